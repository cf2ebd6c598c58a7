use anyhow::Result;
use tracing::info;

use crate::cli::ScannersArgs;
use crate::model::RunStatus;
use crate::tools::{list_scanners, require_tools};

pub fn run(args: ScannersArgs) -> Result<RunStatus> {
    let scanners = list_scanners(&args.program);
    info!(program = %args.program, count = scanners.len(), "listed scanners");

    Ok(RunStatus::Ok {
        scanners: Some(scanners),
        tools: None,
    })
}

pub fn check() -> Result<RunStatus> {
    let tools = require_tools()?;
    for tool in &tools {
        info!(
            tool = %tool.name,
            required = tool.required,
            available = tool.available,
            "tool check"
        );
    }

    Ok(RunStatus::Ok {
        scanners: None,
        tools: Some(tools),
    })
}
