use anyhow::Result;
use tracing::info;

use crate::cli::OrganizeArgs;
use crate::clock::SystemClock;
use crate::model::RunStatus;

use super::process::{ProcessingContext, process_documents};

pub fn run(args: OrganizeArgs) -> Result<RunStatus> {
    info!(
        front = %args.front.display(),
        back = ?args.back.as_ref().map(|path| path.display().to_string()),
        output = %args.output.display(),
        "organize requested"
    );

    let context = ProcessingContext::from_args(&args.processing)?;
    process_documents(
        &args.front,
        args.back.as_deref(),
        &args.output,
        &context,
        &SystemClock,
    )
}
