use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{info, warn};

use super::process::{command_available, run_with_timeout};

/// Adds a text layer with `ocrmypdf`. Never blocks the run: on any failure the input is used as is.
#[derive(Debug, Clone)]
pub struct Ocrmypdf {
    pub program: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutcome {
    pub path: PathBuf,
    pub applied: bool,
    pub warning: Option<String>,
}

impl OcrOutcome {
    fn skipped(input: &Path, warning: String) -> Self {
        warn!(input = %input.display(), reason = %warning, "continuing without OCR");
        Self {
            path: input.to_path_buf(),
            applied: false,
            warning: Some(warning),
        }
    }
}

impl Ocrmypdf {
    pub fn apply(&self, input: &Path, output: &Path) -> OcrOutcome {
        if !command_available(&self.program) {
            return OcrOutcome::skipped(input, format!("{} is not installed", self.program));
        }

        let mut command = Command::new(&self.program);
        command
            .arg("--skip-text")
            .arg("--optimize")
            .arg("1")
            .arg("--output-type")
            .arg("pdf")
            .arg(input)
            .arg(output);

        match run_with_timeout(&mut command, self.timeout, None) {
            Ok(result) if result.status.success() && output.exists() => {
                info!(output = %output.display(), "applied OCR");
                OcrOutcome {
                    path: output.to_path_buf(),
                    applied: true,
                    warning: None,
                }
            }
            Ok(result) => {
                let stderr = String::from_utf8_lossy(&result.stderr);
                OcrOutcome::skipped(
                    input,
                    format!("{} failed: {}", self.program, stderr.trim()),
                )
            }
            Err(err) => OcrOutcome::skipped(input, format!("{} failed: {err:#}", self.program)),
        }
    }
}
