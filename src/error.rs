use thiserror::Error;

use crate::model::RunStatus;

/// Run-level failures. An empty feeder and an unresolvable date are not failures.
#[derive(Debug, Error)]
pub enum ScanFailure {
    #[error("missing tools: {}", .tools.join(", "))]
    ToolUnavailable { tools: Vec<String> },

    #[error("scanner error: {message}")]
    AcquisitionFailure { message: String },

    #[error("scanner '{scanner}' not available")]
    ScannerNotFound {
        scanner: String,
        available: Vec<String>,
    },

    #[error("unreadable PDF: {message}")]
    MalformedInput { message: String },

    #[error("failed to write output: {message}")]
    PersistenceFailure { message: String },

    #[error("{message}")]
    InvalidRequest { code: &'static str, message: String },

    #[error("{message}")]
    Processing { message: String },
}

impl ScanFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ToolUnavailable { .. } => "missing_tools",
            Self::AcquisitionFailure { .. } => "scan_failed",
            Self::ScannerNotFound { .. } => "scanner_not_found",
            Self::MalformedInput { .. } => "malformed_input",
            Self::PersistenceFailure { .. } => "persistence_failed",
            Self::InvalidRequest { code, .. } => *code,
            Self::Processing { .. } => "processing_failed",
        }
    }

    /// Recovers the typed failure from an error chain, or wraps it as a processing error.
    pub fn from_error(err: anyhow::Error) -> Self {
        match err.downcast::<ScanFailure>() {
            Ok(failure) => failure,
            Err(other) => Self::Processing {
                message: format!("{other:#}"),
            },
        }
    }

    pub fn to_status(&self) -> RunStatus {
        let (missing, available_scanners) = match self {
            Self::ToolUnavailable { tools } => (tools.clone(), Vec::new()),
            Self::ScannerNotFound { available, .. } => (Vec::new(), available.clone()),
            _ => (Vec::new(), Vec::new()),
        };

        RunStatus::Error {
            error: self.code().to_string(),
            message: self.to_string(),
            missing,
            available_scanners,
        }
    }
}
