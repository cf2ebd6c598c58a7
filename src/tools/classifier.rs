use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::util::truncate_chars;

use super::process::run_with_timeout;

const CLASSIFIER_INPUT_CHARS: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub sender: Option<String>,
    pub date: Option<NaiveDate>,
    pub confidence: f32,
}

impl Classification {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_usable(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence && (self.sender.is_some() || self.date.is_some())
    }
}

/// Optional sender/date oracle. Implementations must not fail: "unknown" is the fallback.
pub trait DocumentClassifier {
    fn classify(&self, text: &str) -> Classification;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl DocumentClassifier for NoClassifier {
    fn classify(&self, _text: &str) -> Classification {
        Classification::unknown()
    }
}

/// Runs an external program that reads document text on stdin and answers with
/// `{"sender": ..., "date": "YYYY-MM-DD", "confidence": 0.0-1.0}` on stdout.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandClassifier {
    fn try_classify(&self, text: &str) -> Result<Classification> {
        let input = truncate_chars(text, CLASSIFIER_INPUT_CHARS);

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        let output = run_with_timeout(&mut command, self.timeout, Some(input.as_bytes()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("classifier exited with {}: {}", output.status, stderr.trim());
        }

        parse_classifier_response(&output.stdout)
    }
}

impl DocumentClassifier for CommandClassifier {
    fn classify(&self, text: &str) -> Classification {
        match self.try_classify(text) {
            Ok(classification) => classification,
            Err(err) => {
                warn!(program = %self.program.display(), error = %err, "classifier unavailable");
                Classification::unknown()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    sender: Option<String>,
    date: Option<String>,
    confidence: Option<f32>,
}

pub(crate) fn parse_classifier_response(raw: &[u8]) -> Result<Classification> {
    let parsed: RawClassification =
        serde_json::from_slice(raw).context("failed to parse classifier response")?;

    let sender = parsed
        .sender
        .map(|sender| sender.trim().to_string())
        .filter(|sender| !sender.is_empty() && !sender.eq_ignore_ascii_case("unknown"));
    let date = parsed
        .date
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok());

    Ok(Classification {
        sender,
        date,
        confidence: parsed.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
    })
}
