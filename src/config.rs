use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SenderPattern {
    pub sender: String,
    pub fragments: Vec<String>,
}

/// Which analysis positions may open a new document.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Only even positions, i.e. the front of each physical sheet.
    #[default]
    SheetFronts,
    EveryPage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    pub sender_patterns: Vec<SenderPattern>,
    pub boundary_policy: BoundaryPolicy,
    pub classifier_min_confidence: f32,
    pub classifier_timeout_secs: u64,
    pub ocr_timeout_secs: u64,
    pub scan_timeout_secs: u64,
    pub scan_resolution: u32,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            sender_patterns: Vec::new(),
            boundary_policy: BoundaryPolicy::SheetFronts,
            classifier_min_confidence: 0.5,
            classifier_timeout_secs: 60,
            ocr_timeout_secs: 300,
            scan_timeout_secs: 600,
            scan_resolution: 300,
        }
    }
}

impl OrganizerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(
            path = %path.display(),
            senders = config.sender_patterns.len(),
            "loaded organizer config"
        );

        Ok(config)
    }

    pub fn from_json(raw: &[u8]) -> Result<Self> {
        let mut config: Self = serde_json::from_slice(raw)?;
        for pattern in &mut config.sender_patterns {
            pattern.fragments = pattern
                .fragments
                .iter()
                .map(|fragment| fragment.trim().to_lowercase())
                .filter(|fragment| !fragment.is_empty())
                .collect();
        }
        Ok(config)
    }

    pub fn sender_table(&self) -> SenderPatterns {
        SenderPatterns::new(self.sender_patterns.clone())
    }
}

/// Ordered sender identifier -> text fragment table. Earlier entries win.
#[derive(Debug, Clone, Default)]
pub struct SenderPatterns {
    entries: Vec<SenderPattern>,
}

impl SenderPatterns {
    pub fn new(entries: Vec<SenderPattern>) -> Self {
        Self { entries }
    }

    /// Both inputs are expected to be lowercased already.
    pub fn match_sender(&self, header_text: &str, footer_text: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| {
                entry.fragments.iter().any(|fragment| {
                    header_text.contains(fragment.as_str()) || footer_text.contains(fragment.as_str())
                })
            })
            .map(|entry| entry.sender.clone())
    }
}
