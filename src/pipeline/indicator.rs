use anyhow::{Context, Result};
use regex::Regex;

use crate::model::PageIndicator;

const INDICATOR_PATTERNS: [&str; 3] = [
    r"(\d+)\s*/\s*(\d+)",
    r"[Pp]age\s+(\d+)\s+of\s+(\d+)",
    r"[Ss]eite\s+(\d+)\s+von\s+(\d+)",
];

#[derive(Debug, Clone)]
pub struct IndicatorParser {
    patterns: Vec<Regex>,
}

impl IndicatorParser {
    pub fn new() -> Result<Self> {
        let patterns = INDICATOR_PATTERNS
            .iter()
            .map(|source| {
                Regex::new(source)
                    .with_context(|| format!("failed to compile page indicator regex: {source}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        Ok(Self { patterns })
    }

    /// First pattern that matches wins; conflicting markers on one page are not reconciled.
    pub fn parse(&self, text: &str) -> Option<PageIndicator> {
        self.patterns.iter().find_map(|pattern| {
            let captures = pattern.captures(text)?;
            let number = captures.get(1)?.as_str().parse::<u32>().ok()?;
            let total = captures.get(2)?.as_str().parse::<u32>().ok()?;
            Some(PageIndicator { number, total })
        })
    }
}
