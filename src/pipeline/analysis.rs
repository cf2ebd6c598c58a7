use anyhow::Result;

use crate::config::SenderPatterns;
use crate::model::{Page, PageAnalysis};
use crate::util::truncate_chars;

use super::indicator::IndicatorParser;

const HEADER_DIVISOR: usize = 5;
const FOOTER_DIVISOR: usize = 10;
const EDGE_TEXT_MAX_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct PageAnalyzer {
    indicators: IndicatorParser,
    senders: SenderPatterns,
}

impl PageAnalyzer {
    pub fn new(senders: SenderPatterns) -> Result<Self> {
        Ok(Self {
            indicators: IndicatorParser::new()?,
            senders,
        })
    }

    pub fn analyze(&self, page: &Page) -> PageAnalysis {
        let text = page.text.as_str();
        let lines = text.split('\n').collect::<Vec<&str>>();

        let header_count = lines.len().div_ceil(HEADER_DIVISOR).max(1).min(lines.len());
        let footer_count = lines.len().div_ceil(FOOTER_DIVISOR).max(1).min(lines.len());

        let header_text = lines[..header_count].join("\n").to_lowercase();
        let footer_text = lines[lines.len() - footer_count..].join("\n").to_lowercase();

        let sender = self.senders.match_sender(&header_text, &footer_text);

        PageAnalysis {
            index: page.index,
            indicator: self.indicators.parse(text),
            sender,
            header_text: truncate_chars(&header_text, EDGE_TEXT_MAX_CHARS),
            footer_text: truncate_chars(&footer_text, EDGE_TEXT_MAX_CHARS),
            full_text: text.to_string(),
            text_length: text.chars().count(),
            line_count: lines.len(),
        }
    }
}
