use crate::config::BoundaryPolicy;
use crate::model::{DocumentGroup, PageAnalysis};
use crate::util::lowercase_prefix;

use super::dates::DateExtractor;

const GREETING_PHRASES: [&str; 2] = ["sehr geehrte", "guten tag"];
const GREETING_WINDOW_CHARS: usize = 500;
const UNKNOWN_TYPE: &str = "unknown";

/// Pages believed to form one document, still in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    pub sender: Option<String>,
    pub analyses: Vec<PageAnalysis>,
}

impl PageGroup {
    fn start(analysis: PageAnalysis) -> Self {
        Self {
            sender: analysis.sender.clone(),
            analyses: vec![analysis],
        }
    }

    /// Sorts by indicator number only when every page has one.
    pub fn reorder(&mut self) {
        let fully_numbered = self
            .analyses
            .iter()
            .all(|analysis| analysis.indicator.is_some());
        if fully_numbered {
            self.analyses
                .sort_by_key(|analysis| analysis.indicator.map(|indicator| indicator.number));
        }
    }

    pub fn finalize(mut self, dates: &DateExtractor) -> DocumentGroup {
        self.reorder();

        let text = self
            .analyses
            .iter()
            .map(|analysis| analysis.full_text.as_str())
            .collect::<Vec<&str>>()
            .join("\n");
        let first_page_text = self
            .analyses
            .first()
            .map(|analysis| analysis.full_text.clone())
            .unwrap_or_default();

        DocumentGroup {
            pages: self.analyses.iter().map(|analysis| analysis.index).collect(),
            indicators: self
                .analyses
                .iter()
                .map(|analysis| analysis.indicator)
                .collect(),
            date_candidates: dates.extract(&text),
            doc_type: self
                .sender
                .clone()
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            sender: self.sender,
            first_page_text,
            text,
        }
    }
}

/// Splits the analysis sequence (blanks already removed) at document boundaries.
///
/// Under `SheetFronts` only even positions are boundary candidates: each sheet is
/// checked at its front side.
pub fn group_pages(analyses: Vec<PageAnalysis>, policy: BoundaryPolicy) -> Vec<PageGroup> {
    let mut groups = Vec::<PageGroup>::new();

    for (position, analysis) in analyses.into_iter().enumerate() {
        match groups.last_mut() {
            Some(current) if !starts_new_group(position, &analysis, current, policy) => {
                current.analyses.push(analysis);
            }
            _ => groups.push(PageGroup::start(analysis)),
        }
    }

    groups
}

pub fn segment(
    analyses: Vec<PageAnalysis>,
    dates: &DateExtractor,
    policy: BoundaryPolicy,
) -> Vec<DocumentGroup> {
    group_pages(analyses, policy)
        .into_iter()
        .map(|group| group.finalize(dates))
        .collect()
}

fn starts_new_group(
    position: usize,
    analysis: &PageAnalysis,
    current: &PageGroup,
    policy: BoundaryPolicy,
) -> bool {
    if policy == BoundaryPolicy::SheetFronts && position % 2 != 0 {
        return false;
    }

    if analysis.indicator.map(|indicator| indicator.number) == Some(1) {
        return true;
    }

    if let (Some(sender), Some(current_sender)) = (&analysis.sender, &current.sender) {
        if sender != current_sender {
            return true;
        }
    }

    has_greeting(&analysis.full_text)
}

fn has_greeting(text: &str) -> bool {
    let opening = lowercase_prefix(text, GREETING_WINDOW_CHARS);
    GREETING_PHRASES
        .iter()
        .any(|phrase| opening.contains(phrase))
}
