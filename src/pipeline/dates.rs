use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use crate::model::DocumentGroup;
use crate::util::truncate_chars;

const FIRST_PAGE_WINDOW_CHARS: usize = 1000;
const MAX_PAST_DAYS: i64 = 730;
const MAX_FUTURE_DAYS: i64 = 90;

const CANDIDATE_PATTERNS: [&str; 3] = [
    r"\b(\d{1,2}\.\d{1,2}\.\d{2,4})\b",
    r"\b(\d{4}-\d{2}-\d{2})\b",
    r"(?i)\b((?:\d{1,2}\.\s*)?(?:jan|feb|m(?:ae|a|ä)r|apr|ma[iy]|jun|jul|aug|sep|o[ck]t|nov|de[cz])[a-zäöü]*\.?\s+\d{4})\b",
];

const GERMAN_MONTHS: [(&str, &str); 14] = [
    ("januar", "January"),
    ("februar", "February"),
    ("märz", "March"),
    ("maerz", "March"),
    ("mär", "Mar"),
    ("mai", "May"),
    ("juni", "June"),
    ("juli", "July"),
    ("oktober", "October"),
    ("okt", "Oct"),
    ("dezember", "December"),
    ("dez", "Dec"),
    ("sept", "Sep"),
    ("febr", "Feb"),
];

/// Formats tried in order; the first one that parses wins.
const DATE_FORMATS: [DateFormat; 9] = [
    DateFormat::day("%d.%m.%Y"),
    DateFormat::day("%d.%m.%y"),
    DateFormat::day("%Y-%m-%d"),
    DateFormat::month("%B %Y"),
    DateFormat::month("%b %Y"),
    DateFormat::month("%B. %Y"),
    DateFormat::month("%b. %Y"),
    DateFormat::day("%d. %B %Y"),
    DateFormat::day("%d. %b %Y"),
];

#[derive(Debug, Clone, Copy)]
struct DateFormat {
    pattern: &'static str,
    month_only: bool,
}

impl DateFormat {
    const fn day(pattern: &'static str) -> Self {
        Self {
            pattern,
            month_only: false,
        }
    }

    const fn month(pattern: &'static str) -> Self {
        Self {
            pattern,
            month_only: true,
        }
    }

    fn parse(&self, candidate: &str) -> Option<NaiveDate> {
        if self.pattern == "%d.%m.%Y" && trailing_digit_count(candidate) != 4 {
            return None;
        }

        if self.month_only {
            // Month-year dates resolve to the first of the month.
            let padded = format!("1 {candidate}");
            let pattern = format!("%d {}", self.pattern);
            return NaiveDate::parse_from_str(&padded, &pattern).ok();
        }

        NaiveDate::parse_from_str(candidate, self.pattern).ok()
    }
}

#[derive(Debug, Clone)]
pub struct DateExtractor {
    patterns: Vec<Regex>,
    german_months: Vec<(Regex, &'static str)>,
}

impl DateExtractor {
    pub fn new() -> Result<Self> {
        let patterns = CANDIDATE_PATTERNS
            .iter()
            .map(|source| {
                Regex::new(source)
                    .with_context(|| format!("failed to compile date candidate regex: {source}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        let german_months = GERMAN_MONTHS
            .iter()
            .map(|(german, english)| {
                Regex::new(&format!(r"\b{german}\b"))
                    .with_context(|| format!("failed to compile month regex: {german}"))
                    .map(|regex| (regex, *english))
            })
            .collect::<Result<Vec<(Regex, &'static str)>>>()?;

        Ok(Self {
            patterns,
            german_months,
        })
    }

    /// Raw candidate strings in first-occurrence order, without duplicates.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut candidates = Vec::<String>::new();
        for pattern in &self.patterns {
            for captures in pattern.captures_iter(text) {
                let Some(value) = captures.get(1) else {
                    continue;
                };
                let value = value.as_str().to_string();
                if !candidates.contains(&value) {
                    candidates.push(value);
                }
            }
        }
        candidates
    }

    pub fn parse(&self, candidate: &str) -> Option<NaiveDate> {
        let normalized = self.normalize_month_names(candidate.trim());
        DATE_FORMATS
            .iter()
            .find_map(|format| format.parse(&normalized))
    }

    /// Picks the latest plausible date, preferring candidates near the top of the first page.
    ///
    /// `None` means no candidate was plausible; callers fall back to the processing date.
    pub fn resolve(&self, group: &DocumentGroup, today: NaiveDate) -> Option<NaiveDate> {
        if group.date_candidates.is_empty() {
            return None;
        }

        let first_page = truncate_chars(&group.first_page_text, FIRST_PAGE_WINDOW_CHARS);
        let first_page_dates = self.parse_all(&self.extract(&first_page));
        let parsed = if first_page_dates.is_empty() {
            self.parse_all(&group.date_candidates)
        } else {
            first_page_dates
        };

        parsed
            .into_iter()
            .filter(|date| is_plausible(*date, today))
            .max()
    }

    fn parse_all(&self, candidates: &[String]) -> Vec<NaiveDate> {
        candidates
            .iter()
            .filter_map(|candidate| self.parse(candidate))
            .collect()
    }

    fn normalize_month_names(&self, candidate: &str) -> String {
        let lowered = candidate.to_lowercase();
        for (pattern, english) in &self.german_months {
            if pattern.is_match(&lowered) {
                return pattern.replace_all(&lowered, *english).into_owned();
            }
        }
        candidate.to_string()
    }
}

/// Accepts dates from two years back up to ninety days ahead of `today`.
pub fn is_plausible(date: NaiveDate, today: NaiveDate) -> bool {
    let days = date.signed_duration_since(today).num_days();
    (-MAX_PAST_DAYS..=MAX_FUTURE_DAYS).contains(&days)
}

fn trailing_digit_count(candidate: &str) -> usize {
    candidate
        .chars()
        .rev()
        .take_while(|character| character.is_ascii_digit())
        .count()
}
