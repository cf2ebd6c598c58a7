use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, trace};

use crate::clock::Clock;
use crate::config::{BoundaryPolicy, OrganizerConfig};
use crate::model::{DateSource, DocumentGroup, DocumentPlan, Page, ReconstructionPlan};
use crate::tools::DocumentClassifier;

use super::analysis::PageAnalyzer;
use super::blank::is_blank;
use super::dates::{DateExtractor, is_plausible};
use super::segment::segment;
use super::taxonomy::{category_name, filename_stem};

/// Turns the physically ordered pages of one scan into document plans.
pub struct Pipeline<'a> {
    analyzer: PageAnalyzer,
    dates: DateExtractor,
    classifier: &'a dyn DocumentClassifier,
    min_confidence: f32,
    boundary_policy: BoundaryPolicy,
    clock: &'a dyn Clock,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &OrganizerConfig,
        classifier: &'a dyn DocumentClassifier,
        clock: &'a dyn Clock,
    ) -> Result<Self> {
        Ok(Self {
            analyzer: PageAnalyzer::new(config.sender_table())?,
            dates: DateExtractor::new()?,
            classifier,
            min_confidence: config.classifier_min_confidence,
            boundary_policy: config.boundary_policy,
            clock,
        })
    }

    pub fn plan(&self, pages: &[Page]) -> ReconstructionPlan {
        let (blank, content): (Vec<&Page>, Vec<&Page>) =
            pages.iter().partition(|page| is_blank(page));
        let blank_pages = blank.iter().map(|page| page.index).collect::<Vec<usize>>();

        let analyses = content
            .into_iter()
            .map(|page| self.analyzer.analyze(page))
            .collect::<Vec<_>>();
        for analysis in &analyses {
            trace!(
                page = analysis.index,
                lines = analysis.line_count,
                chars = analysis.text_length,
                indicator = ?analysis.indicator,
                sender = ?analysis.sender,
                header = %analysis.header_text,
                footer = %analysis.footer_text,
                "analyzed page"
            );
        }
        let groups = segment(analyses, &self.dates, self.boundary_policy);

        info!(
            pages = pages.len(),
            blank = blank_pages.len(),
            documents = groups.len(),
            "segmented scan"
        );

        let today = self.clock.today();
        let documents = groups
            .into_iter()
            .enumerate()
            .map(|(position, group)| self.plan_document(group, position, today))
            .collect();

        ReconstructionPlan {
            documents,
            blank_pages,
        }
    }

    fn plan_document(
        &self,
        group: DocumentGroup,
        position: usize,
        today: NaiveDate,
    ) -> DocumentPlan {
        let classification = self.classifier.classify(&group.text);
        let hint = classification
            .is_usable(self.min_confidence)
            .then_some(classification);

        let classified_sender = hint
            .as_ref()
            .and_then(|hint| hint.sender.clone())
            .filter(|sender| !sender.trim().is_empty());
        let classified_date = hint
            .as_ref()
            .and_then(|hint| hint.date)
            .filter(|date| is_plausible(*date, today));

        let sender = classified_sender.or_else(|| group.sender.clone());
        let doc_type = sender.clone().unwrap_or_else(|| group.doc_type.clone());

        let (date, date_source) = match classified_date {
            Some(date) => (date, DateSource::Classifier),
            None => match self.dates.resolve(&group, today) {
                Some(date) => (date, DateSource::Content),
                None => (today, DateSource::ProcessingDate),
            },
        };

        let category = category_name(&doc_type);
        let filename_stem = filename_stem(&group.text, &doc_type, position);

        debug!(
            position,
            pages = group.pages.len(),
            numbered = group.indicators.iter().all(Option::is_some),
            doc_type = %doc_type,
            date = %date,
            source = ?date_source,
            "planned document"
        );

        DocumentPlan {
            group,
            sender,
            doc_type,
            date,
            date_source,
            category,
            filename_stem,
        }
    }
}
