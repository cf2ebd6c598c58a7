use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::error::ScanFailure;
use crate::model::{DocumentPlan, Page, SavedDocumentRecord};
use crate::util::ensure_directory;

use super::blank::is_blank;

/// Read access to the source pages plus the ability to copy a selection into a new file.
pub trait PageStore {
    fn page(&self, index: usize) -> Option<Page>;

    /// Writes `indices` in the given order to a new PDF at `path`.
    fn write_pages(&self, indices: &[usize], path: &Path) -> Result<()>;
}

/// Persists plans as `<base>/<year>/<category>/<YYYY-MM-DD>_<stem>.pdf`.
///
/// Identical target paths within one run overwrite each other.
#[derive(Debug, Clone)]
pub struct OutputOrganizer {
    base: PathBuf,
}

impl OutputOrganizer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn target_path(&self, plan: &DocumentPlan) -> PathBuf {
        self.base
            .join(plan.date.format("%Y").to_string())
            .join(&plan.category)
            .join(format!(
                "{}_{}.pdf",
                plan.date.format("%Y-%m-%d"),
                plan.filename_stem
            ))
    }

    pub fn save(
        &self,
        store: &dyn PageStore,
        plans: &[DocumentPlan],
    ) -> Result<Vec<SavedDocumentRecord>> {
        let mut records = Vec::with_capacity(plans.len());

        for plan in plans {
            let kept = plan
                .group
                .pages
                .iter()
                .copied()
                .filter(|index| store.page(*index).is_some_and(|page| !is_blank(&page)))
                .collect::<Vec<usize>>();

            if kept.is_empty() {
                debug!(pages = ?plan.group.pages, "skipping document without writable pages");
                continue;
            }

            let path = self.target_path(plan);
            if let Some(parent) = path.parent() {
                ensure_directory(parent).map_err(|err| ScanFailure::PersistenceFailure {
                    message: format!("{err:#}"),
                })?;
            }
            store
                .write_pages(&kept, &path)
                .map_err(|err| ScanFailure::PersistenceFailure {
                    message: format!("{err:#}"),
                })?;

            info!(
                path = %path.display(),
                pages = kept.len(),
                date_source = ?plan.date_source,
                "saved document"
            );

            records.push(SavedDocumentRecord {
                sender: plan.sender.clone(),
                doc_type: plan.doc_type.clone(),
                date: plan.date.format("%Y-%m-%d").to_string(),
                pages: kept.len(),
                saved_to: path.display().to_string(),
            });
        }

        Ok(records)
    }
}
