use chrono::NaiveDate;
use serde::Serialize;

/// One physical page of the (merged) source scan, as read from the PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub text: String,
    pub has_graphics: bool,
    pub malformed: bool,
}

impl Page {
    pub fn new(index: usize, text: impl Into<String>, has_graphics: bool) -> Self {
        Self {
            index,
            text: text.into(),
            has_graphics,
            malformed: false,
        }
    }

    pub fn malformed(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            has_graphics: false,
            malformed: true,
        }
    }
}

/// A printed "page X of Y" marker. Never validated: `number > total` is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageIndicator {
    pub number: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnalysis {
    pub index: usize,
    pub indicator: Option<PageIndicator>,
    pub sender: Option<String>,
    pub header_text: String,
    pub footer_text: String,
    pub full_text: String,
    pub text_length: usize,
    pub line_count: usize,
}

/// A finalized logical document: pages are already in their reconstructed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    pub pages: Vec<usize>,
    pub sender: Option<String>,
    pub indicators: Vec<Option<PageIndicator>>,
    pub first_page_text: String,
    pub text: String,
    pub date_candidates: Vec<String>,
    pub doc_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Classifier,
    Content,
    ProcessingDate,
}

/// Everything the output organizer needs to persist one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPlan {
    pub group: DocumentGroup,
    pub sender: Option<String>,
    pub doc_type: String,
    pub date: NaiveDate,
    pub date_source: DateSource,
    pub category: String,
    pub filename_stem: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionPlan {
    pub documents: Vec<DocumentPlan>,
    pub blank_pages: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedDocumentRecord {
    pub sender: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub date: String,
    pub pages: usize,
    pub saved_to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolAvailability {
    pub name: String,
    pub required: bool,
    pub available: bool,
}

/// The single JSON object every command prints on stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Complete {
        documents: Vec<SavedDocumentRecord>,
        total_pages: usize,
        total_documents: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Empty {
        message: String,
    },
    AwaitingFlip {
        pages: usize,
        front_pdf: String,
        message: String,
    },
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        scanners: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tools: Option<Vec<ToolAvailability>>,
    },
    Error {
        error: String,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        missing: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        available_scanners: Vec<String>,
    },
}

impl RunStatus {
    pub fn complete(documents: Vec<SavedDocumentRecord>, warnings: Vec<String>) -> Self {
        let total_pages = documents.iter().map(|document| document.pages).sum();
        let total_documents = documents.len();
        Self::Complete {
            documents,
            total_pages,
            total_documents,
            warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputEntry {
    pub path: String,
    pub sha256: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub duplex: bool,
    pub ocr_applied: bool,
    pub inputs: Vec<InputEntry>,
    pub source_page_count: usize,
    pub blank_pages: Vec<usize>,
    pub documents: Vec<SavedDocumentRecord>,
    pub warnings: Vec<String>,
}
