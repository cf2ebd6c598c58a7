//! External collaborators: scanner driver, OCR, and the optional classifier.

mod classifier;
mod ocr;
mod process;
mod scanline;

pub use classifier::{CommandClassifier, DocumentClassifier, NoClassifier};
pub use ocr::Ocrmypdf;
pub use scanline::{OCRMYPDF, SCANLINE, Scanline, list_scanners, require_tools};

#[cfg(test)]
pub(crate) use classifier::Classification;
