use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use super::process::apply_ocr;
use super::*;
use crate::cli::OcrMode;
use crate::clock::FixedClock;
use crate::config::{BoundaryPolicy, OrganizerConfig, SenderPattern};
use crate::error::ScanFailure;
use crate::model::RunStatus;
use crate::pdf::ScanDocument;
use crate::pdf::fixtures::{build_scan, build_scan_pages, build_text_scan};
use crate::tools::{NoClassifier, Ocrmypdf};

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).expect("test date should be valid"))
}

fn context(root: &Path, report_path: Option<PathBuf>) -> ProcessingContext {
    ProcessingContext {
        config: OrganizerConfig::default(),
        ocr: OcrMode::Off,
        classifier: Box::new(NoClassifier),
        staging_dir: root.join("staging"),
        report_path,
    }
}

fn write_scan(path: &Path, pages: &[(i64, bool)]) {
    build_scan_pages(pages)
        .save(path)
        .expect("fixture PDF should be written");
}

#[test]
fn single_sided_scan_without_text_becomes_one_dated_document() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let front = root.path().join("front.pdf");
    build_scan(&[100, 101, 102], true)
        .save(&front)
        .expect("fixture PDF should be written");
    let output = root.path().join("documents");

    let status = process_documents(&front, None, &output, &context(root.path(), None), &clock())
        .expect("run should succeed");

    let RunStatus::Complete {
        documents,
        total_pages,
        total_documents,
        warnings,
    } = status
    else {
        panic!("expected a complete status");
    };
    assert_eq!(total_pages, 3);
    assert_eq!(total_documents, 1);
    assert!(warnings.is_empty());

    let expected = output
        .join("2024")
        .join("Unknown")
        .join("2024-06-01_Unknown_1.pdf");
    assert_eq!(PathBuf::from(&documents[0].saved_to), expected);
    let saved = ScanDocument::load(&expected).expect("saved document should load");
    assert_eq!(saved.page_count(), 3);
}

#[test]
fn text_layer_scan_is_split_into_sender_and_unknown_letters() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let front = root.path().join("front.pdf");
    build_text_scan(&[
        "UBS Switzerland AG\nPostfach, 8098 Zürich\nKontoauszug vom 15.03.2024\nBuchungen im Februar\nSeite 1 von 3",
        "UBS Switzerland AG\nPostfach, 8098 Zürich\nBuchungen Fortsetzung\nSaldo vorgetragen\nSeite 2 von 3",
        "UBS Switzerland AG\nPostfach, 8098 Zürich\nSchlusssaldo per Monatsende\nFreundliche Grüsse\nSeite 3 von 3",
        "Hausverwaltung Muster\nBahnhofstrasse 1, 8001 Zürich\nSehr geehrte Damen und Herren\nMitteilung vom 02.05.2024",
        "Wir informieren Sie hiermit über die geplanten Arbeiten im Treppenhaus.\nDie Arbeiten dauern zwei Wochen.",
        "Bei Fragen stehen wir Ihnen gerne zur Verfügung.\nFreundliche Grüsse\nHausverwaltung Muster",
    ])
    .save(&front)
    .expect("fixture PDF should be written");
    let output = root.path().join("documents");

    let mut context = context(root.path(), None);
    context.config = OrganizerConfig {
        sender_patterns: vec![SenderPattern {
            sender: "UBS".to_string(),
            fragments: vec!["ubs switzerland".to_string()],
        }],
        boundary_policy: BoundaryPolicy::EveryPage,
        ..OrganizerConfig::default()
    };

    let status = process_documents(&front, None, &output, &context, &clock())
        .expect("run should succeed");

    let RunStatus::Complete {
        documents,
        total_pages,
        total_documents,
        ..
    } = status
    else {
        panic!("expected a complete status");
    };
    assert_eq!(total_pages, 6);
    assert_eq!(total_documents, 2);

    let statement = output.join("2024").join("Ubs").join("2024-03-15_UBS.pdf");
    let notice = output
        .join("2024")
        .join("Unknown")
        .join("2024-05-02_Mitteilung.pdf");
    assert_eq!(PathBuf::from(&documents[0].saved_to), statement);
    assert_eq!(PathBuf::from(&documents[1].saved_to), notice);

    let saved = ScanDocument::load(&statement).expect("saved statement should load");
    let pages = saved.pages();
    assert_eq!(pages.len(), 3);
    assert!(pages[0].text.contains("Seite 1 von 3"));
    assert!(pages[2].text.contains("Seite 3 von 3"));
    assert_eq!(
        ScanDocument::load(&notice)
            .expect("saved notice should load")
            .page_count(),
        3
    );
}

#[test]
fn duplex_run_drops_blank_backs_and_writes_manifest() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let front = root.path().join("front.pdf");
    let back = root.path().join("back.pdf");
    write_scan(&front, &[(100, true), (101, true), (102, true)]);
    write_scan(&back, &[(200, false), (201, false), (202, false)]);
    let output = root.path().join("documents");
    let report = root.path().join("reports").join("run.json");

    let status = process_documents(
        &front,
        Some(&back),
        &output,
        &context(root.path(), Some(report.clone())),
        &clock(),
    )
    .expect("run should succeed");

    let RunStatus::Complete { total_pages, .. } = status else {
        panic!("expected a complete status");
    };
    assert_eq!(total_pages, 3);
    assert!(root.path().join("staging").join("merged-scan.pdf").is_file());

    let raw = fs::read(&report).expect("manifest should be written");
    let manifest: serde_json::Value = serde_json::from_slice(&raw).expect("manifest should parse");
    assert_eq!(manifest["duplex"], true);
    assert_eq!(manifest["ocr_applied"], false);
    assert_eq!(manifest["source_page_count"], 6);
    assert_eq!(manifest["blank_pages"], serde_json::json!([1, 3, 5]));
    assert_eq!(manifest["inputs"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        manifest["inputs"][0]["sha256"].as_str().map(str::len),
        Some(64)
    );
    assert_eq!(manifest["documents"][0]["pages"], 3);
    assert_eq!(manifest["documents"][0]["type"], "unknown");
}

#[test]
fn scan_without_pages_reports_empty_status() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let front = root.path().join("front.pdf");
    write_scan(&front, &[]);

    let status = process_documents(
        &front,
        None,
        &root.path().join("documents"),
        &context(root.path(), None),
        &clock(),
    )
    .expect("run should succeed");

    assert!(matches!(status, RunStatus::Empty { .. }));
    assert!(!root.path().join("documents").exists());
}

#[test]
fn missing_input_is_rejected_before_processing() {
    let root = tempfile::tempdir().expect("tempdir should be created");

    let err = process_documents(
        &root.path().join("absent.pdf"),
        None,
        &root.path().join("documents"),
        &context(root.path(), None),
        &clock(),
    )
    .expect_err("missing input should fail");

    assert_eq!(ScanFailure::from_error(err).code(), "input_not_found");
}

#[test]
fn unreadable_back_scan_is_malformed_input() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let front = root.path().join("front.pdf");
    let back = root.path().join("back.pdf");
    write_scan(&front, &[(100, true)]);
    fs::write(&back, b"%PDF-1.5 truncated").expect("file should be written");

    let err = process_documents(
        &front,
        Some(&back),
        &root.path().join("documents"),
        &context(root.path(), None),
        &clock(),
    )
    .expect_err("garbage back scan should fail");

    assert_eq!(ScanFailure::from_error(err).code(), "malformed_input");
}

#[cfg(unix)]
#[test]
fn unreadable_ocr_output_falls_back_to_original_scan() {
    let root = tempfile::tempdir().expect("tempdir should be created");
    let source = root.path().join("single-scan.pdf");
    build_scan(&[100, 101], true)
        .save(&source)
        .expect("fixture PDF should be written");
    let output = root.path().join("ocr-scan.pdf");
    fs::write(&output, b"%PDF-1.5 truncated").expect("file should be written");

    // `true` exits 0 and leaves the garbage output in place.
    let ocr = Ocrmypdf {
        program: "true".to_string(),
        timeout: Duration::from_secs(10),
    };
    let document = ScanDocument::load(&source).expect("source should load");
    let mut warnings = Vec::new();

    let (document, applied) = apply_ocr(&ocr, document, &source, &output, &mut warnings);

    assert!(!applied);
    assert_eq!(document.page_count(), 2);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("true output could not be read"));
}
