use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{OcrMode, ProcessingArgs};
use crate::clock::Clock;
use crate::config::OrganizerConfig;
use crate::error::ScanFailure;
use crate::model::{InputEntry, RunManifest, RunStatus};
use crate::pdf::ScanDocument;
use crate::pipeline::{OutputOrganizer, Pipeline};
use crate::tools::{CommandClassifier, DocumentClassifier, NoClassifier, OCRMYPDF, Ocrmypdf};
use crate::util::{ensure_directory, rfc3339_seconds, run_id, sha256_file, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;
const MERGED_SCAN: &str = "merged-scan.pdf";
const OCR_SCAN: &str = "ocr-scan.pdf";

/// Everything a run needs besides its input files.
pub struct ProcessingContext {
    pub config: OrganizerConfig,
    pub ocr: OcrMode,
    pub classifier: Box<dyn DocumentClassifier>,
    pub staging_dir: PathBuf,
    pub report_path: Option<PathBuf>,
}

impl ProcessingContext {
    pub fn from_args(args: &ProcessingArgs) -> Result<Self> {
        let mut config = OrganizerConfig::load(args.config.as_deref())?;
        if let Some(policy) = args.boundary_policy {
            config.boundary_policy = policy;
        }

        let classifier: Box<dyn DocumentClassifier> = match &args.classifier_command {
            Some(program) => Box::new(CommandClassifier {
                program: program.clone(),
                args: args.classifier_args.clone(),
                timeout: Duration::from_secs(config.classifier_timeout_secs),
            }),
            None => Box::new(NoClassifier),
        };

        info!(
            ocr = args.ocr.as_str(),
            boundary_policy = ?config.boundary_policy,
            classifier = args.classifier_command.is_some(),
            "resolved processing options"
        );

        Ok(Self {
            config,
            ocr: args.ocr,
            classifier,
            staging_dir: args.staging_dir.clone(),
            report_path: args.report_path.clone(),
        })
    }
}

/// Loads the scan(s), merges duplex input, applies OCR, then plans and saves documents.
pub fn process_documents(
    front: &Path,
    back: Option<&Path>,
    output: &Path,
    context: &ProcessingContext,
    clock: &dyn Clock,
) -> Result<RunStatus> {
    let started_ts = Utc::now();
    let started_at = rfc3339_seconds(started_ts);
    let run_id = run_id(started_ts);

    info!(run_id = %run_id, duplex = back.is_some(), "processing scan");

    let mut inputs = Vec::<InputEntry>::new();
    let mut warnings = Vec::<String>::new();

    let front_document = load_input(front, &mut inputs)?;
    let (document, source_path) = match back {
        Some(back) => {
            let back_document = load_input(back, &mut inputs)?;
            let merged = ScanDocument::interleave(front_document, back_document)
                .context("failed to merge front and back scans")?;

            ensure_directory(&context.staging_dir)?;
            let merged_path = context.staging_dir.join(MERGED_SCAN);
            merged.save(&merged_path)?;
            (merged, merged_path)
        }
        None => (front_document, front.to_path_buf()),
    };

    let (document, ocr_applied) = match context.ocr {
        OcrMode::Off => (document, false),
        OcrMode::Auto => {
            ensure_directory(&context.staging_dir)?;
            let ocr = Ocrmypdf {
                program: OCRMYPDF.to_string(),
                timeout: Duration::from_secs(context.config.ocr_timeout_secs),
            };
            apply_ocr(
                &ocr,
                document,
                &source_path,
                &context.staging_dir.join(OCR_SCAN),
                &mut warnings,
            )
        }
    };

    let pages = document.pages();
    if pages.is_empty() {
        info!(run_id = %run_id, "scan has no pages");
        return Ok(RunStatus::Empty {
            message: "Scan contains no pages".to_string(),
        });
    }

    let pipeline = Pipeline::new(&context.config, context.classifier.as_ref(), clock)?;
    let plan = pipeline.plan(&pages);
    let records = OutputOrganizer::new(output).save(&document, &plan.documents)?;

    info!(
        run_id = %run_id,
        pages = pages.len(),
        blank = plan.blank_pages.len(),
        documents = records.len(),
        "run completed"
    );

    if let Some(report_path) = &context.report_path {
        let manifest = RunManifest {
            manifest_version: MANIFEST_VERSION,
            run_id,
            started_at,
            finished_at: rfc3339_seconds(Utc::now()),
            duplex: back.is_some(),
            ocr_applied,
            inputs,
            source_page_count: pages.len(),
            blank_pages: plan.blank_pages,
            documents: records.clone(),
            warnings: warnings.clone(),
        };
        write_json_pretty(report_path, &manifest)?;
        info!(path = %report_path.display(), "wrote run manifest");
    }

    Ok(RunStatus::complete(records, warnings))
}

/// Swaps in the OCR'd scan when it can be read; otherwise the run continues on `document`.
pub(super) fn apply_ocr(
    ocr: &Ocrmypdf,
    document: ScanDocument,
    source: &Path,
    output: &Path,
    warnings: &mut Vec<String>,
) -> (ScanDocument, bool) {
    let outcome = ocr.apply(source, output);
    warnings.extend(outcome.warning);
    if !outcome.applied {
        return (document, false);
    }

    match ScanDocument::load(&outcome.path) {
        Ok(ocr_document) => (ocr_document, true),
        Err(err) => {
            warn!(
                path = %outcome.path.display(),
                error = %err,
                "OCR output unreadable; continuing with the original scan"
            );
            warnings.push(format!("{} output could not be read: {err}", ocr.program));
            (document, false)
        }
    }
}

fn load_input(path: &Path, inputs: &mut Vec<InputEntry>) -> Result<ScanDocument> {
    if !path.is_file() {
        return Err(ScanFailure::InvalidRequest {
            code: "input_not_found",
            message: format!("Input PDF not found: {}", path.display()),
        }
        .into());
    }

    let sha256 = sha256_file(path)?;
    let document = ScanDocument::load(path)?;
    inputs.push(InputEntry {
        path: path.display().to_string(),
        sha256,
        page_count: document.page_count(),
    });

    Ok(document)
}
