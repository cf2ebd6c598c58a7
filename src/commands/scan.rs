use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{ScanArgs, ScanSide};
use crate::clock::SystemClock;
use crate::error::ScanFailure;
use crate::model::RunStatus;
use crate::pdf::ScanDocument;
use crate::tools::{SCANLINE, Scanline, list_scanners, require_tools};

use super::organize::{ProcessingContext, process_documents};

/// Name prefixes of everything a scan run leaves in the staging directory.
const STAGING_PREFIXES: [&str; 5] = [
    "front-scan",
    "back-scan",
    "single-scan",
    "merged-scan",
    "ocr-scan",
];

pub fn run(args: ScanArgs) -> Result<RunStatus> {
    require_tools()?;

    let front_pdf = match args.side {
        ScanSide::Back => Some(require_front_pdf(args.front_pdf.as_deref())?),
        ScanSide::Front | ScanSide::Single => None,
    };

    let available = list_scanners(SCANLINE);
    if !available.contains(&args.scanner) {
        return Err(ScanFailure::ScannerNotFound {
            scanner: args.scanner,
            available,
        }
        .into());
    }

    let context = ProcessingContext::from_args(&args.processing)?;
    let scanner = Scanline {
        program: SCANLINE.to_string(),
        scanner: args.scanner.clone(),
        resolution: context.config.scan_resolution,
        timeout: Duration::from_secs(context.config.scan_timeout_secs),
    };

    let Some(scan_path) = scanner.acquire(args.side, &context.staging_dir)? else {
        info!(side = args.side.as_str(), "feeder was empty");
        return Ok(RunStatus::Empty {
            message: "No documents in feeder".to_string(),
        });
    };

    if args.side == ScanSide::Front {
        let pages = ScanDocument::load(&scan_path)?.page_count();
        info!(pages, path = %scan_path.display(), "front sides scanned");
        return Ok(RunStatus::AwaitingFlip {
            pages,
            front_pdf: scan_path.display().to_string(),
            message: format!("Scanned {pages} pages (front sides). Flip the entire stack and reload."),
        });
    }

    let status = match front_pdf {
        Some(front_pdf) => process_documents(
            front_pdf,
            Some(&scan_path),
            &args.output,
            &context,
            &SystemClock,
        )?,
        None => process_documents(&scan_path, None, &args.output, &context, &SystemClock)?,
    };

    cleanup_staging(&context.staging_dir);
    Ok(status)
}

fn require_front_pdf(front_pdf: Option<&Path>) -> Result<&Path> {
    let Some(front_pdf) = front_pdf else {
        return Err(ScanFailure::InvalidRequest {
            code: "missing_front_pdf",
            message: "Front PDF path required for back mode".to_string(),
        }
        .into());
    };

    if !front_pdf.is_file() {
        return Err(ScanFailure::InvalidRequest {
            code: "front_pdf_not_found",
            message: format!("Front PDF not found: {}", front_pdf.display()),
        }
        .into());
    }

    Ok(front_pdf)
}

/// Removes this tool's scan artifacts; anything else in the directory is left alone.
fn cleanup_staging(staging_dir: &Path) {
    if let Err(err) = remove_staging_artifacts(staging_dir) {
        warn!(path = %staging_dir.display(), error = %err, "failed to clean staging directory");
    }
}

fn remove_staging_artifacts(staging_dir: &Path) -> Result<()> {
    if !staging_dir.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(staging_dir)
        .with_context(|| format!("failed to read {}", staging_dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", staging_dir.display()))?;
        let path = entry.path();
        let is_artifact = entry
            .file_name()
            .to_str()
            .map(|name| STAGING_PREFIXES.iter().any(|prefix| name.starts_with(prefix)))
            .unwrap_or(false);
        if !is_artifact {
            continue;
        }

        if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("failed to remove {}", path.display()))?;
    }

    let is_empty = fs::read_dir(staging_dir)
        .with_context(|| format!("failed to read {}", staging_dir.display()))?
        .next()
        .is_none();
    if is_empty {
        fs::remove_dir(staging_dir)
            .with_context(|| format!("failed to remove {}", staging_dir.display()))?;
    }

    info!(path = %staging_dir.display(), "cleaned staging directory");
    Ok(())
}
