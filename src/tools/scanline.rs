use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ScanSide;
use crate::error::ScanFailure;
use crate::model::ToolAvailability;
use crate::pdf::ScanDocument;
use crate::util::ensure_directory;

use super::process::{command_available, run_with_timeout};

pub const SCANLINE: &str = "scanline";
pub const OCRMYPDF: &str = "ocrmypdf";
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_SCAN_BYTES: u64 = 10_000;

/// Reports required and optional tools; only `scanline` is required.
pub fn check_tools() -> Vec<ToolAvailability> {
    [(SCANLINE, true), (OCRMYPDF, false)]
        .into_iter()
        .map(|(name, required)| ToolAvailability {
            name: name.to_string(),
            required,
            available: command_available(name),
        })
        .collect()
}

/// Fails with `ToolUnavailable` when a required tool is missing; otherwise returns the full report.
pub fn require_tools() -> Result<Vec<ToolAvailability>> {
    let tools = check_tools();
    let missing = missing_required(&tools);
    if !missing.is_empty() {
        return Err(ScanFailure::ToolUnavailable { tools: missing }.into());
    }
    Ok(tools)
}

pub(crate) fn missing_required(tools: &[ToolAvailability]) -> Vec<String> {
    tools
        .iter()
        .filter(|tool| tool.required && !tool.available)
        .map(|tool| tool.name.clone())
        .collect()
}

pub fn list_scanners(program: &str) -> Vec<String> {
    let mut command = Command::new(program);
    command.arg("-list");

    match run_with_timeout(&mut command, LIST_TIMEOUT, None) {
        Ok(output) if output.status.success() => {
            parse_scanner_list(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            warn!(status = %output.status, "scanner listing failed");
            Vec::new()
        }
        Err(err) => {
            warn!(error = %err, "scanner listing failed");
            Vec::new()
        }
    }
}

/// Device lines are prefixed with `*`; everything else is chatter.
pub(crate) fn parse_scanner_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('*'))
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("done"))
        .map(ToOwned::to_owned)
        .collect()
}

/// An "empty feeder" report is a normal outcome, not a hardware failure.
pub(crate) fn is_hard_scan_error(stderr: &str) -> bool {
    let lowered = stderr.to_lowercase();
    lowered.contains("error") && !lowered.contains("empty")
}

#[derive(Debug, Clone)]
pub struct Scanline {
    pub program: String,
    pub scanner: String,
    pub resolution: u32,
    pub timeout: Duration,
}

impl Scanline {
    /// Returns the produced PDF, or `None` when the feeder produced no usable document.
    pub fn acquire(&self, side: ScanSide, staging_dir: &Path) -> Result<Option<PathBuf>> {
        info!(side = side.as_str(), scanner = %self.scanner, "scanning");

        ensure_directory(staging_dir)?;
        let started = SystemTime::now();
        let label = format!("{}-scan", side.as_str());

        let mut command = Command::new(&self.program);
        command
            .arg("-verbose")
            .arg("-scanner")
            .arg(&self.scanner)
            .arg("-resolution")
            .arg(self.resolution.to_string())
            .arg("-a4")
            .arg("-mono")
            .arg("-dir")
            .arg(staging_dir)
            .arg(&label);

        let output = run_with_timeout(&mut command, self.timeout, None).map_err(|err| {
            ScanFailure::AcquisitionFailure {
                message: format!("{err:#}"),
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_hard_scan_error(&stderr) {
                return Err(ScanFailure::AcquisitionFailure {
                    message: stderr.trim().to_string(),
                }
                .into());
            }
        }

        let Some(path) = newest_scan_since(staging_dir, &label, started)? else {
            return Ok(None);
        };

        if usable_scan(&path) {
            Ok(Some(path))
        } else {
            warn!(path = %path.display(), "discarding empty or undersized scan");
            Ok(None)
        }
    }
}

/// Newest PDF under `<staging>/<label>/**` or named `<staging>/<label>*.pdf`, modified after `since`.
pub(crate) fn newest_scan_since(
    staging_dir: &Path,
    label: &str,
    since: SystemTime,
) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::<PathBuf>::new();

    let nested = staging_dir.join(label);
    if nested.is_dir() {
        collect_pdfs(&nested, &mut candidates)?;
    }

    let entries = fs::read_dir(staging_dir)
        .with_context(|| format!("failed to read {}", staging_dir.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", staging_dir.display()))?;
        let path = entry.path();
        let matches_label = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(label))
            .unwrap_or(false);
        if matches_label && path.is_file() && is_pdf(&path) {
            candidates.push(path);
        }
    }

    let newest = candidates
        .into_iter()
        .filter_map(|path| {
            let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok()?;
            (modified > since).then_some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path);

    Ok(newest)
}

fn collect_pdfs(directory: &Path, pdfs: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to read {}", directory.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", directory.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?;

        if file_type.is_dir() {
            collect_pdfs(&path, pdfs)?;
        } else if file_type.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }

    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn usable_scan(path: &Path) -> bool {
    let large_enough = fs::metadata(path)
        .map(|meta| meta.len() >= MIN_SCAN_BYTES)
        .unwrap_or(false);
    if !large_enough {
        return false;
    }

    ScanDocument::load(path)
        .map(|document| document.page_count() > 0)
        .unwrap_or(false)
}
