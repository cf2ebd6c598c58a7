use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::BoundaryPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "scansort",
    version,
    about = "Split scanned mail stacks into dated, sorted PDF documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct documents from existing front (and optional back) scans.
    Organize(OrganizeArgs),
    /// Drive one step of the scanner workflow.
    Scan(ScanArgs),
    /// List attached scanners.
    Scanners(ScannersArgs),
    /// Report required and optional external tools.
    CheckTools,
}

#[derive(Args, Debug, Clone)]
pub struct OrganizeArgs {
    #[arg(long)]
    pub front: PathBuf,

    #[arg(long)]
    pub back: Option<PathBuf>,

    #[arg(long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub processing: ProcessingArgs,
}

/// Options shared by every command that ends in saved documents.
#[derive(Args, Debug, Clone)]
pub struct ProcessingArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OcrMode::Auto)]
    pub ocr: OcrMode,

    #[arg(long, value_enum)]
    pub boundary_policy: Option<BoundaryPolicy>,

    /// Program that reads document text on stdin and prints a JSON classification.
    #[arg(long)]
    pub classifier_command: Option<PathBuf>,

    #[arg(long = "classifier-arg")]
    pub classifier_args: Vec<String>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Scratch space for raw, merged and OCR'd scans.
    #[arg(long, default_value = ".cache/scansort/staging")]
    pub staging_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[arg(value_enum)]
    pub side: ScanSide,

    #[arg(long)]
    pub scanner: String,

    #[arg(long)]
    pub output: PathBuf,

    /// Front-side PDF produced by an earlier `scan front` step.
    #[arg(long)]
    pub front_pdf: Option<PathBuf>,

    #[command(flatten)]
    pub processing: ProcessingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ScannersArgs {
    #[arg(long, default_value = "scanline")]
    pub program: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ScanSide {
    Front,
    Back,
    Single,
}

impl ScanSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Single => "single",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrMode {
    Off,
    Auto,
}

impl OcrMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Auto => "auto",
        }
    }
}
