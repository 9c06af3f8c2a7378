//! Command-line interface definitions

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

/// Print-bleed generator for artwork files
#[derive(Debug, Parser)]
#[command(name = "bleedmakr", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect the whitespace border of a raster image
    Detect(DetectArgs),
    /// Crop and regenerate bleed for a file or a directory of files
    Process(ProcessArgs),
    /// Show cache information for a processed output
    CacheInfo(CacheInfoArgs),
    /// Show version, external tools, and config locations
    Info,
}

/// Arguments for the detect command
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Image to scan (png, jpg, jpeg, tif, tiff)
    pub image: PathBuf,

    /// Brightness/alpha tolerance knob
    #[arg(long, default_value_t = 10)]
    pub tolerance: u8,

    /// Extra pixels cropped from each side (negative expands)
    #[arg(long, default_value_t = 2, allow_hyphen_values = true)]
    pub extra_crop: i32,

    /// Emit the detection as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Input file or directory (png, jpg, jpeg, tif, tiff, pdf, eps)
    pub input: PathBuf,

    /// Output directory
    pub output: PathBuf,

    /// Bleed margin in millimeters
    #[arg(long, default_value_t = 3.0)]
    pub bleed_mm: f64,

    /// Border scan tolerance knob
    #[arg(long, default_value_t = 10)]
    pub tolerance: u8,

    /// Extra pixels cropped from each side of the detected box
    #[arg(long, default_value_t = 2, allow_hyphen_values = true)]
    pub extra_crop: i32,

    /// Working resolution for PDF rendering and output sizing
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    /// JPEG quality for the embedded PDF image (1-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Output format: pdf or a raster extension (png, jpg, tiff)
    #[arg(long, default_value = "pdf")]
    pub format: String,

    /// Worker threads for directory processing (default: all CPUs)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Skip inputs whose output file already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Re-process even when the cache says the output is current
    #[arg(long)]
    pub force: bool,

    /// Print the execution plan without processing
    #[arg(long)]
    pub dry_run: bool,

    /// Explicit config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the summary block
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the cache-info command
#[derive(Debug, Args)]
pub struct CacheInfoArgs {
    /// Processed output file whose sidecar to inspect
    pub output: PathBuf,
}

/// Output path for an input file: `<output_dir>/<stem>_bleed.<format>`
pub fn output_path(input: &Path, output_dir: &Path, format: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_dir.join(format!("{}_bleed.{}", stem, format))
}
