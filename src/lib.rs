//! bleedmakr - print-bleed preparation for artwork files
//!
//! Detects the whitespace border around artwork, crops to the live graphic,
//! and regenerates a mirrored bleed margin so the piece can be trimmed
//! without white slivers at the page edge.
//!
//! The library splits into a pure algorithmic core and plumbing around it:
//!
//! - [`border`]: the whitespace border scanner (pure, no I/O)
//! - [`bleed`]: bleed margin generation (mirror-first, stretch fallback)
//! - [`pipeline`]: file dispatch, external renderers, PDF composition
//! - [`cache`], [`config`], [`cli`], [`progress`]: tool plumbing

pub mod bleed;
pub mod border;
pub mod cache;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod progress;

// Re-export public API
pub use bleed::{BleedGenerator, BleedOptions, BleedReport, CornerFill, EdgeFill};
pub use border::{
    BorderDetection, BorderError, BorderScanner, PixelBuffer, PixelFormat, ScanOptions,
};
pub use cache::{should_skip_processing, CacheDigest, CacheResult, ProcessingCache};
pub use cli::{output_path, CacheInfoArgs, Cli, Commands, DetectArgs, ProcessArgs};
pub use config::{CliOverrides, Config, ConfigError};
pub use pipeline::{PipelineError, ProcessOptions, ProcessReport, Processor};
pub use progress::{batch_bar, OutputMode, ProgressTracker};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INPUT_NOT_FOUND: i32 = 2;
}
