//! Progress reporting for batch processing
//!
//! Console output for directory runs: an indicatif bar across files, a
//! verbosity-gated line per file, and a summary block at the end.

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// No output
    Quiet,
    /// Normal output (per-file status)
    #[default]
    Normal,
    /// Verbose output (detection details)
    Verbose,
    /// Very verbose (everything)
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from verbosity level
    pub fn from_verbosity(level: u8) -> Self {
        match level {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }
}

/// Progress bar for a multi-file batch
pub fn batch_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar
}

/// Batch-level result tracking
#[derive(Debug)]
pub struct ProgressTracker;

impl ProgressTracker {
    /// Print the end-of-run summary block
    pub fn print_summary(total: usize, ok: usize, skipped: usize, errors: usize) {
        println!();
        println!("=== Processing Summary ===");
        println!("  Total:     {}", total);
        println!("  Processed: {}", ok);
        println!("  Skipped:   {}", skipped);
        println!("  Errors:    {}", errors);
    }
}
