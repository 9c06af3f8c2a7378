//! Whitespace Border Detection module
//!
//! Scans inward from each of the four image edges to find where the actual
//! artwork begins, producing a half-open crop rectangle plus the percentage of
//! area the crop would remove.
//!
//! # Algorithm
//!
//! Each row/column within a bounded scan window gets an average brightness
//! (mean of per-pixel RGB means). The first line darker than the background
//! cutoff marks content on that side. RGBA images skip effectively transparent
//! pixels when averaging, so a fully transparent border counts as background
//! no matter what its RGB values are.
//!
//! # Example
//!
//! ```rust
//! use bleedmakr::{BorderScanner, PixelBuffer, PixelFormat, ScanOptions};
//!
//! let white = vec![255u8; 64 * 64 * 3];
//! let buffer = PixelBuffer::new(&white, 64, 64, PixelFormat::Rgb).unwrap();
//! let detection = BorderScanner::scan(&buffer, &ScanOptions::default());
//!
//! assert_eq!(detection.area_reduction, 0.0);
//! ```

mod detect;
mod types;

pub use detect::BorderScanner;
pub use types::{BorderDetection, BorderError, PixelBuffer, PixelFormat, Result};

// ============================================================
// Constants
// ============================================================

/// Maximum number of rows/columns inspected from each edge.
///
/// Borders wider than this are not detected; a documented limitation that
/// bounds worst-case cost independent of image size.
pub(crate) const MAX_SCAN: u32 = 100;

/// Row/column average brightness below this counts as content (0-255 scale).
pub(crate) const BACKGROUND_CUTOFF: f64 = 245.0;

/// RGBA pixels with alpha below this are skipped when averaging.
pub(crate) const ALPHA_SKIP: u8 = 10;

/// Default brightness/alpha tolerance knob.
const DEFAULT_TOLERANCE: u8 = 10;

/// Default extra crop applied to each side of the detected box, in pixels.
const DEFAULT_EXTRA_CROP: i32 = 2;

// ============================================================
// Options
// ============================================================

/// Border scan options
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Brightness/alpha tolerance (0-255).
    ///
    /// Accepted and carried for compatibility with the historical interface,
    /// but the detection comparison uses the fixed [`BACKGROUND_CUTOFF`] and
    /// alpha-skip thresholds and never reads this value.
    pub tolerance: u8,
    /// Extra pixels cropped from each side of the detected box.
    /// Negative values expand the box instead.
    pub extra_crop: i32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            extra_crop: DEFAULT_EXTRA_CROP,
        }
    }
}

impl ScanOptions {
    /// Create a new options builder
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }
}

/// Builder for ScanOptions
#[derive(Debug, Default)]
pub struct ScanOptionsBuilder {
    options: ScanOptions,
}

impl ScanOptionsBuilder {
    /// Set the tolerance knob (0-255)
    #[must_use]
    pub fn tolerance(mut self, tolerance: u8) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    /// Set the extra crop margin in pixels (negative expands)
    #[must_use]
    pub fn extra_crop(mut self, extra_crop: i32) -> Self {
        self.options.extra_crop = extra_crop;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ScanOptions {
        self.options
    }
}
