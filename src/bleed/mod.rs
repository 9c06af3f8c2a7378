//! Bleed Margin Generation module
//!
//! Expands a cropped artwork outward by a bleed margin on all four sides so
//! the print can be trimmed without white slivers at the page edge. Edge
//! strips are filled by mirroring the adjacent artwork; strips that are
//! effectively white fall back to stretching the outermost pixel line.
//! Corners mirror both axes, or take a solid corner color when white.
//!
//! # Example
//!
//! ```rust
//! use bleedmakr::{BleedGenerator, BleedOptions};
//! use image::{Rgb, RgbImage};
//!
//! let artwork = RgbImage::from_pixel(100, 80, Rgb([40, 90, 160]));
//! let options = BleedOptions::from_mm(3.0);
//! let (canvas, report) = BleedGenerator::expand(&artwork, &options);
//!
//! assert_eq!(canvas.width(), 100 + 2 * report.bleed_px);
//! ```

mod expand;

pub use expand::{mean_rgb, BleedGenerator};

use serde::Serialize;

// ============================================================
// Constants
// ============================================================

/// Pixels per millimeter at the 300 DPI working resolution.
pub(crate) const PX_PER_MM: f64 = 11.811;

/// Base whiteness threshold; a strip whose mean RGB exceeds
/// `WHITE_BASE - white_tolerance` is treated as white.
pub(crate) const WHITE_BASE: f64 = 250.0;

/// Default whiteness tolerance for edge strips.
const DEFAULT_WHITE_TOLERANCE: u8 = 5;

// ============================================================
// Options
// ============================================================

/// Bleed generation options
#[derive(Debug, Clone, Copy)]
pub struct BleedOptions {
    /// Bleed margin depth in pixels, added to each side.
    pub bleed_px: u32,
    /// Whiteness tolerance for the mirrored-vs-stretched decision.
    pub white_tolerance: u8,
}

impl Default for BleedOptions {
    fn default() -> Self {
        Self {
            bleed_px: Self::mm_to_px(3.0),
            white_tolerance: DEFAULT_WHITE_TOLERANCE,
        }
    }
}

impl BleedOptions {
    /// Create options from a bleed size in millimeters at 300 DPI.
    pub fn from_mm(mm: f64) -> Self {
        Self {
            bleed_px: Self::mm_to_px(mm),
            ..Default::default()
        }
    }

    /// Create a new options builder
    pub fn builder() -> BleedOptionsBuilder {
        BleedOptionsBuilder::default()
    }

    /// Millimeters to pixels at 300 DPI, truncating.
    fn mm_to_px(mm: f64) -> u32 {
        (mm * PX_PER_MM).max(0.0) as u32
    }
}

/// Builder for BleedOptions
#[derive(Debug, Default)]
pub struct BleedOptionsBuilder {
    options: BleedOptions,
}

impl BleedOptionsBuilder {
    /// Set the bleed depth in pixels
    #[must_use]
    pub fn bleed_px(mut self, bleed_px: u32) -> Self {
        self.options.bleed_px = bleed_px;
        self
    }

    /// Set the whiteness tolerance
    #[must_use]
    pub fn white_tolerance(mut self, tolerance: u8) -> Self {
        self.options.white_tolerance = tolerance;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> BleedOptions {
        self.options
    }
}

// ============================================================
// Report types
// ============================================================

/// How an edge strip was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeFill {
    /// Adjacent artwork mirrored outward
    Mirrored,
    /// Outermost pixel line stretched across the strip
    Stretched,
}

/// How a corner block was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CornerFill {
    /// Corner region mirrored on both axes
    Mirrored,
    /// Solid fill from the corner pixel
    Solid,
}

/// What the generator did, edge by edge.
///
/// Corner order is top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BleedReport {
    pub canvas_size: (u32, u32),
    pub bleed_px: u32,
    pub top: EdgeFill,
    pub bottom: EdgeFill,
    pub left: EdgeFill,
    pub right: EdgeFill,
    pub corners: [CornerFill; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = BleedOptions::default();

        // 3 mm at 300 DPI, truncated
        assert_eq!(opts.bleed_px, 35);
        assert_eq!(opts.white_tolerance, 5);
    }

    #[test]
    fn test_from_mm_truncates() {
        assert_eq!(BleedOptions::from_mm(3.0).bleed_px, 35);
        assert_eq!(BleedOptions::from_mm(2.0).bleed_px, 23);
        assert_eq!(BleedOptions::from_mm(0.0).bleed_px, 0);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = BleedOptions::builder()
            .bleed_px(12)
            .white_tolerance(10)
            .build();

        assert_eq!(opts.bleed_px, 12);
        assert_eq!(opts.white_tolerance, 10);
    }
}
