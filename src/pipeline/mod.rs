//! File Processing Pipeline module
//!
//! Drives a single input file through the full flow: decode (rendering PDF and
//! EPS inputs to raster first), detect the whitespace border, crop to the
//! artwork, flatten any alpha onto white, regenerate the bleed margin, and
//! encode the result as a print-ready PDF or a raster file.
//!
//! # Supported inputs
//!
//! - Raster: png, jpg, jpeg, tif, tiff (decoded in-process)
//! - PDF: first page rendered with `pdftoppm` at the working DPI
//! - EPS: converted to PDF with Ghostscript, then the PDF flow

mod pdf_out;
mod process;
mod render;
mod types;

pub use process::Processor;
pub use render::{eps_to_pdf, pdf_page_count, render_pdf_page};
pub use types::{PipelineError, ProcessReport, Result};

// ============================================================
// Constants
// ============================================================

/// Raster extensions decoded in-process.
pub(crate) const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Inputs with either side below this are rejected.
pub(crate) const MIN_DIMENSION: u32 = 10;

/// Result canvases above this many pixels are rejected.
pub(crate) const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Points per inch.
pub(crate) const POINTS_PER_INCH: f64 = 72.0;

/// Millimeters per inch.
pub(crate) const MM_PER_INCH: f64 = 25.4;

const DEFAULT_BLEED_MM: f64 = 3.0;
const DEFAULT_TOLERANCE: u8 = 10;
const DEFAULT_EXTRA_CROP: i32 = 2;
const DEFAULT_DPI: u32 = 300;
const DEFAULT_JPEG_QUALITY: u8 = 90;
const DEFAULT_MIN_CROP: u32 = 10;

// ============================================================
// Options
// ============================================================

/// Pipeline processing options
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Bleed margin in millimeters
    pub bleed_mm: f64,
    /// Border scan tolerance knob (carried through, see the border module)
    pub tolerance: u8,
    /// Extra pixels cropped from each side of the detected box
    pub extra_crop: i32,
    /// Working resolution for PDF rendering and output sizing
    pub dpi: u32,
    /// JPEG quality for the embedded PDF image (1-100)
    pub jpeg_quality: u8,
    /// PDF inputs keep their full frame when every side would trim fewer
    /// pixels than this
    pub min_crop_px: u32,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            bleed_mm: DEFAULT_BLEED_MM,
            tolerance: DEFAULT_TOLERANCE,
            extra_crop: DEFAULT_EXTRA_CROP,
            dpi: DEFAULT_DPI,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            min_crop_px: DEFAULT_MIN_CROP,
        }
    }
}

impl ProcessOptions {
    /// Create a new options builder
    pub fn builder() -> ProcessOptionsBuilder {
        ProcessOptionsBuilder::default()
    }

    /// Bleed margin in pixels at the working DPI, truncating.
    pub fn bleed_px(&self) -> u32 {
        (self.bleed_mm * self.dpi as f64 / MM_PER_INCH).max(0.0) as u32
    }
}

/// Builder for ProcessOptions
#[derive(Debug, Default)]
pub struct ProcessOptionsBuilder {
    options: ProcessOptions,
}

impl ProcessOptionsBuilder {
    /// Set the bleed margin in millimeters
    #[must_use]
    pub fn bleed_mm(mut self, mm: f64) -> Self {
        self.options.bleed_mm = mm;
        self
    }

    /// Set the border scan tolerance
    #[must_use]
    pub fn tolerance(mut self, tolerance: u8) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    /// Set the extra crop margin in pixels
    #[must_use]
    pub fn extra_crop(mut self, extra_crop: i32) -> Self {
        self.options.extra_crop = extra_crop;
        self
    }

    /// Set the working DPI
    #[must_use]
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi;
        self
    }

    /// Set the JPEG quality (1-100)
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.options.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set the minimum meaningful crop for PDF inputs
    #[must_use]
    pub fn min_crop_px(mut self, pixels: u32) -> Self {
        self.options.min_crop_px = pixels;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ProcessOptions {
        self.options
    }
}
