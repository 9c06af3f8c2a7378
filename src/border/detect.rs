//! Border scan implementation
//!
//! One parametrized inward scan serves all four edges: an axis selects rows or
//! columns, a direction selects which edge the scan starts from. Per-line
//! brightness is the mean of per-pixel RGB means, with RGBA lines skipping
//! effectively transparent pixels.

use image::DynamicImage;

use super::types::{BorderDetection, PixelBuffer, PixelFormat, Result};
use super::{ScanOptions, ALPHA_SKIP, BACKGROUND_CUTOFF, MAX_SCAN};

/// Which image axis a line scan walks over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Lines are rows, indexed by y
    Row,
    /// Lines are columns, indexed by x
    Column,
}

impl Axis {
    /// Number of lines along this axis
    fn line_count(self, buffer: &PixelBuffer<'_>) -> u32 {
        match self {
            Axis::Row => buffer.height,
            Axis::Column => buffer.width,
        }
    }

    /// Number of pixels within one line
    fn line_length(self, buffer: &PixelBuffer<'_>) -> u32 {
        match self {
            Axis::Row => buffer.width,
            Axis::Column => buffer.height,
        }
    }
}

/// Whitespace border scanner.
///
/// Stateless and pure: the same buffer and options always produce the same
/// detection, and concurrent calls on independent buffers are safe.
pub struct BorderScanner;

impl BorderScanner {
    /// Scan a pixel buffer for whitespace borders.
    ///
    /// `options.tolerance` is accepted but not consulted by the comparison;
    /// the background cutoff and alpha-skip thresholds are fixed constants.
    pub fn scan(buffer: &PixelBuffer<'_>, options: &ScanOptions) -> BorderDetection {
        let width = buffer.width;
        let height = buffer.height;

        let top = Self::scan_inward(buffer, Axis::Row, false).unwrap_or(0);
        let bottom = Self::scan_inward(buffer, Axis::Row, true)
            .map(|y| y + 1)
            .unwrap_or(height);
        let left = Self::scan_inward(buffer, Axis::Column, false).unwrap_or(0);
        let right = Self::scan_inward(buffer, Axis::Column, true)
            .map(|x| x + 1)
            .unwrap_or(width);

        // Reduction reflects the detected box, before the extra-crop margin.
        let original_area = width as f64 * height as f64;
        let detected_area =
            (right.saturating_sub(left)) as f64 * (bottom.saturating_sub(top)) as f64;
        let area_reduction = (original_area - detected_area) / original_area * 100.0;

        let extra = options.extra_crop as i64;
        let left = (left as i64 + extra).max(0);
        let top = (top as i64 + extra).max(0);
        let mut right = (right as i64 - extra).min(width as i64);
        let mut bottom = (bottom as i64 - extra).min(height as i64);

        // Minimum 1x1 box. This can push right/bottom one past the image
        // bound when the clamped box inverted; callers intersect with the
        // image bounds before cropping.
        if right <= left {
            right = left + 1;
        }
        if bottom <= top {
            bottom = top + 1;
        }

        BorderDetection {
            left: left as u32,
            top: top as u32,
            right: right as u32,
            bottom: bottom as u32,
            area_reduction,
        }
    }

    /// Scan a decoded image, choosing the pixel format from its color type.
    ///
    /// Sources carrying an alpha channel are scanned as RGBA so transparent
    /// borders count as background; everything else is scanned as RGB.
    pub fn detect_image(image: &DynamicImage, options: &ScanOptions) -> Result<BorderDetection> {
        if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let buffer =
                PixelBuffer::new(rgba.as_raw(), rgba.width(), rgba.height(), PixelFormat::Rgba)?;
            Ok(Self::scan(&buffer, options))
        } else {
            let rgb = image.to_rgb8();
            let buffer =
                PixelBuffer::new(rgb.as_raw(), rgb.width(), rgb.height(), PixelFormat::Rgb)?;
            Ok(Self::scan(&buffer, options))
        }
    }

    /// Walk lines inward from one edge, returning the index of the first line
    /// whose brightness falls below the background cutoff.
    ///
    /// At most [`MAX_SCAN`] lines are inspected; `None` means no content line
    /// was found within the window.
    fn scan_inward(buffer: &PixelBuffer<'_>, axis: Axis, from_far_edge: bool) -> Option<u32> {
        let count = axis.line_count(buffer);
        let window = MAX_SCAN.min(count);

        let indices: Box<dyn Iterator<Item = u32>> = if from_far_edge {
            Box::new((count - window..count).rev())
        } else {
            Box::new(0..window)
        };

        for index in indices {
            if Self::line_brightness(buffer, axis, index) < BACKGROUND_CUTOFF {
                return Some(index);
            }
        }
        None
    }

    /// Average brightness of one row or column.
    ///
    /// RGBA buffers skip pixels with alpha below [`ALPHA_SKIP`]; a line with
    /// every pixel skipped averages to 255.0 (background).
    fn line_brightness(buffer: &PixelBuffer<'_>, axis: Axis, index: u32) -> f64 {
        let channels = buffer.format.channels() as usize;
        let stride = buffer.width as usize * channels;
        let length = axis.line_length(buffer);

        let mut sum = 0.0;
        let mut count = 0u32;

        for i in 0..length {
            let (x, y) = match axis {
                Axis::Row => (i, index),
                Axis::Column => (index, i),
            };
            let offset = y as usize * stride + x as usize * channels;
            let pixel = &buffer.data[offset..offset + channels];

            if buffer.format == PixelFormat::Rgba && pixel[3] < ALPHA_SKIP {
                continue;
            }

            sum += (pixel[0] as f64 + pixel[1] as f64 + pixel[2] as f64) / 3.0;
            count += 1;
        }

        if count > 0 {
            sum / count as f64
        } else {
            255.0
        }
    }
}
