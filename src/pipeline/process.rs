//! Single-file processing flow

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, info};

use crate::border::{BorderDetection, BorderScanner, ScanOptions};
use crate::bleed::{BleedGenerator, BleedOptions};

use super::types::{PipelineError, ProcessReport, Result};
use super::{pdf_out, render, ProcessOptions, MAX_CANVAS_PIXELS, MIN_DIMENSION, RASTER_EXTENSIONS};

/// File processor: dispatches on the input extension and runs the
/// detect / crop / flatten / bleed / encode flow.
pub struct Processor;

impl Processor {
    /// Process one input file into `output`.
    ///
    /// The output format follows the output extension: `.pdf` composes a
    /// print-ready single-page PDF, any raster extension saves the bleed
    /// canvas directly.
    pub fn process_file(
        input: &Path,
        output: &Path,
        options: &ProcessOptions,
    ) -> Result<ProcessReport> {
        let started = Instant::now();

        if !input.exists() {
            return Err(PipelineError::InputNotFound(input.to_path_buf()));
        }

        let extension = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            ext if RASTER_EXTENSIONS.contains(&ext) => {
                let image = image::open(input)?;
                Self::process_decoded(input, output, image, options, false, started)
            }
            "pdf" => Self::process_pdf(input, output, options, started),
            "eps" => Self::process_eps(input, output, options, started),
            other => Err(PipelineError::UnsupportedFormat(other.to_string())),
        }
    }

    /// PDF flow: validate the page count, render page 1 at the working DPI,
    /// then run the raster flow with the minimum-crop guard enabled.
    fn process_pdf(
        input: &Path,
        output: &Path,
        options: &ProcessOptions,
        started: Instant,
    ) -> Result<ProcessReport> {
        let pages = render::pdf_page_count(input)?;
        if pages == 0 {
            return Err(PipelineError::EmptyDocument(input.to_path_buf()));
        }
        debug!(pages, "rendering PDF input");

        let work_dir = tempfile::tempdir()?;
        let rendered = render::render_pdf_page(input, options.dpi, work_dir.path())?;
        let image = image::open(&rendered)?;

        Self::process_decoded(input, output, image, options, true, started)
    }

    /// EPS flow: Ghostscript conversion to a temporary PDF, then the PDF flow.
    fn process_eps(
        input: &Path,
        output: &Path,
        options: &ProcessOptions,
        started: Instant,
    ) -> Result<ProcessReport> {
        let work_dir = tempfile::tempdir()?;
        let temp_pdf = work_dir.path().join("converted.pdf");
        render::eps_to_pdf(input, &temp_pdf)?;

        Self::process_pdf_rendered_from(input, &temp_pdf, output, options, started)
    }

    /// PDF flow on a converted document, keeping the original input path in
    /// the report.
    fn process_pdf_rendered_from(
        input: &Path,
        pdf: &Path,
        output: &Path,
        options: &ProcessOptions,
        started: Instant,
    ) -> Result<ProcessReport> {
        let pages = render::pdf_page_count(pdf)?;
        if pages == 0 {
            return Err(PipelineError::EmptyDocument(input.to_path_buf()));
        }

        let work_dir = tempfile::tempdir()?;
        let rendered = render::render_pdf_page(pdf, options.dpi, work_dir.path())?;
        let image = image::open(&rendered)?;

        Self::process_decoded(input, output, image, options, true, started)
    }

    /// Shared flow on a decoded image: guards, detection, crop, flatten,
    /// bleed, encode.
    fn process_decoded(
        input: &Path,
        output: &Path,
        image: DynamicImage,
        options: &ProcessOptions,
        min_crop_guard: bool,
        started: Instant,
    ) -> Result<ProcessReport> {
        let (width, height) = (image.width(), image.height());
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(PipelineError::ImageTooSmall { width, height });
        }

        let scan_options = ScanOptions::builder()
            .tolerance(options.tolerance)
            .extra_crop(options.extra_crop)
            .build();
        let detection = BorderScanner::detect_image(&image, &scan_options)?;
        debug!(
            left = detection.left,
            top = detection.top,
            right = detection.right,
            bottom = detection.bottom,
            area_reduction = detection.area_reduction,
            "border detection"
        );

        let (x0, y0, x1, y1) = Self::crop_rect(&detection, width, height, options, min_crop_guard);
        let cropped = image.crop_imm(x0, y0, x1 - x0, y1 - y0);

        let bleed_px = options.bleed_px();
        let canvas_pixels = (cropped.width() as u64 + 2 * bleed_px as u64)
            * (cropped.height() as u64 + 2 * bleed_px as u64);
        if canvas_pixels > MAX_CANVAS_PIXELS {
            return Err(PipelineError::ImageTooLarge {
                pixels: canvas_pixels,
            });
        }

        let artwork = Self::flatten_onto_white(&cropped);
        let bleed_options = BleedOptions::builder().bleed_px(bleed_px).build();
        let (canvas, bleed_report) = BleedGenerator::expand(&artwork, &bleed_options);
        debug!(?bleed_report, "bleed generated");

        Self::save_canvas(output, &canvas, bleed_px, options)?;
        let output_size = std::fs::metadata(output)?.len();

        let report = ProcessReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            original_size: (width, height),
            detection,
            canvas_size: canvas.dimensions(),
            bleed_px,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            output_size,
        };
        info!(
            input = %report.input.display(),
            output = %report.output.display(),
            elapsed = report.elapsed_seconds,
            "processed"
        );
        Ok(report)
    }

    /// Final crop rectangle: the detection intersected with the image bounds
    /// (the scanner may push right/bottom one past the edge when enforcing
    /// its minimum box), optionally discarded when every side trims less
    /// than the minimum meaningful crop.
    fn crop_rect(
        detection: &BorderDetection,
        width: u32,
        height: u32,
        options: &ProcessOptions,
        min_crop_guard: bool,
    ) -> (u32, u32, u32, u32) {
        let x1 = detection.right.min(width).max(1);
        let y1 = detection.bottom.min(height).max(1);
        let x0 = detection.left.min(x1 - 1);
        let y0 = detection.top.min(y1 - 1);

        if min_crop_guard {
            let min = options.min_crop_px;
            let trims_little = x0 < min
                && y0 < min
                && (width - x1) < min
                && (height - y1) < min;
            if trims_little {
                debug!("detected crop below minimum, keeping full frame");
                return (0, 0, width, height);
            }
        }

        (x0, y0, x1, y1)
    }

    /// Flatten any alpha onto a white background, yielding plain RGB.
    fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
        if !image.color().has_alpha() {
            return image.to_rgb8();
        }

        let rgba = image.to_rgba8();
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let pixel = rgba.get_pixel(x, y);
            let alpha = pixel[3] as u32;
            let blend = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
        })
    }

    /// Encode the canvas per the output extension.
    fn save_canvas(
        output: &Path,
        canvas: &RgbImage,
        bleed_px: u32,
        options: &ProcessOptions,
    ) -> Result<()> {
        let is_pdf = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            pdf_out::write_pdf(output, canvas, bleed_px, options.dpi, options.jpeg_quality)
        } else {
            canvas.save(output)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn bordered_png(dir: &Path, name: &str, size: u32, border: u32) -> std::path::PathBuf {
        let image = RgbImage::from_fn(size, size, |x, y| {
            let inside =
                x >= border && y >= border && x < size - border && y < size - border;
            if inside {
                Rgb([30, 30, 30])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_input_not_found() {
        let result = Processor::process_file(
            Path::new("/nonexistent/input.png"),
            Path::new("/tmp/out.pdf"),
            &ProcessOptions::default(),
        );
        assert!(matches!(result, Err(PipelineError::InputNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("artwork.bmp");
        std::fs::write(&input, b"not really a bmp").unwrap();

        let result = Processor::process_file(
            &input,
            &temp_dir.path().join("out.pdf"),
            &ProcessOptions::default(),
        );
        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedFormat(ext)) if ext == "bmp"
        ));
    }

    #[test]
    fn test_too_small_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("tiny.png");
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save(&input)
            .unwrap();

        let result = Processor::process_file(
            &input,
            &temp_dir.path().join("out.pdf"),
            &ProcessOptions::default(),
        );
        assert!(matches!(result, Err(PipelineError::ImageTooSmall { .. })));
    }

    #[test]
    fn test_raster_to_png_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = bordered_png(temp_dir.path(), "art.png", 120, 20);
        let output = temp_dir.path().join("art_bleed.png");

        let options = ProcessOptions::builder()
            .bleed_mm(1.0)
            .extra_crop(0)
            .build();
        let report = Processor::process_file(&input, &output, &options).unwrap();

        assert!(output.exists());
        assert_eq!(report.original_size, (120, 120));
        assert_eq!(report.detection.left, 20);
        assert_eq!(report.detection.right, 100);
        // 80 px of artwork plus an 11 px bleed on each side.
        assert_eq!(report.bleed_px, 11);
        assert_eq!(report.canvas_size, (102, 102));

        let saved = image::open(&output).unwrap();
        assert_eq!(saved.width(), 102);
    }

    #[test]
    fn test_raster_to_pdf_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = bordered_png(temp_dir.path(), "art.png", 100, 15);
        let output = temp_dir.path().join("art_bleed.pdf");

        let options = ProcessOptions::builder()
            .bleed_mm(2.0)
            .extra_crop(0)
            .build();
        let report = Processor::process_file(&input, &output, &options).unwrap();

        assert!(output.exists());
        assert!(report.output_size > 0);
        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_transparent_border_cropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("alpha.png");
        let image = image::RgbaImage::from_fn(80, 80, |x, y| {
            let inside = (8..72).contains(&x) && (8..72).contains(&y);
            if inside {
                Rgba([120, 60, 60, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        image.save(&input).unwrap();
        let output = temp_dir.path().join("alpha_bleed.png");

        let options = ProcessOptions::builder()
            .bleed_mm(0.0)
            .extra_crop(0)
            .build();
        let report = Processor::process_file(&input, &output, &options).unwrap();

        assert_eq!(report.detection.left, 8);
        assert_eq!(report.detection.right, 72);
        // Fully transparent ring cropped away, alpha flattened.
        assert_eq!(report.canvas_size, (64, 64));
        let saved = image::open(&output).unwrap().to_rgb8();
        assert_eq!(saved.get_pixel(0, 0), &Rgb([120, 60, 60]));
    }

    #[test]
    fn test_flatten_semitransparent_onto_white() {
        let mut rgba = image::RgbaImage::from_pixel(12, 12, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        let flat = Processor::flatten_onto_white(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([127, 127, 127]));
        assert_eq!(flat.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_min_crop_guard_keeps_full_frame() {
        let detection = BorderDetection {
            left: 3,
            top: 2,
            right: 98,
            bottom: 97,
            area_reduction: 1.0,
        };
        let options = ProcessOptions::default();

        let guarded = Processor::crop_rect(&detection, 100, 100, &options, true);
        assert_eq!(guarded, (0, 0, 100, 100));

        let unguarded = Processor::crop_rect(&detection, 100, 100, &options, false);
        assert_eq!(unguarded, (3, 2, 98, 97));
    }

    #[test]
    fn test_crop_rect_intersects_bounds() {
        // Minimum-box enforcement can leave right one past the image edge.
        let detection = BorderDetection {
            left: 99,
            top: 0,
            right: 101,
            bottom: 100,
            area_reduction: 0.0,
        };
        let options = ProcessOptions::default();

        let rect = Processor::crop_rect(&detection, 100, 100, &options, false);
        assert_eq!(rect, (99, 0, 100, 100));
    }
}
