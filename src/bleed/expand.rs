//! Bleed canvas construction
//!
//! Mirror-first strategy: each edge strip reflects the adjacent artwork so
//! colors join seamlessly at the trim line. A strip that is effectively white
//! (or an artwork too small to supply one) is instead filled by stretching the
//! outermost pixel line, which avoids mirroring visible content back into the
//! margin of a mostly-white piece.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use super::{BleedOptions, BleedReport, CornerFill, EdgeFill, WHITE_BASE};

/// Which side of the artwork an edge strip belongs to
#[derive(Debug, Clone, Copy)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Bleed margin generator.
///
/// Pure with respect to its input: the artwork is only read, the returned
/// canvas is freshly allocated.
pub struct BleedGenerator;

impl BleedGenerator {
    /// Expand the artwork by `bleed_px` on each side.
    ///
    /// Returns the new canvas plus a report of how each edge and corner was
    /// filled. A zero bleed returns an untouched copy.
    pub fn expand(artwork: &RgbImage, options: &BleedOptions) -> (RgbImage, BleedReport) {
        let (width, height) = artwork.dimensions();
        let bleed = options.bleed_px;

        if bleed == 0 {
            let report = BleedReport {
                canvas_size: (width, height),
                bleed_px: 0,
                top: EdgeFill::Mirrored,
                bottom: EdgeFill::Mirrored,
                left: EdgeFill::Mirrored,
                right: EdgeFill::Mirrored,
                corners: [CornerFill::Mirrored; 4],
            };
            return (artwork.clone(), report);
        }

        let new_width = width + 2 * bleed;
        let new_height = height + 2 * bleed;

        let mut canvas = RgbImage::from_pixel(new_width, new_height, Rgb([255, 255, 255]));
        imageops::replace(&mut canvas, artwork, bleed as i64, bleed as i64);

        let top = Self::fill_edge(&mut canvas, artwork, Side::Top, options);
        let bottom = Self::fill_edge(&mut canvas, artwork, Side::Bottom, options);
        let left = Self::fill_edge(&mut canvas, artwork, Side::Left, options);
        let right = Self::fill_edge(&mut canvas, artwork, Side::Right, options);

        let corners = [
            Self::fill_corner(&mut canvas, artwork, false, false, options),
            Self::fill_corner(&mut canvas, artwork, true, false, options),
            Self::fill_corner(&mut canvas, artwork, false, true, options),
            Self::fill_corner(&mut canvas, artwork, true, true, options),
        ];

        let report = BleedReport {
            canvas_size: (new_width, new_height),
            bleed_px: bleed,
            top,
            bottom,
            left,
            right,
            corners,
        };
        (canvas, report)
    }

    /// Fill one edge strip, mirroring when the adjacent artwork has content
    /// and stretching the outermost line otherwise.
    fn fill_edge(
        canvas: &mut RgbImage,
        artwork: &RgbImage,
        side: Side,
        options: &BleedOptions,
    ) -> EdgeFill {
        let (width, height) = artwork.dimensions();
        let bleed = options.bleed_px;
        let new_width = width + 2 * bleed;
        let new_height = height + 2 * bleed;

        let horizontal = matches!(side, Side::Top | Side::Bottom);
        let depth_available = if horizontal { height } else { width };

        // Where the finished strip lands on the canvas.
        let (dest_x, dest_y) = match side {
            Side::Top => (bleed, 0),
            Side::Bottom => (bleed, new_height - bleed),
            Side::Left => (0, bleed),
            Side::Right => (new_width - bleed, bleed),
        };

        let can_mirror = depth_available >= bleed;
        if can_mirror {
            let strip = match side {
                Side::Top => imageops::crop_imm(artwork, 0, 0, width, bleed),
                Side::Bottom => imageops::crop_imm(artwork, 0, height - bleed, width, bleed),
                Side::Left => imageops::crop_imm(artwork, 0, 0, bleed, height),
                Side::Right => imageops::crop_imm(artwork, width - bleed, 0, bleed, height),
            }
            .to_image();

            if !Self::is_white(&strip, options.white_tolerance) {
                let mirrored = if horizontal {
                    imageops::flip_vertical(&strip)
                } else {
                    imageops::flip_horizontal(&strip)
                };
                imageops::replace(canvas, &mirrored, dest_x as i64, dest_y as i64);
                return EdgeFill::Mirrored;
            }
        }

        // Fallback: stretch the outermost pixel line across the strip.
        let line = match side {
            Side::Top => imageops::crop_imm(artwork, 0, 0, width, 1),
            Side::Bottom => imageops::crop_imm(artwork, 0, height - 1, width, 1),
            Side::Left => imageops::crop_imm(artwork, 0, 0, 1, height),
            Side::Right => imageops::crop_imm(artwork, width - 1, 0, 1, height),
        }
        .to_image();
        let stretched = if horizontal {
            imageops::resize(&line, width, bleed, FilterType::Nearest)
        } else {
            imageops::resize(&line, bleed, height, FilterType::Nearest)
        };
        imageops::replace(canvas, &stretched, dest_x as i64, dest_y as i64);
        EdgeFill::Stretched
    }

    /// Fill one corner block, mirroring on both axes or painting the corner
    /// pixel solid when the corner region is white.
    fn fill_corner(
        canvas: &mut RgbImage,
        artwork: &RgbImage,
        at_right: bool,
        at_bottom: bool,
        options: &BleedOptions,
    ) -> CornerFill {
        let (width, height) = artwork.dimensions();
        let bleed = options.bleed_px;
        let new_width = width + 2 * bleed;
        let new_height = height + 2 * bleed;

        let src_x = if at_right { width.saturating_sub(bleed) } else { 0 };
        let src_y = if at_bottom { height.saturating_sub(bleed) } else { 0 };
        let dest_x = if at_right { new_width - bleed } else { 0 };
        let dest_y = if at_bottom { new_height - bleed } else { 0 };

        let corner_px = *artwork.get_pixel(
            if at_right { width - 1 } else { 0 },
            if at_bottom { height - 1 } else { 0 },
        );

        if width >= bleed && height >= bleed {
            let region = imageops::crop_imm(artwork, src_x, src_y, bleed, bleed).to_image();
            if !Self::is_white(&region, options.white_tolerance) {
                let mirrored = imageops::rotate180(&region);
                imageops::replace(canvas, &mirrored, dest_x as i64, dest_y as i64);
                return CornerFill::Mirrored;
            }
        }

        let solid = RgbImage::from_pixel(bleed, bleed, corner_px);
        imageops::replace(canvas, &solid, dest_x as i64, dest_y as i64);
        CornerFill::Solid
    }

    fn is_white(region: &RgbImage, tolerance: u8) -> bool {
        mean_rgb(region) > WHITE_BASE - tolerance as f64
    }
}

/// Mean of all RGB samples in an image; an empty image counts as white.
pub fn mean_rgb(image: &RgbImage) -> f64 {
    let samples = image.as_raw();
    if samples.is_empty() {
        return 255.0;
    }
    let sum: u64 = samples.iter().map(|&v| v as u64).sum();
    sum as f64 / samples.len() as f64
}
