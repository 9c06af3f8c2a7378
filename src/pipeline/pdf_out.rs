//! Print-ready PDF composition
//!
//! The output document is a single page carrying the bleed canvas as a
//! JPEG-compressed image XObject. The MediaBox and BleedBox span the full
//! canvas; the TrimBox marks the artwork rectangle inside the bleed, which is
//! what the imposition software cuts on.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use super::types::Result;
use super::POINTS_PER_INCH;

/// Write the bleed canvas as a single-page PDF.
///
/// `bleed_px` is the margin depth on each side; the TrimBox is the canvas
/// inset by that amount.
pub fn write_pdf(
    path: &Path,
    canvas: &RgbImage,
    bleed_px: u32,
    dpi: u32,
    jpeg_quality: u8,
) -> Result<()> {
    let (width, height) = canvas.dimensions();
    let scale = POINTS_PER_INCH / dpi as f64;
    let page_w = width as f64 * scale;
    let page_h = height as f64 * scale;
    let bleed_pt = bleed_px as f64 * scale;

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality);
    encoder.encode(canvas.as_raw(), width, height, ExtendedColorType::Rgb8)?;

    debug!(
        width,
        height,
        page_w,
        page_h,
        jpeg_bytes = jpeg.len(),
        "composing output PDF"
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w as f32),
                    0.into(),
                    0.into(),
                    Object::Real(page_h as f32),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let media_box = vec![
        0.into(),
        0.into(),
        Object::Real(page_w as f32),
        Object::Real(page_h as f32),
    ];
    let trim_box = vec![
        Object::Real(bleed_pt as f32),
        Object::Real(bleed_pt as f32),
        Object::Real((page_w - bleed_pt) as f32),
        Object::Real((page_h - bleed_pt) as f32),
    ];

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box.clone(),
        "BleedBox" => media_box,
        "TrimBox" => trim_box,
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_written_pdf_loads_with_one_page() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("out.pdf");
        let canvas = RgbImage::from_pixel(120, 90, Rgb([200, 80, 40]));

        write_pdf(&output, &canvas, 10, 300, 90).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_boxes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output = temp_dir.path().join("boxes.pdf");
        // 300 px at 300 DPI is exactly 72 points.
        let canvas = RgbImage::from_pixel(300, 300, Rgb([10, 10, 10]));

        write_pdf(&output, &canvas, 30, 300, 90).unwrap();

        let doc = Document::load(&output).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();

        let media = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert!((media[2].as_float().unwrap() - 72.0).abs() < 0.01);

        let trim = page.get(b"TrimBox").unwrap().as_array().unwrap();
        // 30 px bleed at 300 DPI is 7.2 points in from each side.
        assert!((trim[0].as_float().unwrap() - 7.2).abs() < 0.01);
        assert!((trim[2].as_float().unwrap() - 64.8).abs() < 0.01);
    }
}
