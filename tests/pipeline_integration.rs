//! CLI integration tests
//!
//! End-to-end runs of the bleedmakr binary over synthetic images in
//! temporary directories.

use assert_cmd::Command;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn bleedmakr() -> Command {
    Command::cargo_bin("bleedmakr").expect("binary builds")
}

/// White-bordered artwork fixture
fn write_bordered_png(dir: &Path, name: &str, size: u32, border: u32) -> PathBuf {
    let image = RgbImage::from_fn(size, size, |x, y| {
        let inside = x >= border && y >= border && x < size - border && y < size - border;
        if inside {
            Rgb([40, 40, 40])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

#[test]
fn test_detect_reports_crop_box() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 12);

    bleedmakr()
        .arg("detect")
        .arg(&input)
        .args(["--extra-crop", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left=12 top=12 right=88 bottom=88"));
}

#[test]
fn test_detect_json_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 12);

    let output = bleedmakr()
        .arg("detect")
        .arg(&input)
        .args(["--extra-crop", "0", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let detection: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detection["left"], 12);
    assert_eq!(detection["right"], 88);
    assert!(detection["area_reduction"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_detect_missing_input_exit_code() {
    bleedmakr()
        .arg("detect")
        .arg("/nonexistent/image.png")
        .assert()
        .code(2);
}

#[test]
fn test_process_png_to_pdf() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "poster.png", 150, 20);
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .args(["--bleed-mm", "2", "--extra-crop", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 1"));

    let output = out_dir.join("poster_bleed.pdf");
    assert!(output.exists());
    let doc = lopdf::Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    // Sidecar cache written next to the output.
    assert!(out_dir.join("poster_bleed.pdf.bleedmakr.json").exists());
}

#[test]
fn test_process_raster_format_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 120, 10);
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .args(["--bleed-mm", "1", "--extra-crop", "0", "--format", "png"])
        .assert()
        .success();

    // 100 px of artwork plus 11 px bleed per side.
    let saved = image::open(out_dir.join("art_bleed.png")).unwrap();
    assert_eq!(saved.width(), 122);
    assert_eq!(saved.height(), 122);
}

#[test]
fn test_process_transparent_artwork() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("alpha.png");
    let image = RgbaImage::from_fn(90, 90, |x, y| {
        let inside = (15..75).contains(&x) && (15..75).contains(&y);
        if inside {
            Rgba([100, 50, 50, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    image.save(&input).unwrap();
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .args(["--bleed-mm", "0", "--extra-crop", "0", "--format", "png"])
        .assert()
        .success();

    // Transparent ring cropped, alpha flattened: pure 60x60 artwork.
    let saved = image::open(out_dir.join("alpha_bleed.png")).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (60, 60));
    assert_eq!(saved.get_pixel(0, 0), &Rgb([100, 50, 50]));
}

#[test]
fn test_process_cache_skips_second_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 10);
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 1"));

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped:   1"));

    // --force re-processes despite the cache.
    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed: 1"));
}

#[test]
fn test_process_directory_batch() {
    let temp_dir = tempfile::tempdir().unwrap();
    let in_dir = temp_dir.path().join("in");
    std::fs::create_dir(&in_dir).unwrap();
    for i in 1..=3 {
        write_bordered_png(&in_dir, &format!("page_{}.png", i), 80, 8);
    }
    // Unsupported files are ignored during collection.
    std::fs::write(in_dir.join("notes.txt"), "ignore me").unwrap();
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&in_dir)
        .arg(&out_dir)
        .args(["--format", "png", "--quiet"])
        .assert()
        .success();

    for i in 1..=3 {
        assert!(out_dir.join(format!("page_{}_bleed.png", i)).exists());
    }
}

#[test]
fn test_process_unsupported_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("artwork.txt");
    std::fs::write(&input, "not an image").unwrap();

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(temp_dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No supported files"));
}

#[test]
fn test_process_verbosity_modes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 10);
    let out_dir = temp_dir.path().join("out");

    // -v adds a per-file completion line.
    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed:"))
        .stdout(predicate::str::contains("Processing Summary"));

    // --quiet drops the summary block entirely.
    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .args(["--quiet", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing Summary").not());
}

#[test]
fn test_process_dry_run_touches_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 10);
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution Plan"));

    assert!(!out_dir.exists());
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 120, 10);
    let out_dir = temp_dir.path().join("out");
    let config = temp_dir.path().join("custom.toml");
    std::fs::write(&config, "bleed_mm = 1.0\nextra_crop_px = 0\n").unwrap();

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .args(["--format", "png"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    // 1 mm bleed from the config: 100 px artwork + 11 px per side.
    let saved = image::open(out_dir.join("art_bleed.png")).unwrap();
    assert_eq!(saved.width(), 122);
}

#[test]
fn test_cache_info_command() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = write_bordered_png(temp_dir.path(), "art.png", 100, 10);
    let out_dir = temp_dir.path().join("out");

    bleedmakr()
        .arg("process")
        .arg(&input)
        .arg(&out_dir)
        .assert()
        .success();

    bleedmakr()
        .arg("cache-info")
        .arg(out_dir.join("art_bleed.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache Version: 1"));
}

#[test]
fn test_info_command() {
    bleedmakr()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("bleedmakr v"))
        .stdout(predicate::str::contains("External Tools"));
}
