//! Common types for the pipeline module

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::border::{BorderDetection, BorderError};

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Unsupported format: .{0}")]
    UnsupportedFormat(String),

    #[error("Image too small: {width}x{height} (minimum 10x10)")]
    ImageTooSmall { width: u32, height: u32 },

    #[error("Result canvas too large: {pixels} pixels")]
    ImageTooLarge { pixels: u64 },

    #[error("PDF contains no pages: {0}")]
    EmptyDocument(PathBuf),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error(transparent)]
    Border(#[from] BorderError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// What one processed file produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Decoded input dimensions in pixels
    pub original_size: (u32, u32),
    /// Border scan result on the decoded input
    pub detection: BorderDetection,
    /// Final canvas dimensions, crop plus bleed
    pub canvas_size: (u32, u32),
    /// Bleed depth in pixels at the working DPI
    pub bleed_px: u32,
    pub elapsed_seconds: f64,
    /// Encoded output size in bytes
    pub output_size: u64,
}
