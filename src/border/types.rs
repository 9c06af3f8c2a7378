//! Common types for the border module

use serde::Serialize;
use thiserror::Error;

/// Border detection error types
#[derive(Debug, Error)]
pub enum BorderError {
    #[error("Invalid buffer shape: expected (height, width, channels) = ({height}, {width}, {channels}) = {expected} bytes, got {actual}")]
    InvalidShape {
        width: u32,
        height: u32,
        channels: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported channel count {0}: expected RGB (3) or RGBA (4)")]
    UnsupportedChannels(u32),
}

pub type Result<T> = std::result::Result<T, BorderError>;

/// Pixel layout of a scanned buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 interleaved channels per pixel
    Rgb,
    /// 4 interleaved channels per pixel, alpha last
    Rgba,
}

impl PixelFormat {
    /// Map a channel count to a format, rejecting anything but 3 or 4
    pub fn from_channels(channels: u32) -> Result<Self> {
        match channels {
            3 => Ok(PixelFormat::Rgb),
            4 => Ok(PixelFormat::Rgba),
            n => Err(BorderError::UnsupportedChannels(n)),
        }
    }

    /// Bytes per pixel
    pub fn channels(&self) -> u32 {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Borrowed view over a densely packed, row-major 8-bit pixel buffer.
///
/// Construction validates the shape; the scanner itself trusts it and never
/// mutates or retains the data.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap a raw buffer, validating that its length matches
    /// `width * height * channels` and both dimensions are non-zero.
    pub fn new(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let channels = format.channels();
        let expected = width as usize * height as usize * channels as usize;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(BorderError::InvalidShape {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

/// Result of a border scan.
///
/// `[left, right) x [top, bottom)` is the half-open crop rectangle after the
/// extra-crop margin and clamping. `area_reduction` is the percentage of the
/// original area removed by the *detected* box, before the extra-crop margin
/// is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderDetection {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub area_reduction: f64,
}

impl BorderDetection {
    /// Width of the crop rectangle
    pub fn crop_width(&self) -> u32 {
        self.right - self.left
    }

    /// Height of the crop rectangle
    pub fn crop_height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the crop rectangle covers the whole image
    pub fn is_full_frame(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right == width && self.bottom == height
    }
}
