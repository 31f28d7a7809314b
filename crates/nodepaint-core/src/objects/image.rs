//! Embedded raster image payload.

use serde::{Deserialize, Serialize};

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Scale factor applied to images dropped onto the canvas, so a large photo
/// does not swallow the whole surface.
pub const INSERT_SCALE: f64 = 0.3;

/// An image placed on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// Source width in pixels.
    pub source_width: u32,
    /// Source height in pixels.
    pub source_height: u32,
    pub format: ImageFormat,
    /// Image bytes as base64 so the payload survives JSON snapshots.
    pub data_base64: String,
    /// Uniform display scale relative to the source size.
    pub scale: f64,
}

impl ImageData {
    /// Wrap externally decoded image bytes, applying the insert scale.
    pub fn new(data: &[u8], source_width: u32, source_height: u32, format: ImageFormat) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};

        Self {
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            scale: INSERT_SCALE,
        }
    }

    pub fn display_width(&self) -> f64 {
        self.source_width as f64 * self.scale
    }

    pub fn display_height(&self) -> f64 {
        self.source_height as f64 * self.scale
    }
}
