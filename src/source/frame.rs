//! Video frames read from the camera stream

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::time::Instant;

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// When the frame was read from the stream
    pub timestamp: Instant,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encode the frame as PNG at its native resolution
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("Frame buffer does not match its dimensions")?;

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .context("Failed to encode frame as PNG")?;
        Ok(png.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_keeps_resolution() {
        let frame = CapturedFrame::new(vec![255u8; 4 * 3 * 2], 3, 2);
        let png = frame.encode_png().unwrap();

        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), frame.dimensions());
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        let frame = CapturedFrame::new(vec![0u8; 10], 4, 4);
        assert!(frame.encode_png().is_err());
    }
}
