//! Texture decoding and data structures.

use anyhow::{Context, Result, ensure};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Wrap raw RGBA8 pixels, checking the buffer matches the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        ensure!(
            data.len() == expected,
            "RGBA8 buffer is {} bytes, {}x{} needs {}",
            data.len(),
            width,
            height,
            expected
        );
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Decode an encoded image (PNG) into RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("Failed to decode image")?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::debug!("Decoded texture {}x{} with {} bytes", width, height, data.len());

        Self::from_rgba8(width, height, data)
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size =
            self.width as usize * self.height as usize * self.bytes_per_pixel() as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}
