//! Texture loading and data structures.

use std::path::Path;

use anyhow::{Context, Result};

/// Decoded pixels, tightly packed rows, top row first.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgb8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::Rgb8 => 3,
        }
    }
}

impl TextureData {
    /// Wrap raw RGB8 pixels. Panics if the buffer does not match the dimensions.
    pub fn new_rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 3) as usize,
            "Data size doesn't match RGB8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgb8,
        }
    }

    /// Decode an image file into RGB8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {}", path.display());

        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        Ok(Self::from_image(img))
    }

    /// Decode an in-memory encoded image into RGB8.
    pub fn from_memory(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("Failed to decode image")?;
        Ok(Self::from_image(img))
    }

    fn from_image(img: image::DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = rgb.into_raw();
        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());
        Self::new_rgb8(width, height, data)
    }

    /// White/gray checkerboard with 8-pixel cells.
    pub fn checkerboard(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 3) as usize);
        for y in 0..size {
            for x in 0..size {
                let cell = ((x / 8) + (y / 8)) % 2;
                let value = if cell == 0 { 255 } else { 128 };
                data.extend_from_slice(&[value, value, value]);
            }
        }
        Self::new_rgb8(size, size, data)
    }

    /// Same pixels with an opaque alpha channel appended.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
        for px in self.data.chunks_exact(3) {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        out
    }

    pub fn is_valid(&self) -> bool {
        let expected = (self.width * self.height * self.format.bytes_per_pixel()) as usize;
        self.data.len() == expected && self.width > 0 && self.height > 0
    }
}
