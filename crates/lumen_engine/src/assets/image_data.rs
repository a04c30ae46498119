//! Decoded pixel data ready for texture upload

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::AssetError;

/// Decoded pixels plus the layout metadata texture upload needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel, 1 to 4
    pub components: u32,
    /// Bits per channel: 8, 16 or 32 (float)
    pub bits: u32,
    /// Tightly packed rows, native endian for 16 and 32 bit data
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Take over a decoded image
    ///
    /// Layouts without 1 to 4 channels of 8, 16 or 32 bits are rejected.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self, AssetError> {
        let color = image.color();
        let components = u32::from(color.channel_count());
        let bits = u32::from(color.bytes_per_pixel()) * 8 / components.max(1);

        if !(1..=4).contains(&components) || ![8, 16, 32].contains(&bits) {
            return Err(AssetError::UnsupportedImage(format!("{color:?}")));
        }

        Ok(Self {
            width: image.width(),
            height: image.height(),
            components,
            bits,
            pixels: image.as_bytes().to_vec(),
        })
    }

    /// Decode an image held in memory
    pub fn from_memory(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AssetError::UnsupportedImage(format!("decoding failed: {e}")))?;
        let data = Self::from_dynamic(&image)?;
        log::debug!("Decoded {}x{} image from memory", data.width, data.height);
        Ok(data)
    }

    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| AssetError::UnsupportedImage(format!("{}: {e}", path.display())))?;
        let data = Self::from_dynamic(&image)?;
        log::info!("Loaded {}x{} image from {}", data.width, data.height, path.display());
        Ok(data)
    }

    /// High dynamic range RGBA image from float texels
    ///
    /// # Panics
    ///
    /// Panics if `texels` does not hold `width * height * 4` values.
    pub fn from_rgba32f(width: u32, height: u32, texels: &[f32]) -> Self {
        assert_eq!(
            texels.len(),
            (width * height * 4) as usize,
            "{width}x{height} RGBA image needs {} texels",
            width * height * 4
        );
        Self {
            width,
            height,
            components: 4,
            bits: 32,
            pixels: bytemuck::cast_slice(texels).to_vec(),
        }
    }

    /// Single color RGBA8 image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = color.repeat((width * height) as usize);
        Self {
            width,
            height,
            components: 4,
            bits: 8,
            pixels,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    #[test]
    fn test_solid_color_image() {
        let image = ImageData::solid_color(4, 2, [255, 0, 0, 255]);
        assert_eq!(image.size_bytes(), 4 * 2 * 4);
        assert_eq!(&image.pixels[4..8], &[255, 0, 0, 255]);
        assert_eq!((image.components, image.bits), (4, 8));
    }

    #[test]
    fn test_from_dynamic_keeps_channel_layout() {
        let rgb = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(3, 2, Rgb([1, 2, 3])));
        let data = ImageData::from_dynamic(&rgb).unwrap();
        assert_eq!((data.width, data.height, data.components, data.bits), (3, 2, 3, 8));
        assert_eq!(&data.pixels[..3], &[1, 2, 3]);

        let gray16 = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(2, 2, Luma([500_u16])));
        let data = ImageData::from_dynamic(&gray16).unwrap();
        assert_eq!((data.components, data.bits), (1, 16));
        assert_eq!(data.size_bytes(), 2 * 2 * 2);
    }

    #[test]
    fn test_from_rgba32f() {
        let data = ImageData::from_rgba32f(1, 1, &[1.0, 0.5, 0.25, 1.0]);
        assert_eq!(data.bits, 32);
        assert_eq!(data.size_bytes(), 16);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(matches!(ImageData::from_memory(&[0, 1, 2, 3]), Err(AssetError::UnsupportedImage(_))));
    }
}
