//! Floating-point raster with color channels plus one weight (alpha) channel.
//!
//! Samples are interleaved row-major: pixel `(x, y)` occupies
//! `data[(y * width + x) * channels .. + channels]`, with the weight channel last.
//! Color and weight values use the 0–255 range.

use anyhow::{ensure, Result};

/// Raster dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel, including the weight channel.
    pub channels: usize,
}

impl Shape {
    pub fn new(width: u32, height: u32, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Number of pixels.
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of color channels (all channels except the weight).
    pub fn color_channels(&self) -> usize {
        self.channels.saturating_sub(1)
    }
}

/// Mutable image whose last channel is the blending weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelImage {
    shape: Shape,
    data: Vec<f32>,
}

impl PixelImage {
    /// Zero-filled image.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.num_pixels() * shape.channels],
        }
    }

    /// Wrap interleaved samples.
    ///
    /// Fails if `data.len() != width * height * channels` or there is no room
    /// for at least one color channel next to the weight.
    pub fn from_raw(shape: Shape, data: Vec<f32>) -> Result<Self> {
        ensure!(
            shape.channels >= 2,
            "Image needs at least one color channel plus weight, got {} channels",
            shape.channels
        );
        ensure!(
            data.len() == shape.num_pixels() * shape.channels,
            "Sample count ({}) does not match width*height*channels ({}x{}x{}={})",
            data.len(),
            shape.width,
            shape.height,
            shape.channels,
            shape.num_pixels() * shape.channels
        );
        Ok(Self { shape, data })
    }

    /// Image where every pixel has the given color and weight.
    pub fn filled(width: u32, height: u32, color: &[f32], weight: f32) -> Self {
        let shape = Shape::new(width, height, color.len() + 1);
        let mut data = Vec::with_capacity(shape.num_pixels() * shape.channels);
        for _ in 0..shape.num_pixels() {
            data.extend_from_slice(color);
            data.push(weight);
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn width(&self) -> u32 {
        self.shape.width
    }

    pub fn height(&self) -> u32 {
        self.shape.height
    }

    pub fn channels(&self) -> usize {
        self.shape.channels
    }

    /// Index of the weight channel.
    pub fn weight_channel(&self) -> usize {
        self.shape.channels - 1
    }

    /// Interleaved samples.
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Samples of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let c = self.shape.channels;
        let i = (y as usize * self.shape.width as usize + x as usize) * c;
        &self.data[i..i + c]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let c = self.shape.channels;
        let i = (y as usize * self.shape.width as usize + x as usize) * c;
        &mut self.data[i..i + c]
    }

    /// Weight of pixel `(x, y)`.
    pub fn weight(&self, x: u32, y: u32) -> f32 {
        self.pixel(x, y)[self.weight_channel()]
    }

    /// Number of samples in one row.
    pub(crate) fn row_len(&self) -> usize {
        self.shape.width as usize * self.shape.channels
    }
}

#[cfg(feature = "image")]
impl PixelImage {
    /// Convert an [`image::DynamicImage`] to an RGB + weight raster.
    ///
    /// Color is scaled to 0–255 regardless of the source bit depth. The weight
    /// channel starts at 255 (the source alpha is not used for blending).
    pub fn from_dynamic_image(img: &image::DynamicImage) -> Self {
        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let shape = Shape::new(width, height, 4);
        let mut data = Vec::with_capacity(shape.num_pixels() * 4);
        for p in rgb.pixels() {
            let [r, g, b] = p.0;
            data.extend_from_slice(&[r * 255.0, g * 255.0, b * 255.0, 255.0]);
        }
        Self { shape, data }
    }

    /// Convert to 8-bit RGBA, clamping each sample to 0–255.
    ///
    /// Requires three color channels; `None` otherwise.
    pub fn to_rgba8(&self) -> Option<image::RgbaImage> {
        if self.shape.channels != 4 {
            return None;
        }
        let buf: Vec<u8> = self
            .data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        image::RgbaImage::from_raw(self.shape.width, self.shape.height, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let mut img = PixelImage::new(Shape::new(3, 2, 4));
        img.pixel_mut(2, 1).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.as_raw()[20..24], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.weight(2, 1), 4.0);
        assert_eq!(img.weight(0, 0), 0.0);
        assert_eq!(img.shape().color_channels(), 3);
    }

    #[test]
    fn test_from_raw_validates_length() {
        assert!(PixelImage::from_raw(Shape::new(2, 2, 4), vec![0.0; 16]).is_ok());
        assert!(PixelImage::from_raw(Shape::new(2, 2, 4), vec![0.0; 15]).is_err());
        assert!(PixelImage::from_raw(Shape::new(2, 2, 1), vec![0.0; 4]).is_err());
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_dynamic_image_roundtrip() {
        let mut rgb = image::RgbImage::new(4, 3);
        rgb.put_pixel(1, 2, image::Rgb([10, 200, 33]));
        let img = PixelImage::from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb));
        assert_eq!(img.channels(), 4);
        let p = img.pixel(1, 2);
        assert!((p[0] - 10.0).abs() < 1e-3 && (p[1] - 200.0).abs() < 1e-3);
        assert_eq!(p[3], 255.0);

        let back = img.to_rgba8().unwrap();
        assert_eq!(back.get_pixel(1, 2).0, [10, 200, 33, 255]);
    }
}
