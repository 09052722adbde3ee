//! Weighted-sum accumulation of warped, masked images on the mosaic canvas.
//!
//! The buffer holds, per pixel, `Σ color · (w / 255)` in each color channel and
//! `Σ w` in the weight channel. Sums are order-independent up to floating-point
//! rounding, so the normalized mosaic does not depend on the order images are
//! added in.

use anyhow::{ensure, Result};
use rayon::prelude::*;

use super::alpha::MAX_WEIGHT;
use super::image::{PixelImage, Shape};

/// Running weighted sums over the full canvas.
///
/// Owned by one compositing run: created zeroed, added to image by image, and
/// read once by [`normalize_blend`](super::normalize::normalize_blend).
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationBuffer {
    sums: PixelImage,
}

impl AccumulationBuffer {
    /// Zeroed buffer for a canvas of the given shape.
    pub fn new(shape: Shape) -> Self {
        Self {
            sums: PixelImage::new(shape),
        }
    }

    pub fn shape(&self) -> Shape {
        self.sums.shape()
    }

    /// Weighted-sum view (color channels) plus weight-sum channel.
    pub fn sums(&self) -> &PixelImage {
        &self.sums
    }

    /// Accumulated weight at `(x, y)`.
    pub fn weight(&self, x: u32, y: u32) -> f32 {
        self.sums.weight(x, y)
    }

    /// Reset every sum to zero.
    pub fn clear(&mut self) {
        self.sums.as_raw_mut().fill(0.0);
    }

    /// Add another buffer's sums into this one.
    ///
    /// Merging partial buffers in a fixed order gives reproducible results.
    pub fn merge(&mut self, other: &AccumulationBuffer) -> Result<()> {
        ensure!(
            self.shape() == other.shape(),
            "Cannot merge buffers of shape {:?} and {:?}",
            self.shape(),
            other.shape()
        );
        self.sums
            .as_raw_mut()
            .par_iter_mut()
            .zip(other.sums.as_raw().par_iter())
            .for_each(|(a, &b)| *a += b);
        Ok(())
    }
}

/// Add `img` (already warped into canvas coordinates and carrying a weight mask)
/// into `acc`: color scaled by `w / 255` into the color sums, `w` into the
/// weight sum.
///
/// Fails if `img` and the buffer differ in shape.
pub fn accumulate_blend(img: &PixelImage, acc: &mut AccumulationBuffer) -> Result<()> {
    ensure!(
        img.shape() == acc.shape(),
        "Image shape {:?} does not match accumulation buffer {:?}",
        img.shape(),
        acc.shape()
    );
    let channels = img.channels();
    let wc = img.weight_channel();
    let row_len = img.row_len();
    if row_len == 0 {
        return Ok(());
    }

    acc.sums
        .as_raw_mut()
        .par_chunks_mut(row_len)
        .zip(img.as_raw().par_chunks(row_len))
        .for_each(|(acc_row, img_row)| {
            for (a, p) in acc_row
                .chunks_exact_mut(channels)
                .zip(img_row.chunks_exact(channels))
            {
                let w = p[wc];
                if w <= 0.0 {
                    continue;
                }
                let alpha = w / MAX_WEIGHT;
                for c in 0..wc {
                    a[c] += p[c] * alpha;
                }
                a[wc] += w;
            }
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sums() {
        let shape = Shape::new(2, 1, 4);
        let mut acc = AccumulationBuffer::new(shape);

        let a = PixelImage::from_raw(shape, vec![100.0, 50.0, 0.0, 255.0, 9.0, 9.0, 9.0, 0.0])
            .unwrap();
        let b = PixelImage::from_raw(shape, vec![200.0, 0.0, 60.0, 51.0, 1.0, 2.0, 3.0, 102.0])
            .unwrap();
        accumulate_blend(&a, &mut acc).unwrap();
        accumulate_blend(&b, &mut acc).unwrap();

        let p0 = acc.sums().pixel(0, 0);
        assert!((p0[0] - (100.0 + 200.0 * 0.2)).abs() < 1e-4);
        assert!((p0[1] - 50.0).abs() < 1e-4);
        assert!((p0[2] - 60.0 * 0.2).abs() < 1e-4);
        assert!((p0[3] - 306.0).abs() < 1e-4);

        // Zero-weight sample adds nothing
        let p1 = acc.sums().pixel(1, 0);
        assert!((p1[0] - 0.4).abs() < 1e-5);
        assert!((p1[3] - 102.0).abs() < 1e-5);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut acc = AccumulationBuffer::new(Shape::new(4, 4, 4));
        let img = PixelImage::new(Shape::new(4, 3, 4));
        assert!(accumulate_blend(&img, &mut acc).is_err());
        let img = PixelImage::new(Shape::new(4, 4, 2));
        assert!(accumulate_blend(&img, &mut acc).is_err());
    }

    #[test]
    fn test_merge_equals_direct_accumulation() {
        let shape = Shape::new(3, 2, 2);
        let imgs: Vec<PixelImage> = (0..3)
            .map(|k| {
                let data = (0..12)
                    .map(|i| if i % 2 == 1 { 40.0 * k as f32 + i as f32 } else { i as f32 * 3.0 })
                    .collect();
                PixelImage::from_raw(shape, data).unwrap()
            })
            .collect();

        let mut direct = AccumulationBuffer::new(shape);
        for img in &imgs {
            accumulate_blend(img, &mut direct).unwrap();
        }

        let mut merged = AccumulationBuffer::new(shape);
        for img in &imgs {
            let mut part = AccumulationBuffer::new(shape);
            accumulate_blend(img, &mut part).unwrap();
            merged.merge(&part).unwrap();
        }
        for (a, b) in direct.sums().as_raw().iter().zip(merged.sums().as_raw()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }

        merged.clear();
        assert!(merged.sums().as_raw().iter().all(|&v| v == 0.0));
    }
}
