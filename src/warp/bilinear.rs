//! Bilinear resampling through a warp field.

use rayon::prelude::*;

use crate::blend::{PixelImage, Shape};

use super::{WarpField, Warper};

/// Samples every channel (weight included) with bilinear interpolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearWarper;

impl Warper for BilinearWarper {
    fn warp(&self, image: &PixelImage, field: &WarpField) -> PixelImage {
        let shape = Shape::new(field.width(), field.height(), image.channels());
        let mut out = PixelImage::new(shape);
        let channels = image.channels();
        let width = field.width() as usize;
        if width == 0 || channels == 0 {
            return out;
        }

        out.as_raw_mut()
            .par_chunks_mut(width * channels)
            .zip(field.coords().par_chunks(width))
            .for_each(|(row, coords)| {
                for (px, uv) in row.chunks_exact_mut(channels).zip(coords) {
                    if let Some([u, v]) = *uv {
                        sample_bilinear(image, u, v, px);
                    }
                }
            });
        out
    }
}

/// Write the bilinear sample of `img` at `(u, v)` into `out`.
///
/// Returns `false` and leaves `out` untouched for positions outside
/// `[0, w−1] × [0, h−1]`.
pub fn sample_bilinear(img: &PixelImage, u: f32, v: f32, out: &mut [f32]) -> bool {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 || !(u >= 0.0 && v >= 0.0) {
        return false;
    }
    let max_u = (w - 1) as f32;
    let max_v = (h - 1) as f32;
    if u > max_u || v > max_v {
        return false;
    }

    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let p00 = img.pixel(x0, y0);
    let p10 = img.pixel(x1, y0);
    let p01 = img.pixel(x0, y1);
    let p11 = img.pixel(x1, y1);
    for (c, o) in out.iter_mut().enumerate() {
        *o = (1.0 - fx) * (1.0 - fy) * p00[c]
            + fx * (1.0 - fy) * p10[c]
            + (1.0 - fx) * fy * p01[c]
            + fx * fy * p11[c];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelImage {
        let mut img = PixelImage::new(Shape::new(w, h, 2));
        for y in 0..h {
            for x in 0..w {
                img.pixel_mut(x, y).copy_from_slice(&[10.0 * x as f32 + y as f32, 255.0]);
            }
        }
        img
    }

    #[test]
    fn test_interpolates_linear_ramp() {
        let img = gradient(5, 4);
        let mut px = [0.0f32; 2];
        assert!(sample_bilinear(&img, 1.5, 2.25, &mut px));
        assert!((px[0] - (15.0 + 2.25)).abs() < 1e-4);
        assert!((px[1] - 255.0).abs() < 1e-4);

        // Last row/column are reachable
        assert!(sample_bilinear(&img, 4.0, 3.0, &mut px));
        assert!((px[0] - 43.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_bounds_is_zero() {
        let img = gradient(5, 4);
        let mut field = WarpField::empty(3, 1);
        field.coords_mut()[0] = Some([2.0, 1.0]);
        field.coords_mut()[1] = Some([-0.5, 1.0]);
        field.coords_mut()[2] = Some([4.5, 1.0]);

        let out = BilinearWarper.warp(&img, &field);
        assert_eq!(out.shape(), Shape::new(3, 1, 2));
        assert!((out.pixel(0, 0)[0] - 21.0).abs() < 1e-4);
        assert_eq!(out.pixel(1, 0), &[0.0, 0.0]);
        assert_eq!(out.pixel(2, 0), &[0.0, 0.0]);
    }

    #[test]
    fn test_nan_coordinates_are_rejected() {
        let img = gradient(3, 3);
        let mut px = [7.0f32; 2];
        assert!(!sample_bilinear(&img, f32::NAN, 1.0, &mut px));
        assert_eq!(px, [7.0, 7.0]);
    }
}
