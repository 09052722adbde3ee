//! Feathered blending of overlapping images on a shared canvas.
//!
//! Every source image is given a radial weight mask ([`alpha`]), warped onto
//! the canvas, added into an [`AccumulationBuffer`] ([`accumulate`]) and
//! finally divided through by the accumulated weight ([`normalize`]).

pub mod accumulate;
pub mod alpha;
pub mod image;
pub mod normalize;

pub use accumulate::{accumulate_blend, AccumulationBuffer};
pub use alpha::{radial_weight, set_image_alpha, MAX_WEIGHT};
pub use image::{PixelImage, Shape};
pub use normalize::{coverage, normalize_blend};

use crate::warp::RadialDistortion;

/// Parameters controlling the mosaic build.
#[derive(Debug, Clone)]
pub struct BlendConfig {
    /// Focal length in pixels. Also sets the canvas size:
    /// `round(2π·f) × round(π·f)` for the full 360° × 180° sphere.
    pub focal_length: f64,
    /// Distance (pixels) from the image center at which the blend weight
    /// reaches zero. Default 100.
    pub blend_radius: f32,
    /// Lens distortion applied when mapping canvas directions to source pixels.
    /// Default none.
    pub distortion: RadialDistortion,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            focal_length: 0.0,
            blend_radius: 100.0,
            distortion: RadialDistortion::default(),
        }
    }
}

impl BlendConfig {
    /// Create a blend configuration for a focal length and blend radius.
    pub fn new(focal_length: f64, blend_radius: f32) -> Self {
        Self {
            focal_length,
            blend_radius,
            ..Default::default()
        }
    }

    /// Canvas `(width, height)` = `(nTheta, nPhi)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        canvas_size(self.focal_length)
    }
}

/// Canvas `(width, height)` for a focal length: `(round(2π·f), round(π·f))`.
pub fn canvas_size(focal_length: f64) -> (u32, u32) {
    let n_theta = (2.0 * std::f64::consts::PI * focal_length).round().max(0.0) as u32;
    let n_phi = (std::f64::consts::PI * focal_length).round().max(0.0) as u32;
    (n_theta, n_phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size() {
        assert_eq!(canvas_size(100.0), (628, 314));
        assert_eq!(canvas_size(1.0), (6, 3));
        assert_eq!(BlendConfig::new(50.0, 10.0).canvas_size(), (314, 157));
        assert_eq!(canvas_size(-5.0), (0, 0));
    }
}
