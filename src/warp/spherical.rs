//! Spherical (equirectangular) warp field.
//!
//! Canvas pixel `(x, y)` of a `W × H` canvas corresponds to longitude
//! `θ = (x − W/2) / f` and latitude `φ = (y − H/2) / f`, i.e. the direction
//!
//! ```text
//! d = (sin θ · cos φ,  sin φ,  cos θ · cos φ)
//! ```
//!
//! in the mosaic frame. The image's [`Transform`] rotates `d` into the camera
//! frame; directions behind the camera are not seen. Visible directions are
//! projected to the tangent plane, optionally distorted, and scaled back to
//! source pixels:
//!
//! ```text
//! (x', y') = distort(c.x / c.z, c.y / c.z)
//! u = f · x' + w/2,   v = f · y' + h/2
//! ```

use rayon::prelude::*;

use crate::blend::Shape;
use crate::transform::Transform;
use crate::Vector3;

use super::radial::RadialDistortion;
use super::{WarpField, WarpFieldGenerator};

/// Spherical reprojection with optional radial lens distortion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalWarp {
    /// Lens distortion of the source camera.
    pub distortion: RadialDistortion,
}

impl SphericalWarp {
    pub fn new(distortion: RadialDistortion) -> Self {
        Self { distortion }
    }

    /// Mosaic-frame direction of canvas pixel `(x, y)`.
    pub fn direction(target: Shape, focal_length: f64, x: f64, y: f64) -> Vector3 {
        let theta = (x - 0.5 * target.width as f64) / focal_length;
        let phi = (y - 0.5 * target.height as f64) / focal_length;
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        Vector3::new(st * cp, sp, ct * cp)
    }

    /// Source pixel seen along mosaic-frame direction `d`, if any.
    pub fn source_pixel(
        &self,
        source: Shape,
        focal_length: f64,
        transform: &Transform,
        d: &Vector3,
    ) -> Option<[f64; 2]> {
        let c = transform.apply(d);
        if c.z <= 0.0 {
            return None;
        }
        let (xd, yd) = self.distortion.distort(c.x / c.z, c.y / c.z);
        Some([
            focal_length * xd + 0.5 * source.width as f64,
            focal_length * yd + 0.5 * source.height as f64,
        ])
    }
}

impl WarpFieldGenerator for SphericalWarp {
    fn compute_field(
        &self,
        source: Shape,
        target: Shape,
        focal_length: f64,
        transform: &Transform,
    ) -> WarpField {
        let mut field = WarpField::empty(target.width, target.height);
        let width = target.width as usize;
        if width == 0 || !(focal_length > 0.0) {
            return field;
        }

        field
            .coords_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    let d = Self::direction(target, focal_length, x as f64, y as f64);
                    *slot = self
                        .source_pixel(source, focal_length, transform, &d)
                        .map(|[u, v]| [u as f32, v as f32]);
                }
            });
        field
    }
}
