//! Pinhole projector: maps image-plane feature locations to 3D viewing rays.
//!
//! All images of a panorama share one projection center. A feature at pixel
//! `(x, y)` of a `width × height` image lies on the ray
//!
//! ```text
//! p = (x − width/2, y − height/2, f)
//! ```
//!
//! i.e. the image plane sits at distance `f` from the center, with the optical
//! axis through the geometric image center. Rotating `p` by a camera orientation
//! expresses the ray in mosaic coordinates.
//!
//! # Coordinate conventions
//!
//! - **Pixel coordinates**: origin at the top-left corner, +X right, +Y down.
//! - **Ray coordinates**: origin at the projection center, +Z along the optical axis.

use crate::feature::Feature;
use crate::Vector3;

/// Projection parameters shared by every image of one alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Projector {
    /// Create a projector for images of the given size.
    pub fn new(focal_length: f64, width: u32, height: u32) -> Self {
        Self {
            focal_length,
            width,
            height,
        }
    }

    /// Ray through pixel `(x, y)`.
    pub fn ray(&self, x: f64, y: f64) -> Vector3 {
        Vector3::new(
            x - 0.5 * self.width as f64,
            y - 0.5 * self.height as f64,
            self.focal_length,
        )
    }

    /// Ray through a feature location.
    pub fn feature_ray(&self, feature: &Feature) -> Vector3 {
        self.ray(feature.x, feature.y)
    }

    /// Project a ray back onto the image plane `z = f`.
    ///
    /// Returns the first two ray coordinates of the scaled ray (still centered on
    /// the optical axis), or `None` if the ray points away from the image plane.
    pub fn to_plane(&self, ray: &Vector3) -> Option<(f64, f64)> {
        if ray.z <= 0.0 {
            return None;
        }
        let s = self.focal_length / ray.z;
        Some((ray.x * s, ray.y * s))
    }

    /// Convert a ray to pixel coordinates.
    ///
    /// Pipeline: project to the plane `z = f` → add the image center.
    pub fn to_pixel(&self, ray: &Vector3) -> Option<(f64, f64)> {
        let (px, py) = self.to_plane(ray)?;
        Some((px + 0.5 * self.width as f64, py + 0.5 * self.height as f64))
    }
}
