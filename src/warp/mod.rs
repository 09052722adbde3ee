//! Reprojection of source images onto the spherical mosaic canvas.
//!
//! Warping happens in two steps, each behind a trait so callers can plug in
//! their own implementation:
//!
//! 1. A [`WarpFieldGenerator`] computes, for every canvas pixel, the source
//!    pixel it samples from (or `None` if the canvas direction is not seen by
//!    the source camera).
//! 2. A [`Warper`] resamples the source image through that field.
//!
//! The defaults are [`SphericalWarp`] and [`BilinearWarper`].

pub mod bilinear;
pub mod radial;
pub mod spherical;

pub use bilinear::BilinearWarper;
pub use radial::RadialDistortion;
pub use spherical::SphericalWarp;

use crate::blend::{PixelImage, Shape};
use crate::transform::Transform;

/// Per-pixel source coordinates for one target raster.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpField {
    width: u32,
    height: u32,
    coords: Vec<Option<[f32; 2]>>,
}

impl WarpField {
    /// Field of the given size where no pixel maps anywhere.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coords: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source `(u, v)` sampled by target pixel `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 2]> {
        self.coords[y as usize * self.width as usize + x as usize]
    }

    /// Row-major coordinates.
    pub fn coords(&self) -> &[Option<[f32; 2]>] {
        &self.coords
    }

    pub(crate) fn coords_mut(&mut self) -> &mut [Option<[f32; 2]>] {
        &mut self.coords
    }
}

/// Computes the sampling field that reprojects a source image onto a target raster.
pub trait WarpFieldGenerator {
    /// Field of size `target.width × target.height` giving, for each target
    /// pixel, the pixel of `source` seen in that direction by a camera with
    /// orientation `transform`.
    fn compute_field(
        &self,
        source: Shape,
        target: Shape,
        focal_length: f64,
        transform: &Transform,
    ) -> WarpField;
}

/// Resamples an image through a [`WarpField`].
pub trait Warper {
    /// Output has the field's size and the source's channel count. Pixels whose
    /// field entry is `None` or falls outside the source are all zero.
    fn warp(&self, image: &PixelImage, field: &WarpField) -> PixelImage;
}
