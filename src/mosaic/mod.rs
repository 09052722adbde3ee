//! Mosaic assembly: warp → mask → accumulate every image, then normalize.
//!
//! Images are processed sequentially in input order into a single
//! [`AccumulationBuffer`] owned by the run. Per-pixel work inside each step runs
//! row-parallel. An image that cannot be composited (wrong shape, or a warp
//! that returns the wrong raster) is left out and reported in
//! [`MosaicResult::skipped`]; the rest of the mosaic is still built.

pub mod chain;

pub use chain::{positions_from_chain, ChainedPositions};

use anyhow::{ensure, Result};
use tracing::{debug, info, warn};

use crate::align::AlignStatus;
use crate::blend::{
    accumulate_blend, coverage, normalize_blend, set_image_alpha, AccumulationBuffer,
    BlendConfig, PixelImage, Shape,
};
use crate::transform::Transform;
use crate::warp::{BilinearWarper, SphericalWarp, WarpFieldGenerator, Warper};

/// One source image and its orientation in the mosaic frame.
#[derive(Debug, Clone)]
pub struct ImagePosition {
    pub image: PixelImage,
    /// Maps mosaic-frame directions into this image's camera frame.
    pub transform: Transform,
}

impl ImagePosition {
    pub fn new(image: PixelImage, transform: Transform) -> Self {
        Self { image, transform }
    }
}

/// Why an image was left out of the mosaic.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Raw dimensions or channel count differ from the first image.
    ShapeMismatch { expected: Shape, found: Shape },
    /// The warper returned a raster that does not match the canvas.
    WarpMismatch { expected: Shape, found: Shape },
    /// The alignment placing this image failed.
    AlignmentFailed(AlignStatus),
    /// An earlier alignment in the chain failed, so this image has no pose.
    Unanchored,
}

/// An excluded image.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    /// Index of the image in the caller's input.
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of a mosaic build.
#[derive(Debug, Clone)]
pub struct MosaicResult {
    /// Composited canvas. Weight channel is 255 where covered, 0 elsewhere.
    pub image: PixelImage,
    /// Indices of the input positions that were composited, ascending.
    pub included: Vec<usize>,
    /// Input positions that were left out, with the reason.
    pub skipped: Vec<SkippedImage>,
    /// Fraction of canvas pixels covered by at least one image.
    pub coverage: f64,
}

/// Drives warping and blending with pluggable warp collaborators.
#[derive(Debug, Clone, Default)]
pub struct MosaicAssembler<G = SphericalWarp, W = BilinearWarper> {
    generator: G,
    warper: W,
}

impl<G: WarpFieldGenerator, W: Warper> MosaicAssembler<G, W> {
    pub fn new(generator: G, warper: W) -> Self {
        Self { generator, warper }
    }

    /// Composite `positions` onto a `round(2π·f) × round(π·f)` canvas.
    ///
    /// Fails only for run-level problems: no images, a non-positive or
    /// non-finite focal length or blend radius, or a first image without a
    /// color channel. Per-image problems are reported in the result.
    pub fn build(&self, positions: &[ImagePosition], config: &BlendConfig) -> Result<MosaicResult> {
        let f = config.focal_length;
        ensure!(
            f.is_finite() && f > 0.0,
            "Focal length must be positive and finite, got {}",
            f
        );
        ensure!(
            config.blend_radius.is_finite() && config.blend_radius > 0.0,
            "Blend radius must be positive and finite, got {}",
            config.blend_radius
        );
        ensure!(!positions.is_empty(), "No images to composite");

        let reference = positions[0].image.shape();
        ensure!(
            reference.channels >= 2,
            "Images need at least one color channel plus weight, got {} channels",
            reference.channels
        );

        let (n_theta, n_phi) = config.canvas_size();
        let canvas = Shape::new(n_theta, n_phi, reference.channels);
        debug!(
            "Canvas {}x{} ({} channels) for f = {:.1}, blend radius {:.1}",
            n_theta, n_phi, canvas.channels, f, config.blend_radius
        );

        let mut acc = AccumulationBuffer::new(canvas);
        let mut included = Vec::with_capacity(positions.len());
        let mut skipped = Vec::new();

        for (index, pos) in positions.iter().enumerate() {
            let shape = pos.image.shape();
            if shape != reference {
                warn!(
                    "Skipping image {}: shape {:?} differs from first image {:?}",
                    index, shape, reference
                );
                skipped.push(SkippedImage {
                    index,
                    reason: SkipReason::ShapeMismatch {
                        expected: reference,
                        found: shape,
                    },
                });
                continue;
            }

            let mut masked = pos.image.clone();
            set_image_alpha(&mut masked, config.blend_radius);

            let field = self
                .generator
                .compute_field(shape, canvas, f, &pos.transform);
            let warped = self.warper.warp(&masked, &field);
            if warped.shape() != canvas {
                warn!(
                    "Skipping image {}: warp produced {:?}, canvas is {:?}",
                    index,
                    warped.shape(),
                    canvas
                );
                skipped.push(SkippedImage {
                    index,
                    reason: SkipReason::WarpMismatch {
                        expected: canvas,
                        found: warped.shape(),
                    },
                });
                continue;
            }

            accumulate_blend(&warped, &mut acc)?;
            included.push(index);
            debug!("Accumulated image {}", index);
        }

        let image = normalize_blend(&acc);
        let coverage = coverage(&acc);
        info!(
            "Mosaic {}x{}: {} images blended, {} skipped, {:.1}% covered",
            n_theta,
            n_phi,
            included.len(),
            skipped.len(),
            100.0 * coverage
        );

        Ok(MosaicResult {
            image,
            included,
            skipped,
            coverage,
        })
    }
}

/// Build a mosaic with the spherical warp (using `config.distortion`) and
/// bilinear resampling.
pub fn build_mosaic(positions: &[ImagePosition], config: &BlendConfig) -> Result<MosaicResult> {
    MosaicAssembler::new(SphericalWarp::new(config.distortion), BilinearWarper)
        .build(positions, config)
}
