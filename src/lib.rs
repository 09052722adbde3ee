//! # panostitch
//!
//! Panorama core for a camera rotating about its projection center: **robust
//! pairwise rotation alignment** from feature matches, and **feathered
//! blending** of the aligned images onto a full spherical mosaic.
//!
//! Feature detection and descriptor matching happen upstream; this crate takes
//! feature positions and a match list per image pair, estimates the 3D rotation
//! relating the two views, and composites all images once their orientations
//! are known.
//!
//! ## Features
//!
//! - **RANSAC over 2-point minimal samples**: each candidate rotation is an
//!   orthogonal Procrustes fit, scored by re-projection distance
//! - **Reproducible**: fixed seed gives the same result whether or not
//!   iterations run in parallel
//! - **Feathered blending**: radial weight masks, weighted averaging in an
//!   accumulation buffer
//! - **Pluggable warping**: spherical warp field with optional radial lens
//!   distortion and bilinear resampling, both behind traits
//!
//! ## Example
//!
//! ```no_run
//! use panostitch::{
//!     align_image_pair, build_mosaic, positions_from_chain, AlignConfig, BlendConfig,
//!     Feature, FeatureMatch, PixelImage,
//! };
//!
//! // Features of two consecutive 640x480 images, matched upstream
//! let f1 = vec![Feature::new(100.0, 200.0), Feature::new(320.0, 41.5)];
//! let f2 = vec![Feature::new(210.3, 198.0), Feature::new(431.0, 44.2)];
//! let matches = vec![FeatureMatch::to(0), FeatureMatch::to(1)];
//!
//! let config = AlignConfig::new(500.0, 640, 480);
//! let link = align_image_pair(&f1, &f2, &matches, &config);
//! println!("{:?}: {} inliers", link.status, link.num_inliers());
//!
//! // Chain the pairwise rotations and composite
//! let images = vec![
//!     PixelImage::filled(640, 480, &[128.0, 128.0, 128.0], 255.0),
//!     PixelImage::filled(640, 480, &[90.0, 90.0, 90.0], 255.0),
//! ];
//! let chain = positions_from_chain(images, &[link]).unwrap();
//! let mosaic = build_mosaic(&chain.positions, &BlendConfig::new(500.0, 300.0)).unwrap();
//! println!("Covered {:.1}% of the sphere", 100.0 * mosaic.coverage);
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Rays**: each feature `(x, y)` becomes the viewing direction
//!    `(x − w/2, y − h/2, f)`
//! 2. **Sampling**: two distinct usable matches per iteration, drawn from a
//!    per-iteration seeded generator
//! 3. **Fitting**: `M = V·Uᵀ` from the SVD of `Σ p1·p2ᵀ`, with the sign of the
//!    last singular direction flipped if needed so `det M = +1`
//! 4. **Scoring**: a match is an inlier if `M·p1`, projected back onto the
//!    image plane, lands within the threshold of `p2`
//! 5. **Refinement**: refit on the largest inlier set
//! 6. **Blending**: mask, warp, accumulate `(color·w/255, w)` per image, then
//!    divide by the accumulated weight
//!

pub mod align;
pub mod blend;
pub mod camera;
pub mod feature;
pub mod mosaic;
pub mod transform;
pub mod warp;

pub use align::{
    align_image_pair, count_inliers, least_squares_fit, reprojection_error, AlignConfig,
    AlignResult, AlignStatus, MotionModel,
};
pub use blend::{
    accumulate_blend, canvas_size, normalize_blend, set_image_alpha, AccumulationBuffer,
    BlendConfig, PixelImage, Shape,
};
pub use camera::Projector;
pub use feature::{Feature, FeatureMatch, FeatureSet};
pub use mosaic::{
    build_mosaic, positions_from_chain, ChainedPositions, ImagePosition, MosaicAssembler,
    MosaicResult, SkipReason, SkippedImage,
};
pub use transform::Transform;
pub use warp::{
    BilinearWarper, RadialDistortion, SphericalWarp, WarpField, WarpFieldGenerator, Warper,
};

// Commonly used types
// Geometry is done in 64-bit; pixel samples are 32-bit.
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;
