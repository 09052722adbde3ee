//! Robust pairwise alignment of two images from feature correspondences.
//!
//! The camera is assumed to rotate about its projection center, so two images
//! are related by a 3D rotation of their viewing rays. The aligner:
//!
//! 1. **Sampling**: draws minimal sets of two distinct valid matches.
//! 2. **Fitting**: solves the orthogonal Procrustes problem for each sample.
//! 3. **Scoring**: counts correspondences that agree with the candidate to
//!    within a re-projection threshold.
//! 4. **Refinement**: refits the rotation on the largest consensus set.

pub mod inliers;
pub mod procrustes;
pub mod ransac;

use std::time::Instant;

use tracing::{debug, info};

use crate::camera::Projector;
use crate::feature::{valid_pairs, Feature, FeatureMatch};
use crate::transform::Transform;

pub use inliers::{count_inliers, reprojection_error};
pub use procrustes::least_squares_fit;

// ── Motion models ───────────────────────────────────────────────────────────

/// Motion relating the two images of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionModel {
    /// Pure 3D rotation about the shared projection center (2-point minimal set).
    #[default]
    Rotation3D,
}

impl MotionModel {
    /// Number of correspondences in a minimal sample.
    pub fn sample_size(&self) -> usize {
        match self {
            MotionModel::Rotation3D => 2,
        }
    }
}

// ── Status codes ────────────────────────────────────────────────────────────

/// Outcome of an alignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignStatus {
    /// A rotation supported by at least one inlier was estimated.
    Aligned,
    /// Fewer valid (matched, in-range) correspondences than a minimal sample.
    TooFewMatches,
    /// Every iteration exhausted its redraw budget on degenerate samples.
    DegenerateSamples,
    /// No candidate had any inlier, so the final refit has nothing to use.
    NoConsensus,
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Parameters controlling the alignment of one image pair.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Motion model. Default [`MotionModel::Rotation3D`].
    pub motion_model: MotionModel,
    /// Focal length in pixels, shared by both images.
    pub focal_length: f64,
    /// Image width in pixels (both images).
    pub image_width: u32,
    /// Image height in pixels (both images).
    pub image_height: u32,
    /// Number of RANSAC iterations. Default 500.
    pub num_iterations: usize,
    /// Inlier threshold: maximum re-projection distance in pixels (exclusive).
    /// Default 2.0.
    pub inlier_threshold: f64,
    /// Seed for the pseudo-random sample selection. Runs with the same seed and
    /// inputs are reproducible. Default 0.
    pub seed: u64,
    /// Redraws allowed per iteration when a sample is degenerate (the two rays
    /// are nearly parallel). Default 32.
    pub max_sample_attempts: u32,
    /// Evaluate iterations on the rayon thread pool. The result does not depend
    /// on this flag. Default true.
    pub parallel: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            motion_model: MotionModel::Rotation3D,
            focal_length: 0.0,
            image_width: 0,
            image_height: 0,
            num_iterations: 500,
            inlier_threshold: 2.0,
            seed: 0,
            max_sample_attempts: 32,
            parallel: true,
        }
    }
}

impl AlignConfig {
    /// Create an alignment configuration for a focal length and image size.
    pub fn new(focal_length: f64, image_width: u32, image_height: u32) -> Self {
        Self {
            focal_length,
            image_width,
            image_height,
            ..Default::default()
        }
    }

    /// Projector matching this configuration.
    pub fn projector(&self) -> Projector {
        Projector::new(self.focal_length, self.image_width, self.image_height)
    }
}

// ── Result ──────────────────────────────────────────────────────────────────

/// Result of an alignment attempt.
#[derive(Debug, Clone)]
pub struct AlignResult {
    /// Outcome status.
    pub status: AlignStatus,
    /// Rotation refitted on the winning inlier set (`M · p1 ≈ p2`).
    /// Only populated when `status == Aligned`.
    pub transform: Option<Transform>,
    /// Indices into the first feature set supporting `transform`, ascending.
    pub inliers: Vec<usize>,
    /// Number of usable correspondences in the match list.
    pub num_valid_matches: usize,
    /// RANSAC iteration that produced the winning inlier set.
    pub best_iteration: Option<usize>,
    /// RMS re-projection error (pixels) of `transform` over `inliers`.
    pub rmse_px: Option<f64>,
    /// Wall-clock time spent aligning, in milliseconds.
    pub align_time_ms: f32,
}

impl AlignResult {
    /// Create a failure result with the given status.
    pub(crate) fn failure(status: AlignStatus, num_valid_matches: usize, t0: Instant) -> Self {
        Self {
            status,
            transform: None,
            inliers: Vec::new(),
            num_valid_matches,
            best_iteration: None,
            rmse_px: None,
            align_time_ms: elapsed_ms(t0),
        }
    }

    /// `true` if a transform was produced.
    pub fn is_aligned(&self) -> bool {
        self.status == AlignStatus::Aligned
    }

    /// Number of inliers supporting the transform.
    pub fn num_inliers(&self) -> usize {
        self.inliers.len()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Estimate the rotation aligning image 1 onto image 2.
///
/// `matches[i]` is the correspondence of `f1[i]`. Entries past the end of `f1`
/// are ignored, as are targets outside `f2`.
///
/// With fewer than two usable correspondences the result is
/// [`AlignStatus::TooFewMatches`] and no transform is produced.
pub fn align_image_pair(
    f1: &[Feature],
    f2: &[Feature],
    matches: &[FeatureMatch],
    config: &AlignConfig,
) -> AlignResult {
    let t0 = Instant::now();

    let pairs: Vec<(usize, usize)> = valid_pairs(f1, f2, matches).collect();
    let num_valid = pairs.len();
    let sample_size = config.motion_model.sample_size();

    debug!(
        "Aligning: {} features, {} matches, {} usable",
        f1.len(),
        matches.len(),
        num_valid
    );

    if num_valid < sample_size {
        debug!("Too few matches: need {}, got {}", sample_size, num_valid);
        return AlignResult::failure(AlignStatus::TooFewMatches, num_valid, t0);
    }

    let projector = config.projector();
    let rays1: Vec<_> = pairs.iter().map(|&(i, _)| projector.feature_ray(&f1[i])).collect();
    let rays2: Vec<_> = pairs.iter().map(|&(_, j)| projector.feature_ray(&f2[j])).collect();

    let Some(best) = ransac::run(&rays1, &rays2, &projector, config) else {
        debug!("All {} iterations drew degenerate samples", config.num_iterations);
        return AlignResult::failure(AlignStatus::DegenerateSamples, num_valid, t0);
    };

    if best.inliers.is_empty() {
        debug!("No candidate rotation had any inlier");
        return AlignResult::failure(AlignStatus::NoConsensus, num_valid, t0);
    }

    // ── Refit on the full winning inlier set ──
    let in1: Vec<_> = best.inliers.iter().map(|&k| rays1[k]).collect();
    let in2: Vec<_> = best.inliers.iter().map(|&k| rays2[k]).collect();
    let Some(transform) = procrustes::fit_rays(&in1, &in2) else {
        return AlignResult::failure(AlignStatus::NoConsensus, num_valid, t0);
    };

    let sq_sum: f64 = in1
        .iter()
        .zip(&in2)
        .map(|(p1, p2)| {
            reprojection_error(&projector, &transform, p1, p2)
                .map(|e| e * e)
                .unwrap_or(0.0)
        })
        .sum();
    let rmse = (sq_sum / in1.len() as f64).sqrt();

    let inliers: Vec<usize> = best.inliers.iter().map(|&k| pairs[k].0).collect();

    info!(
        "Aligned: {}/{} inliers (iteration {}), rmse {:.3} px, {:.2}° rotation",
        inliers.len(),
        num_valid,
        best.iteration,
        rmse,
        Transform::identity().angle_to(&transform).to_degrees()
    );

    AlignResult {
        status: AlignStatus::Aligned,
        transform: Some(transform),
        inliers,
        num_valid_matches: num_valid,
        best_iteration: Some(best.iteration),
        rmse_px: Some(rmse),
        align_time_ms: elapsed_ms(t0),
    }
}

fn elapsed_ms(t0: Instant) -> f32 {
    t0.elapsed().as_secs_f32() * 1000.0
}
