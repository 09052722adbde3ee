//! Random-sample consensus over minimal ray-pair samples.
//!
//! Every iteration owns a private `StdRng` derived from the configured seed and
//! its iteration index, so the candidate drawn by iteration `k` is the same
//! whether iterations run sequentially or on the rayon pool. The reduction keeps
//! the largest inlier set and resolves ties to the lowest iteration index.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::camera::Projector;
use crate::Vector3;

use super::inliers::ray_inliers;
use super::procrustes::{fit_rays, nearly_parallel};
use super::AlignConfig;

/// Winning iteration of a RANSAC run.
#[derive(Debug, Clone)]
pub(crate) struct Consensus {
    /// Iteration index that produced this set.
    pub iteration: usize,
    /// Positions into the ray slices, ascending.
    pub inliers: Vec<usize>,
}

/// Run the consensus loop over corresponding rays.
///
/// Returns `None` if no iteration managed to draw a non-degenerate sample.
/// Callers guarantee at least two ray pairs.
pub(crate) fn run(
    rays1: &[Vector3],
    rays2: &[Vector3],
    projector: &Projector,
    config: &AlignConfig,
) -> Option<Consensus> {
    let evaluate = |iteration: usize| -> Option<Consensus> {
        let mut rng = iteration_rng(config.seed, iteration);
        let (a, b) = draw_sample(&mut rng, rays1, rays2, config.max_sample_attempts)?;
        let candidate = fit_rays(&[rays1[a], rays1[b]], &[rays2[a], rays2[b]])?;
        let inliers = ray_inliers(rays1, rays2, projector, &candidate, config.inlier_threshold);
        Some(Consensus { iteration, inliers })
    };

    let best = if config.parallel {
        (0..config.num_iterations)
            .into_par_iter()
            .filter_map(evaluate)
            .reduce_with(better)
    } else {
        (0..config.num_iterations).filter_map(evaluate).reduce(better)
    };

    if let Some(ref c) = best {
        debug!(
            "RANSAC: best iteration {} with {} inliers",
            c.iteration,
            c.inliers.len()
        );
    }
    best
}

/// Keep the larger inlier set; on a tie keep the earlier iteration.
fn better(a: Consensus, b: Consensus) -> Consensus {
    match a.inliers.len().cmp(&b.inliers.len()) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal => {
            if a.iteration <= b.iteration {
                a
            } else {
                b
            }
        }
    }
}

/// Private random stream for one iteration.
fn iteration_rng(seed: u64, iteration: usize) -> StdRng {
    // splitmix64 finalizer decorrelates neighbouring iteration indices
    let mut z = seed ^ (iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

/// Draw two distinct pair positions whose rays are not parallel in either image.
///
/// Redraws at most `max_attempts` times before giving up on this iteration.
fn draw_sample(
    rng: &mut StdRng,
    rays1: &[Vector3],
    rays2: &[Vector3],
    max_attempts: u32,
) -> Option<(usize, usize)> {
    let n = rays1.len().min(rays2.len());
    if n < 2 {
        return None;
    }
    for _ in 0..max_attempts.max(1) {
        let a = rng.random_range(0..n);
        let mut b = rng.random_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        if !nearly_parallel(&rays1[a], &rays1[b]) && !nearly_parallel(&rays2[a], &rays2[b]) {
            return Some((a, b));
        }
    }
    None
}
