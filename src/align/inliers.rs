//! Consensus scoring of a candidate rotation.
//!
//! A correspondence `(p1, p2)` is an inlier of `M` when the re-projection of
//! `M·p1` onto the image plane `z = f` lies strictly within the threshold of
//! `p2`. Distances are in ray-plane units, which equal pixels.

use crate::camera::Projector;
use crate::feature::{valid_pairs, Feature, FeatureMatch};
use crate::transform::Transform;
use crate::Vector3;

/// Planar distance between `M·p1` and `p2` after projecting both onto `z = f`.
///
/// `None` if either ray points away from the image plane.
pub fn reprojection_error(
    projector: &Projector,
    transform: &Transform,
    p1: &Vector3,
    p2: &Vector3,
) -> Option<f64> {
    let (x1, y1) = projector.to_plane(&transform.apply(p1))?;
    let (x2, y2) = projector.to_plane(p2)?;
    Some(((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt())
}

/// Indices into `f1` whose matched feature in `f2` agrees with `transform`.
///
/// Unmatched features are never counted. The result is in ascending order and
/// its length is the inlier count.
pub fn count_inliers(
    f1: &[Feature],
    f2: &[Feature],
    matches: &[FeatureMatch],
    projector: &Projector,
    transform: &Transform,
    threshold: f64,
) -> Vec<usize> {
    valid_pairs(f1, f2, matches)
        .filter(|&(i, j)| {
            let p1 = projector.feature_ray(&f1[i]);
            let p2 = projector.feature_ray(&f2[j]);
            is_inlier(projector, transform, &p1, &p2, threshold)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Same as [`count_inliers`] over pre-projected ray pairs; returns positions in
/// the ray slices.
pub(crate) fn ray_inliers(
    rays1: &[Vector3],
    rays2: &[Vector3],
    projector: &Projector,
    transform: &Transform,
    threshold: f64,
) -> Vec<usize> {
    rays1
        .iter()
        .zip(rays2)
        .enumerate()
        .filter(|(_, (p1, p2))| is_inlier(projector, transform, p1, p2, threshold))
        .map(|(k, _)| k)
        .collect()
}

fn is_inlier(
    projector: &Projector,
    transform: &Transform,
    p1: &Vector3,
    p2: &Vector3,
    threshold: f64,
) -> bool {
    reprojection_error(projector, transform, p1, p2).is_some_and(|d| d < threshold)
}
