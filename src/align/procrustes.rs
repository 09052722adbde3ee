//! Least-squares rotation between two sets of corresponding rays.
//!
//! Solves the orthogonal Procrustes (Wahba) problem: find the rotation `M`
//! minimizing `Σ |M·p1 − p2|²`. With the cross-covariance `A = Σ p1 ⊗ p2`
//! decomposed as `A = U·S·Vᵀ`, the optimum is `M = V·D·Uᵀ` where
//! `D = diag(1, 1, sign det(V·Uᵀ))` keeps `M` a proper rotation. The correction
//! matters for the two-point minimal sample, whose `A` has rank 2 and leaves
//! the sign of the third singular pair free.

use tracing::debug;

use crate::camera::Projector;
use crate::feature::{Feature, FeatureMatch};
use crate::transform::Transform;
use crate::{Matrix3, Vector3};

/// Fit the rotation mapping `f1[i]` onto `f2[matches[i]]` over the given inliers.
///
/// `inliers` are indices into `f1`; entries that are unmatched or out of range
/// are skipped. Returns `None` ("no estimate") when nothing remains to fit.
pub fn least_squares_fit(
    f1: &[Feature],
    f2: &[Feature],
    matches: &[FeatureMatch],
    projector: &Projector,
    inliers: &[usize],
) -> Option<Transform> {
    let mut rays1 = Vec::with_capacity(inliers.len());
    let mut rays2 = Vec::with_capacity(inliers.len());
    for &i in inliers {
        let Some(j) = matches.get(i).and_then(|m| m.target) else {
            continue;
        };
        let (Some(a), Some(b)) = (f1.get(i), f2.get(j)) else {
            continue;
        };
        rays1.push(projector.feature_ray(a));
        rays2.push(projector.feature_ray(b));
    }
    fit_rays(&rays1, &rays2)
}

/// Fit the rotation mapping each `rays1[k]` onto `rays2[k]`.
///
/// Returns `None` for empty input or if the SVD does not converge.
pub(crate) fn fit_rays(rays1: &[Vector3], rays2: &[Vector3]) -> Option<Transform> {
    if rays1.is_empty() || rays2.is_empty() {
        return None;
    }

    let mut a = Matrix3::zeros();
    for (p1, p2) in rays1.iter().zip(rays2) {
        a += p1 * p2.transpose();
    }

    let svd = a.try_svd(true, true, f64::EPSILON, 0)?;
    let u = svd.u?;
    let v = svd.v_t?.transpose();

    let mut m = v * u.transpose();
    if m.determinant() < 0.0 {
        debug!("Procrustes: correcting reflection");
        let d = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        m = v * d * u.transpose();
    }
    Some(Transform::from_matrix_unchecked(m))
}

/// `true` if two rays are too close to parallel to constrain a rotation together.
pub(crate) fn nearly_parallel(a: &Vector3, b: &Vector3) -> bool {
    let denom = a.norm() * b.norm();
    denom <= f64::EPSILON || a.cross(b).norm() / denom < 1e-9
}
