//! Camera orientations.
//!
//! A [`Transform`] is a 3×3 rotation. For an image of the mosaic it maps
//! directions expressed in the mosaic frame into that image's camera frame.
//! For a pairwise alignment it maps rays of the first image onto rays of the
//! second (`M · p1 ≈ p2`), which is the same thing when the first image is the
//! mosaic reference.
//!
//! The matrix is private: values are only produced by the Procrustes solver,
//! from a `Rotation3`, or through a checked constructor, so orthogonality holds
//! by construction.

use nalgebra::Rotation3;

use crate::{Matrix3, Vector3};

/// Proper rotation (orthogonal, determinant +1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Matrix3,
}

impl Transform {
    /// The identity orientation (mosaic reference image).
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Wrap a rotation.
    pub fn from_rotation(rotation: &Rotation3<f64>) -> Self {
        Self {
            m: *rotation.matrix(),
        }
    }

    /// Accept `m` only if it is a proper rotation to within `tol`
    /// (max-abs deviation of `mᵀm` from identity and of `det m` from 1).
    pub fn try_from_matrix(m: Matrix3, tol: f64) -> Option<Self> {
        let t = Self { m };
        t.is_rotation(tol).then_some(t)
    }

    /// Solver output; the caller guarantees orthogonality.
    pub(crate) fn from_matrix_unchecked(m: Matrix3) -> Self {
        Self { m }
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &Matrix3 {
        &self.m
    }

    /// Rotate a vector.
    pub fn apply(&self, v: &Vector3) -> Vector3 {
        self.m * v
    }

    /// Inverse rotation (the transpose).
    pub fn inverse(&self) -> Self {
        Self {
            m: self.m.transpose(),
        }
    }

    /// `other` applied after `self`: `(self.then(other)).apply(v) == other.apply(self.apply(v))`.
    pub fn then(&self, other: &Transform) -> Self {
        Self { m: other.m * self.m }
    }

    /// `true` if the matrix is a proper rotation to within `tol`.
    pub fn is_rotation(&self, tol: f64) -> bool {
        let ortho = (self.m.transpose() * self.m - Matrix3::identity()).amax();
        ortho <= tol && (self.m.determinant() - 1.0).abs() <= tol
    }

    /// Rotation angle (radians) of `self⁻¹ · other`, i.e. the angular distance
    /// between two orientations.
    pub fn angle_to(&self, other: &Transform) -> f64 {
        let r = self.m.transpose() * other.m;
        ((r.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
