//! Radial lens distortion: r_distorted = r × (1 + k1·r² + k2·r⁴).
//!
//! Coordinates are normalized tangent-plane coordinates (pixel offset from the
//! optical center divided by the focal length), so the coefficients do not
//! depend on image resolution.

/// Radial distortion with two coefficients.
///
/// The forward model maps ideal normalized radius `r` to distorted radius:
///
/// ```text
/// r_d = r × (1 + k1·r² + k2·r⁴)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialDistortion {
    /// First radial coefficient (barrel < 0, pincushion > 0).
    pub k1: f64,
    /// Second radial coefficient.
    pub k2: f64,
}

impl RadialDistortion {
    /// Create a new radial distortion model with the given coefficients.
    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    /// Forward distortion: ideal → distorted.
    ///
    /// Given ideal (pinhole) normalized coordinates `(x, y)`, returns the
    /// coordinates where the lens actually images that direction.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        if self.is_zero() {
            return (x, y);
        }
        let r2 = x * x + y * y;
        let scale = 1.0 + self.k1 * r2 + self.k2 * r2 * r2;
        (x * scale, y * scale)
    }

    /// Returns `true` if all coefficients are zero (no distortion).
    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0
    }
}
