//! Two-hit consistency pre-filter.
//!
//! A duplet is accepted when its azimuth-over-radius slope stays bounded and its
//! straight-line extrapolation to the `x = 0` reference plane lands close to the
//! interaction region.

use serde::{Deserialize, Serialize};

use crate::data::hit::ProjectedHit;

/// `z0` reported by [`origin_z0`] for two hits sharing the same Cartesian `x`.
/// [`DupletFilter::evaluate`] rejects such pairs as [`DupletVerdict::DegenerateX`]
/// whatever the origin window.
pub const DEGENERATE_Z0: f64 = 1000.0;

/// Outcome of testing one hit pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DupletVerdict {
    Accepted,
    /// Both hits have exactly the same `x`, the origin extrapolation is undefined.
    DegenerateX,
    /// `|Δφ / Δr|` above the bound, or not a number.
    SlopeTooSteep,
    /// `|z0|` above the bound.
    OriginTooFar,
}

impl DupletVerdict {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, DupletVerdict::Accepted)
    }
}

/// Duplet filter configuration. Both bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DupletFilter {
    pub max_abs_z0: f64,
    pub max_abs_slope: f64,
}

impl Default for DupletFilter {
    fn default() -> Self {
        Self {
            max_abs_z0: 100.0,
            max_abs_slope: 6.0e4,
        }
    }
}

impl DupletFilter {
    pub fn new(max_abs_z0: f64, max_abs_slope: f64) -> Self {
        DupletFilter { max_abs_z0, max_abs_slope }
    }

    /// Decide on the pair `(a, b)`, with `a` on the inner layer.
    pub fn evaluate(&self, a: &ProjectedHit, b: &ProjectedHit) -> DupletVerdict {
        if a.hit.x == b.hit.x {
            return DupletVerdict::DegenerateX;
        }
        let z0 = origin_z0(a, b);

        // NaN compares false and lands here too
        if !(azimuth_slope(a, b).abs() <= self.max_abs_slope) {
            return DupletVerdict::SlopeTooSteep;
        }

        if !(z0.abs() <= self.max_abs_z0) {
            return DupletVerdict::OriginTooFar;
        }

        DupletVerdict::Accepted
    }

    #[inline]
    pub fn passes(&self, a: &ProjectedHit, b: &ProjectedHit) -> bool {
        self.evaluate(a, b).is_accepted()
    }
}

/// Linear extrapolation of `z` to the `x = 0` plane through both hits,
/// [`DEGENERATE_Z0`] when the hits share the same `x`.
pub fn origin_z0(a: &ProjectedHit, b: &ProjectedHit) -> f64 {
    let dx = b.hit.x - a.hit.x;
    if dx == 0.0 {
        return DEGENERATE_Z0;
    }
    a.coords.z - a.hit.x * (b.coords.z - a.coords.z) / dx
}

/// `(φ_b − φ_a) / (r_b − r_a)`; infinite or NaN when the radii coincide.
pub fn azimuth_slope(a: &ProjectedHit, b: &ProjectedHit) -> f64 {
    (b.coords.phi - a.coords.phi) / (b.coords.r - a.coords.r)
}
