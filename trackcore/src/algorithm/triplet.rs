//! Three-hit angular consistency filter.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::data::hit::ProjectedHit;
use crate::data::triplet::BreakAngles;
use crate::geometry::vector::{angle2, angle3};

/// Outcome of testing one hit triple.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TripletVerdict {
    Accepted(BreakAngles),
    /// One of the two segments has zero length, no direction is defined.
    Degenerate,
    ThetaTooLarge(BreakAngles),
    PhiTooLarge(BreakAngles),
}

impl TripletVerdict {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, TripletVerdict::Accepted(_))
    }

    pub fn angles(&self) -> Option<BreakAngles> {
        match *self {
            TripletVerdict::Accepted(a) | TripletVerdict::ThetaTooLarge(a) | TripletVerdict::PhiTooLarge(a) => Some(a),
            TripletVerdict::Degenerate => None,
        }
    }
}

/// Triplet filter configuration, tolerances in radians. Both bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripletFilter {
    pub max_theta_break: f64,
    pub max_phi_break: f64,
}

impl Default for TripletFilter {
    fn default() -> Self {
        Self {
            max_theta_break: 0.05,
            max_phi_break: 0.05,
        }
    }
}

impl TripletFilter {
    pub fn new(max_theta_break: f64, max_phi_break: f64) -> Self {
        TripletFilter { max_theta_break, max_phi_break }
    }

    /// Decide on the triple `(h1, h2, h3)` ordered from the inner to the outer layer.
    pub fn evaluate(&self, h1: &ProjectedHit, h2: &ProjectedHit, h3: &ProjectedHit) -> TripletVerdict {
        let angles = match break_angles(h1, h2, h3) {
            Some(angles) => angles,
            None => return TripletVerdict::Degenerate,
        };
        self.judge(angles)
    }

    /// Apply the tolerances to already computed angles.
    pub fn judge(&self, angles: BreakAngles) -> TripletVerdict {
        if angles.theta > self.max_theta_break {
            return TripletVerdict::ThetaTooLarge(angles);
        }
        if angles.phi > self.max_phi_break {
            return TripletVerdict::PhiTooLarge(angles);
        }
        TripletVerdict::Accepted(angles)
    }
}

/// Break angles between the segments `h1 → h2` and `h2 → h3`.
///
/// `theta` is measured between the Cartesian displacement vectors, `phi` between
/// the `(Δz, Δr)` vectors of the same segments. `None` if a segment has zero
/// length in either space.
pub fn break_angles(h1: &ProjectedHit, h2: &ProjectedHit, h3: &ProjectedHit) -> Option<BreakAngles> {
    let v12 = h2.hit.position() - h1.hit.position();
    let v23 = h3.hit.position() - h2.hit.position();
    let theta = angle3(&v12, &v23)?;

    let f12 = Vector2::new(h2.coords.z - h1.coords.z, h2.coords.r - h1.coords.r);
    let f23 = Vector2::new(h3.coords.z - h2.coords.z, h3.coords.r - h2.coords.r);
    let phi = angle2(&f12, &f23)?;

    Some(BreakAngles { theta, phi })
}
