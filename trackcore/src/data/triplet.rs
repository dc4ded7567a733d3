use serde::{Deserialize, Serialize};

use crate::geometry::cylindrical::CylindricalCoords;

/// Break angles of a three-hit candidate, in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakAngles {
    /// 3-D angle between the two consecutive segment directions.
    pub theta: f64,
    /// Angle between the two segment directions projected on the (z, r) plane.
    pub phi: f64,
}

/// One accepted, labeled triplet. Field order is the column order of the output table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripletResult {
    pub r1: f64,
    pub phi1: f64,
    pub z1: f64,
    pub r2: f64,
    pub phi2: f64,
    pub z2: f64,
    pub r3: f64,
    pub phi3: f64,
    pub z3: f64,
    pub theta_break: f64,
    pub phi_break: f64,
    pub label: u8,
}

impl TripletResult {
    pub fn new(coords: [CylindricalCoords; 3], angles: BreakAngles, label: u8) -> Self {
        let [c1, c2, c3] = coords;
        TripletResult {
            r1: c1.r,
            phi1: c1.phi,
            z1: c1.z,
            r2: c2.r,
            phi2: c2.phi,
            z2: c2.z,
            r3: c3.r,
            phi3: c3.phi,
            z3: c3.z,
            theta_break: angles.theta,
            phi_break: angles.phi,
            label,
        }
    }

    pub fn is_genuine(&self) -> bool {
        self.label == 1
    }
}
