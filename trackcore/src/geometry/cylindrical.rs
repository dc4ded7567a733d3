use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Unit used to report the azimuth of a cylindrical coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

/// Cylindrical representation of a hit position.
///
/// # Fields
///
/// * `r` - radial distance from the beam axis, always `>= 0`
/// * `phi` - azimuth in `[0, 2π)`, or `[0, 360)` when built with [`AngleUnit::Degrees`]
/// * `z` - height along the beam axis, passed through from the Cartesian position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylindricalCoords {
    pub r: f64,
    pub phi: f64,
    pub z: f64,
}

impl CylindricalCoords {
    pub fn new(r: f64, phi: f64, z: f64) -> Self {
        CylindricalCoords { r, phi, z }
    }

    /// Inverse transform, valid for coordinates whose azimuth is in radians.
    ///
    /// # Example
    ///
    /// ```
    /// use trackcore::geometry::cylindrical::to_cylindrical;
    ///
    /// let c = to_cylindrical(3.0, -4.0, 1.5);
    /// let (x, y, z) = c.to_cartesian();
    /// assert!((x - 3.0).abs() < 1e-12);
    /// assert!((y + 4.0).abs() < 1e-12);
    /// assert_eq!(z, 1.5);
    /// ```
    pub fn to_cartesian(&self) -> (f64, f64, f64) {
        (self.r * self.phi.cos(), self.r * self.phi.sin(), self.z)
    }
}

/// Convert a Cartesian position to cylindrical coordinates with the azimuth in radians.
///
/// The azimuth is normalized into `[0, 2π)`; the singular point `x = y = 0` maps to `phi = 0`.
pub fn to_cylindrical(x: f64, y: f64, z: f64) -> CylindricalCoords {
    to_cylindrical_with(x, y, z, AngleUnit::Radians)
}

/// Convert a Cartesian position to cylindrical coordinates in the requested azimuth unit.
///
/// Degrees are obtained by scaling the already normalized radian value, so the
/// degree range is `[0, 360)`.
pub fn to_cylindrical_with(x: f64, y: f64, z: f64, unit: AngleUnit) -> CylindricalCoords {
    let r = (x * x + y * y).sqrt();

    let mut phi = y.atan2(x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    // -tiny + 2π rounds up to exactly 2π
    if phi >= 2.0 * PI {
        phi = 0.0;
    }

    if unit == AngleUnit::Degrees {
        phi = phi * 180.0 / PI;
    }

    CylindricalCoords::new(r, phi, z)
}
