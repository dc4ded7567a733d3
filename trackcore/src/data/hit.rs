use std::fmt;
use std::fmt::{Display, Formatter};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::geometry::cylindrical::{to_cylindrical, CylindricalCoords};

/// Particle id carried by hits that are not associated with any particle.
pub const NOISE_PARTICLE_ID: i64 = 0;

/// A single recorded detector hit.
///
/// # Fields
///
/// * `hit_id` - identifier of the hit within its event
/// * `x`, `y`, `z` - Cartesian position
/// * `volume_id`, `layer_id`, `module_id` - location on the detector geometry
/// * `particle_id` - truth particle, [`NOISE_PARTICLE_ID`] for noise
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub hit_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub volume_id: i32,
    pub layer_id: i32,
    pub module_id: i32,
    pub particle_id: i64,
}

impl Hit {
    pub fn new(
        hit_id: i32,
        x: f64,
        y: f64,
        z: f64,
        volume_id: i32,
        layer_id: i32,
        module_id: i32,
        particle_id: i64,
    ) -> Self {
        Hit { hit_id, x, y, z, volume_id, layer_id, module_id, particle_id }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn cylindrical(&self) -> CylindricalCoords {
        to_cylindrical(self.x, self.y, self.z)
    }

    pub fn is_noise(&self) -> bool {
        self.particle_id == NOISE_PARTICLE_ID
    }
}

impl Display for Hit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hit(id: {}, pos: ({}, {}, {}), volume: {}, layer: {}, module: {}, particle: {})",
            self.hit_id, self.x, self.y, self.z, self.volume_id, self.layer_id, self.module_id, self.particle_id
        )
    }
}

/// A hit paired with its cylindrical coordinates, computed once when the hit
/// enters an enumeration stage.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedHit<'a> {
    pub hit: &'a Hit,
    pub coords: CylindricalCoords,
}

impl<'a> ProjectedHit<'a> {
    pub fn new(hit: &'a Hit) -> Self {
        ProjectedHit { hit, coords: hit.cylindrical() }
    }
}
