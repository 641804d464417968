//! Three-component vectors as they appear in tool messages

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// An `(x, y, z)` triple used for locations, rotations, scales and colors
///
/// Displays in tuple form with every component in its shortest round-trip
/// float form, e.g. `(1.0, 2.5, -3.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector3(pub [f64; 3]);

impl Vector3 {
    pub const ZERO: Self = Self([0.0, 0.0, 0.0]);
    pub const ONE: Self = Self([1.0, 1.0, 1.0]);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    pub fn x(self) -> f64 {
        self.0[0]
    }

    pub fn y(self) -> f64 {
        self.0[1]
    }

    pub fn z(self) -> f64 {
        self.0[2]
    }

    /// Largest component
    pub fn max_element(self) -> f64 {
        self.0.into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn to_dvec3(self) -> DVec3 {
        DVec3::from_array(self.0)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(value: [f64; 3]) -> Self {
        Self(value)
    }
}

impl From<Vector3> for DVec3 {
    fn from(value: Vector3) -> Self {
        value.to_dvec3()
    }
}

impl std::fmt::Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?}, {:?})", self.0[0], self.0[1], self.0[2])
    }
}
