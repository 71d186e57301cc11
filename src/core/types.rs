//! Core data types for the measurement engine

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// World-space pose of an anchor or hit, in meters.
///
/// Only `position` takes part in measurement; orientation is carried so
/// that anchors can be recreated faithfully by the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self { position, orientation }
    }

    /// Pose at `(x, y, z)` with identity orientation
    pub fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Translation component as a vector
    pub fn translation(&self) -> Vector3<f64> {
        self.position.coords
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(0.0, 0.0, 0.0)
    }
}

/// Pixel coordinate on the render surface (origin top-left, Y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }
}

/// Current render surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center of the surface, where the crosshair sits
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width as f64 * 0.5, self.height as f64 * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
