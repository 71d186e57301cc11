//! Euclidean distance between poses

use crate::core::Pose;

/// Straight-line distance between two poses' positions (meters)
pub fn distance(a: &Pose, b: &Pose) -> f64 {
    nalgebra::distance(&a.position, &b.position)
}
