//! Tracking session abstraction
//!
//! The AR tracking session is an external collaborator: it supplies one
//! `TrackingFrame` per camera tick and owns the anchors the engine asks it
//! to create. The engine only ever borrows it for the duration of a call.

pub mod interface;
pub mod mock;
pub mod error;
pub mod scenario;

pub use interface::{ArSession, TrackingFrame};
pub use mock::{MockFrame, MockSession};
pub use error::{SessionError, SessionResult};
pub use scenario::{Scenario, ScenarioStep, StepReport};

use crate::core::Pose;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Camera tracking quality reported with each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// Full six-degree-of-freedom tracking
    #[default]
    Tracking,
    /// Tracking degraded (fast motion, low light, few features)
    Limited,
    /// Tracking lost or session paused
    Lost,
}

/// What a hit-test ray intersected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitTarget {
    /// A detected plane; `within_polygon` is true when the hit lies inside
    /// the plane's observed boundary polygon.
    Plane { within_polygon: bool },
    /// A tracked feature point; `has_surface_normal` is true when the
    /// session could estimate its orientation from a surface normal.
    FeaturePoint { has_surface_normal: bool },
    /// Depth points, instant-placement points and anything else
    Other,
}

/// Single hit-test intersection, as reported by the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    pub pose: Pose,
    /// Distance from the camera to the hit (meters)
    pub distance_m: f64,
    pub target: HitTarget,
}

impl HitResult {
    pub fn new(pose: Pose, distance_m: f64, target: HitTarget) -> Self {
        Self { pose, distance_m, target }
    }

    pub fn plane(pose: Pose, within_polygon: bool) -> Self {
        Self::new(pose, 0.0, HitTarget::Plane { within_polygon })
    }

    pub fn feature_point(pose: Pose, has_surface_normal: bool) -> Self {
        Self::new(pose, 0.0, HitTarget::FeaturePoint { has_surface_normal })
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = distance_m;
        self
    }
}

/// Session-issued identifier for a world anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}
