//! Traits implemented by the AR runtime binding

use crate::core::Pose;
use crate::session::{AnchorId, HitResult, SessionResult, TrackingState};
use nalgebra::Matrix4;

/// One tick's snapshot of the tracked camera
pub trait TrackingFrame {
    /// Current camera tracking quality
    fn tracking_state(&self) -> TrackingState;

    /// Camera projection matrix for the given clip planes (meters)
    fn projection_matrix(&self, near: f64, far: f64) -> Matrix4<f64>;

    /// World-to-camera view matrix
    fn view_matrix(&self) -> Matrix4<f64>;

    /// Intersect the ray through pixel `(x, y)` with tracked geometry.
    /// Results are sorted nearest first.
    fn hit_test(&self, x: f64, y: f64) -> Vec<HitResult>;
}

/// Anchor management surface of the AR session
pub trait ArSession {
    /// Bind a persistent anchor at the hit location
    fn create_anchor(&mut self, hit: &HitResult) -> SessionResult<AnchorId>;

    /// Detach an anchor and free its session resources
    fn detach_anchor(&mut self, id: AnchorId) -> SessionResult<()>;

    /// Current world pose of a live anchor. The session may refine it
    /// between frames, so callers must not cache the result.
    fn anchor_pose(&self, id: AnchorId) -> SessionResult<Pose>;
}
