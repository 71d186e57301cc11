//! In-memory session and frame for testing and scenario replay

use crate::core::Pose;
use crate::session::{
    AnchorId, ArSession, HitResult, SessionError, SessionResult, TrackingFrame, TrackingState,
};
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};
use std::collections::BTreeMap;

/// Mock AR session holding anchors in a table
#[derive(Debug, Default)]
pub struct MockSession {
    anchors: BTreeMap<AnchorId, Pose>,
    next_id: u64,
    detached: Vec<AnchorId>,
    anchor_limit: Option<usize>,
    failures_pending: usize,
}

impl MockSession {
    /// Create a new mock session with no anchor limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse anchor creation once `limit` anchors are live
    pub fn with_anchor_limit(mut self, limit: usize) -> Self {
        self.anchor_limit = Some(limit);
        self
    }

    /// Fail the next `count` anchor creations with a backend error
    pub fn fail_next_anchor_creations(&mut self, count: usize) {
        self.failures_pending = count;
    }

    /// Simulate the tracker refining an anchor's pose.
    /// Returns false if the anchor is not live.
    pub fn set_anchor_pose(&mut self, id: AnchorId, pose: Pose) -> bool {
        match self.anchors.get_mut(&id) {
            Some(slot) => {
                *slot = pose;
                true
            }
            None => false,
        }
    }

    /// Number of anchors currently attached
    pub fn live_anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the anchor is still attached
    pub fn is_live(&self, id: AnchorId) -> bool {
        self.anchors.contains_key(&id)
    }

    /// Anchors detached so far, in detach order
    pub fn detached(&self) -> &[AnchorId] {
        &self.detached
    }

    /// Total anchors ever created
    pub fn created_count(&self) -> u64 {
        self.next_id
    }
}

impl ArSession for MockSession {
    fn create_anchor(&mut self, hit: &HitResult) -> SessionResult<AnchorId> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(SessionError::Backend("simulated anchor failure".to_string()));
        }

        if let Some(limit) = self.anchor_limit {
            if self.anchors.len() >= limit {
                return Err(SessionError::AnchorLimitReached { limit });
            }
        }

        self.next_id += 1;
        let id = AnchorId(self.next_id);
        self.anchors.insert(id, hit.pose);
        Ok(id)
    }

    fn detach_anchor(&mut self, id: AnchorId) -> SessionResult<()> {
        match self.anchors.remove(&id) {
            Some(_) => {
                self.detached.push(id);
                Ok(())
            }
            None => Err(SessionError::UnknownAnchor(id)),
        }
    }

    fn anchor_pose(&self, id: AnchorId) -> SessionResult<Pose> {
        self.anchors
            .get(&id)
            .copied()
            .ok_or(SessionError::UnknownAnchor(id))
    }
}

/// Mock tracking frame: a perspective camera plus scripted hit results
#[derive(Debug, Clone)]
pub struct MockFrame {
    tracking_state: TrackingState,
    view: Matrix4<f64>,
    fov_y_rad: f64,
    aspect: f64,
    hits: Vec<HitResult>,
}

impl MockFrame {
    /// Frame with an explicit view matrix
    pub fn new(view: Matrix4<f64>, fov_y_rad: f64, aspect: f64) -> Self {
        Self {
            tracking_state: TrackingState::Tracking,
            view,
            fov_y_rad,
            aspect,
            hits: Vec::new(),
        }
    }

    /// Camera at `eye` looking towards `target`
    pub fn looking_at(eye: Point3<f64>, target: Point3<f64>, fov_y_deg: f64, aspect: f64) -> Self {
        let forward = target - eye;
        // look_at degenerates when the up vector is parallel to the view direction
        let up = if forward.normalize().cross(&Vector3::y()).norm() < 1e-6 {
            -Vector3::z()
        } else {
            Vector3::y()
        };
        let view = Isometry3::look_at_rh(&eye, &target, &up).to_homogeneous();
        Self::new(view, fov_y_deg.to_radians(), aspect)
    }

    pub fn with_tracking_state(mut self, state: TrackingState) -> Self {
        self.tracking_state = state;
        self
    }

    pub fn with_hit(mut self, hit: HitResult) -> Self {
        self.hits.push(hit);
        self
    }

    pub fn with_hits(mut self, hits: Vec<HitResult>) -> Self {
        self.hits.extend(hits);
        self
    }
}

impl TrackingFrame for MockFrame {
    fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    fn projection_matrix(&self, near: f64, far: f64) -> Matrix4<f64> {
        Perspective3::new(self.aspect, self.fov_y_rad, near, far).to_homogeneous()
    }

    fn view_matrix(&self) -> Matrix4<f64> {
        self.view
    }

    fn hit_test(&self, _x: f64, _y: f64) -> Vec<HitResult> {
        let mut hits = self.hits.clone();
        hits.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_session_creation() {
        let session = MockSession::new();
        assert_eq!(session.live_anchor_count(), 0);
        assert_eq!(session.created_count(), 0);
    }

    #[test]
    fn test_anchor_lifecycle() {
        let mut session = MockSession::new();
        let hit = HitResult::plane(Pose::from_position(1.0, 0.0, -2.0), true);

        let id = session.create_anchor(&hit).unwrap();
        assert!(session.is_live(id));
        assert_eq!(session.anchor_pose(id).unwrap(), hit.pose);

        session.detach_anchor(id).unwrap();
        assert!(!session.is_live(id));
        assert_eq!(session.detached(), &[id]);
        assert_eq!(session.anchor_pose(id), Err(SessionError::UnknownAnchor(id)));
        assert_eq!(session.detach_anchor(id), Err(SessionError::UnknownAnchor(id)));
    }

    #[test]
    fn test_anchor_refinement() {
        let mut session = MockSession::new();
        let id = session
            .create_anchor(&HitResult::plane(Pose::from_position(0.0, 0.0, -1.0), true))
            .unwrap();

        let refined = Pose::from_position(0.0, 0.01, -1.0);
        assert!(session.set_anchor_pose(id, refined));
        assert_eq!(session.anchor_pose(id).unwrap(), refined);
        assert!(!session.set_anchor_pose(AnchorId(99), refined));
    }

    #[test]
    fn test_failure_injection_and_limit() {
        let mut session = MockSession::new().with_anchor_limit(1);
        let hit = HitResult::plane(Pose::default(), true);

        session.fail_next_anchor_creations(1);
        assert!(matches!(session.create_anchor(&hit), Err(SessionError::Backend(_))));

        assert!(session.create_anchor(&hit).is_ok());
        assert_eq!(
            session.create_anchor(&hit),
            Err(SessionError::AnchorLimitReached { limit: 1 })
        );
    }

    #[test]
    fn test_hits_sorted_by_distance() {
        let far = HitResult::plane(Pose::from_position(0.0, 0.0, -3.0), true).with_distance(3.0);
        let near = HitResult::plane(Pose::from_position(0.0, 0.0, -1.0), true).with_distance(1.0);
        let frame = MockFrame::looking_at(Point3::origin(), Point3::new(0.0, 0.0, -1.0), 60.0, 1.0)
            .with_hits(vec![far, near]);

        let hits = frame.hit_test(0.0, 0.0);
        assert_eq!(hits, vec![near, far]);
    }

    #[test]
    fn test_straight_down_camera_is_finite() {
        let frame = MockFrame::looking_at(
            Point3::new(0.0, 1.5, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            60.0,
            0.5,
        );
        assert!(frame.view_matrix().iter().all(|v| v.is_finite()));
    }
}
