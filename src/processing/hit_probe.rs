//! Surface probing at the crosshair

use crate::core::{ScreenPoint, Viewport};
use crate::session::{HitResult, HitTarget, TrackingFrame, TrackingState};

/// Validated hit-test against the tracked scene
pub struct HitProbe;

impl HitProbe {
    /// First measurable hit under `point`, or `None`.
    ///
    /// Nothing is measurable while tracking is degraded or lost; the probe
    /// recovers on its own once the session reports `Tracking` again.
    pub fn probe<F: TrackingFrame + ?Sized>(frame: &F, point: ScreenPoint) -> Option<HitResult> {
        if frame.tracking_state() != TrackingState::Tracking {
            log::trace!("probe skipped: tracking state {:?}", frame.tracking_state());
            return None;
        }

        frame
            .hit_test(point.x, point.y)
            .into_iter()
            .find(Self::is_measurable)
    }

    /// Probe the exact viewport center, where the crosshair is drawn
    pub fn probe_center<F: TrackingFrame + ?Sized>(frame: &F, viewport: Viewport) -> Option<HitResult> {
        if viewport.is_empty() {
            return None;
        }
        Self::probe(frame, viewport.center())
    }

    /// Planes count only inside their observed polygon; feature points only
    /// when their orientation comes from a surface normal.
    pub fn is_measurable(hit: &HitResult) -> bool {
        match hit.target {
            HitTarget::Plane { within_polygon } => within_polygon,
            HitTarget::FeaturePoint { has_surface_normal } => has_surface_normal,
            HitTarget::Other => false,
        }
    }
}
