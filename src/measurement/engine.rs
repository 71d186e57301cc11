//! Top-level measurement controller
//!
//! The engine owns every piece of mutable measurement state: the anchor
//! bookkeeping, the pending first point, calibration and history. Host
//! callbacks (frame ticks, button presses, resize) all funnel into it.
//!
//! Per tick the host calls [`MeasurementEngine::update_frame`] with the
//! newest tracking frame and then [`MeasurementEngine::renderables`] to
//! get the overlay. Confirm actions are applied against the most recent
//! frame; before the first frame arrives they are ignored.

use crate::algorithms::{distance, CameraMatrices, Projector};
use crate::api::formatting::{UnitFormatter, UnitSystem};
use crate::api::types::{CommandOutcome, ConfirmOutcome, EngineCommand, EngineStatus, IgnoreReason};
use crate::core::{Pose, ScreenPoint, Viewport};
use crate::measurement::calibration::{CalibrationOutcome, CalibrationSession, CalibrationStep, ReferenceObject};
use crate::measurement::history::{MeasurementHistory, MeasurementId, MeasurementRecord};
use crate::measurement::render::{push_segment, RenderCommand};
use crate::processing::{Anchor, AnchorStore, HitProbe};
use crate::session::{ArSession, HitResult, TrackingFrame, TrackingState};
use crate::utils::config::{validate, EngineConfig};
use crate::validation::EngineResult;

/// What the engine keeps from the latest tracking frame
#[derive(Debug, Clone, Copy)]
struct FrameSnapshot {
    tracking_state: TrackingState,
    matrices: CameraMatrices,
    /// Valid hit under the crosshair, if any
    hit: Option<HitResult>,
}

/// AR ruler controller
#[derive(Debug)]
pub struct MeasurementEngine {
    config: EngineConfig,
    anchors: AnchorStore,
    calibration: CalibrationSession,
    history: MeasurementHistory,
    /// First endpoint of the measurement in progress
    pending_first: Option<Anchor>,
    unit_system: UnitSystem,
    frame: Option<FrameSnapshot>,
}

impl MeasurementEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let validation = validate(&config);
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error.into());
        }
        for warning in &validation.warnings {
            log::warn!("config: {}", warning);
        }
        Ok(Self::from_config(config))
    }

    fn from_config(config: EngineConfig) -> Self {
        Self {
            anchors: AnchorStore::new(),
            calibration: CalibrationSession::new(config.scale_bounds, config.plausible_reference_range_m),
            history: MeasurementHistory::new(),
            pending_first: None,
            unit_system: config.default_unit_system,
            frame: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Take in the newest tracking frame and re-probe the crosshair.
    /// Returns whether a measurable surface is under it.
    pub fn update_frame<F: TrackingFrame + ?Sized>(&mut self, frame: &F, viewport: Viewport) -> bool {
        let tracking_state = frame.tracking_state();
        let matrices = CameraMatrices::from_frame(frame, self.config.near_plane_m, self.config.far_plane_m);
        let hit = HitProbe::probe_center(frame, viewport);

        if let Some(previous) = &self.frame {
            if previous.tracking_state != tracking_state {
                log::debug!("tracking state {:?} -> {:?}", previous.tracking_state, tracking_state);
            }
        }
        log::trace!("frame: hit_valid={}", hit.is_some());

        self.frame = Some(FrameSnapshot {
            tracking_state,
            matrices,
            hit,
        });
        hit.is_some()
    }

    /// Place a point at the crosshair.
    ///
    /// Routed to calibration while it is running, otherwise starts or
    /// completes a measurement. Missing frames, missing hits and anchor
    /// failures are no-ops reported through [`ConfirmOutcome::Ignored`].
    pub fn confirm<S: ArSession + ?Sized>(&mut self, session: &mut S) -> ConfirmOutcome {
        let hit = match &self.frame {
            None => return ConfirmOutcome::ignored(IgnoreReason::NoFrame),
            Some(FrameSnapshot { hit: None, .. }) => {
                log::debug!("confirm ignored: no valid hit");
                return ConfirmOutcome::ignored(IgnoreReason::NoValidHit);
            }
            Some(FrameSnapshot { hit: Some(hit), .. }) => *hit,
        };

        let anchor = match self.anchors.create(session, &hit) {
            Ok(anchor) => anchor,
            Err(e) if e.is_transient() => {
                log::debug!("confirm ignored: anchor creation failed: {}", e);
                return ConfirmOutcome::ignored(IgnoreReason::AnchorCreationFailed);
            }
            Err(e) => {
                log::warn!("confirm ignored: anchor creation failed: {}", e);
                return ConfirmOutcome::ignored(IgnoreReason::AnchorCreationFailed);
            }
        };

        if self.calibration.is_active() {
            return match self.calibration.confirm_point(anchor, &mut self.anchors, session) {
                CalibrationOutcome::FirstPointPlaced => ConfirmOutcome::CalibrationPointPlaced,
                CalibrationOutcome::Accepted { scale, raw_distance_m } => {
                    ConfirmOutcome::CalibrationAccepted { scale, raw_distance_m }
                }
                CalibrationOutcome::Rejected { raw_distance_m } => {
                    ConfirmOutcome::CalibrationRejected { raw_distance_m }
                }
                // guarded by is_active above
                CalibrationOutcome::NotActive => ConfirmOutcome::ignored(IgnoreReason::NoValidHit),
            };
        }

        match self.pending_first.take() {
            None => {
                log::debug!("measurement started at {}", anchor.id());
                self.pending_first = Some(anchor);
                ConfirmOutcome::MeasurementStarted
            }
            Some(first) => self.complete_measurement(first, anchor, session),
        }
    }

    fn complete_measurement<S: ArSession + ?Sized>(
        &mut self,
        first: Anchor,
        second: Anchor,
        session: &mut S,
    ) -> ConfirmOutcome {
        let poses = (
            self.anchors.pose(&*session, &first),
            self.anchors.pose(&*session, &second),
        );

        match poses {
            (Some(a), Some(b)) => {
                let raw_distance_m = distance(&a, &b);
                let id = self.history.push(first, second, raw_distance_m);
                log::info!(
                    "measurement {} completed: raw {:.4} m, shown {}",
                    id,
                    raw_distance_m,
                    UnitFormatter::format(raw_distance_m * self.scale(), self.unit_system)
                );
                ConfirmOutcome::MeasurementCompleted { id, raw_distance_m }
            }
            _ => {
                // The stale first point is dropped and the new point starts over.
                log::warn!("endpoint pose unavailable, restarting measurement at {}", second.id());
                self.anchors.release(session, first);
                self.pending_first = Some(second);
                ConfirmOutcome::MeasurementStarted
            }
        }
    }

    /// Release every anchor the engine owns, clear history and cancel
    /// calibration. The calibration scale is kept. Returns the number of
    /// anchors released.
    pub fn reset<S: ArSession + ?Sized>(&mut self, session: &mut S) -> usize {
        let before = self.anchors.released_count();

        if let Some(first) = self.pending_first.take() {
            self.anchors.release(session, first);
        }
        let cleared = self.history.clear(&mut self.anchors, session);
        self.calibration.cancel(&mut self.anchors, session);

        let released = (self.anchors.released_count() - before) as usize;
        log::info!("reset: {} measurements cleared, {} anchors released", cleared, released);
        released
    }

    /// Flip between metric and imperial display
    pub fn toggle_units(&mut self) -> UnitSystem {
        self.unit_system = self.unit_system.toggled();
        log::debug!("units: {:?}", self.unit_system);
        self.unit_system
    }

    pub fn set_unit_system(&mut self, unit: UnitSystem) {
        self.unit_system = unit;
    }

    /// Start calibrating against a reference of `known_reference_m`, using
    /// the configured plausible range. Any measurement in progress is
    /// dropped.
    pub fn start_calibration<S: ArSession + ?Sized>(
        &mut self,
        known_reference_m: f64,
        session: &mut S,
    ) -> EngineResult<()> {
        self.calibration.start(known_reference_m, &mut self.anchors, session)?;
        self.drop_pending(session);
        Ok(())
    }

    /// Start calibrating against a reference object
    pub fn start_calibration_with<S: ArSession + ?Sized>(
        &mut self,
        reference: ReferenceObject,
        session: &mut S,
    ) -> EngineResult<()> {
        self.calibration.start_with(reference, &mut self.anchors, session)?;
        self.drop_pending(session);
        Ok(())
    }

    pub fn cancel_calibration<S: ArSession + ?Sized>(&mut self, session: &mut S) -> bool {
        self.calibration.cancel(&mut self.anchors, session)
    }

    /// Remove the newest measurement and release its anchors
    pub fn undo_last<S: ArSession + ?Sized>(&mut self, session: &mut S) -> Option<MeasurementId> {
        let id = self.history.remove_last(&mut self.anchors, session);
        if let Some(id) = id {
            log::info!("measurement {} removed", id);
        }
        id
    }

    /// Reapply a persisted calibration scale; returns the scale in effect
    pub fn restore_scale(&mut self, scale: f64) -> f64 {
        self.calibration.restore_scale(scale)
    }

    fn drop_pending<S: ArSession + ?Sized>(&mut self, session: &mut S) {
        if let Some(first) = self.pending_first.take() {
            log::debug!("pending measurement at {} dropped", first.id());
            self.anchors.release(session, first);
        }
    }

    /// Dispatch a UI command
    pub fn handle<S: ArSession + ?Sized>(
        &mut self,
        command: EngineCommand,
        session: &mut S,
    ) -> EngineResult<CommandOutcome> {
        let outcome = match command {
            EngineCommand::Confirm => CommandOutcome::Confirm(self.confirm(session)),
            EngineCommand::Reset => CommandOutcome::Reset {
                released_anchors: self.reset(session),
            },
            EngineCommand::ToggleUnits => CommandOutcome::UnitsToggled {
                unit_system: self.toggle_units(),
            },
            EngineCommand::StartCalibration { known_reference_m } => {
                self.start_calibration(known_reference_m, session)?;
                CommandOutcome::CalibrationStarted
            }
            EngineCommand::StartReferenceCalibration { reference } => {
                self.start_calibration_with(reference, session)?;
                CommandOutcome::CalibrationStarted
            }
            EngineCommand::CancelCalibration => CommandOutcome::CalibrationCancelled {
                was_active: self.cancel_calibration(session),
            },
            EngineCommand::UndoLast => CommandOutcome::Undone {
                id: self.undo_last(session),
            },
        };
        Ok(outcome)
    }

    /// Overlay for the latest frame, in `viewport` pixels.
    ///
    /// History first, then the measurement in progress with its live
    /// preview to the crosshair, then a pending calibration point. Anything
    /// that does not project this frame is left out.
    pub fn renderables<S: ArSession + ?Sized>(&self, session: &S, viewport: Viewport) -> Vec<RenderCommand> {
        let mut out = Vec::new();
        let snapshot = match &self.frame {
            Some(snapshot) => snapshot,
            None => return out,
        };
        let theme = &self.config.overlay;
        let scale = self.scale();

        for measurement in self.history.iter() {
            let start = self.project_anchor(session, snapshot, measurement.start(), viewport);
            let end = self.project_anchor(session, snapshot, measurement.end(), viewport);
            if let (Some(start), Some(end)) = (start, end) {
                push_segment(
                    &mut out,
                    start,
                    end,
                    measurement.label(scale, self.unit_system),
                    &theme.history,
                );
            } else {
                log::trace!("measurement {} not visible", measurement.id());
            }
        }

        if let Some(first) = &self.pending_first {
            if let Some(first_pose) = self.anchors.pose(session, first) {
                if let Some(first_px) = project(snapshot, &first_pose, viewport) {
                    out.push(RenderCommand::point(first_px, &theme.active));

                    let preview = snapshot
                        .hit
                        .and_then(|hit| project(snapshot, &hit.pose, viewport).map(|px| (hit, px)));
                    if let Some((hit, hit_px)) = preview {
                        let live = distance(&first_pose, &hit.pose) * scale;
                        out.push(RenderCommand::line(first_px, hit_px, &theme.active));
                        out.push(RenderCommand::point(hit_px, &theme.active));
                        out.push(RenderCommand::label(
                            first_px.midpoint(&hit_px),
                            UnitFormatter::format(live, self.unit_system),
                            &theme.active,
                        ));
                    }
                }
            }
        }

        if let Some(pending) = self.calibration.pending_anchor() {
            if let Some(px) = self.project_anchor(session, snapshot, pending, viewport) {
                out.push(RenderCommand::point(px, &theme.calibration));
            }
        }

        out
    }

    fn project_anchor<S: ArSession + ?Sized>(
        &self,
        session: &S,
        snapshot: &FrameSnapshot,
        anchor: &Anchor,
        viewport: Viewport,
    ) -> Option<ScreenPoint> {
        let pose = self.anchors.pose(session, anchor)?;
        project(snapshot, &pose, viewport)
    }

    /// UI chrome state
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            unit_system: self.unit_system,
            calibration_step: self.calibration_step(),
            hit_valid: self.hit_valid(),
            scale: self.scale(),
            measurement_count: self.history.len(),
            last_measurement: self.last_measurement_label(),
        }
    }

    pub fn hit_valid(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.hit.is_some())
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn scale(&self) -> f64 {
        self.calibration.scale()
    }

    pub fn calibration_step(&self) -> CalibrationStep {
        self.calibration.step()
    }

    pub fn history(&self) -> &MeasurementHistory {
        &self.history
    }

    /// Whether a first endpoint is waiting for its partner
    pub fn has_pending_point(&self) -> bool {
        self.pending_first.is_some()
    }

    pub fn last_measurement_label(&self) -> Option<String> {
        self.history.last().map(|m| m.label(self.scale(), self.unit_system))
    }

    /// History in the current scale and units
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.history.records(self.scale(), self.unit_system)
    }

    pub fn live_anchor_count(&self) -> usize {
        self.anchors.live_count()
    }
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::from_config(EngineConfig::default())
    }
}

fn project(snapshot: &FrameSnapshot, pose: &Pose, viewport: Viewport) -> Option<ScreenPoint> {
    Projector::project(&snapshot.matrices, &pose.position, viewport)
}
