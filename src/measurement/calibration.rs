//! Two-point calibration against a known physical reference
//!
//! ```text
//! Inactive --start--> AwaitingFirstPoint --confirm--> AwaitingSecondPoint
//!    ^                                                     |
//!    +------------- confirm (accepted | rejected) ---------+
//!    +------------- cancel (from any active state) --------+
//! ```
//!
//! The candidate scale is `known / raw`, accepted only when the raw
//! distance between the two taps falls inside the reference object's
//! plausible range, and always clamped to the configured bounds.
//! Calibration anchors never outlive the step that created them.

use crate::algorithms::distance;
use crate::core::{
    BANK_CARD_DIAGONAL_M, MAX_CALIBRATION_SCALE, MAX_PLAUSIBLE_REFERENCE_M,
    MIN_CALIBRATION_SCALE, MIN_PLAUSIBLE_REFERENCE_M,
};
use crate::processing::{Anchor, AnchorStore};
use crate::session::ArSession;
use crate::validation::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Inclusive range of raw distances considered physically plausible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibleRange {
    pub min_m: f64,
    pub max_m: f64,
}

impl PlausibleRange {
    pub fn new(min_m: f64, max_m: f64) -> Self {
        Self { min_m, max_m }
    }

    /// Both ends are inside the range
    pub fn contains(&self, meters: f64) -> bool {
        meters >= self.min_m && meters <= self.max_m
    }
}

impl Default for PlausibleRange {
    fn default() -> Self {
        Self::new(MIN_PLAUSIBLE_REFERENCE_M, MAX_PLAUSIBLE_REFERENCE_M)
    }
}

/// Clamp bounds for the calibration scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::new(MIN_CALIBRATION_SCALE, MAX_CALIBRATION_SCALE)
    }
}

/// Physical object the user measures during calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    pub known_length_m: f64,
    pub plausible_range_m: PlausibleRange,
}

impl ReferenceObject {
    pub fn custom(known_length_m: f64, plausible_range_m: PlausibleRange) -> Self {
        Self { known_length_m, plausible_range_m }
    }

    /// Diagonal of a standard bank card
    pub fn bank_card_diagonal() -> Self {
        Self::custom(BANK_CARD_DIAGONAL_M, PlausibleRange::default())
    }

    fn validate(&self) -> EngineResult<()> {
        if !self.known_length_m.is_finite() || self.known_length_m <= 0.0 {
            return Err(EngineError::InvalidReferenceLength(self.known_length_m));
        }
        Ok(())
    }
}

/// Calibration progress shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStep {
    #[default]
    None,
    Step1,
    Step2,
}

/// Result of feeding a point into the calibration session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    /// First reference point stored, waiting for the second
    FirstPointPlaced,
    /// Scale updated
    Accepted { scale: f64, raw_distance_m: f64 },
    /// Raw distance implausible (or unreadable); scale unchanged
    Rejected { raw_distance_m: Option<f64> },
    /// Calibration was not running; the anchor was released
    NotActive,
}

#[derive(Debug)]
enum Phase {
    Inactive,
    AwaitingFirstPoint,
    AwaitingSecondPoint { first: Anchor },
}

/// Two-step calibration state machine
#[derive(Debug)]
pub struct CalibrationSession {
    phase: Phase,
    reference: ReferenceObject,
    default_range: PlausibleRange,
    bounds: ScaleBounds,
    scale: f64,
}

impl CalibrationSession {
    pub fn new(bounds: ScaleBounds, default_range: PlausibleRange) -> Self {
        Self {
            phase: Phase::Inactive,
            reference: ReferenceObject::custom(BANK_CARD_DIAGONAL_M, default_range),
            default_range,
            bounds,
            scale: bounds.clamp(1.0),
        }
    }

    /// Begin calibrating against `known_reference_m` using the default
    /// plausible range
    pub fn start<S: ArSession + ?Sized>(
        &mut self,
        known_reference_m: f64,
        anchors: &mut AnchorStore,
        session: &mut S,
    ) -> EngineResult<()> {
        let reference = ReferenceObject::custom(known_reference_m, self.default_range);
        self.start_with(reference, anchors, session)
    }

    /// Begin calibrating against a reference object. Restarting from any
    /// state drops the pending point.
    pub fn start_with<S: ArSession + ?Sized>(
        &mut self,
        reference: ReferenceObject,
        anchors: &mut AnchorStore,
        session: &mut S,
    ) -> EngineResult<()> {
        reference.validate()?;

        self.release_pending(anchors, session);
        self.reference = reference;
        self.phase = Phase::AwaitingFirstPoint;
        log::info!(
            "calibration started: reference {:.4} m, plausible {:.3}..{:.3} m",
            reference.known_length_m,
            reference.plausible_range_m.min_m,
            reference.plausible_range_m.max_m
        );
        Ok(())
    }

    /// Feed a freshly created anchor into the protocol
    pub fn confirm_point<S: ArSession + ?Sized>(
        &mut self,
        anchor: Anchor,
        anchors: &mut AnchorStore,
        session: &mut S,
    ) -> CalibrationOutcome {
        match std::mem::replace(&mut self.phase, Phase::Inactive) {
            Phase::Inactive => {
                anchors.release(session, anchor);
                CalibrationOutcome::NotActive
            }
            Phase::AwaitingFirstPoint => {
                self.phase = Phase::AwaitingSecondPoint { first: anchor };
                CalibrationOutcome::FirstPointPlaced
            }
            Phase::AwaitingSecondPoint { first } => {
                let raw = match (anchors.pose(&*session, &first), anchors.pose(&*session, &anchor)) {
                    (Some(a), Some(b)) => Some(distance(&a, &b)),
                    _ => None,
                };

                anchors.release(session, first);
                anchors.release(session, anchor);

                match raw.and_then(|r| self.evaluate(r).map(|s| (r, s))) {
                    Some((raw_distance_m, scale)) => {
                        self.scale = scale;
                        log::info!(
                            "calibration accepted: raw {:.4} m, scale {:.5}",
                            raw_distance_m,
                            scale
                        );
                        CalibrationOutcome::Accepted { scale, raw_distance_m }
                    }
                    None => {
                        log::info!("calibration rejected: raw {:?} m, scale kept at {:.5}", raw, self.scale);
                        CalibrationOutcome::Rejected { raw_distance_m: raw }
                    }
                }
            }
        }
    }

    /// Abort calibration, releasing any pending point. Returns whether a
    /// calibration was running.
    pub fn cancel<S: ArSession + ?Sized>(&mut self, anchors: &mut AnchorStore, session: &mut S) -> bool {
        let was_active = self.is_active();
        self.release_pending(anchors, session);
        self.phase = Phase::Inactive;
        if was_active {
            log::info!("calibration cancelled");
        }
        was_active
    }

    /// Candidate scale for a raw measurement of the current reference, or
    /// `None` when the raw distance is implausible
    pub fn evaluate(&self, raw_distance_m: f64) -> Option<f64> {
        if !raw_distance_m.is_finite() || !self.reference.plausible_range_m.contains(raw_distance_m) {
            return None;
        }
        Some(self.bounds.clamp(self.reference.known_length_m / raw_distance_m))
    }

    /// Reapply a previously persisted scale, clamped to bounds
    pub fn restore_scale(&mut self, scale: f64) -> f64 {
        if scale.is_finite() {
            self.scale = self.bounds.clamp(scale);
        }
        self.scale
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn reference(&self) -> &ReferenceObject {
        &self.reference
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Inactive)
    }

    pub fn step(&self) -> CalibrationStep {
        match self.phase {
            Phase::Inactive => CalibrationStep::None,
            Phase::AwaitingFirstPoint => CalibrationStep::Step1,
            Phase::AwaitingSecondPoint { .. } => CalibrationStep::Step2,
        }
    }

    /// First reference point, while waiting for the second
    pub fn pending_anchor(&self) -> Option<&Anchor> {
        match &self.phase {
            Phase::AwaitingSecondPoint { first } => Some(first),
            _ => None,
        }
    }

    fn release_pending<S: ArSession + ?Sized>(&mut self, anchors: &mut AnchorStore, session: &mut S) {
        if let Phase::AwaitingSecondPoint { first } = std::mem::replace(&mut self.phase, Phase::Inactive) {
            anchors.release(session, first);
        }
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(ScaleBounds::default(), PlausibleRange::default())
    }
}
