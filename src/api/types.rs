//! UI-facing command, outcome and status types

use crate::api::formatting::UnitSystem;
use crate::measurement::calibration::{CalibrationStep, ReferenceObject};
use crate::measurement::history::MeasurementId;
use serde::{Deserialize, Serialize};

/// User inputs routed through [`MeasurementEngine::handle`](crate::MeasurementEngine::handle)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    Confirm,
    Reset,
    ToggleUnits,
    StartCalibration { known_reference_m: f64 },
    /// Calibrate against a reference object with its own plausible range
    StartReferenceCalibration { reference: ReferenceObject },
    CancelCalibration,
    UndoLast,
}

/// Why a confirm did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No tracking frame has arrived yet
    NoFrame,
    /// Nothing measurable under the crosshair
    NoValidHit,
    /// The session refused to create an anchor
    AnchorCreationFailed,
}

/// Result of a confirm action, for host feedback (haptics, sounds, toasts)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    MeasurementStarted,
    MeasurementCompleted { id: MeasurementId, raw_distance_m: f64 },
    CalibrationPointPlaced,
    CalibrationAccepted { scale: f64, raw_distance_m: f64 },
    CalibrationRejected { raw_distance_m: Option<f64> },
    Ignored { reason: IgnoreReason },
}

impl ConfirmOutcome {
    pub fn ignored(reason: IgnoreReason) -> Self {
        ConfirmOutcome::Ignored { reason }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, ConfirmOutcome::Ignored { .. })
    }
}

/// Result of a dispatched [`EngineCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Confirm(ConfirmOutcome),
    Reset { released_anchors: usize },
    UnitsToggled { unit_system: UnitSystem },
    CalibrationStarted,
    CalibrationCancelled { was_active: bool },
    Undone { id: Option<MeasurementId> },
}

/// Snapshot of everything the UI chrome displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub unit_system: UnitSystem,
    pub calibration_step: CalibrationStep,
    /// Drives crosshair styling
    pub hit_valid: bool,
    pub scale: f64,
    pub measurement_count: usize,
    /// Formatted distance of the newest measurement
    pub last_measurement: Option<String>,
}
