//! UI-facing surface of the engine
//!
//! Display formatting plus the command, outcome and status types a host
//! UI exchanges with [`MeasurementEngine`](crate::MeasurementEngine).

pub mod formatting;
pub mod types;

pub use crate::measurement::calibration::CalibrationStep;
pub use formatting::{UnitFormatter, UnitSystem};
pub use types::{CommandOutcome, ConfirmOutcome, EngineCommand, EngineStatus, IgnoreReason};
