//! AR Ruler
//!
//! Spatial measurement engine for augmented-reality tape measures. Points
//! are placed on tracked surfaces under a screen-center crosshair, bound to
//! world anchors, and joined into measurements whose distances are
//! corrected by a user-calibrated scale. Every frame the engine re-projects
//! its anchors into screen-space draw commands for the host renderer.
//!
//! The AR runtime is abstracted behind [`session::TrackingFrame`] and
//! [`session::ArSession`]; [`session::MockSession`] and
//! [`session::MockFrame`] stand in for it in tests and scenario replay.

pub mod core;
pub mod session;
pub mod algorithms;
pub mod processing;
pub mod measurement;
pub mod api;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{Pose, ScreenPoint, Viewport};
pub use session::{ArSession, HitResult, HitTarget, TrackingFrame, TrackingState};
pub use algorithms::{distance, CameraMatrices, Projector};
pub use processing::{Anchor, AnchorStore, HitProbe};
pub use measurement::{
    CalibrationSession, CalibrationStep, Measurement, MeasurementEngine, MeasurementHistory,
    MeasurementId, ReferenceObject, RenderCommand,
};
pub use api::{
    CommandOutcome, ConfirmOutcome, EngineCommand, EngineStatus, UnitFormatter, UnitSystem,
};
pub use utils::{ConfigurationManager, EngineConfig};
pub use validation::{EngineError, EngineResult};
