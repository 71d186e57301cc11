//! Measurement state: calibration, history, the controller and its overlay

pub mod calibration;
pub mod engine;
pub mod history;
pub mod render;

pub use calibration::{
    CalibrationOutcome, CalibrationSession, CalibrationStep, PlausibleRange, ReferenceObject,
    ScaleBounds,
};
pub use engine::MeasurementEngine;
pub use history::{Measurement, MeasurementHistory, MeasurementId, MeasurementRecord};
pub use render::{Color, OverlayStyle, OverlayTheme, RenderCommand};
