//! Crate-level error type

use crate::session::SessionError;
use crate::utils::config::ConfigError;
use std::path::PathBuf;

/// Errors surfaced to callers of the engine and its tooling.
///
/// Transient per-frame conditions (no hit, no frame yet, a point that
/// cannot be projected) are not errors and never appear here.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Calibration reference length must be finite and positive
    #[error("invalid reference length {0} m: must be finite and positive")]
    InvalidReferenceLength(f64),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read scenario '{path}': {source}")]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    ScenarioFormat(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
