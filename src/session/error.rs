//! Session error types

use crate::session::AnchorId;

/// Failures reported across the tracking session boundary
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The camera is not tracking, so no anchor can be placed
    #[error("camera is not tracking")]
    NotTracking,
    /// The session refuses to hold more anchors
    #[error("anchor limit of {limit} reached")]
    AnchorLimitReached { limit: usize },
    /// The anchor was never created or has already been detached
    #[error("unknown {0}")]
    UnknownAnchor(AnchorId),
    /// Anything else the underlying AR runtime reports
    #[error("session backend error: {0}")]
    Backend(String),
}

impl SessionError {
    /// Whether retrying on a later frame may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::NotTracking | SessionError::Backend(_))
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
