//! Geometric primitives shared by every overlay

pub mod projector;
pub mod distance;

pub use projector::{CameraMatrices, Projector};
pub use distance::distance;
