//! Core types and constants for the measurement engine

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
