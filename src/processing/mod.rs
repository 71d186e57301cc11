//! Per-frame probing and anchor bookkeeping

pub mod hit_probe;
pub mod anchors;

pub use hit_probe::HitProbe;
pub use anchors::{Anchor, AnchorStore};
