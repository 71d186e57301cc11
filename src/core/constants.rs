//! Physical constants and engine defaults

/// Length of one inch in meters (exact by definition)
pub const METERS_PER_INCH: f64 = 0.0254;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Default near clip plane handed to the tracking frame (meters)
pub const DEFAULT_NEAR_PLANE_M: f64 = 0.1;

/// Default far clip plane handed to the tracking frame (meters)
pub const DEFAULT_FAR_PLANE_M: f64 = 100.0;

/// Lower clamp for the calibration scale
pub const MIN_CALIBRATION_SCALE: f64 = 0.7;

/// Upper clamp for the calibration scale
pub const MAX_CALIBRATION_SCALE: f64 = 1.3;

/// Shortest raw reference distance accepted during calibration (meters)
pub const MIN_PLAUSIBLE_REFERENCE_M: f64 = 0.06;

/// Longest raw reference distance accepted during calibration (meters)
pub const MAX_PLAUSIBLE_REFERENCE_M: f64 = 0.15;

/// Diagonal of an ISO/IEC 7810 ID-1 card (85.60 mm x 53.98 mm)
pub const BANK_CARD_DIAGONAL_M: f64 = 0.1012;

/// Clip-space `w` magnitudes below this are treated as zero
pub const CLIP_W_EPSILON: f64 = 1e-9;
