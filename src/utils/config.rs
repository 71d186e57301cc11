use crate::api::formatting::UnitSystem;
use crate::core::{DEFAULT_FAR_PLANE_M, DEFAULT_NEAR_PLANE_M};
use crate::measurement::calibration::{PlausibleRange, ScaleBounds};
use crate::measurement::render::{OverlayStyle, OverlayTheme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Engine-wide tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Near clip plane passed to the frame's projection matrix (meters)
    pub near_plane_m: f64,
    /// Far clip plane passed to the frame's projection matrix (meters)
    pub far_plane_m: f64,
    /// Clamp bounds for the calibration scale
    pub scale_bounds: ScaleBounds,
    /// Raw calibration distances accepted for the default reference object
    pub plausible_reference_range_m: PlausibleRange,
    /// Unit system shown when the engine starts
    pub default_unit_system: UnitSystem,
    /// Overlay colors and sizes
    pub overlay: OverlayTheme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            near_plane_m: DEFAULT_NEAR_PLANE_M,
            far_plane_m: DEFAULT_FAR_PLANE_M,
            scale_bounds: ScaleBounds::default(),
            plausible_reference_range_m: PlausibleRange::default(),
            default_unit_system: UnitSystem::default(),
            overlay: OverlayTheme::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    #[error("config I/O: {message}")]
    Io { message: String },
    #[error("config format: {message}")]
    Serialization { message: String },
}

impl ConfigError {
    fn invalid(parameter: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}

/// Holds the active configuration and its backing file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: EngineConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the whole configuration after validation
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        validate(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("failed to read '{}': {}", path_str, e),
        })?;

        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
                message: format!("failed to parse '{}': {}", path_str, e),
            })?;

        let validation = validate(&config);
        for warning in &validation.warnings {
            log::warn!("{}: {}", path_str, warning);
        }
        validation.into_result()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        log::debug!("configuration loaded");
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Serialization {
                message: format!("failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file last loaded or saved
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::Io {
                message: "no file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Whether configuration changed since the last load or save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    // Runtime parameter adjustment

    /// Set both clip planes; returns the previous `(near, far)`
    pub fn set_clip_planes(&mut self, near_m: f64, far_m: f64) -> Result<(f64, f64), ConfigError> {
        check_clip_planes(near_m, far_m)?;
        let old = (self.config.near_plane_m, self.config.far_plane_m);
        self.config.near_plane_m = near_m;
        self.config.far_plane_m = far_m;
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_plausible_range(&mut self, range: PlausibleRange) -> Result<PlausibleRange, ConfigError> {
        check_plausible_range(&range)?;
        let old = std::mem::replace(&mut self.config.plausible_reference_range_m, range);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_scale_bounds(&mut self, bounds: ScaleBounds) -> Result<ScaleBounds, ConfigError> {
        check_scale_bounds(&bounds)?;
        let old = std::mem::replace(&mut self.config.scale_bounds, bounds);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_default_unit_system(&mut self, unit: UnitSystem) -> UnitSystem {
        let old = std::mem::replace(&mut self.config.default_unit_system, unit);
        self.is_modified = true;
        old
    }
}

fn check_clip_planes(near_m: f64, far_m: f64) -> Result<(), ConfigError> {
    if !(near_m.is_finite() && near_m > 0.0) {
        return Err(ConfigError::invalid("near_plane_m", near_m, "must be positive"));
    }
    if !(far_m.is_finite() && far_m > near_m) {
        return Err(ConfigError::invalid("far_plane_m", far_m, "must be greater than the near plane"));
    }
    Ok(())
}

fn check_scale_bounds(bounds: &ScaleBounds) -> Result<(), ConfigError> {
    if !(bounds.min.is_finite() && bounds.min > 0.0 && bounds.min <= 1.0) {
        return Err(ConfigError::invalid("scale_bounds.min", bounds.min, "must be in (0, 1]"));
    }
    if !(bounds.max.is_finite() && bounds.max >= 1.0) {
        return Err(ConfigError::invalid("scale_bounds.max", bounds.max, "must be at least 1"));
    }
    Ok(())
}

fn check_plausible_range(range: &PlausibleRange) -> Result<(), ConfigError> {
    if !(range.min_m.is_finite() && range.min_m > 0.0) {
        return Err(ConfigError::invalid("plausible_reference_range_m.min_m", range.min_m, "must be positive"));
    }
    if !(range.max_m.is_finite() && range.max_m > range.min_m) {
        return Err(ConfigError::invalid(
            "plausible_reference_range_m.max_m",
            range.max_m,
            "must be greater than the minimum",
        ));
    }
    Ok(())
}

fn check_style(name: &str, style: &OverlayStyle, errors: &mut Vec<ConfigError>) {
    if !(style.line_width_px.is_finite() && style.line_width_px > 0.0) {
        errors.push(ConfigError::invalid(
            &format!("overlay.{}.line_width_px", name),
            style.line_width_px,
            "must be positive",
        ));
    }
    if !(style.point_radius_px.is_finite() && style.point_radius_px > 0.0) {
        errors.push(ConfigError::invalid(
            &format!("overlay.{}.point_radius_px", name),
            style.point_radius_px,
            "must be positive",
        ));
    }
}

/// Validate a configuration, collecting every error and warning
pub fn validate(config: &EngineConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if let Err(e) = check_clip_planes(config.near_plane_m, config.far_plane_m) {
        result.errors.push(e);
    } else if config.near_plane_m > 0.5 {
        result
            .warnings
            .push("near plane beyond 0.5 m hides close-range measurements".to_string());
    }

    if let Err(e) = check_scale_bounds(&config.scale_bounds) {
        result.errors.push(e);
    }

    if let Err(e) = check_plausible_range(&config.plausible_reference_range_m) {
        result.errors.push(e);
    } else if config.plausible_reference_range_m.max_m / config.plausible_reference_range_m.min_m > 10.0 {
        result
            .warnings
            .push("very wide plausible range accepts grossly wrong calibrations".to_string());
    }

    check_style("history", &config.overlay.history, &mut result.errors);
    check_style("active", &config.overlay.active, &mut result.errors);
    check_style("calibration", &config.overlay.calibration, &mut result.errors);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.near_plane_m, 0.1);
        assert_eq!(config.far_plane_m, 100.0);
        let result = validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_manager_creation() {
        let manager = ConfigurationManager::new();
        assert_eq!(manager.config(), &EngineConfig::default());
        assert!(!manager.is_modified());
    }

    #[test]
    fn test_invalid_config_collects_all_errors() {
        let mut config = EngineConfig::default();
        config.near_plane_m = 5.0;
        config.far_plane_m = 1.0;
        config.scale_bounds = ScaleBounds::new(1.1, 1.3);
        config.plausible_reference_range_m = PlausibleRange::new(0.2, 0.1);
        config.overlay.active.point_radius_px = 0.0;

        let result = validate(&config);
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn test_setters_validate_and_return_old_value() {
        let mut manager = ConfigurationManager::new();

        assert_eq!(manager.set_clip_planes(0.05, 50.0), Ok((0.1, 100.0)));
        assert!(manager.is_modified());
        assert!(matches!(
            manager.set_clip_planes(0.0, 50.0),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert!(manager.set_clip_planes(1.0, 1.0).is_err());
        assert_eq!(manager.config().near_plane_m, 0.05);

        let old = manager.set_scale_bounds(ScaleBounds::new(0.8, 1.2)).unwrap();
        assert_eq!(old, ScaleBounds::default());
        assert!(manager.set_scale_bounds(ScaleBounds::new(0.8, 0.9)).is_err());

        let old = manager.set_plausible_range(PlausibleRange::new(0.2, 0.4)).unwrap();
        assert_eq!(old, PlausibleRange::default());
        assert!(manager.set_plausible_range(PlausibleRange::new(-0.1, 0.4)).is_err());

        assert_eq!(manager.set_default_unit_system(UnitSystem::Imperial), UnitSystem::Metric);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ruler.json");

        let mut manager = ConfigurationManager::new();
        manager.set_clip_planes(0.05, 20.0).unwrap();
        manager.set_default_unit_system(UnitSystem::Imperial);
        manager.save_to_file(&path).unwrap();
        assert!(!manager.is_modified());

        let loaded = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(loaded.config(), manager.config());
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "default_unit_system": "imperial" }"#).unwrap();

        let manager = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(manager.config().default_unit_system, UnitSystem::Imperial);
        assert_eq!(manager.config().far_plane_m, 100.0);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "near_plane_m": -1.0 }"#).unwrap();

        let mut manager = ConfigurationManager::new();
        assert!(matches!(
            manager.load_from_file(&path),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert_eq!(manager.config(), &EngineConfig::default());

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            manager.load_from_file(&path),
            Err(ConfigError::Serialization { .. })
        ));
        assert!(matches!(
            manager.load_from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut manager = ConfigurationManager::new();
        assert!(matches!(manager.save(), Err(ConfigError::Io { .. })));
    }
}
