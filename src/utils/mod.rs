//! Configuration and logging

pub mod config;
pub mod logger;

pub use config::{validate, ConfigError, ConfigurationManager, EngineConfig, ValidationResult};
