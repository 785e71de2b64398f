//! # Core Configuration
//!
//! All tuning values for the lifecycle manager and the fuzzy map live here.
//!
//! ## Usage
//! ```rust
//! use gh_core::config::CoreConfig;
//!
//! let config = CoreConfig::default();
//! let demo = CoreConfig::quick();
//! assert!(demo.lifecycle.resolution_delay_ms < config.lifecycle.resolution_delay_ms);
//! ```
//!
//! A file can be supplied through `GH_CONFIG_PATH`; `.yaml`/`.yml` files are
//! read as YAML, everything else as JSON. Missing fields fall back to defaults.

mod lifecycle_config;
mod proximity_config;

pub use lifecycle_config::{LifecycleConfig, MAX_DELAY_MS};
pub use proximity_config::{ProximityConfig, COUNT_LIMIT};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};
use tracing::{debug, info};

pub const CONFIG_PATH_ENV: &str = "GH_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
}

impl CoreConfig {
    /// Production timings (default)
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Short delays for demos and manual testing
    pub fn quick() -> Self {
        let mut cfg = Self::default();
        cfg.lifecycle.resolution_delay_ms = 500;
        cfg.lifecycle.retry_delay_ms = 250;
        cfg
    }

    /// No jitter, single search attempt
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.lifecycle.max_search_attempts = 1;
        cfg.proximity.radius_jitter = 0.0;
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lifecycle.validate().map_err(ConfigError::Invalid)?;
        self.proximity.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let cfg = if is_yaml { Self::from_yaml(&content)? } else { Self::from_json(&content)? };
        info!(path = %path.display(), "Loaded config");
        Ok(cfg)
    }

    /// Load from `GH_CONFIG_PATH` when set and non-empty, else defaults.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        Self::from_optional_path(env::var(CONFIG_PATH_ENV).ok().as_deref())
    }

    pub(crate) fn from_optional_path(path: Option<&str>) -> Result<Self, ConfigError> {
        match path.map(str::trim) {
            Some(p) if !p.is_empty() => Self::from_path(p),
            _ => {
                debug!("{CONFIG_PATH_ENV} not set, using default config");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.lifecycle.resolution_delay_ms, 5000);
        assert_eq!(cfg.proximity.default_count, 15);
        assert!((cfg.proximity.default_role_ratio - 0.3).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(CoreConfig::realistic().validate().is_ok());
        assert!(CoreConfig::quick().validate().is_ok());
        assert!(CoreConfig::deterministic().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = CoreConfig::from_json(r#"{"lifecycle": {"resolution_delay_ms": 100}}"#).unwrap();
        assert_eq!(cfg.lifecycle.resolution_delay_ms, 100);
        assert_eq!(cfg.lifecycle.max_search_attempts, 3);
        assert_eq!(cfg.proximity.default_count, 15);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        let result = CoreConfig::from_json(r#"{"proximity": {"min_radius": 0.0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_yaml_file_loading() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "proximity:\n  default_count: 8\n  max_radius: 90.0").unwrap();

        let cfg = CoreConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.proximity.default_count, 8);
        assert_eq!(cfg.proximity.max_radius, 90.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = CoreConfig::from_optional_path(Some("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_blank_path_means_default() {
        let cfg = CoreConfig::from_optional_path(Some("   ")).unwrap();
        assert_eq!(cfg.lifecycle.resolution_delay_ms, 5000);
        assert!(CoreConfig::from_optional_path(None).is_ok());
    }
}
