//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub geo: GeoConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.geo.validate()
    }
}

/// Search radius limits applied to every issue read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Hard ceiling on how far from the caller an issue may be and still be
    /// visible, in kilometers
    #[serde(default = "default_max_search_radius_km")]
    pub max_search_radius_km: f64,

    /// Radius used when the caller does not ask for one
    #[serde(default = "default_search_radius_km")]
    pub default_search_radius_km: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            max_search_radius_km: default_max_search_radius_km(),
            default_search_radius_km: default_search_radius_km(),
        }
    }
}

impl GeoConfig {
    /// Build a config whose default radius equals the maximum.
    pub fn with_max_radius(max_search_radius_km: f64) -> Self {
        Self {
            max_search_radius_km,
            default_search_radius_km: max_search_radius_km,
        }
    }

    /// Check both radii are positive and the default does not exceed the maximum.
    pub fn validate(&self) -> Result<()> {
        if !self.max_search_radius_km.is_finite() || self.max_search_radius_km <= 0.0 {
            return Err(Error::config_validation(format!(
                "max_search_radius_km must be a positive number, got {}",
                self.max_search_radius_km
            )));
        }
        if !self.default_search_radius_km.is_finite() || self.default_search_radius_km <= 0.0 {
            return Err(Error::config_validation(format!(
                "default_search_radius_km must be a positive number, got {}",
                self.default_search_radius_km
            )));
        }
        if self.default_search_radius_km > self.max_search_radius_km {
            return Err(Error::config_validation(format!(
                "default_search_radius_km ({}) exceeds max_search_radius_km ({})",
                self.default_search_radius_km, self.max_search_radius_km
            ))
            .with_suggestion("Lower the default radius or raise the maximum"));
        }
        Ok(())
    }
}

fn default_max_search_radius_km() -> f64 {
    5.0
}

fn default_search_radius_km() -> f64 {
    5.0
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.geo.max_search_radius_km, 5.0);
        assert_eq!(schema.geo.default_search_radius_km, 5.0);
        assert_eq!(schema.logging.level, "info");
        assert!(!schema.logging.json);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let schema: ConfigSchema =
            toml::from_str("[geo]\ndefault_search_radius_km = 2.5\n").unwrap();
        assert_eq!(schema.geo.max_search_radius_km, 5.0);
        assert_eq!(schema.geo.default_search_radius_km, 2.5);
    }

    #[test]
    fn test_default_above_max_rejected() {
        let geo = GeoConfig {
            max_search_radius_km: 5.0,
            default_search_radius_km: 8.0,
        };
        let err = geo.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        assert!(GeoConfig::with_max_radius(0.0).validate().is_err());
        assert!(GeoConfig::with_max_radius(-1.0).validate().is_err());
        assert!(GeoConfig::with_max_radius(f64::NAN).validate().is_err());
        assert!(GeoConfig::with_max_radius(10.0).validate().is_ok());
    }
}
