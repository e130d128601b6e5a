//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::env;
use std::path::Path;

/// Maximum search radius override, in kilometers
pub const ENV_MAX_RADIUS: &str = "CIVICPULSE_MAX_RADIUS_KM";
/// Default search radius override, in kilometers
pub const ENV_DEFAULT_RADIUS: &str = "CIVICPULSE_DEFAULT_RADIUS_KM";
/// Log level override
pub const ENV_LOG_LEVEL: &str = "CIVICPULSE_LOG_LEVEL";
/// JSON log output override
pub const ENV_LOG_JSON: &str = "CIVICPULSE_LOG_JSON";

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path (or the standard locations),
    /// apply environment overrides, and validate.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Same as [`Config::load`] but with an injected environment lookup.
    pub fn load_with_env<F>(path: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = path.map(String::from).or_else(find_config_file);

        let mut schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        apply_env_overrides(&mut schema, lookup)?;
        schema
            .validate()
            .context(config_path.as_deref().unwrap_or("built-in defaults"))?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        "civicpulse.toml",
        ".civicpulse.toml",
        ".config/civicpulse.toml",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    if !Path::new(path).exists() {
        return Err(Error::config_not_found(path));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::from(e).with_context(format!("Failed to read config file {}", path)))?;

    toml::from_str(&content)
        .map_err(|e| Error::from(e).with_context(format!("Failed to parse config file {}", path)))
}

fn apply_env_overrides<F>(schema: &mut ConfigSchema, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_MAX_RADIUS) {
        schema.geo.max_search_radius_km = parse_env_f64(ENV_MAX_RADIUS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_DEFAULT_RADIUS) {
        schema.geo.default_search_radius_km = parse_env_f64(ENV_DEFAULT_RADIUS, &raw)?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        schema.logging.level = level;
    }
    if let Some(raw) = lookup(ENV_LOG_JSON) {
        schema.logging.json = match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => return Err(Error::invalid_config_value(ENV_LOG_JSON, &raw)),
        };
    }
    Ok(())
}

fn parse_env_f64(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::invalid_config_value(key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.geo.max_search_radius_km, 5.0);
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[geo]
max_search_radius_km = 8.0
default_search_radius_km = 3.0

[logging]
json = true
"#,
        );
        let path = file.path().to_str().unwrap();

        let config = Config::load_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.schema.geo.max_search_radius_km, 8.0);
        assert_eq!(config.schema.geo.default_search_radius_km, 3.0);
        assert!(config.schema.logging.json);
        assert_eq!(config.path.as_deref(), Some(path));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load_with_env(Some("/nonexistent/civicpulse.toml"), no_env).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = write_config("[geo\nmax_search_radius_km = ");
        let err = Config::load_with_env(file.path().to_str(), no_env).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[geo]\nmax_search_radius_km = 8.0\n");
        let env: HashMap<&str, &str> = [
            (ENV_MAX_RADIUS, "4"),
            (ENV_DEFAULT_RADIUS, "2.5"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_JSON, "yes"),
        ]
        .into_iter()
        .collect();

        let config = Config::load_with_env(file.path().to_str(), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.schema.geo.max_search_radius_km, 4.0);
        assert_eq!(config.schema.geo.default_search_radius_km, 2.5);
        assert_eq!(config.schema.logging.level, "debug");
        assert!(config.schema.logging.json);
    }

    #[test]
    fn test_unparseable_env_override() {
        let file = write_config("");
        let err = Config::load_with_env(file.path().to_str(), |k| {
            (k == ENV_MAX_RADIUS).then(|| "five".to_string())
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_override_failing_validation() {
        let file = write_config("");
        let err = Config::load_with_env(file.path().to_str(), |k| {
            (k == ENV_DEFAULT_RADIUS).then(|| "12".to_string())
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }
}
