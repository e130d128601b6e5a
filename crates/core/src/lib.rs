//! Core utilities shared by the CivicPulse crates
//!
//! - **Error handling**: error codes, context, recovery suggestions and
//!   serializable reports
//! - **Configuration**: TOML-based configuration with environment overrides
//!   and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use civicpulse_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("max radius: {} km", config.schema.geo.max_search_radius_km);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, GeoConfig, LoggingConfig};
    pub use crate::error::{Error, ErrorCode, ErrorReport, Result, ResultExt};
}
