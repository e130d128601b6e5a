//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Latitude or longitude outside the degree domain, or not finite
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        /// Offending latitude
        latitude: f64,
        /// Offending longitude
        longitude: f64,
    },

    /// Value is not a GeoJSON point
    #[error("Invalid GeoJSON point: {0}")]
    InvalidGeoJson(String),

    /// Viewport corners are inverted in latitude
    #[error("Invalid viewport: south-west latitude {south} is above north-east latitude {north}")]
    InvalidViewport {
        /// South-west corner latitude
        south: f64,
        /// North-east corner latitude
        north: f64,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
