//! Geospatial primitives for CivicPulse.
//!
//! This crate provides:
//! - [`GeoPoint`], the validated latitude/longitude value type
//! - Coordinate domain checks ([`is_valid_coordinate`])
//! - Haversine distance rounded for display and comparison ([`distance_km`])
//! - GeoJSON point decoding for stored issue locations
//! - Rectangular [`Viewport`] filtering for map views
//!
//! # Example
//!
//! ```
//! use civicpulse_geo::{distance_km, GeoPoint};
//!
//! let caller = GeoPoint::try_new(18.5204, 73.8567).unwrap();
//! let issue = GeoPoint::try_new(18.5205, 73.8568).unwrap();
//!
//! assert!(distance_km(&caller, &issue) <= 0.02);
//! ```

mod error;
mod geojson;
mod haversine;
mod viewport;

pub use error::{GeoError, Result};
pub use geojson::GeoJsonPoint;
pub use haversine::{distance_km, haversine_distance, round_km, EARTH_RADIUS_KM};
pub use viewport::Viewport;

use serde::{Deserialize, Serialize};

/// Latitude bounds in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude bounds in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Returns true iff both values are finite and inside the WGS84 degree domain.
#[inline]
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude)
        && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude)
}

/// A geographic point in degrees.
///
/// Used for user home locations, issue locations and the ad-hoc location a
/// caller sends with each request. Values are never mutated in place; build a
/// new point instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point without checking the domain.
    ///
    /// Prefer [`GeoPoint::try_new`] for anything that came from outside the
    /// process.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a point, rejecting non-finite or out-of-range values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        if is_valid_coordinate(latitude, longitude) {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(GeoError::InvalidCoordinate { latitude, longitude })
        }
    }

    /// Returns true if the point has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }

    /// Great-circle distance to `other`, rounded to two decimals.
    #[inline]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_km(self, other)
    }

    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl TryFrom<(f64, f64)> for GeoPoint {
    type Error = GeoError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self> {
        Self::try_new(lat, lng)
    }
}
