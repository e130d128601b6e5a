//! Raw request parameters.
//!
//! Query strings and bodies deliver `latitude`, `longitude` and `distance` as
//! text. This is the only place those strings become numbers.

use crate::error::{AccessError, Result};
use civicpulse_geo::{GeoPoint, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::{Deserialize, Serialize};

/// Location-bearing parameters of an issue request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationParams {
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    /// Requested search radius in kilometers
    #[serde(default)]
    pub distance: Option<String>,
}

impl LocationParams {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            distance: None,
        }
    }

    #[must_use]
    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = Some(distance.into());
        self
    }

    /// Parse and validate the coordinate pair.
    pub fn location(&self) -> Result<GeoPoint> {
        parse_location(self.latitude.as_deref(), self.longitude.as_deref())
    }

    /// The raw radius, if one was sent.
    pub fn distance(&self) -> Option<&str> {
        non_blank(self.distance.as_deref())
    }
}

/// Parse a latitude/longitude pair from raw strings.
///
/// Absent or blank values (either one) are [`AccessError::MissingLocation`].
/// Non-numeric, non-finite or out-of-range values are
/// [`AccessError::InvalidLocation`].
pub fn parse_location(latitude: Option<&str>, longitude: Option<&str>) -> Result<GeoPoint> {
    let (Some(lat_raw), Some(lon_raw)) = (non_blank(latitude), non_blank(longitude)) else {
        return Err(AccessError::MissingLocation);
    };

    let latitude = parse_degrees("latitude", lat_raw, LATITUDE_RANGE)?;
    let longitude = parse_degrees("longitude", lon_raw, LONGITUDE_RANGE)?;

    Ok(GeoPoint::try_new(latitude, longitude)?)
}

fn parse_degrees(field: &str, raw: &str, (min, max): (f64, f64)) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| AccessError::invalid_location(format!("{} must be a number", field)))?;

    if !value.is_finite() || value < min || value > max {
        return Err(AccessError::invalid_location(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(value)
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
