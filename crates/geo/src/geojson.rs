//! GeoJSON point decoding.
//!
//! Stored issue and user locations arrive as GeoJSON points:
//! `{"type": "Point", "coordinates": [lng, lat]}`. The `type` member is
//! optional but, when present, must be `"Point"`. A trailing altitude
//! (`[lng, lat, alt]`) is accepted and dropped.

use crate::{GeoError, GeoPoint, Result};
use serde::{Deserialize, Serialize};

const POINT_TYPE: &str = "Point";

/// Wire shape of a GeoJSON point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    /// Should be "Point"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub point_type: Option<String>,
    /// [longitude, latitude] or [longitude, latitude, altitude]
    pub coordinates: Vec<f64>,
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            point_type: Some(POINT_TYPE.to_string()),
            coordinates: vec![point.longitude, point.latitude],
        }
    }
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(value: GeoJsonPoint) -> Result<Self> {
        if let Some(kind) = value.point_type.as_deref() {
            if kind != POINT_TYPE {
                return Err(GeoError::InvalidGeoJson(format!("Expected Point, got: {}", kind)));
            }
        }
        match value.coordinates.as_slice() {
            [lng, lat] | [lng, lat, _] => GeoPoint::try_new(*lat, *lng),
            other => Err(GeoError::InvalidGeoJson(format!(
                "Expected 2 or 3 coordinates, got {}",
                other.len()
            ))),
        }
    }
}

impl GeoPoint {
    /// Decodes and validates a GeoJSON point.
    ///
    /// # Example
    /// ```
    /// use civicpulse_geo::GeoPoint;
    /// use serde_json::json;
    ///
    /// let value = json!({"type": "Point", "coordinates": [73.8567, 18.5204]});
    /// let point = GeoPoint::from_geojson(&value).unwrap();
    /// assert_eq!(point.latitude, 18.5204);
    /// ```
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Err(GeoError::InvalidGeoJson("Location is null".into()));
        }
        let point: GeoJsonPoint = GeoJsonPoint::deserialize(value)?;
        point.try_into()
    }

    /// Encodes the point as a GeoJSON value.
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": POINT_TYPE,
            "coordinates": [self.longitude, self.latitude],
        })
    }
}
