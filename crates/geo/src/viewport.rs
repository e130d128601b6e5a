//! Rectangular map viewport.
//!
//! Map clients send the visible rectangle as two corners. A viewport only
//! narrows a radius query; it never widens it.

use crate::{GeoError, GeoPoint, Result};
use serde::{Deserialize, Serialize};

/// An axis-aligned latitude/longitude box, inclusive on every edge.
///
/// When `south_west.longitude > north_east.longitude` the box crosses the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Bottom-left corner
    pub south_west: GeoPoint,
    /// Top-right corner
    pub north_east: GeoPoint,
}

impl Viewport {
    /// Builds a viewport from validated corners.
    pub fn try_new(south_west: GeoPoint, north_east: GeoPoint) -> Result<Self> {
        for corner in [south_west, north_east] {
            if !corner.is_valid() {
                return Err(GeoError::InvalidCoordinate {
                    latitude: corner.latitude,
                    longitude: corner.longitude,
                });
            }
        }
        if south_west.latitude > north_east.latitude {
            return Err(GeoError::InvalidViewport {
                south: south_west.latitude,
                north: north_east.latitude,
            });
        }
        Ok(Self { south_west, north_east })
    }

    /// Returns true if the box spans the 180th meridian.
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.longitude > self.north_east.longitude
    }

    /// Returns true if `point` lies inside or on the edge of the box.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat_ok = point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude;
        if !lat_ok {
            return false;
        }

        if self.crosses_antimeridian() {
            point.longitude >= self.south_west.longitude
                || point.longitude <= self.north_east.longitude
        } else {
            point.longitude >= self.south_west.longitude
                && point.longitude <= self.north_east.longitude
        }
    }
}
