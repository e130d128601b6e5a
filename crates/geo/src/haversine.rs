//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::GeoPoint;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the distance between two points in kilometers, rounded to two
/// decimal places.
///
/// Inputs are expected to be validated already. Out-of-domain values still
/// produce a number.
///
/// # Example
/// ```
/// use civicpulse_geo::{distance_km, GeoPoint};
///
/// let a = GeoPoint::new(18.5204, 73.8567);
/// let b = GeoPoint::new(18.60, 73.90);
///
/// assert!(distance_km(&a, &b) > 5.0);
/// assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
/// ```
#[inline]
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    round_km(haversine_distance(from, to))
}

/// Unrounded great-circle distance in kilometers.
#[inline]
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Float error can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a kilometer value to two decimal places.
#[inline]
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
