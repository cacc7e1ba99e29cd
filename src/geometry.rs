//! Geometric helpers over latitude/longitude points.

use geo::{Distance, Haversine, Point};

use crate::models::GeoPoint;

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance between two points in meters
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat))
}

/// Total length of a polyline in meters. Zero for fewer than two points.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|pair| distance(pair[0], pair[1])).sum()
}

/// Squared separation in degree space. Flat-earth shortcut for nearest-street
/// comparisons; only meaningful against thresholds converted with
/// [`METERS_PER_DEGREE`].
pub fn planar_distance_sq(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.lat - b.lat;
    let dlon = a.lon - b.lon;
    dlat * dlat + dlon * dlon
}

/// Plain average of a set of points. `None` when empty.
pub fn points_centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    Some(GeoPoint {
        lat: lat_sum / n,
        lon: lon_sum / n,
    })
}
