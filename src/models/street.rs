//! Street geometry: raw fetched fragments and aggregated streets.

use serde::{Deserialize, Serialize};

use crate::geometry;

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One contiguous piece of street centerline, exactly as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStreetFragment {
    pub name: String,
    pub points: Vec<GeoPoint>,
}

/// A fragment owned by an aggregated street, length computed once on ingest.
#[derive(Debug, Clone)]
pub struct PathFragment {
    pub points: Vec<GeoPoint>,
    pub length_m: f64,
}

impl PathFragment {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        let length_m = geometry::path_length(&points);
        Self { points, length_m }
    }

    /// Plain average of the fragment's points
    pub fn centroid(&self) -> Option<GeoPoint> {
        geometry::points_centroid(&self.points)
    }
}

/// An address point accepted onto a street, with its dwelling weight
#[derive(Debug, Clone, Copy)]
pub struct AssignedPoint {
    pub location: GeoPoint,
    pub weight: u32,
}

/// All fragments sharing one normalized name.
///
/// `households` tracks the weight of the points assigned so far; the
/// segmentation stage substitutes a length-derived minimum when it stays zero.
#[derive(Debug, Clone)]
pub struct AggregatedStreet {
    /// Display name, taken from the first fragment seen
    pub name: String,
    pub fragments: Vec<PathFragment>,
    pub length_m: f64,
    pub households: u32,
    pub points: Vec<AssignedPoint>,
}

impl AggregatedStreet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fragments: Vec::new(),
            length_m: 0.0,
            households: 0,
            points: Vec::new(),
        }
    }

    pub fn push_fragment(&mut self, fragment: PathFragment) {
        self.length_m += fragment.length_m;
        self.fragments.push(fragment);
    }

    /// Accept an address point with its dwelling weight
    pub fn add_point(&mut self, location: GeoPoint, weight: u32) {
        self.households += weight;
        self.points.push(AssignedPoint { location, weight });
    }

    /// Average of the per-fragment centroids
    pub fn centroid(&self) -> Option<GeoPoint> {
        let centers: Vec<GeoPoint> = self
            .fragments
            .iter()
            .filter_map(PathFragment::centroid)
            .collect();
        geometry::points_centroid(&centers)
    }
}
