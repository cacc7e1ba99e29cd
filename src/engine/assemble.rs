//! Builds the serializable plan from finished street segments.

use std::collections::BTreeMap;

use crate::engine::StreetSegment;
use crate::geometry;
use crate::models::{GeoPoint, ReservationStatus, StreetRecord};

/// Turn segments into keyed records plus the map center.
///
/// Every record starts unclaimed; the reservation server owns `status` and
/// `user` from here on.
pub fn assemble(segments: Vec<StreetSegment>) -> (BTreeMap<String, StreetRecord>, Option<GeoPoint>) {
    let mut centers = Vec::with_capacity(segments.len());
    let mut records = BTreeMap::new();

    for segment in segments {
        centers.push(segment.centroid);
        records.insert(
            segment.id,
            StreetRecord {
                name: segment.name,
                households: segment.households,
                length: segment.length_m as u32,
                coords: [segment.centroid.lat, segment.centroid.lon],
                path: segment
                    .fragments
                    .iter()
                    .map(|f| f.points.iter().map(|p| [p.lat, p.lon]).collect())
                    .collect(),
                status: ReservationStatus::Free,
                user: String::new(),
            },
        );
    }

    let center = geometry::points_centroid(&centers);
    (records, center)
}
