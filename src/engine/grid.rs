//! Uniform-grid spatial hash over street geometry.

use hashbrown::{HashMap, HashSet};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::models::{AggregatedStreet, GeoPoint};

/// Grid cell edge in degrees, roughly 111 m of latitude
pub const CELL_SIZE_DEG: f64 = 0.001;

/// Cell-hashed lookup from a location to the streets near it.
///
/// Built once per run from down-sampled street geometry; purely an
/// accelerator, the distance check stays with the caller.
pub struct StreetGrid {
    cells: HashMap<(i32, i32), HashSet<usize>>,
    /// Street keys in insertion order; lexicographic, since the source map
    /// iterates sorted
    keys: Vec<String>,
}

impl StreetGrid {
    fn cell_of(point: GeoPoint) -> (i32, i32) {
        (
            (point.lat / CELL_SIZE_DEG) as i32,
            (point.lon / CELL_SIZE_DEG) as i32,
        )
    }

    /// Register every `stride`-th point of every fragment of every street
    pub fn build(streets: &BTreeMap<String, AggregatedStreet>, stride: usize) -> Self {
        let stride = stride.max(1);
        let mut cells: HashMap<(i32, i32), HashSet<usize>> = HashMap::new();
        let mut keys = Vec::with_capacity(streets.len());

        for (idx, (key, street)) in streets.iter().enumerate() {
            keys.push(key.clone());
            for fragment in &street.fragments {
                for point in fragment.points.iter().step_by(stride) {
                    cells.entry(Self::cell_of(*point)).or_default().insert(idx);
                }
            }
        }

        info!(
            "Spatial grid built: {} cells over {} streets",
            cells.len(),
            keys.len()
        );

        Self { cells, keys }
    }

    /// Street keys registered in the 3x3 cell block around a point,
    /// deduplicated, in lexicographic order
    pub fn candidates(&self, point: GeoPoint) -> Vec<&str> {
        let (row, col) = Self::cell_of(point);
        let mut found = BTreeSet::new();
        for dr in -1..=1 {
            for dc in -1..=1 {
                if let Some(members) = self.cells.get(&(row + dr, col + dc)) {
                    found.extend(members.iter().copied());
                }
            }
        }
        found.into_iter().map(|idx| self.keys[idx].as_str()).collect()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PathFragment;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    fn street(name: &str, points: Vec<GeoPoint>) -> (String, AggregatedStreet) {
        let mut s = AggregatedStreet::new(name);
        s.push_fragment(PathFragment::new(points));
        (name.to_lowercase().replace(' ', "_"), s)
    }

    fn world(entries: Vec<(String, AggregatedStreet)>) -> BTreeMap<String, AggregatedStreet> {
        entries.into_iter().collect()
    }

    #[test]
    fn test_candidates_nearby() {
        let streets = world(vec![street("Main Street", vec![p(0.0, 0.0), p(0.0, 0.001)])]);
        let grid = StreetGrid::build(&streets, 1);

        let found = grid.candidates(p(0.0004, 0.0006));
        assert_eq!(found, vec!["main_street"]);
    }

    #[test]
    fn test_candidates_out_of_reach() {
        let streets = world(vec![street("Main Street", vec![p(0.0, 0.0), p(0.0, 0.001)])]);
        let grid = StreetGrid::build(&streets, 1);

        // Ten cells away, outside the 3x3 block
        assert!(grid.candidates(p(0.0105, 0.0)).is_empty());
    }

    #[test]
    fn test_candidates_sorted_and_deduplicated() {
        let streets = world(vec![
            street("Birch Way", vec![p(0.0, 0.0), p(0.0, 0.001)]),
            street("Alder Way", vec![p(0.0002, 0.0), p(0.0002, 0.001)]),
        ]);
        let grid = StreetGrid::build(&streets, 1);

        let found = grid.candidates(p(0.0001, 0.0005));
        assert_eq!(found, vec!["alder_way", "birch_way"]);
    }

    #[test]
    fn test_stride_skips_intermediate_points() {
        // Points one cell apart, placed mid-cell; with stride 5 only
        // indices 0, 5 and 10 land in the grid.
        let points: Vec<GeoPoint> = (0..=10)
            .map(|i| p(0.0005, i as f64 * 0.001 + 0.0005))
            .collect();
        let streets = world(vec![street("Long Road", points)]);
        let grid = StreetGrid::build(&streets, 5);

        assert!(!grid.candidates(p(0.0005, 0.0005)).is_empty());
        assert!(!grid.candidates(p(0.0005, 0.0055)).is_empty());
        // Around index 2, two cells away from the nearest sample
        assert!(grid.candidates(p(0.0005, 0.0025)).is_empty());
    }

    #[test]
    fn test_empty_world() {
        let grid = StreetGrid::build(&BTreeMap::new(), 5);
        assert!(grid.is_empty());
        assert_eq!(grid.len(), 0);
        assert!(grid.candidates(p(0.0, 0.0)).is_empty());
    }
}
