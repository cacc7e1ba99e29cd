//! Assigns address points to their nearest street within a distance threshold.

use std::collections::BTreeMap;

use crate::engine::StreetGrid;
use crate::geometry::{self, METERS_PER_DEGREE};
use crate::models::{AddressPoint, AggregatedStreet};

/// Matches address points against grid candidates, one point at a time.
///
/// Candidates come pre-sorted from the grid and the best match only moves on
/// a strictly smaller distance, so equidistant streets resolve to the
/// lexicographically smallest key on every run.
pub struct AddressMatcher<'a> {
    grid: &'a StreetGrid,
    threshold_sq: f64,
    stride: usize,
    assigned: usize,
    unassigned: usize,
}

impl<'a> AddressMatcher<'a> {
    pub fn new(grid: &'a StreetGrid, radius_m: f64, sample_stride: usize) -> Self {
        let threshold_deg = radius_m / METERS_PER_DEGREE;
        Self {
            grid,
            threshold_sq: threshold_deg * threshold_deg,
            stride: sample_stride.max(1),
            assigned: 0,
            unassigned: 0,
        }
    }

    /// Try to place one address on its nearest street. Returns whether the
    /// point was within the threshold of any candidate.
    pub fn assign(
        &mut self,
        streets: &mut BTreeMap<String, AggregatedStreet>,
        address: &AddressPoint,
    ) -> bool {
        let mut best_key: Option<&str> = None;
        let mut best_sq = f64::INFINITY;

        for key in self.grid.candidates(address.location) {
            let Some(street) = streets.get(key) else {
                continue;
            };
            for fragment in &street.fragments {
                for point in fragment.points.iter().step_by(self.stride) {
                    let d = geometry::planar_distance_sq(address.location, *point);
                    if d < best_sq {
                        best_sq = d;
                        best_key = Some(key);
                    }
                }
            }
        }

        match best_key {
            Some(key) if best_sq < self.threshold_sq => {
                if let Some(street) = streets.get_mut(key) {
                    street.add_point(address.location, address.dwelling.weight());
                }
                self.assigned += 1;
                true
            }
            _ => {
                self.unassigned += 1;
                false
            }
        }
    }

    /// (assigned, unassigned) counts so far
    pub fn stats(&self) -> (usize, usize) {
        (self.assigned, self.unassigned)
    }
}
