//! The planning engine: aggregation, spatial indexing, address assignment,
//! segmentation, and result assembly.
//!
//! The whole pass is synchronous, single-threaded, and deterministic: the
//! same fragments, addresses, and configuration always produce the same plan.

pub mod aggregate;
pub mod assemble;
pub mod assign;
pub mod grid;
pub mod split;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use aggregate::{street_key, StreetAggregator};
pub use assign::AddressMatcher;
pub use grid::StreetGrid;
pub use split::{split_street, StreetSegment};

use crate::models::{
    AddressPoint, AggregatedStreet, GeoPoint, RawStreetFragment, RunStats, StreetRecord,
};

/// Tunable engine parameters. Distances are meters, strides are point counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Addresses farther than this from every street stay unassigned
    pub match_radius_m: f64,
    /// Streets longer than this are split
    pub split_length_m: f64,
    /// Streets with more households than this are split
    pub split_households: u32,
    /// Aimed-for length of one split part
    pub segment_target_length_m: f64,
    /// Assumed meters of street per household for fallback estimates
    pub household_spacing_m: f64,
    /// Every n-th street point lands in the grid index
    pub index_sample_stride: usize,
    /// Every n-th street point is checked during matching
    pub match_sample_stride: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_radius_m: 45.0,
            split_length_m: 600.0,
            split_households: 80,
            segment_target_length_m: 400.0,
            household_spacing_m: 25.0,
            index_sample_stride: 5,
            match_sample_stride: 10,
        }
    }
}

/// Everything one planning pass produces
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub streets: BTreeMap<String, StreetRecord>,
    pub center: Option<GeoPoint>,
    pub stats: RunStats,
}

/// Run the full pass over raw inputs
pub fn run_plan(
    fragments: Vec<RawStreetFragment>,
    addresses: &[AddressPoint],
    config: &EngineConfig,
) -> PlanResult {
    let mut aggregator = StreetAggregator::new();
    for fragment in fragments {
        aggregator.add_fragment(fragment);
    }
    let mut streets = aggregator.finish();

    let grid = StreetGrid::build(&streets, config.index_sample_stride);
    let mut matcher = AddressMatcher::new(&grid, config.match_radius_m, config.match_sample_stride);
    for address in addresses {
        matcher.assign(&mut streets, address);
    }
    let (assigned, unassigned) = matcher.stats();

    finish_plan(streets, assigned, unassigned, config)
}

/// Complete a pass after assignment: segmentation, assembly, statistics.
/// Separate so a caller driving the assignment loop itself (for progress
/// reporting) ends up in the same place as [`run_plan`].
pub fn finish_plan(
    streets: BTreeMap<String, AggregatedStreet>,
    assigned: usize,
    unassigned: usize,
    config: &EngineConfig,
) -> PlanResult {
    let streets_aggregated = streets.len();

    let mut segments = Vec::new();
    for (key, street) in streets {
        segments.extend(split::split_street(&key, street, config));
    }

    let (streets, center) = assemble::assemble(segments);

    let stats = RunStats {
        addresses_total: assigned + unassigned,
        addresses_assigned: assigned,
        addresses_unassigned: unassigned,
        streets_aggregated,
        units_emitted: streets.len(),
        match_radius_m: config.match_radius_m,
    };

    PlanResult {
        streets,
        center,
        stats,
    }
}
