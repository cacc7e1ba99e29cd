//! Output documents: distribution units, run statistics, plan metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GeoPoint;

/// Claim state of one distribution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Free,
    Taken,
    Done,
}

/// One distribution unit: a whole street or one part of a split street.
///
/// This is the document volunteers see and the reservation server mutates
/// (`status` and `user` only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRecord {
    pub name: String,
    pub households: u32,
    /// Walking length in whole meters
    pub length: u32,
    /// Display anchor: [lat, lon]
    pub coords: [f64; 2],
    /// One coordinate sequence per fragment, [lat, lon] pairs
    pub path: Vec<Vec<[f64; 2]>>,
    pub status: ReservationStatus,
    pub user: String,
}

/// Counters from one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub addresses_total: usize,
    pub addresses_assigned: usize,
    pub addresses_unassigned: usize,
    pub streets_aggregated: usize,
    pub units_emitted: usize,
    pub match_radius_m: f64,
}

impl RunStats {
    /// Share of addresses that matched no street. Zero when there were none.
    pub fn unassigned_ratio(&self) -> f64 {
        if self.addresses_total == 0 {
            0.0
        } else {
            self.addresses_unassigned as f64 / self.addresses_total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub generated: DateTime<Utc>,
    pub postal_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    pub stats: RunStats,
}

/// The full plan document, keyed by stable unit ids.
///
/// `BTreeMap` fixes the serialization order, so re-running the planner on
/// identical input produces an identical file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutput {
    pub metadata: Metadata,
    pub streets: BTreeMap<String, StreetRecord>,
}
