//! Core data models for the distribution planner.

pub mod address;
pub mod plan;
pub mod street;

pub use address::{AddressPoint, BuildingKind, DwellingHint};
pub use plan::{Metadata, PlanOutput, ReservationStatus, RunStats, StreetRecord};
pub use street::{AggregatedStreet, AssignedPoint, GeoPoint, PathFragment, RawStreetFragment};
