//! Paperroute - leaflet distribution planning from OpenStreetMap data.
//!
//! This library provides shared types and modules for the plan and serve binaries.

pub mod cache;
pub mod engine;
pub mod geometry;
pub mod models;
pub mod overpass;

pub use models::{AddressPoint, GeoPoint, PlanOutput, RawStreetFragment, StreetRecord};
