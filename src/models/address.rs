//! Address points and the dwelling-unit heuristics behind household counts.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Building categories that imply several households at one address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Apartments,
    Dormitory,
    Terrace,
}

/// What the source data says about dwelling units at an address.
///
/// Resolved once at parse time so the rest of the pipeline never sees raw
/// tag strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellingHint {
    /// Explicit unit count, e.g. `addr:flats=6`
    UnitCount(u32),
    /// Unit range, e.g. `addr:flats=1-10`
    UnitRange(u32, u32),
    /// No unit count, but a multi-unit building category
    Building(BuildingKind),
    Unknown,
}

impl DwellingHint {
    /// Resolve raw tag values into a hint. A present but malformed unit
    /// attribute shadows the building category and resolves to `Unknown`.
    pub fn from_tags(flats: Option<&str>, building: Option<&str>) -> Self {
        if let Some(raw) = flats {
            return Self::parse_units(raw);
        }
        match building {
            Some("apartments") => DwellingHint::Building(BuildingKind::Apartments),
            Some("dormitory") => DwellingHint::Building(BuildingKind::Dormitory),
            Some("terrace") => DwellingHint::Building(BuildingKind::Terrace),
            _ => DwellingHint::Unknown,
        }
    }

    fn parse_units(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some((lo, hi)) = raw.split_once('-') {
            return match (lo.trim().parse(), hi.trim().parse()) {
                (Ok(lo), Ok(hi)) => DwellingHint::UnitRange(lo, hi),
                _ => DwellingHint::Unknown,
            };
        }
        match raw.parse() {
            Ok(n) => DwellingHint::UnitCount(n),
            Err(_) => DwellingHint::Unknown,
        }
    }

    /// Estimated households behind one address point, never zero
    pub fn weight(&self) -> u32 {
        match self {
            DwellingHint::UnitCount(n) => (*n).max(1),
            DwellingHint::UnitRange(lo, hi) => hi.saturating_sub(*lo).saturating_add(1).max(1),
            DwellingHint::Building(_) => 6,
            DwellingHint::Unknown => 1,
        }
    }
}

/// A single address location with its resolved dwelling hint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddressPoint {
    pub location: GeoPoint,
    pub dwelling: DwellingHint,
}
