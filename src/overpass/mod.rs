//! Overpass API acquisition: query building, fetching with retry, parsing.

mod client;
mod parse;

use serde::{Deserialize, Serialize};

use crate::models::{AddressPoint, RawStreetFragment};

pub use client::{FetchError, OverpassClient, DEFAULT_ENDPOINT};

/// Everything fetched for one set of postal codes. This is what the raw-data
/// cache stores, so the engine can be re-run offline with different settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBundle {
    pub fragments: Vec<RawStreetFragment>,
    pub addresses: Vec<AddressPoint>,
}
