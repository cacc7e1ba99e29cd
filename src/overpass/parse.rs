//! Overpass JSON response parsing.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{AddressPoint, DwellingHint, GeoPoint, RawStreetFragment};

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// One Overpass element. Ways queried with `out geom` carry `geometry`;
/// address elements carry top-level coordinates (nodes) or a `center`
/// (ways and relations).
#[derive(Debug, Deserialize)]
pub(crate) struct Element {
    #[serde(default)]
    geometry: Vec<Coordinate>,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Coordinate>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Coordinate {
    lat: f64,
    lon: f64,
}

/// Extract named street fragments, dropping nameless or geometry-less ways
pub(crate) fn street_fragments(response: OverpassResponse) -> Vec<RawStreetFragment> {
    let mut fragments = Vec::new();
    let mut skipped = 0usize;

    for element in response.elements {
        let name = element.tags.get("name").map_or("", |n| n.trim());
        if name.is_empty() || element.geometry.is_empty() {
            skipped += 1;
            continue;
        }
        fragments.push(RawStreetFragment {
            name: name.to_string(),
            points: element
                .geometry
                .iter()
                .map(|c| GeoPoint {
                    lat: c.lat,
                    lon: c.lon,
                })
                .collect(),
        });
    }

    if skipped > 0 {
        debug!("Skipped {} ways without name or geometry", skipped);
    }
    fragments
}

/// Extract address points, dropping elements without usable coordinates
pub(crate) fn address_points(response: OverpassResponse) -> Vec<AddressPoint> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for element in response.elements {
        let location = match (element.lat, element.lon, element.center) {
            (Some(lat), Some(lon), _) => GeoPoint { lat, lon },
            (_, _, Some(center)) => GeoPoint {
                lat: center.lat,
                lon: center.lon,
            },
            _ => {
                skipped += 1;
                continue;
            }
        };
        let dwelling = DwellingHint::from_tags(
            element.tags.get("addr:flats").map(String::as_str),
            element.tags.get("building").map(String::as_str),
        );
        points.push(AddressPoint { location, dwelling });
    }

    if skipped > 0 {
        debug!("Skipped {} address elements without coordinates", skipped);
    }
    points
}
