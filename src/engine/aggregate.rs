//! Groups raw street fragments sharing a normalized name into one street.
//!
//! OSM splits a street into many ways wherever a tag changes, so a single
//! "Hauptstraße" often arrives as a dozen fragments. Aggregating them first
//! keeps household counting and segmentation on whole streets.

use std::collections::BTreeMap;
use tracing::info;

use crate::models::{AggregatedStreet, PathFragment, RawStreetFragment};

/// Normalized street identity: trimmed, lowercased, sharp-s folded, whitespace
/// runs collapsed to underscores. Doubles as the stable output id.
/// `None` for unnamed fragments.
pub fn street_key(name: &str) -> Option<String> {
    let folded = name.trim().to_lowercase().replace('ß', "ss");
    let key = folded.split_whitespace().collect::<Vec<_>>().join("_");
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Accumulates fragments into aggregated streets keyed by normalized name
pub struct StreetAggregator {
    streets: BTreeMap<String, AggregatedStreet>,
    added: usize,
    skipped: usize,
}

impl StreetAggregator {
    pub fn new() -> Self {
        Self {
            streets: BTreeMap::new(),
            added: 0,
            skipped: 0,
        }
    }

    /// Add one raw fragment. Unnamed or empty fragments are dropped.
    pub fn add_fragment(&mut self, fragment: RawStreetFragment) {
        let Some(key) = street_key(&fragment.name) else {
            self.skipped += 1;
            return;
        };
        if fragment.points.is_empty() {
            self.skipped += 1;
            return;
        }

        let piece = PathFragment::new(fragment.points);
        self.streets
            .entry(key)
            .or_insert_with(|| AggregatedStreet::new(fragment.name.trim()))
            .push_fragment(piece);
        self.added += 1;
    }

    /// Consume the builder, yielding streets in lexicographic key order
    pub fn finish(self) -> BTreeMap<String, AggregatedStreet> {
        info!(
            "Aggregated {} fragments into {} streets ({} skipped)",
            self.added,
            self.streets.len(),
            self.skipped
        );
        self.streets
    }
}

impl Default for StreetAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn fragment(name: &str, points: &[(f64, f64)]) -> RawStreetFragment {
        RawStreetFragment {
            name: name.to_string(),
            points: points
                .iter()
                .map(|&(lat, lon)| GeoPoint { lat, lon })
                .collect(),
        }
    }

    #[test]
    fn test_street_key_normalization() {
        assert_eq!(street_key("Main Street"), Some("main_street".to_string()));
        assert_eq!(
            street_key("  Haupt   Straße "),
            Some("haupt_strasse".to_string())
        );
        assert_eq!(street_key("Hauptstrasse"), Some("hauptstrasse".to_string()));
    }

    #[test]
    fn test_street_key_unnamed() {
        assert_eq!(street_key(""), None);
        assert_eq!(street_key("   "), None);
    }

    #[test]
    fn test_spelling_variants_aggregate() {
        let mut aggregator = StreetAggregator::new();
        aggregator.add_fragment(fragment("Hauptstraße", &[(0.0, 0.0), (0.001, 0.0)]));
        aggregator.add_fragment(fragment("Hauptstrasse ", &[(0.001, 0.0), (0.002, 0.0)]));

        let streets = aggregator.finish();
        assert_eq!(streets.len(), 1);

        let street = &streets["hauptstrasse"];
        assert_eq!(street.name, "Hauptstraße");
        assert_eq!(street.fragments.len(), 2);
        assert!((street.length_m - 222.4).abs() < 1.0);
    }

    #[test]
    fn test_unusable_fragments_skipped() {
        let mut aggregator = StreetAggregator::new();
        aggregator.add_fragment(fragment("", &[(0.0, 0.0), (0.001, 0.0)]));
        aggregator.add_fragment(fragment("Empty Lane", &[]));
        aggregator.add_fragment(fragment("Kept Lane", &[(0.0, 0.0)]));

        let streets = aggregator.finish();
        assert_eq!(streets.len(), 1);
        // A one-point fragment is degenerate but kept
        assert_eq!(streets["kept_lane"].fragments.len(), 1);
        assert_eq!(streets["kept_lane"].length_m, 0.0);
    }

    #[test]
    fn test_output_order_is_lexicographic() {
        let mut aggregator = StreetAggregator::new();
        aggregator.add_fragment(fragment("Zinnowitzer Weg", &[(0.0, 0.0), (0.001, 0.0)]));
        aggregator.add_fragment(fragment("Ahornallee", &[(0.0, 0.0), (0.001, 0.0)]));
        aggregator.add_fragment(fragment("Mittelweg", &[(0.0, 0.0), (0.001, 0.0)]));

        let keys: Vec<String> = aggregator.finish().into_keys().collect();
        assert_eq!(keys, vec!["ahornallee", "mittelweg", "zinnowitzer_weg"]);
    }
}
