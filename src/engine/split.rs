//! Splits oversize streets into balanced, geometrically contiguous segments.

use tracing::debug;

use crate::engine::EngineConfig;
use crate::geometry;
use crate::models::{AggregatedStreet, AssignedPoint, GeoPoint, PathFragment};

/// One distribution unit ready for assembly: a whole street or one part of a
/// split street.
#[derive(Debug, Clone)]
pub struct StreetSegment {
    /// Stable id: the street key, with a `_partN` suffix for split parts
    pub id: String,
    /// Display name, annotated `Name (i/n)` for split parts
    pub name: String,
    pub fragments: Vec<PathFragment>,
    pub length_m: f64,
    pub centroid: GeoPoint,
    pub households: u32,
    pub points: Vec<AssignedPoint>,
}

/// Turn one aggregated street into one or more segments.
///
/// A street is split when it is longer than the configured limit or carries
/// more households than one volunteer can walk, provided it has more than one
/// fragment to distribute. Streets that end up with zero weight receive a
/// length-derived household minimum first, so no unit is ever planned empty.
pub fn split_street(
    key: &str,
    mut street: AggregatedStreet,
    config: &EngineConfig,
) -> Vec<StreetSegment> {
    if street.households == 0 {
        street.households = minimum_households(street.length_m, config.household_spacing_m, 3);
    }

    let needs_split = (street.length_m > config.split_length_m
        || street.households > config.split_households)
        && street.fragments.len() > 1;

    if !needs_split {
        let centroid = match street.centroid() {
            Some(c) => c,
            None => return Vec::new(),
        };
        return vec![StreetSegment {
            id: key.to_string(),
            name: street.name,
            length_m: street.length_m,
            centroid,
            households: street.households,
            points: street.points,
            fragments: street.fragments,
        }];
    }

    split_into_parts(key, street, config)
}

fn split_into_parts(
    key: &str,
    street: AggregatedStreet,
    config: &EngineConfig,
) -> Vec<StreetSegment> {
    let fragment_count = street.fragments.len();
    let target_parts = ((street.length_m / config.segment_target_length_m) as usize)
        .max(2)
        .min(fragment_count);
    let chunk_size = fragment_count.div_ceil(target_parts);

    let ordered = order_along_axis(street.fragments);

    // Contiguous chunks; the last one may come up short, and a short tail can
    // leave fewer parts than targeted, so labels use the emitted count.
    let mut chunks: Vec<Vec<PathFragment>> = Vec::new();
    let mut remaining = ordered;
    while !remaining.is_empty() {
        let tail = remaining.split_off(chunk_size.min(remaining.len()));
        chunks.push(remaining);
        remaining = tail;
    }

    let total = chunks.len();
    debug!(
        "Splitting {} ({} fragments, {:.0} m) into {} parts",
        key, fragment_count, street.length_m, total
    );

    let mut parts: Vec<StreetSegment> = chunks
        .into_iter()
        .enumerate()
        .filter_map(|(i, fragments)| {
            let all_points: Vec<GeoPoint> = fragments
                .iter()
                .flat_map(|f| f.points.iter().copied())
                .collect();
            let centroid = geometry::points_centroid(&all_points)?;
            Some(StreetSegment {
                id: format!("{}_part{}", key, i + 1),
                name: format!("{} ({}/{})", street.name, i + 1, total),
                length_m: fragments.iter().map(|f| f.length_m).sum(),
                centroid,
                households: 0,
                points: Vec::new(),
                fragments,
            })
        })
        .collect();

    // Every parent point lands in the nearest part; no threshold here
    for point in street.points {
        let idx = nearest_part(&parts, point.location, config.match_sample_stride);
        parts[idx].households += point.weight;
        parts[idx].points.push(point);
    }

    for part in &mut parts {
        if part.households == 0 {
            part.households = minimum_households(part.length_m, config.household_spacing_m, 1);
        }
    }

    parts
}

/// Sort fragments by centroid along the street's dominant axis, so contiguous
/// chunks stay contiguous on the map.
fn order_along_axis(fragments: Vec<PathFragment>) -> Vec<PathFragment> {
    let centers: Vec<GeoPoint> = fragments
        .iter()
        .map(|f| f.centroid().unwrap_or(GeoPoint { lat: 0.0, lon: 0.0 }))
        .collect();

    let lat_span = span(centers.iter().map(|c| c.lat));
    let lon_span = span(centers.iter().map(|c| c.lon));

    let mut indexed: Vec<(GeoPoint, PathFragment)> =
        centers.into_iter().zip(fragments).collect();
    if lat_span >= lon_span {
        indexed.sort_by(|a, b| a.0.lat.total_cmp(&b.0.lat));
    } else {
        indexed.sort_by(|a, b| a.0.lon.total_cmp(&b.0.lon));
    }
    indexed.into_iter().map(|(_, f)| f).collect()
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        0.0
    } else {
        max - min
    }
}

fn nearest_part(parts: &[StreetSegment], location: GeoPoint, sample_stride: usize) -> usize {
    let stride = sample_stride.max(1);
    let mut best = 0;
    let mut best_sq = f64::INFINITY;
    for (i, part) in parts.iter().enumerate() {
        for fragment in &part.fragments {
            for point in fragment.points.iter().step_by(stride) {
                let d = geometry::planar_distance_sq(location, *point);
                if d < best_sq {
                    best_sq = d;
                    best = i;
                }
            }
        }
    }
    best
}

/// Household floor for a street or part that no address matched
fn minimum_households(length_m: f64, spacing_m: f64, floor: u32) -> u32 {
    ((length_m / spacing_m).ceil() as u32).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    /// Straight north-south street built from `n` fragments of roughly 200 m
    fn long_street(n: usize) -> AggregatedStreet {
        let mut street = AggregatedStreet::new("Long Street");
        for i in 0..n {
            let start = i as f64 * 0.0018;
            street.push_fragment(PathFragment::new(vec![
                p(start, 0.0),
                p(start + 0.0018, 0.0),
            ]));
        }
        street
    }

    #[test]
    fn test_short_street_stays_whole() {
        let mut street = AggregatedStreet::new("Short Lane");
        street.push_fragment(PathFragment::new(vec![p(0.0, 0.0), p(0.001, 0.0)]));
        street.push_fragment(PathFragment::new(vec![p(0.001, 0.0), p(0.002, 0.0)]));
        street.add_point(p(0.001, 0.0001), 3);

        let segments = split_street("short_lane", street, &EngineConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "short_lane");
        assert_eq!(segments[0].name, "Short Lane");
        assert_eq!(segments[0].households, 3);
        assert_eq!(segments[0].fragments.len(), 2);
    }

    #[test]
    fn test_single_fragment_never_splits() {
        let mut street = AggregatedStreet::new("Unbroken Road");
        // 1 km in one piece; nothing to distribute
        street.push_fragment(PathFragment::new(vec![p(0.0, 0.0), p(0.009, 0.0)]));

        let segments = split_street("unbroken_road", street, &EngineConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "unbroken_road");
    }

    #[test]
    fn test_long_street_splits_in_two() {
        // Five fragments, about 1000 m total: two parts of 3 and 2 fragments
        let segments = split_street("long_street", long_street(5), &EngineConfig::default());

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id, "long_street_part1");
        assert_eq!(segments[0].name, "Long Street (1/2)");
        assert_eq!(segments[0].fragments.len(), 3);
        assert_eq!(segments[1].id, "long_street_part2");
        assert_eq!(segments[1].name, "Long Street (2/2)");
        assert_eq!(segments[1].fragments.len(), 2);

        // Contiguity: everything in part 1 lies south of part 2
        let max_part1 = segments[0]
            .fragments
            .iter()
            .flat_map(|f| f.points.iter())
            .fold(f64::NEG_INFINITY, |m, pt| m.max(pt.lat));
        let min_part2 = segments[1]
            .fragments
            .iter()
            .flat_map(|f| f.points.iter())
            .fold(f64::INFINITY, |m, pt| m.min(pt.lat));
        assert!(max_part1 <= min_part2);
    }

    #[test]
    fn test_split_is_input_order_independent() {
        let ordered = long_street(5);
        let mut shuffled = AggregatedStreet::new("Long Street");
        for i in [3usize, 0, 4, 1, 2] {
            shuffled.push_fragment(ordered.fragments[i].clone());
        }

        let a = split_street("long_street", ordered, &EngineConfig::default());
        let b = split_street("long_street", shuffled, &EngineConfig::default());

        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.fragments.len(), right.fragments.len());
            assert!((left.length_m - right.length_m).abs() < 1e-9);
        }
    }

    #[test]
    fn test_emitted_part_count_in_labels() {
        // Six fragments, about 1600 m: the part target of four collapses to
        // three chunks of two, and the labels must say (i/3).
        let mut street = AggregatedStreet::new("Long Street");
        for i in 0..6 {
            let start = i as f64 * 0.0024;
            street.push_fragment(PathFragment::new(vec![
                p(start, 0.0),
                p(start + 0.0024, 0.0),
            ]));
        }

        let segments = split_street("long_street", street, &EngineConfig::default());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].name, "Long Street (1/3)");
        assert_eq!(segments[2].name, "Long Street (3/3)");
        assert_eq!(segments[2].id, "long_street_part3");
    }

    #[test]
    fn test_household_pressure_splits_short_street() {
        let mut street = AggregatedStreet::new("Dense Lane");
        street.push_fragment(PathFragment::new(vec![p(0.0, 0.0), p(0.0005, 0.0)]));
        street.push_fragment(PathFragment::new(vec![p(0.0005, 0.0), p(0.001, 0.0)]));
        street.add_point(p(0.0002, 0.0), 60);
        street.add_point(p(0.0008, 0.0), 60);

        let segments = split_street("dense_lane", street, &EngineConfig::default());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].households, 60);
        assert_eq!(segments[1].households, 60);
    }

    #[test]
    fn test_points_reassigned_to_nearest_part() {
        let mut street = long_street(5);
        // Near the south end and the north end respectively
        street.add_point(p(0.0001, 0.0001), 2);
        street.add_point(p(0.0089, 0.0001), 7);

        let segments = split_street("long_street", street, &EngineConfig::default());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].households, 2);
        assert_eq!(segments[1].households, 7);
        assert_eq!(segments[0].points.len(), 1);
        assert_eq!(segments[1].points.len(), 1);
    }

    #[test]
    fn test_street_fallback_when_nothing_matched() {
        let mut street = AggregatedStreet::new("Quiet Close");
        street.push_fragment(PathFragment::new(vec![p(0.0, 0.0), p(0.0003, 0.0)]));

        let segments = split_street("quiet_close", street, &EngineConfig::default());
        // 33 m at one household per 25 m rounds up to 2, floored at 3
        assert_eq!(segments[0].households, 3);
    }

    #[test]
    fn test_part_fallback_keeps_households_positive() {
        // Unmatched 1000 m street: street-level fallback applies before the
        // split, then each part is re-derived from its own length.
        let segments = split_street("long_street", long_street(5), &EngineConfig::default());
        let parent_fallback = minimum_households(long_street(5).length_m, 25.0, 3);

        for part in &segments {
            assert!(part.households > 0);
        }
        let total: u32 = segments.iter().map(|s| s.households).sum();
        assert!(total >= parent_fallback);
    }

    #[test]
    fn test_split_conserves_weight_and_fragments() {
        let mut street = long_street(5);
        street.add_point(p(0.0005, 0.0), 4);
        street.add_point(p(0.0040, 0.0), 1);
        street.add_point(p(0.0085, 0.0), 6);
        let parent_households = street.households;
        let parent_fragments = street.fragments.len();

        let segments = split_street("long_street", street, &EngineConfig::default());

        let total_households: u32 = segments.iter().map(|s| s.households).sum();
        let total_fragments: usize = segments.iter().map(|s| s.fragments.len()).sum();
        assert!(total_households >= parent_households);
        assert_eq!(total_fragments, parent_fragments);
    }

    #[test]
    fn test_minimum_households() {
        assert_eq!(minimum_households(0.0, 25.0, 1), 1);
        assert_eq!(minimum_households(0.0, 25.0, 3), 3);
        assert_eq!(minimum_households(1000.0, 25.0, 3), 40);
        assert_eq!(minimum_households(1001.0, 25.0, 3), 41);
    }
}
