use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::routing::geo::{Coordinate, haversine_km};

/// Flat collection rate (currency units per km).
pub const COST_PER_KM: f64 = 150.0;

/// A seller picked for the collection round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellerStop {
    pub id: i64,
    /// `None` while the seller's position is unknown; such stops are skipped.
    #[serde(default, deserialize_with = "partial_location")]
    pub location: Option<Coordinate>,
}

/// Accepts `[lat, lng]` where either half (or the whole pair) may be null.
fn partial_location<'de, D>(de: D) -> Result<Option<Coordinate>, D::Error>
where
    D: Deserializer<'de>,
{
    let pair: Option<[Option<f64>; 2]> = Option::deserialize(de)?;
    Ok(pair.and_then(|[lat, lng]| Coordinate::from_parts(lat, lng)))
}

impl SellerStop {
    pub fn new(id: i64, location: Coordinate) -> Self {
        Self {
            id,
            location: Some(location),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SequenceOptions {
    pub cost_per_km: f64,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            cost_per_km: COST_PER_KM,
        }
    }
}

/// Ordered round trip: origin, every selected seller once, origin again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub route: Vec<Coordinate>,
    /// Seller ids in visiting order.
    pub visit_order: Vec<i64>,
    pub total_distance_km: f64,
    pub estimated_cost: f64,
}

impl RoutePlan {
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Number of legs (consecutive coordinate pairs) in the route.
    pub fn legs(&self) -> usize {
        self.route.len().saturating_sub(1)
    }
}

/// Order the selected sellers with the nearest-neighbour heuristic.
///
/// Starting at `origin`, repeatedly travel to the closest unvisited seller
/// and finally return home. Distances are Haversine kilometres. Ties go to
/// the seller that appears first in `selected`. The result is greedy, not
/// optimal.
///
/// A missing origin, or a selection with no usable coordinate, yields the
/// empty plan. Duplicate ids are visited once.
pub fn plan_route(
    origin: Option<Coordinate>,
    selected: &[SellerStop],
    opts: SequenceOptions,
) -> RoutePlan {
    let Some(origin) = origin.filter(Coordinate::is_valid) else {
        return RoutePlan::default();
    };

    let mut seen = HashSet::with_capacity(selected.len());
    let mut remaining: Vec<(i64, Coordinate)> = selected
        .iter()
        .filter_map(|s| {
            let loc = s.location.filter(Coordinate::is_valid)?;
            seen.insert(s.id).then_some((s.id, loc))
        })
        .collect();

    if remaining.is_empty() {
        return RoutePlan::default();
    }

    let mut route = Vec::with_capacity(remaining.len() + 2);
    let mut visit_order = Vec::with_capacity(remaining.len());
    let mut total = 0.0;
    let mut current = origin;
    route.push(origin);

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut min_dist = haversine_km(current, remaining[0].1);

        for (i, (_, loc)) in remaining.iter().enumerate().skip(1) {
            let d = haversine_km(current, *loc);
            if d < min_dist {
                min_dist = d;
                nearest = i;
            }
        }

        // `remove` keeps input order for the remaining stops, so ties stay stable.
        let (id, loc) = remaining.remove(nearest);
        route.push(loc);
        visit_order.push(id);
        total += min_dist;
        current = loc;
    }

    total += haversine_km(current, origin);
    route.push(origin);

    debug!(
        stops = visit_order.len(),
        total_km = total,
        "collection route sequenced"
    );

    RoutePlan {
        route,
        visit_order,
        total_distance_km: total,
        estimated_cost: total * opts.cost_per_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_stops_without_coordinates() {
        let origin = Coordinate::new(0.0, 0.0);
        let stops = [
            SellerStop {
                id: 1,
                location: None,
            },
            SellerStop::new(2, Coordinate::new(0.0, 1.0)),
        ];

        let plan = plan_route(Some(origin), &stops, SequenceOptions::default());
        assert_eq!(plan.visit_order, vec![2]);
        assert_eq!(plan.route.len(), 3);
    }

    #[test]
    fn duplicate_ids_visited_once() {
        let origin = Coordinate::new(0.0, 0.0);
        let stops = [
            SellerStop::new(7, Coordinate::new(0.0, 1.0)),
            SellerStop::new(7, Coordinate::new(0.0, 1.0)),
        ];

        let plan = plan_route(Some(origin), &stops, SequenceOptions::default());
        assert_eq!(plan.visit_order, vec![7]);
        assert_eq!(plan.legs(), 2);
    }

    #[test]
    fn null_location_parts_mean_unknown() {
        let stops: Vec<SellerStop> = serde_json::from_str(
            r#"[
                {"id": 1, "location": [null, null]},
                {"id": 2, "location": [-15.8, null]},
                {"id": 3, "location": null},
                {"id": 4},
                {"id": 5, "location": [-15.8, 35.0]}
            ]"#,
        )
        .unwrap();

        let known: Vec<i64> = stops
            .iter()
            .filter(|s| s.location.is_some())
            .map(|s| s.id)
            .collect();
        assert_eq!(known, vec![5]);
    }

    #[test]
    fn invalid_origin_is_empty() {
        let stops = [SellerStop::new(1, Coordinate::new(0.0, 1.0))];
        let plan = plan_route(
            Some(Coordinate::new(f64::NAN, 0.0)),
            &stops,
            SequenceOptions::default(),
        );
        assert!(plan.is_empty());
    }
}
