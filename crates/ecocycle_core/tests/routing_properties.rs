use ecocycle_core::routing::geo::Coordinate;
use ecocycle_core::routing::sequencer::{
    COST_PER_KM, SellerStop, SequenceOptions, plan_route,
};

fn sample_stops() -> Vec<SellerStop> {
    vec![
        SellerStop::new(1, Coordinate::new(-15.70, 35.10)),
        SellerStop::new(2, Coordinate::new(-15.95, 34.90)),
        SellerStop::new(3, Coordinate::new(-15.78, 35.02)),
        SellerStop::new(4, Coordinate::new(-15.60, 35.30)),
        SellerStop::new(5, Coordinate::new(-15.85, 35.00)),
    ]
}

#[test]
fn repeated_calls_are_bit_identical() {
    let origin = Some(Coordinate::new(-15.787, 35.005));
    let stops = sample_stops();

    let a = plan_route(origin, &stops, SequenceOptions::default());
    let b = plan_route(origin, &stops, SequenceOptions::default());

    assert_eq!(a, b);
    assert_eq!(
        a.total_distance_km.to_bits(),
        b.total_distance_km.to_bits()
    );
}

#[test]
fn input_order_does_not_matter_without_ties() {
    let origin = Some(Coordinate::new(-15.787, 35.005));
    let stops = sample_stops();
    let mut reversed = stops.clone();
    reversed.reverse();
    let mut rotated = stops.clone();
    rotated.rotate_left(2);

    let base = plan_route(origin, &stops, SequenceOptions::default());
    for variant in [reversed, rotated] {
        let plan = plan_route(origin, &variant, SequenceOptions::default());
        assert_eq!(plan.visit_order, base.visit_order);
        assert_eq!(plan.route, base.route);
        assert!((plan.total_distance_km - base.total_distance_km).abs() < 1e-9);
    }
}

#[test]
fn cost_is_distance_times_rate() {
    let origin = Some(Coordinate::new(-15.787, 35.005));
    let plan = plan_route(origin, &sample_stops(), SequenceOptions::default());

    assert!(plan.total_distance_km > 0.0);
    assert_eq!(plan.estimated_cost, plan.total_distance_km * COST_PER_KM);
    assert_eq!(COST_PER_KM, 150.0);
}

#[test]
fn custom_rate_scales_cost() {
    let origin = Some(Coordinate::new(-15.787, 35.005));
    let plan = plan_route(
        origin,
        &sample_stops(),
        SequenceOptions { cost_per_km: 10.0 },
    );

    assert_eq!(plan.estimated_cost, plan.total_distance_km * 10.0);
}

#[test]
fn route_length_is_selection_plus_two() {
    let origin = Coordinate::new(-15.787, 35.005);
    let stops = sample_stops();
    let plan = plan_route(Some(origin), &stops, SequenceOptions::default());

    assert_eq!(plan.route.len(), stops.len() + 2);
    let mut ids = plan.visit_order.clone();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn plan_serializes_with_camel_case_keys() {
    let origin = Coordinate::new(0.0, 0.0);
    let plan = plan_route(
        Some(origin),
        &[SellerStop::new(4, Coordinate::new(0.0, 1.0))],
        SequenceOptions::default(),
    );

    let v = serde_json::to_value(&plan).unwrap();
    assert_eq!(v["visitOrder"], serde_json::json!([4]));
    assert_eq!(v["route"][1], serde_json::json!([0.0, 1.0]));
    assert!(v["totalDistanceKm"].as_f64().unwrap() > 111.0);
    assert!(v.get("estimatedCost").is_some());
}
