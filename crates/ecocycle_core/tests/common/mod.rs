#![allow(dead_code)]

use std::path::PathBuf;

use ecocycle_core::db::queries::{listings, users};
use ecocycle_core::db::{DbPool, PoolOptions, open_db};
use ecocycle_core::model::{ListingStatus, LocationInput, NewListing, UserType};
use ecocycle_core::routing::geo::{Coordinate, EARTH_RADIUS_KM};
use ecocycle_core::routing::sequencer::RoutePlan;
use rusqlite::Connection;

/// Independent Haversine used to cross-check the sequencer.
pub fn reference_haversine(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lat1, lon1) = (a[0].to_radians(), a[1].to_radians());
    let (lat2, lon2) = (b[0].to_radians(), b[1].to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn assert_round_trip(plan: &RoutePlan, origin: Coordinate) {
    assert!(plan.route.len() >= 3, "route too short: {:?}", plan.route);
    assert_eq!(plan.route.first(), Some(&origin));
    assert_eq!(plan.route.last(), Some(&origin));
    assert_eq!(plan.route.len(), plan.visit_order.len() + 2);
}

pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("ecocycle_test_{}.sqlite", uuid::Uuid::new_v4()))
}

/// Freshly migrated database on disk.
pub fn fresh_db() -> Connection {
    let path = temp_db_path();
    let mut con = open_db(&path).expect("open db");
    ecocycle_core::db::migrate::run(&mut con).expect("migrate");
    con
}

pub fn fresh_pool() -> DbPool {
    DbPool::open(temp_db_path(), PoolOptions::default()).expect("open pool")
}

pub fn add_user(con: &Connection, name: &str, phone: &str) -> i64 {
    users::insert_user(con, name, phone, "not-a-real-hash", UserType::Individual)
        .expect("insert user")
}

pub fn add_listing(
    con: &mut Connection,
    user_id: i64,
    category: &str,
    quantity: f64,
    at: (f64, f64),
) -> i64 {
    let category_id = listings::find_category_by_name(con, category)
        .expect("category lookup")
        .expect("seeded category");

    let listing = NewListing {
        category_id,
        location: LocationInput {
            city: "Blantyre".into(),
            district: Some("Blantyre".into()),
            country: "Malawi".into(),
            latitude: at.0,
            longitude: at.1,
        },
        name: format!("{category} lot"),
        price: 1000.0,
        quantity,
        unit: "kg".into(),
        description: None,
        status: ListingStatus::Active,
        image_url: None,
    };

    listings::create_listing(con, user_id, &listing)
        .expect("create listing")
        .0
}
