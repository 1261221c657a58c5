mod common;

use crate::common::{add_listing, add_user, fresh_db};
use ecocycle_core::db::queries::{listings, stats};
use ecocycle_core::model::{ListingStatus, ListingUpdate, LocationInput, NewListing, VolumeTier};
use ecocycle_core::routing::filter::SellerFilter;
use ecocycle_core::routing::geo::Coordinate;

#[test]
fn reuses_identical_location() {
    let mut con = fresh_db();
    let uid = add_user(&con, "Chisomo", "0991000001");

    let p1 = add_listing(&mut con, uid, "Plastic", 10.0, (-15.78, 35.0));
    let p2 = add_listing(&mut con, uid, "Metal", 10.0, (-15.78, 35.0));
    assert_ne!(p1, p2);

    let n: i64 = con
        .query_row("SELECT COUNT(*) FROM locations", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn failed_product_insert_leaves_no_location_behind() {
    let mut con = fresh_db();
    let uid = add_user(&con, "Tamanda", "0991000004");

    let listing = NewListing {
        category_id: 9_999,
        location: LocationInput {
            city: "Zomba".into(),
            district: None,
            country: "Malawi".into(),
            latitude: -15.38,
            longitude: 35.33,
        },
        name: "Orphan lot".into(),
        price: 500.0,
        quantity: 3.0,
        unit: "kg".into(),
        description: None,
        status: ListingStatus::Active,
        image_url: Some("https://img.example/orphan.jpg".into()),
    };

    assert!(listings::create_listing(&mut con, uid, &listing).is_err());

    for table in ["locations", "products", "product_images"] {
        let n: i64 = con
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0, "{table} not rolled back");
    }
}

#[test]
fn owner_only_update_and_delete() {
    let mut con = fresh_db();
    let owner = add_user(&con, "Owner", "0991000002");
    let other = add_user(&con, "Other", "0991000003");
    let pid = add_listing(&mut con, owner, "Glass", 5.0, (-15.7, 35.1));

    let category_id = listings::find_category_by_name(&con, "glass")
        .unwrap()
        .unwrap();
    let update = ListingUpdate {
        name: "Bottles".into(),
        price: 250.0,
        quantity: 12.0,
        unit: "kg".into(),
        description: Some("clear".into()),
        status: ListingStatus::Sold,
        category_id,
    };

    assert_eq!(listings::update_listing(&con, other, pid, &update).unwrap(), 0);
    assert_eq!(listings::update_listing(&con, owner, pid, &update).unwrap(), 1);

    let mine = listings::list_own_listings(&con, owner).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Bottles");
    assert_eq!(mine[0].status, "sold");
    assert_eq!(mine[0].category.as_deref(), Some("Glass"));

    assert_eq!(listings::delete_listing(&con, other, pid).unwrap(), 0);
    assert_eq!(listings::delete_listing(&con, owner, pid).unwrap(), 1);
    assert!(listings::list_own_listings(&con, owner).unwrap().is_empty());
}

#[test]
fn marketplace_shows_only_active_newest_first() {
    let mut con = fresh_db();
    let uid = add_user(&con, "Seller", "0991000004");
    let first = add_listing(&mut con, uid, "Paper", 3.0, (-15.7, 35.1));
    let second = add_listing(&mut con, uid, "Metal", 3.0, (-15.7, 35.1));
    con.execute(
        "UPDATE products SET status = 'draft' WHERE product_id = ?1",
        [first],
    )
    .unwrap();

    let rows = listings::active_listings(&con).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second);
    assert_eq!(rows[0].seller.as_deref(), Some("Seller"));
    assert_eq!(rows[0].city.as_deref(), Some("Blantyre"));
}

#[test]
fn sellers_are_aggregated_with_volume_tier() {
    let mut con = fresh_db();
    let a = add_user(&con, "A", "0991000005");
    let b = add_user(&con, "B", "0991000006");

    add_listing(&mut con, a, "Plastic", 800.0, (-15.78, 35.00));
    add_listing(&mut con, a, "Plastic", 300.0, (-15.90, 35.20));
    add_listing(&mut con, a, "Metal", 1.0, (-15.78, 35.00));
    add_listing(&mut con, b, "Glass", 20.0, (-15.70, 35.10));

    let sellers = listings::list_sellers(&con).unwrap();
    assert_eq!(sellers.len(), 2);

    let sa = &sellers[0];
    assert_eq!(sa.id, a);
    assert_eq!(sa.items, vec!["Plastic".to_string(), "Metal".to_string()]);
    assert_eq!(sa.total_quantity, 1101.0);
    assert_eq!(sa.volume, VolumeTier::High);
    assert_eq!(sa.location, Some(Coordinate::new(-15.78, 35.00)));

    assert_eq!(sellers[1].volume, VolumeTier::Low);

    let glass = SellerFilter::new(Some("GLASS"), None).apply(sellers);
    assert_eq!(glass.len(), 1);
    assert_eq!(glass[0].id, b);
}

#[test]
fn totals_and_oldest_items() {
    let mut con = fresh_db();
    let uid = add_user(&con, "Dash", "0991000007");

    let empty = listings::listing_totals(&con, uid).unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.sum, None);

    let ids: Vec<i64> = (0..6)
        .map(|_| add_listing(&mut con, uid, "Organic", 1.0, (-15.7, 35.1)))
        .collect();

    let totals = listings::listing_totals(&con, uid).unwrap();
    assert_eq!(totals.total, 6);
    assert_eq!(totals.sum, Some(6000.0));

    let items = listings::oldest_items(&con, uid, 4).unwrap();
    let got: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    assert_eq!(got, ids[..4].to_vec());
}

#[test]
fn leaderboard_and_category_shares() {
    let mut con = fresh_db();
    let busy = add_user(&con, "Busy", "0991000008");
    let idle = add_user(&con, "Idle", "0991000009");

    for _ in 0..5 {
        add_listing(&mut con, busy, "Metal", 1.0, (-15.7, 35.1));
    }

    let board = stats::leaderboard(&con).unwrap();
    assert_eq!(board[0].id, busy);
    assert_eq!(board[0].points, 30);
    assert_eq!(board[0].position, 1);
    assert_eq!(board[1].id, idle);
    assert_eq!(board[1].points, 2);

    let shares = stats::category_shares(&con, busy).unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].name.as_deref(), Some("Metal"));
    assert!((shares[0].percent - 0.15).abs() < 1e-12);
}
