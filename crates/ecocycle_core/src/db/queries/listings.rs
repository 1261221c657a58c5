use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

use crate::db::now_utc;
use crate::model::{
    Category, ListingStatus, ListingTotals, ListingUpdate, LocationInput, MarketListing,
    NewListing, OwnListing, RecentItem, Seller, VolumeTier,
};
use crate::routing::geo::Coordinate;

// First image only; a product may carry several.
const FIRST_IMAGE: &str = r#"
  (SELECT pi.image_url
     FROM product_images pi
    WHERE pi.product_id = p.product_id
    ORDER BY pi.image_id
    LIMIT 1)
"#;

// ---------- Categories ----------

pub fn list_categories(con: &Connection) -> Result<Vec<Category>> {
    let mut stmt = con.prepare("SELECT category_id, name FROM categories ORDER BY category_id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Category {
                category_id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_category_by_name(con: &Connection, name: &str) -> Result<Option<i64>> {
    let id = con
        .query_row(
            "SELECT category_id FROM categories WHERE name = ?1 COLLATE NOCASE LIMIT 1",
            [name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn category_exists(con: &Connection, category_id: i64) -> Result<bool> {
    let n: i64 = con.query_row(
        "SELECT COUNT(*) FROM categories WHERE category_id = ?1",
        [category_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

// ---------- Creating listings ----------

/// Reuse a location with the exact same city, country and coordinates, or
/// insert a new one.
pub fn resolve_location(tx: &Transaction<'_>, loc: &LocationInput) -> Result<i64> {
    let existing: Option<i64> = tx
        .query_row(
            r#"
            SELECT location_id
            FROM locations
            WHERE city = ?1 AND country = ?2 AND latitude = ?3 AND longitude = ?4
            LIMIT 1
            "#,
            params![loc.city, loc.country, loc.latitude, loc.longitude],
            |r| r.get(0),
        )
        .optional()
        .context("Failed to look up location")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tx.execute(
        r#"
        INSERT INTO locations (city, district, country, latitude, longitude)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            loc.city,
            loc.district,
            loc.country,
            loc.latitude,
            loc.longitude
        ],
    )
    .context("Failed to insert location")?;

    Ok(tx.last_insert_rowid())
}

/// Insert location (if new), product and optional image atomically.
/// Returns `(product_id, location_id)`.
pub fn create_listing(con: &mut Connection, user_id: i64, l: &NewListing) -> Result<(i64, i64)> {
    let tx = con
        .transaction()
        .context("Failed to start listing transaction")?;

    let location_id = resolve_location(&tx, &l.location)?;

    tx.execute(
        r#"
        INSERT INTO products
            (user_id, category_id, location_id, name, price, quantity, unit, description, status, date_added)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            user_id,
            l.category_id,
            location_id,
            l.name,
            l.price,
            l.quantity,
            l.unit,
            l.description,
            l.status.as_str(),
            now_utc()
        ],
    )
    .context("Failed to insert product")?;
    let product_id = tx.last_insert_rowid();

    if let Some(url) = l.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
        tx.execute(
            "INSERT INTO product_images (product_id, image_url) VALUES (?1, ?2)",
            params![product_id, url],
        )
        .context("Failed to insert product image")?;
    }

    tx.commit().context("Failed to commit listing")?;
    Ok((product_id, location_id))
}

// ---------- Own listings ----------

fn own_listing_from_row(r: &Row<'_>) -> rusqlite::Result<OwnListing> {
    Ok(OwnListing {
        product_id: r.get("product_id")?,
        name: r.get("name")?,
        price: r.get("price")?,
        quantity: r.get("quantity")?,
        unit: r.get("unit")?,
        description: r.get("description")?,
        status: r.get("status")?,
        category: r.get("category")?,
        image_url: r.get("image_url")?,
    })
}

pub fn list_own_listings(con: &Connection, user_id: i64) -> Result<Vec<OwnListing>> {
    let sql = format!(
        r#"
        SELECT
          p.product_id, p.name, p.price, p.quantity, p.unit, p.description, p.status,
          c.name AS category,
          {image} AS image_url
        FROM products p
        LEFT JOIN categories c ON c.category_id = p.category_id
        WHERE p.user_id = ?1
        ORDER BY p.product_id DESC
        "#,
        image = FIRST_IMAGE
    );

    let mut stmt = con.prepare(&sql)?;
    let rows = stmt.query_map([user_id], own_listing_from_row)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Returns the number of rows changed; 0 when the product is absent or not
/// owned by `user_id`.
pub fn update_listing(
    con: &Connection,
    user_id: i64,
    product_id: i64,
    u: &ListingUpdate,
) -> Result<usize> {
    let n = con
        .execute(
            r#"
            UPDATE products
            SET name = ?1, price = ?2, quantity = ?3, unit = ?4, description = ?5,
                status = ?6, category_id = ?7
            WHERE product_id = ?8 AND user_id = ?9
            "#,
            params![
                u.name,
                u.price,
                u.quantity,
                u.unit,
                u.description,
                u.status.as_str(),
                u.category_id,
                product_id,
                user_id
            ],
        )
        .context("Failed to update product")?;
    Ok(n)
}

pub fn delete_listing(con: &Connection, user_id: i64, product_id: i64) -> Result<usize> {
    let n = con
        .execute(
            "DELETE FROM products WHERE product_id = ?1 AND user_id = ?2",
            params![product_id, user_id],
        )
        .context("Failed to delete product")?;
    Ok(n)
}

/// Oldest listings of a user, for the dashboard preview.
pub fn oldest_items(con: &Connection, user_id: i64, limit: usize) -> Result<Vec<RecentItem>> {
    let mut stmt = con.prepare(
        r#"
        SELECT c.name, p.product_id, p.price, p.date_added
        FROM products p
        LEFT JOIN categories c ON c.category_id = p.category_id
        WHERE p.user_id = ?1
        ORDER BY p.date_added, p.product_id
        LIMIT ?2
        "#,
    )?;

    let rows = stmt
        .query_map(params![user_id, limit as i64], |r| {
            Ok(RecentItem {
                category: r.get(0)?,
                product_id: r.get(1)?,
                price: r.get(2)?,
                date_added: r.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn listing_totals(con: &Connection, user_id: i64) -> Result<ListingTotals> {
    let totals = con.query_row(
        "SELECT COUNT(product_id), SUM(price) FROM products WHERE user_id = ?1",
        [user_id],
        |r| {
            Ok(ListingTotals {
                total: r.get(0)?,
                sum: r.get(1)?,
            })
        },
    )?;
    Ok(totals)
}

// ---------- Marketplace ----------

pub fn active_listings(con: &Connection) -> Result<Vec<MarketListing>> {
    let sql = format!(
        r#"
        SELECT
          p.product_id AS id,
          p.name       AS product_name,
          p.price, p.quantity, p.unit, p.description, p.status,
          l.location_id, l.city, l.district,
          u.id         AS seller_id,
          c.name       AS category,
          {image}      AS image_url,
          u.user_name  AS seller
        FROM products p
        LEFT JOIN categories c ON c.category_id = p.category_id
        LEFT JOIN users u      ON u.id = p.user_id
        LEFT JOIN locations l  ON l.location_id = p.location_id
        WHERE p.status = ?1
        ORDER BY p.product_id DESC
        "#,
        image = FIRST_IMAGE
    );

    let mut stmt = con.prepare(&sql)?;
    let rows = stmt
        .query_map([ListingStatus::Active.as_str()], |r| {
            Ok(MarketListing {
                id: r.get("id")?,
                product_name: r.get("product_name")?,
                price: r.get("price")?,
                quantity: r.get("quantity")?,
                unit: r.get("unit")?,
                description: r.get("description")?,
                status: r.get("status")?,
                location_id: r.get("location_id")?,
                city: r.get("city")?,
                district: r.get("district")?,
                seller_id: r.get("seller_id")?,
                category: r.get("category")?,
                image_url: r.get("image_url")?,
                seller: r.get("seller")?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Sellers with at least one active listing.
///
/// A seller's position is the location of their earliest active listing;
/// materials are listed once each in the order first seen.
pub fn list_sellers(con: &Connection) -> Result<Vec<Seller>> {
    let mut stmt = con.prepare(
        r#"
        SELECT
          u.id, u.user_name, u.phone_number,
          l.latitude, l.longitude, l.city, l.district,
          c.name, p.quantity
        FROM products p
        JOIN users u      ON u.id = p.user_id
        JOIN categories c ON c.category_id = p.category_id
        JOIN locations l  ON l.location_id = p.location_id
        WHERE p.status = ?1
        ORDER BY u.id, p.product_id
        "#,
    )?;

    let mut rows = stmt.query([ListingStatus::Active.as_str()])?;
    let mut out: Vec<Seller> = Vec::new();

    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let category: String = r.get(7)?;
        let quantity: f64 = r.get(8)?;

        match out.last_mut() {
            Some(s) if s.id == id => {
                if !s.items.contains(&category) {
                    s.items.push(category);
                }
                s.total_quantity += quantity;
            }
            _ => out.push(Seller {
                id,
                name: r.get(1)?,
                contact: r.get(2)?,
                location: Coordinate::from_parts(r.get(3)?, r.get(4)?),
                city: r.get(5)?,
                district: r.get(6)?,
                items: vec![category],
                total_quantity: quantity,
                volume: VolumeTier::Low,
            }),
        }
    }

    for s in &mut out {
        s.volume = VolumeTier::classify(s.total_quantity);
    }

    Ok(out)
}

/// Sellers by id, in the order requested. Unknown ids are skipped.
pub fn sellers_by_ids(con: &Connection, ids: &[i64]) -> Result<Vec<Seller>> {
    let all = list_sellers(con)?;
    Ok(ids
        .iter()
        .filter_map(|id| all.iter().find(|s| s.id == *id).cloned())
        .collect())
}
