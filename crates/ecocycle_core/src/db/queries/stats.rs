use anyhow::Result;
use rusqlite::Connection;

use crate::model::{CategoryShare, ScoreEntry, category_percent, rank_scores};

/// Everyone ranked by listing points, highest first.
pub fn leaderboard(con: &Connection) -> Result<Vec<ScoreEntry>> {
    let mut stmt = con.prepare(
        r#"
        SELECT u.id, up.photo_url, u.user_name, COUNT(p.product_id) AS count
        FROM users u
        LEFT JOIN products p    ON p.user_id = u.id
        LEFT JOIN user_photo up ON up.user_id = u.id
        GROUP BY u.id, u.user_name, up.photo_url
        ORDER BY u.id
        "#,
    )?;

    let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rank_scores(rows))
}

/// Per-category share indicator over the user's listed quantities.
pub fn category_shares(con: &Connection, user_id: i64) -> Result<Vec<CategoryShare>> {
    let mut stmt = con.prepare(
        r#"
        SELECT c.name, SUM(p.quantity)
        FROM products p
        LEFT JOIN categories c ON c.category_id = p.category_id
        WHERE p.user_id = ?1
        GROUP BY c.name
        ORDER BY c.name
        "#,
    )?;

    let rows = stmt
        .query_map([user_id], |r| {
            let name: Option<String> = r.get(0)?;
            let sum: Option<f64> = r.get(1)?;
            Ok(CategoryShare {
                name,
                percent: category_percent(sum.unwrap_or(0.0)),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
