use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::now_utc;
use crate::model::{User, UserCredentials, UserType};

const USER_SELECT: &str = r#"
  u.id              AS id,
  u.user_name       AS user_name,
  u.phone_number    AS phone_number,
  u.user_type       AS user_type,
  u.account_state   AS account_state,
  u.registered_date AS registered_date,
  up.photo_url      AS photo_url
"#;

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get("id")?,
        user_name: r.get("user_name")?,
        phone_number: r.get("phone_number")?,
        user_type: r.get("user_type")?,
        account_state: r.get("account_state")?,
        registered_date: r.get("registered_date")?,
        photo_url: r.get("photo_url")?,
    })
}

pub fn find_credentials_by_phone(
    con: &Connection,
    phone_number: &str,
) -> Result<Option<UserCredentials>> {
    let creds = con
        .query_row(
            "SELECT id, password FROM users WHERE phone_number = ?1 LIMIT 1",
            [phone_number],
            |r| {
                Ok(UserCredentials {
                    id: r.get(0)?,
                    password_hash: r.get(1)?,
                })
            },
        )
        .optional()
        .context("Failed to look up user by phone number")?;
    Ok(creds)
}

pub fn insert_user(
    con: &Connection,
    user_name: &str,
    phone_number: &str,
    password_hash: &str,
    user_type: UserType,
) -> Result<i64> {
    con.execute(
        r#"
        INSERT INTO users (user_name, phone_number, password, user_type, registered_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            user_name,
            phone_number,
            password_hash,
            user_type.as_str(),
            now_utc()
        ],
    )
    .context("Failed to insert user")?;

    Ok(con.last_insert_rowid())
}

pub fn find_user_by_id(con: &Connection, id: i64) -> Result<Option<User>> {
    let sql = format!(
        r#"
        SELECT
          {select}
        FROM users u
        LEFT JOIN user_photo up ON up.user_id = u.id
        WHERE u.id = ?1
        LIMIT 1
        "#,
        select = USER_SELECT
    );

    let mut stmt = con.prepare(&sql)?;
    let user = stmt.query_row([id], user_from_row).optional()?;
    Ok(user)
}

pub fn user_exists(con: &Connection, id: i64) -> Result<bool> {
    let n: i64 = con.query_row("SELECT COUNT(*) FROM users WHERE id = ?1", [id], |r| r.get(0))?;
    Ok(n > 0)
}

/// Insert or replace the user's profile photo url.
pub fn upsert_user_photo(con: &Connection, user_id: i64, photo_url: Option<&str>) -> Result<()> {
    con.execute(
        r#"
        INSERT INTO user_photo (user_id, photo_url) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET photo_url = excluded.photo_url
        "#,
        params![user_id, photo_url],
    )
    .context("Failed to update profile photo")?;
    Ok(())
}
