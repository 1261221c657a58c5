use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::db::now_utc;

pub fn create_session(con: &Connection, token_digest: &str, user_id: i64) -> Result<()> {
    con.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token_digest, user_id, now_utc()],
    )
    .context("Failed to create session")?;
    Ok(())
}

pub fn session_user(con: &Connection, token_digest: &str) -> Result<Option<i64>> {
    let user_id = con
        .query_row(
            "SELECT user_id FROM sessions WHERE token_hash = ?1",
            [token_digest],
            |r| r.get(0),
        )
        .optional()
        .context("Failed to look up session")?;
    Ok(user_id)
}

pub fn delete_session(con: &Connection, token_digest: &str) -> Result<usize> {
    let n = con.execute("DELETE FROM sessions WHERE token_hash = ?1", [token_digest])?;
    Ok(n)
}
