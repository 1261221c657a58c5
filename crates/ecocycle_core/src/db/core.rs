use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let con = Connection::open(path)
        .with_context(|| format!("Unable to open database: {}", path.display()))?;
    configure(&con)?;
    Ok(con)
}

/// Per-connection settings; SQLite does not persist these.
pub fn configure(con: &Connection) -> Result<()> {
    con.busy_timeout(BUSY_TIMEOUT)
        .context("Failed to set busy timeout")?;
    con.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")?;
    Ok(())
}

pub fn has_table(con: &Connection, table: &str) -> Result<bool> {
    let n: i64 = con.query_row(
        r#"
        SELECT COUNT(*)
        FROM sqlite_master
        WHERE type = 'table' AND name = ?1
        "#,
        [table],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// True when a UNIQUE index rejected the write somewhere in `err`'s chain.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    })
}

/// UTC timestamp with millisecond precision, lexically sortable.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unique_violation_through_context() {
        let con = Connection::open_in_memory().unwrap();
        con.execute_batch("CREATE TABLE t (k TEXT NOT NULL UNIQUE);")
            .unwrap();
        con.execute("INSERT INTO t (k) VALUES ('a')", []).unwrap();

        let dup = con
            .execute("INSERT INTO t (k) VALUES ('a')", [])
            .context("insert");
        assert!(is_unique_violation(&dup.unwrap_err()));

        let not_null = con
            .execute("INSERT INTO t (k) VALUES (NULL)", [])
            .context("insert");
        assert!(!is_unique_violation(&not_null.unwrap_err()));
    }
}
