use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ecocycle_core::db::{self, has_table, migrate, paths};
use rusqlite::{Connection, backup::Backup};

use crate::ui::{error, info, success, warning};

const COUNTED_TABLES: [&str; 8] = [
    "users",
    "categories",
    "locations",
    "products",
    "product_images",
    "chat_threads",
    "messages",
    "sessions",
];

pub fn run_init(out: Option<String>, force: bool) -> Result<()> {
    let out_path = paths::resolve_db_path(out)?;
    paths::ensure_parent_dir(&out_path)?;

    if out_path.exists() {
        if force || confirm_overwrite(&out_path)? {
            fs::remove_file(&out_path).with_context(|| {
                format!("Unable to remove existing database: {}", out_path.display())
            })?;
        } else {
            eprintln!("Aborted. Existing database was not modified.");
            return Ok(());
        }
    }

    println!("Initializing local database at: {}", out_path.display());

    let mut con = db::open_db(&out_path)?;
    migrate::run(&mut con)?;

    success(format!(
        "Database ready (schema v{}).",
        migrate::current_version(&con)?
    ));
    Ok(())
}

pub fn run_status(db_arg: Option<String>) -> Result<()> {
    let db_path = paths::resolve_db_path(db_arg)?;

    println!("Database path: {}", db_path.display());

    if !db_path.exists() {
        error("Status: MISSING");
        println!("Hint: run `ecocycle db init` to create it.");
        return Ok(());
    }

    let meta_fs = fs::metadata(&db_path).context("Unable to read database file metadata")?;
    success("Status: OK");
    println!("Size: {} bytes", meta_fs.len());

    // Plain open: status must not change the file.
    let con = Connection::open(&db_path)
        .with_context(|| format!("Unable to open database: {}", db_path.display()))?;

    if !has_table(&con, "meta")? {
        warning("Warning: table 'meta' is missing (database not initialized or schema is invalid)");
        return Ok(());
    }

    let version = migrate::current_version(&con)?;
    println!();
    println!("Schema:");
    println!("  schema_version: {version}");
    println!("  expected:       {}", migrate::SCHEMA_VERSION);
    if version < migrate::SCHEMA_VERSION {
        warning("Schema is behind; run `ecocycle db migrate`.");
    }

    println!();
    println!("Counts:");
    for table in COUNTED_TABLES {
        if has_table(&con, table)? {
            println!("  {table}: {}", count(&con, table)?);
        } else {
            println!("  {table}: -");
        }
    }

    if has_table(&con, "products")? {
        let active: i64 = con.query_row(
            "SELECT COUNT(*) FROM products WHERE status = 'active'",
            [],
            |r| r.get(0),
        )?;
        println!("  active products: {active}");
    }

    Ok(())
}

pub fn run_migrate(con: &mut Connection) -> Result<()> {
    let before = migrate::current_version(con)?;
    if before >= migrate::SCHEMA_VERSION {
        info(format!("Schema already at v{before}; nothing to do."));
        return Ok(());
    }

    migrate::run(con)?;
    success(format!(
        "Schema migrated from v{before} to v{}.",
        migrate::current_version(con)?
    ));
    Ok(())
}

pub fn run_backup(con: &Connection, out: &Path) -> Result<()> {
    let out: PathBuf = out.to_path_buf();
    paths::ensure_parent_dir(&out)?;

    let mut dst = Connection::open(&out)
        .with_context(|| format!("Unable to create backup file: {}", out.display()))?;

    Backup::new(con, &mut dst)
        .context("Unable to start backup")?
        .run_to_completion(64, Duration::from_millis(50), None)
        .context("Backup failed")?;

    success(format!("Backup written to {}", out.display()));
    Ok(())
}

fn count(con: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    con.query_row(&sql, [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows in table: {table}"))
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    // Prompt only on an interactive stdin.
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    eprintln!("Database already exists:\n  {}\n", path.display());
    eprint!("Overwrite existing database? [y/N]: ");
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}
