use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction};
use tracing::info;

pub const SCHEMA_VERSION: i64 = 3;

/// Materials offered when listing a product.
pub const DEFAULT_CATEGORIES: [&str; 6] = ["E-Waste", "Plastic", "Paper", "Metal", "Glass", "Organic"];

fn ensure_meta(con: &Connection) -> Result<()> {
    con.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .context("Failed to create meta table")?;
    Ok(())
}

pub fn meta_get(con: &Connection, key: &str) -> Result<Option<String>> {
    con.query_row("SELECT value FROM meta WHERE key = ?1", [key], |r| r.get(0))
        .optional()
        .with_context(|| format!("Failed to read meta key: {key}"))
}

fn meta_get_i64(con: &Connection, key: &str) -> Result<Option<i64>> {
    match meta_get(con, key)? {
        None => Ok(None),
        Some(v) => Ok(Some(v.parse::<i64>().with_context(|| {
            format!("Invalid integer value in meta table for key '{key}': '{v}'")
        })?)),
    }
}

fn meta_upsert(tx: &Transaction<'_>, key: &str, value: &str) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO meta(key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        (key, value),
    )?;
    Ok(())
}

pub fn current_version(con: &Connection) -> Result<i64> {
    ensure_meta(con)?;
    Ok(meta_get_i64(con, "schema_version")?.unwrap_or(0))
}

fn m_to_v1(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        -- =========================
        -- USERS
        -- =========================
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_name       TEXT NOT NULL,
            phone_number    TEXT NOT NULL,
            password        TEXT NOT NULL,
            user_type       TEXT NOT NULL DEFAULT 'individual'
                            CHECK (user_type IN ('individual', 'company')),
            account_state   TEXT NOT NULL DEFAULT 'active',
            registered_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_phone
          ON users(phone_number);

        CREATE TABLE IF NOT EXISTS user_photo (
            user_id   INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            photo_url TEXT
        );

        -- =========================
        -- CATALOG
        -- =========================
        CREATE TABLE IF NOT EXISTS categories (
            category_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS locations (
            location_id INTEGER PRIMARY KEY AUTOINCREMENT,
            city        TEXT NOT NULL,
            district    TEXT,
            country     TEXT NOT NULL,
            latitude    REAL,
            longitude   REAL
        );

        CREATE INDEX IF NOT EXISTS idx_locations_lookup
          ON locations(city, country, latitude, longitude);

        CREATE TABLE IF NOT EXISTS products (
            product_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category_id INTEGER REFERENCES categories(category_id),
            location_id INTEGER REFERENCES locations(location_id),
            name        TEXT NOT NULL,
            price       REAL NOT NULL DEFAULT 0,
            quantity    REAL NOT NULL DEFAULT 0,
            unit        TEXT NOT NULL DEFAULT 'kg',
            description TEXT,
            status      TEXT NOT NULL DEFAULT 'active'
                        CHECK (status IN ('active', 'sold', 'draft')),
            date_added  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_products_user   ON products(user_id);
        CREATE INDEX IF NOT EXISTS idx_products_status ON products(status);

        CREATE TABLE IF NOT EXISTS product_images (
            image_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(product_id) ON DELETE CASCADE,
            image_url  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_product_images_product
          ON product_images(product_id);
        "#,
    )
    .context("Failed to migrate schema to v1 (marketplace tables)")?;

    for name in DEFAULT_CATEGORIES {
        tx.execute("INSERT OR IGNORE INTO categories(name) VALUES (?1)", [name])
            .with_context(|| format!("Failed to seed category '{name}'"))?;
    }

    Ok(())
}

fn m_to_v2(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chat_threads (
            thread_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            user1_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            user2_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            last_message TEXT,
            last_updated TEXT NOT NULL,
            CHECK (user1_id <> user2_id)
        );

        CREATE INDEX IF NOT EXISTS idx_chat_threads_pair
          ON chat_threads(user1_id, user2_id);

        CREATE TABLE IF NOT EXISTS messages (
            message_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id    INTEGER NOT NULL REFERENCES chat_threads(thread_id) ON DELETE CASCADE,
            sender_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            message_text TEXT NOT NULL,
            sent_at      TEXT NOT NULL,
            opened       TEXT NOT NULL DEFAULT 'no' CHECK (opened IN ('no', 'yes'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_thread
          ON messages(thread_id, sent_at);
        "#,
    )
    .context("Failed to migrate schema to v2 (chat tables)")?;

    Ok(())
}

fn m_to_v3(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user
          ON sessions(user_id);
        "#,
    )
    .context("Failed to migrate schema to v3 (sessions)")?;

    Ok(())
}

/// Bring the schema up to [`SCHEMA_VERSION`].
/// Idempotent and safe to call on every open.
pub fn run(con: &mut Connection) -> Result<()> {
    let current = current_version(con)?;

    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    info!(
        current,
        target = SCHEMA_VERSION,
        "database schema upgrade required"
    );

    let tx = con
        .transaction()
        .context("Failed to start migration transaction")?;

    let steps: [(i64, &str, fn(&Transaction<'_>) -> Result<()>); 3] = [
        (1, "marketplace tables", m_to_v1),
        (2, "chat", m_to_v2),
        (3, "sessions", m_to_v3),
    ];

    for (version, label, step) in steps {
        if current < version {
            info!(version, label, "applying migration");
            step(&tx)?;
            meta_upsert(&tx, "schema_version", &version.to_string()).with_context(|| {
                format!("Failed to update meta.schema_version to {version}")
            })?;
        }
    }

    tx.commit().context("Failed to commit migration")?;

    info!(version = SCHEMA_VERSION, "database schema up to date");

    Ok(())
}
