use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;
use rusqlite::Connection;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::db::{configure, migrate, open_db, paths};

#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    /// Maximum number of connections handed out at once.
    pub max_size: usize,
    /// How long `acquire` waits for a free slot.
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 10,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

struct Inner {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
    slots: Arc<Semaphore>,
    opts: PoolOptions,
}

/// Bounded SQLite connection pool.
///
/// Connections are opened lazily up to `max_size` and go back to the idle
/// list when their [`PooledConnection`] is dropped, whichever way the
/// caller exits.
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<Inner>,
}

impl DbPool {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>, opts: PoolOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if opts.max_size == 0 {
            return Err(anyhow!("Pool size must be > 0"));
        }

        paths::ensure_parent_dir(&path)?;

        let mut first = open_db(&path)?;
        first
            .execute_batch("PRAGMA journal_mode = WAL;")
            .context("Failed to enable WAL journal")?;
        migrate::run(&mut first)?;

        info!(
            path = %path.display(),
            max_size = opts.max_size,
            acquire_timeout_ms = opts.acquire_timeout.as_millis() as u64,
            "database pool ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                idle: Mutex::new(vec![first]),
                slots: Arc::new(Semaphore::new(opts.max_size)),
                opts,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn options(&self) -> PoolOptions {
        self.inner.opts
    }

    /// Connections currently free to hand out without waiting.
    pub fn available(&self) -> usize {
        self.inner.slots.available_permits()
    }

    /// Wait for a free slot, up to the configured acquire timeout.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let wait = self.inner.opts.acquire_timeout;
        let permit = tokio::time::timeout(wait, self.inner.slots.clone().acquire_owned())
            .await
            .map_err(|_| {
                warn!(timeout_ms = wait.as_millis() as u64, "database pool exhausted");
                anyhow!("Timed out after {wait:?} waiting for a database connection")
            })?
            .context("Database pool is closed")?;

        let reused = self.inner.idle.lock().pop();
        let con = match reused {
            Some(con) => con,
            None => {
                debug!("opening new pooled connection");
                let con = Connection::open(&self.inner.path).with_context(|| {
                    format!("Unable to open database: {}", self.inner.path.display())
                })?;
                configure(&con)?;
                con
            }
        };

        Ok(PooledConnection {
            con: Some(con),
            inner: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Run blocking database work on a pooled connection.
    ///
    /// The connection is released when `f` returns, errors or panics.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut con = self.acquire().await?;
        tokio::task::spawn_blocking(move || f(&mut *con))
            .await
            .context("Database task failed")?
    }
}

/// A connection checked out of a [`DbPool`].
pub struct PooledConnection {
    con: Option<Connection>,
    inner: Arc<Inner>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.con.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.con.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(con) = self.con.take() {
            // A connection left inside a transaction is not reusable.
            if con.is_autocommit() {
                self.inner.idle.lock().push(con);
            }
        }
        // `_permit` is released after this, so the idle push happens first.
    }
}
