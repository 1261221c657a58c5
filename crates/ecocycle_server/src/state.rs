use std::sync::Arc;

use anyhow::Result;
use ecocycle_core::db::DbPool;

use crate::config::Config;

pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Open the pool for the configured database. The pool lives as long
    /// as the returned state.
    pub fn new(config: Config) -> Result<SharedState> {
        let pool = DbPool::open(&config.db_path, config.pool_options())?;
        Ok(Arc::new(Self { pool, config }))
    }
}
