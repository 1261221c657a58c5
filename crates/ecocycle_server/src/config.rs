use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use ecocycle_core::auth::DEFAULT_BCRYPT_COST;
use ecocycle_core::db::{PoolOptions, paths};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub pool_size: usize,
    pub pool_timeout: Duration,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
    pub secure_cookie: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let db_path = match var("ECOCYCLE_DB") {
            Some(p) => PathBuf::from(p),
            None => paths::default_db_path()?,
        };

        Ok(Self {
            port: try_load("ECOCYCLE_PORT", "5001")?,
            db_path,
            pool_size: try_load("ECOCYCLE_POOL_SIZE", "10")?,
            pool_timeout: Duration::from_secs(try_load("ECOCYCLE_POOL_TIMEOUT_SECS", "10")?),
            cors_origin: try_load("ECOCYCLE_CORS_ORIGIN", "http://localhost:5173")?,
            bcrypt_cost: try_load("ECOCYCLE_BCRYPT_COST", &DEFAULT_BCRYPT_COST.to_string())?,
            secure_cookie: try_load("ECOCYCLE_SECURE_COOKIE", "false")?,
        })
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            acquire_timeout: self.pool_timeout,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow::anyhow!("{e}")
        })
        .with_context(|| format!("Environment misconfigured: {key}={raw}"))
}
