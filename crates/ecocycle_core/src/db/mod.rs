pub mod core;
pub mod migrate;
pub mod paths;
pub mod pool;
pub mod queries;

pub use self::core::*;
pub use pool::{DbPool, PoolOptions, PooledConnection};
