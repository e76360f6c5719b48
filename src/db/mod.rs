//! Relational store access: the placements database connection pool.

mod pool;

pub use pool::{ConnectionPool, PoolConfig, PoolStatus, PooledConnection};

use crate::config::Settings;

impl From<&Settings> for PoolConfig {
    fn from(settings: &Settings) -> Self {
        PoolConfig::new(settings.database_path())
            .with_max_connections(settings.database.max_connections)
            .with_read_only(settings.database.read_only)
    }
}
