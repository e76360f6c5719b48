//! CLI command implementations.

mod ask;
mod config;
mod search;
mod serve;
mod sql;

pub use ask::run_ask;
pub use config::run_config;
pub use search::run_search;
pub use serve::run_serve;
pub use sql::run_sql;
