//! HMS Inventory client
//!
//! Query cache with optimistic mutations, location trees, session state
//! and the commands screens call, over the `hms-backend` data layer.

pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod models;
pub mod query;
pub mod tree;
pub mod validation;

pub use commands::{ClientError, ClientResult, InventoryClient};
pub use config::{ClientConfig, QueryConfig};
pub use context::SessionContext;

const APP_NAME: &str = "hms-inventory";

/// Install the rolling file logger when `config.log_dir` is set
pub fn init_logging(config: &ClientConfig) -> Result<(), String> {
    match &config.log_dir {
        Some(dir) => rolling_logger::init_logger(dir, APP_NAME),
        None => Ok(()),
    }
}
