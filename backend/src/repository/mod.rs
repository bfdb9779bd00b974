//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod memory_store;
mod settings_repo;
mod sqlite_store;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{init_db, DbState};
pub use memory_store::MemoryStore;
pub use settings_repo::SettingsRepository;
pub use sqlite_store::SqliteStore;
pub use traits::{DocumentStore, Repository};
