//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::document::Collection;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + Serialize + DeserializeOwned {
    /// Collection the entity is stored in
    const COLLECTION: Collection;

    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Entities living under a household (`households/{id}/{collection}`)
pub trait HouseholdScoped: Entity {
    fn household_id(&self) -> &str;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal(format!("serialization: {}", err))
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
