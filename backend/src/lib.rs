//! HMS Inventory Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Document store abstraction and implementations
//! - services: Per-collection operations with user-facing errors
//! - auth / biometric: External identity and unlock collaborators

pub mod auth;
pub mod biometric;
pub mod domain;
pub mod repository;
pub mod services;

pub use services::Services;
