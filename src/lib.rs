//! # Addressbook - address records with a proximity lookup
//!
//! Addressbook provides:
//! - An `Address` model with boundary validation of coordinates
//! - SQLite-backed storage, one short-lived connection per operation
//! - A record service that adds logging and not-found handling
//! - An HTTP API and a CLI on top of the service

pub mod address;
pub mod storage;
pub mod service;
pub mod server;
pub mod config;

// Re-exports for convenient access
pub use address::{Address, AddressPayload, FieldError, ValidationError};
pub use storage::AddressStore;
pub use service::AddressService;

/// Result type alias for Addressbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Addressbook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Address not found: {0}")]
    NotFound(i64),
}
