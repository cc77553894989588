//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - addresses(id, street, city, state, country, postal_code, latitude, longitude)

pub mod schema;
pub mod sqlite;

pub use sqlite::AddressStore;
