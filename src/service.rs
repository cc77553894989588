//! Record service - the seam between the API layer and storage
//!
//! Mirrors `AddressStore` one method per operation. On top of storage it
//! validates payloads before writing, turns missing ids into
//! `Error::NotFound` and logs every call.

use std::path::Path;
use crate::address::{Address, AddressPayload, FieldError, ValidationError};
use crate::storage::AddressStore;
use crate::{Error, Result};

/// Address record service
#[derive(Debug, Clone)]
pub struct AddressService {
    store: AddressStore,
}

impl AddressService {
    /// Wrap an already opened store
    pub fn new(store: AddressStore) -> Self {
        Self { store }
    }

    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening address store at {}", path.display());
        Ok(Self::new(AddressStore::open(path)?))
    }

    /// Create an address and return the full record
    pub fn add_address(&self, payload: AddressPayload) -> Result<Address> {
        payload.validate()?;
        let id = self.store.add(&payload).map_err(storage_failure("add"))?;
        tracing::info!(id, "Address created");
        Ok(Address::from_payload(id, payload))
    }

    /// Replace every field of an existing address
    pub fn update_address(&self, id: i64, payload: AddressPayload) -> Result<()> {
        payload.validate()?;
        if !self.store.update(id, &payload).map_err(storage_failure("update"))? {
            tracing::debug!(id, "Update of unknown address");
            return Err(Error::NotFound(id));
        }
        tracing::info!(id, "Address updated");
        Ok(())
    }

    /// Delete an address
    pub fn delete_address(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).map_err(storage_failure("delete"))? {
            tracing::debug!(id, "Delete of unknown address");
            return Err(Error::NotFound(id));
        }
        tracing::info!(id, "Address deleted");
        Ok(())
    }

    pub fn get_address_by_id(&self, id: i64) -> Result<Address> {
        tracing::debug!(id, "Fetching address");
        self.store
            .get_by_id(id)
            .map_err(storage_failure("get_by_id"))?
            .ok_or(Error::NotFound(id))
    }

    pub fn get_all_addresses(&self) -> Result<Vec<Address>> {
        let addresses = self.store.get_all().map_err(storage_failure("get_all"))?;
        tracing::debug!(count = addresses.len(), "Listed addresses");
        Ok(addresses)
    }

    /// Addresses strictly within `distance` degrees (planar) of the point.
    ///
    /// NaN or infinite arguments are rejected; SQLite would bind NaN as NULL
    /// and quietly match nothing.
    pub fn get_addresses_within_distance(&self, latitude: f64, longitude: f64, distance: f64) -> Result<Vec<Address>> {
        let fields: Vec<FieldError> = [("latitude", latitude), ("longitude", longitude), ("distance", distance)]
            .into_iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(field, value)| FieldError::new(field, format!("must be a finite number, got {}", value)))
            .collect();
        if !fields.is_empty() {
            return Err(ValidationError { fields }.into());
        }

        let addresses = self
            .store
            .get_within_distance(latitude, longitude, distance)
            .map_err(storage_failure("get_within_distance"))?;
        tracing::debug!(latitude, longitude, distance, count = addresses.len(), "Proximity query");
        Ok(addresses)
    }

    pub fn count_addresses(&self) -> Result<usize> {
        self.store.count().map_err(storage_failure("count"))
    }
}

/// Log a storage failure before handing it up unchanged
fn storage_failure(operation: &'static str) -> impl Fn(Error) -> Error {
    move |err| {
        tracing::error!(operation, error = %err, "Address storage failure");
        err
    }
}
