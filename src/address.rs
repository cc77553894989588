//! Address types
//!
//! The same entity has two shapes at the boundary:
//! - `AddressPayload`: client-supplied fields, no `id`
//! - `Address`: the stored record, payload fields plus the storage-assigned `id`

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Valid latitude range in degrees
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Fields accepted on create and update.
///
/// Updates replace every field; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPayload {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    /// Degrees, within [-90, 90]
    pub latitude: f64,
    /// Degrees, within [-180, 180]
    pub longitude: f64,
}

impl AddressPayload {
    /// Check the coordinate ranges, reporting every offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();

        if !LATITUDE_RANGE.contains(&self.latitude) {
            fields.push(FieldError::new(
                "latitude",
                format!("must be between -90 and 90, got {}", self.latitude),
            ));
        }
        if !LONGITUDE_RANGE.contains(&self.longitude) {
            fields.push(FieldError::new(
                "longitude",
                format!("must be between -180 and 180, got {}", self.longitude),
            ));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}

/// A stored address record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Assigned by storage on insert, never changes afterwards
    pub id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Address {
    /// Attach a storage-assigned id to a payload
    pub fn from_payload(id: i64, payload: AddressPayload) -> Self {
        Self {
            id,
            street: payload.street,
            city: payload.city,
            state: payload.state,
            country: payload.country,
            postal_code: payload.postal_code,
            latitude: payload.latitude,
            longitude: payload.longitude,
        }
    }

    /// The record without its id
    pub fn payload(&self) -> AddressPayload {
        AddressPayload {
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            postal_code: self.postal_code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Payload rejected at the boundary, with per-field detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Validation failed: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}
