//! SQLite storage implementation

use std::path::{Path, PathBuf};
use std::time::Duration;
use rusqlite::{Connection, params, OptionalExtension};
use crate::Result;
use crate::address::{Address, AddressPayload};
use super::schema::{self, ADDRESS_COLUMNS};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed storage for address records.
///
/// Holds only the database path. Every operation opens its own connection,
/// runs a single statement and drops the connection on return, error or not.
#[derive(Debug, Clone)]
pub struct AddressStore {
    path: PathBuf,
}

impl AddressStore {
    /// Open a database file (creates the file and table if they don't exist).
    ///
    /// The parent directory must already exist; see `config::ensure_db_dir`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { path: path.as_ref().to_path_buf() };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Write Operations ==========

    /// Insert a new address and return its assigned id.
    ///
    /// No duplicate detection: identical payloads produce distinct rows.
    pub fn add(&self, payload: &AddressPayload) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO addresses (street, city, state, country, postal_code, latitude, longitude)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                payload.street,
                payload.city,
                payload.state,
                payload.country,
                payload.postal_code,
                payload.latitude,
                payload.longitude,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every field of the row with `id`.
    ///
    /// Returns `false` when no row matched; a missing id is not an error here.
    pub fn update(&self, id: i64, payload: &AddressPayload) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute(
            r#"
            UPDATE addresses
            SET street = ?1, city = ?2, state = ?3, country = ?4, postal_code = ?5,
                latitude = ?6, longitude = ?7
            WHERE id = ?8
            "#,
            params![
                payload.street,
                payload.city,
                payload.state,
                payload.country,
                payload.postal_code,
                payload.latitude,
                payload.longitude,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Remove the row with `id`. Returns `false` when no row matched.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM addresses WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ========== Read Operations ==========

    /// Get an address by id
    pub fn get_by_id(&self, id: i64) -> Result<Option<Address>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = ?1");
        conn.query_row(&sql, [id], row_to_address)
            .optional()
            .map_err(Into::into)
    }

    /// Get every address, ordered by id
    pub fn get_all(&self) -> Result<Vec<Address>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let addresses = stmt
            .query_map([], row_to_address)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(addresses)
    }

    /// Get every address strictly inside `distance` of (`latitude`, `longitude`).
    ///
    /// Distance is planar: degrees are treated as Cartesian coordinates, so
    /// the predicate is `(lat - latitude)^2 + (lon - longitude)^2 < distance^2`.
    /// Points exactly on the boundary are excluded.
    pub fn get_within_distance(&self, latitude: f64, longitude: f64, distance: f64) -> Result<Vec<Address>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE (latitude - ?1) * (latitude - ?1) + (longitude - ?2) * (longitude - ?2) < ?3 * ?3
             ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let addresses = stmt
            .query_map(params![latitude, longitude, distance], row_to_address)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(addresses)
    }

    /// Count all addresses
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM addresses", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row to an Address
fn row_to_address(row: &rusqlite::Row) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(0)?,
        street: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        country: row.get(4)?,
        postal_code: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, AddressStore) {
        let dir = TempDir::new().unwrap();
        let store = AddressStore::open(dir.path().join("addresses.db")).unwrap();
        (dir, store)
    }

    fn sample_payload(street: &str, latitude: f64, longitude: f64) -> AddressPayload {
        AddressPayload {
            street: street.to_string(),
            city: "Lisbon".to_string(),
            state: "Lisboa".to_string(),
            country: "PT".to_string(),
            postal_code: "1100-148".to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_address_crud() {
        let (_dir, store) = open_temp();

        let payload = sample_payload("Rua Augusta 1", 38.71, -9.14);
        let id = store.add(&payload).unwrap();

        let retrieved = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(retrieved.id, id);
        assert_eq!(retrieved.payload(), payload);

        let replacement = sample_payload("Rua do Ouro 2", 38.70, -9.13);
        assert!(store.update(id, &replacement).unwrap());
        let updated = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(updated, Address::from_payload(id, replacement));

        assert!(store.delete(id).unwrap());
        assert!(store.get_by_id(id).unwrap().is_none());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_id_is_silent() {
        let (_dir, store) = open_temp();

        assert!(store.get_by_id(42).unwrap().is_none());
        assert!(!store.update(42, &sample_payload("x", 0.0, 0.0)).unwrap());
        assert!(!store.delete(42).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_duplicates_get_distinct_ids() {
        let (_dir, store) = open_temp();

        let payload = sample_payload("Same St", 1.0, 1.0);
        let a = store.add(&payload).unwrap();
        let b = store.add(&payload).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_reopen_is_idempotent_and_persistent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.db");

        let id = AddressStore::open(&path).unwrap().add(&sample_payload("Keep", 5.0, 5.0)).unwrap();

        let reopened = AddressStore::open(&path).unwrap();
        assert_eq!(reopened.get_by_id(id).unwrap().unwrap().street, "Keep");
    }

    #[test]
    fn test_within_distance_scenario() {
        let (_dir, store) = open_temp();

        let origin = store.add(&sample_payload("origin", 0.0, 0.0)).unwrap();
        let near = store.add(&sample_payload("near", 1.0, 1.0)).unwrap();
        store.add(&sample_payload("far", 10.0, 10.0)).unwrap();

        let ids: Vec<i64> = store
            .get_within_distance(0.0, 0.0, 2.0)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![origin, near]);
    }

    #[test]
    fn test_within_distance_excludes_boundary() {
        let (_dir, store) = open_temp();

        // Exactly 3 away in latitude: 9 < 9 is false
        store.add(&sample_payload("edge", 3.0, 0.0)).unwrap();
        // 3-4-5 triangle, exactly on a radius-5 circle
        store.add(&sample_payload("hyp", 3.0, 4.0)).unwrap();

        assert!(store.get_within_distance(0.0, 0.0, 3.0).unwrap().is_empty());
        let inside_five = store.get_within_distance(0.0, 0.0, 5.0).unwrap();
        assert_eq!(inside_five.len(), 1);
        assert_eq!(inside_five[0].street, "edge");
    }

    #[test]
    fn test_within_distance_is_planar() {
        let (_dir, store) = open_temp();

        // Near the pole a degree of longitude is tiny on the ground, but
        // the planar predicate still counts it as a full degree.
        store.add(&sample_payload("polar", 89.0, 10.0)).unwrap();
        assert!(store.get_within_distance(89.0, 0.0, 5.0).unwrap().is_empty());
        assert_eq!(store.get_within_distance(89.0, 0.0, 10.5).unwrap().len(), 1);
    }

    #[test]
    fn test_parameters_are_not_interpolated() {
        let (_dir, store) = open_temp();

        let hostile = sample_payload("'); DROP TABLE addresses; --", 0.0, 0.0);
        let id = store.add(&hostile).unwrap();
        assert_eq!(store.get_by_id(id).unwrap().unwrap().street, hostile.street);
        assert_eq!(store.count().unwrap(), 1);
    }
}
