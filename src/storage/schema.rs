//! Database schema definitions

/// SQL to create the addresses table
pub const CREATE_ADDRESSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    street TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    country TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL
)
"#;

/// Column list shared by every SELECT, in `row_to_address` order
pub const ADDRESS_COLUMNS: &str =
    "id, street, city, state, country, postal_code, latitude, longitude";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_ADDRESSES_TABLE]
}
