use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "address_book.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Settings read from `addressbook.toml`. Unset fields fall back to defaults;
/// CLI flags take precedence over both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AddressBookConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AddressBookConfig {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.as_deref().unwrap_or(DEFAULT_DATABASE))
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("addressbook.toml")
}

/// Load the config file, or `None` when it doesn't exist
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<AddressBookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AddressBookConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Serialize `config` to `path`. An existing file is only replaced with `force`.
pub fn write_config(path: &Path, config: &AddressBookConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Create the directory that will hold the database file, if missing
pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = AddressBookConfig::default();
        assert_eq!(config.database_path(), PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("addressbook.toml");
        let config = AddressBookConfig {
            database: Some("data/book.db".to_string()),
            host: None,
            port: Some(9090),
        };

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.port(), 9090);
        assert_eq!(loaded.host(), DEFAULT_HOST);
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("addressbook.toml");
        let config = AddressBookConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &config, true).is_ok());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("addressbook.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_ensure_db_dir_creates_missing_parents() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("data").join("nested").join("book.db");

        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
        // Idempotent, and a bare file name has no directory to create
        ensure_db_dir(&db).unwrap();
        ensure_db_dir(Path::new("book.db")).unwrap();

        let service = crate::AddressService::open(&db).unwrap();
        assert!(service.get_all_addresses().unwrap().is_empty());
    }
}
