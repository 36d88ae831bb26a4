//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default                              |
//! |-----------------------------|--------------------------------------|
//! | `HEROSTORE_DB_PATH`         | `<platform data dir>/herostore.db`   |
//! | `HEROSTORE_MAX_CONNECTIONS` | `5`                                  |
//! | `HEROSTORE_STORE_NAME`      | `Hero Store`                         |
//! | `HEROSTORE_EXPORT_DIR`      | current directory                    |

use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use herostore_core::DEFAULT_STORE_NAME;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Title of the PDF report
    pub store_name: String,

    /// Where `export` writes when no output file is given
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("HEROSTORE_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let max_connections = lookup("HEROSTORE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| ConfigError::InvalidValue("HEROSTORE_MAX_CONNECTIONS".to_string()))?;

        let store_name = lookup("HEROSTORE_STORE_NAME")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string());

        let export_dir = lookup("HEROSTORE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(AppConfig {
            db_path,
            max_connections,
            store_name,
            export_dir,
        })
    }
}

/// Platform data directory.
///
/// - **macOS**: `~/Library/Application Support/com.herostore.herostore/herostore.db`
/// - **Windows**: `%APPDATA%\herostore\herostore\data\herostore.db`
/// - **Linux**: `~/.local/share/herostore/herostore.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "herostore", "herostore").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("herostore.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set HEROSTORE_DB_PATH")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("HEROSTORE_DB_PATH", "/tmp/hs.db")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/hs.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.store_name, "Hero Store");
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HEROSTORE_DB_PATH", "shop.db"),
            ("HEROSTORE_MAX_CONNECTIONS", "2"),
            ("HEROSTORE_STORE_NAME", "Avengers Outlet"),
            ("HEROSTORE_EXPORT_DIR", "/srv/exports"),
        ])
        .unwrap();
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.store_name, "Avengers Outlet");
        assert_eq!(config.export_dir, PathBuf::from("/srv/exports"));
    }

    #[test]
    fn test_invalid_pool_size() {
        for bad in ["zero", "0", "-1"] {
            let err = config(&[("HEROSTORE_DB_PATH", "x.db"), ("HEROSTORE_MAX_CONNECTIONS", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "HEROSTORE_MAX_CONNECTIONS"));
        }
    }
}
