use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CareLink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

const BIND_ADDR_VAR: &str = "CARELINK_BIND_ADDR";
const DB_PATH_VAR: &str = "CARELINK_DB_PATH";
const UPLOADS_DIR_VAR: &str = "CARELINK_UPLOADS_DIR";

/// Get the application data directory: `~/CareLink/`, or `./CareLink/`
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the SQLite database file
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("carelink.db")
}

/// Default directory under which uploaded test files are stored
pub fn default_uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "carelink_lib=info,tower_http=info"
}

/// Errors from reading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
}

impl ServerConfig {
    /// Read settings from `CARELINK_*` environment variables, falling back
    /// to defaults for the unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr =
            raw_addr
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    var: BIND_ADDR_VAR,
                    value: raw_addr.clone(),
                    reason: e.to_string(),
                })?;

        let db_path = lookup(DB_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let uploads_dir = lookup(UPLOADS_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_uploads_dir);

        Ok(Self {
            bind_addr,
            db_path,
            uploads_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn app_data_dir_named_after_app() {
        assert!(app_data_dir().ends_with("CareLink"));
        assert!(default_db_path().starts_with(app_data_dir()));
        assert!(default_uploads_dir().ends_with("uploads"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.db_path, default_db_path());
        assert_eq!(config.uploads_dir, default_uploads_dir());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("CARELINK_BIND_ADDR", "127.0.0.1:9000"),
            ("CARELINK_DB_PATH", "/tmp/care.db"),
            ("CARELINK_UPLOADS_DIR", "/tmp/uploads"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/care.db"));
        assert_eq!(config.uploads_dir, PathBuf::from("/tmp/uploads"));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = ServerConfig::from_lookup(lookup_from(&[("CARELINK_BIND_ADDR", "localhost")]))
            .unwrap_err();
        assert!(err.to_string().contains("CARELINK_BIND_ADDR"));
    }
}
