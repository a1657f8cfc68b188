//! Shared application state for the HTTP layer.
//!
//! `CoreState` is created once at startup, wrapped in `Arc`, and handed to
//! the router. It holds no open connection: every request opens its own
//! connection to the database file, so concurrent writers are serialized by
//! SQLite rather than by a process-wide lock.

use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::ServerConfig;
use crate::db;
use crate::models::enums::Role;

pub struct CoreState {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory under which uploaded test files are stored.
    pub uploads_dir: PathBuf,
}

impl CoreState {
    /// Prepare the data directories and bring the schema up to date.
    pub fn initialize(db_path: &Path, uploads_dir: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(uploads_dir)?;

        // Runs pending migrations; the connection itself is not kept.
        db::open_database(db_path)?;
        tracing::info!(db_path = %db_path.display(), "Database ready");

        Ok(Self {
            db_path: db_path.to_path_buf(),
            uploads_dir: uploads_dir.to_path_buf(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreError> {
        Self::initialize(&config.db_path, &config.uploads_dir)
    }

    /// Open a connection for one request.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::connect(&self.db_path).map_err(CoreError::Database)
    }

    /// Path under which an upload with the given stored name is kept.
    pub fn upload_path(&self, stored_name: &str) -> PathBuf {
        self.uploads_dir.join(stored_name)
    }

    /// Record one data access in the audit trail.
    pub fn log_access(&self, source: &AccessSource, action: &str, outcome: &str) {
        tracing::info!(target: "audit", %source, action, outcome, "API access");
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Who made a request, for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSource {
    /// No (valid) session headers.
    Anonymous,
    User { role: Role, external_id: String },
}

impl fmt::Display for AccessSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::User { role, external_id } => write!(f, "{role}:{external_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_creates_directories_and_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("data").join("carelink.db");
        let uploads = tmp.path().join("uploads");

        let core = CoreState::initialize(&db_path, &uploads).unwrap();

        assert!(db_path.exists());
        assert!(uploads.is_dir());
        let conn = core.open_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 7);
    }

    #[test]
    fn initialize_twice_is_safe() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("carelink.db");
        let uploads = tmp.path().join("uploads");

        CoreState::initialize(&db_path, &uploads).unwrap();
        assert!(CoreState::initialize(&db_path, &uploads).is_ok());
    }

    #[test]
    fn upload_path_is_under_uploads_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let core =
            CoreState::initialize(&tmp.path().join("c.db"), &tmp.path().join("uploads")).unwrap();
        let path = core.upload_path("abc_cbc.pdf");
        assert!(path.starts_with(&core.uploads_dir));
        assert!(path.ends_with("abc_cbc.pdf"));
    }

    #[test]
    fn access_source_display() {
        assert_eq!(AccessSource::Anonymous.to_string(), "anonymous");
        let user = AccessSource::User {
            role: Role::Doctor,
            external_id: "doctor_3".into(),
        };
        assert_eq!(user.to_string(), "doctor:doctor_3");
    }
}
