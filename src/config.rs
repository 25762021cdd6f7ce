//! Store selection from command-line flags and the environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::Database;
use crate::rest::RestStoreBuilder;
use crate::store::ContentStore;
use crate::utils::{ensure_database_directory, get_database_path};

/// Environment variable selecting the store backend (`sqlite` or `remote`).
pub const STORE_ENV: &str = "REVKIT_STORE";

/// Environment variable overriding the default SQLite path.
pub const DB_ENV: &str = "REVKIT_DB";

/// Configuration mistakes the operator can fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--db cannot be combined with a remote store")]
    ConflictingStore,

    #[error("Unknown store '{0}' in {STORE_ENV} (expected 'sqlite' or 'remote')")]
    UnknownStore(String),
}

/// Which content store to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Local SQLite database at the given path.
    Sqlite(PathBuf),
    /// Hosted PostgREST API, configured from `SUPABASE_URL` and
    /// `SUPABASE_SERVICE_ROLE_KEY`.
    Remote,
}

impl StoreConfig {
    /// Resolves the store from CLI flags and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error on conflicting or unknown store settings, or if no
    /// default data directory exists.
    pub fn resolve(db: Option<PathBuf>, remote: bool) -> Result<Self> {
        Self::resolve_with(db, remote, |key| std::env::var(key).ok())
    }

    /// Like [`StoreConfig::resolve`], reading variables through `env`.
    ///
    /// Precedence: `--remote` or `REVKIT_STORE=remote` selects the hosted
    /// store; otherwise `--db`, then `REVKIT_DB`, then the default path.
    pub fn resolve_with(
        db: Option<PathBuf>,
        remote: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let remote = remote
            || match env(STORE_ENV) {
                None => false,
                Some(value) => match value.trim().to_lowercase().as_str() {
                    "" | "sqlite" | "local" => false,
                    "remote" | "supabase" => true,
                    _ => return Err(ConfigError::UnknownStore(value).into()),
                },
            };

        if remote {
            if db.is_some() {
                return Err(ConfigError::ConflictingStore.into());
            }
            return Ok(Self::Remote);
        }

        let path = match db.or_else(|| env(DB_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => get_database_path()?,
        };
        Ok(Self::Sqlite(path))
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the remote
    /// configuration is incomplete.
    pub fn open(&self) -> Result<Box<dyn ContentStore>> {
        match self {
            Self::Sqlite(path) => {
                ensure_database_directory(path)?;
                let db = Database::open(path)
                    .with_context(|| format!("Failed to open database: {}", path.display()))?;
                info!(path = %path.display(), "opened local store");
                Ok(Box::new(db))
            }
            Self::Remote => {
                let store = RestStoreBuilder::new().build()?;
                info!(url = store.base_url(), "using remote store");
                Ok(Box::new(store))
            }
        }
    }
}
