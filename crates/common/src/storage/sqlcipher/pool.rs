//! SQLCipher connection pool
//!
//! Provides r2d2-based connection pooling for SQLite databases, optionally
//! encrypted with SQLCipher.

use std::path::{Path, PathBuf};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::cipher::{apply_key, verify_readable};
use super::config::SqlCipherPoolConfig;
use super::pragmas::apply_connection_pragmas;
use crate::storage::error::{classify_open_error, StorageError, StorageResult};

/// Connection checked out of the pool. Derefs to [`rusqlite::Connection`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// SQLite connection pool
///
/// Every connection gets the key (when configured) and the pragmas from
/// [`SqlCipherPoolConfig`] before it is handed out.
#[derive(Debug)]
pub struct SqlCipherPool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlCipherPoolConfig,
    path: PathBuf,
    encrypted: bool,
}

impl SqlCipherPool {
    /// Create a new connection pool
    ///
    /// # Arguments
    /// * `path` - Path to the database file
    /// * `encryption_key` - SQLCipher key, `None` for a plain database
    /// * `config` - Pool configuration
    ///
    /// # Errors
    /// Returns an error if:
    /// - Database file can't be accessed
    /// - Encryption key is wrong
    /// - Pool creation fails
    #[instrument(skip(encryption_key, config), fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(
        path: &Path,
        encryption_key: Option<String>,
        config: SqlCipherPoolConfig,
    ) -> StorageResult<Self> {
        config.validate()?;
        info!("Creating SQLite connection pool");

        let encrypted = encryption_key.is_some();
        let pool_config = config.clone();

        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            if let Some(key) = encryption_key.as_deref() {
                apply_key(conn, key)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            }
            apply_connection_pragmas(conn, &pool_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!("Failed to create connection pool: {}", e);
                classify_open_error(&e.to_string())
            })?;

        {
            let conn = pool.get().map_err(|e| classify_open_error(&e.to_string()))?;
            verify_readable(&conn)?;
            debug!(encrypted, "Database verified readable");
        }

        info!("SQLite pool created successfully with {} connections", config.max_size);

        Ok(Self { pool, config, path: path.to_path_buf(), encrypted })
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns `StorageError::Connection` when the pool times out.
    pub fn get(&self) -> StorageResult<PooledConnection> {
        self.pool.get().map_err(|e| {
            warn!(error = %e, "Failed to acquire pooled connection");
            StorageError::Connection(format!("Failed to get connection: {e}"))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn max_size(&self) -> u32 {
        self.config.max_size
    }

    /// Connections currently idle in the pool.
    pub fn idle_connections(&self) -> u32 {
        self.pool.state().idle_connections
    }
}
