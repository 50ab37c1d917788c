//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::params;
use sellerdesk_common::storage::{PooledConnection, SqlCipherPool, SqlCipherPoolConfig, StorageError};
use sellerdesk_domain::{DatabaseConfig, Result, SellerDeskError};
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps an [`SqlCipherPool`].
#[derive(Debug)]
pub struct DbManager {
    pool: Arc<SqlCipherPool>,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size and optional SQLCipher
    /// key.
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        pool_size: u32,
        encryption_key: Option<&str>,
    ) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SellerDeskError::Database(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let config =
            SqlCipherPoolConfig { max_size: pool_size.max(1), ..SqlCipherPoolConfig::default() };
        let pool = SqlCipherPool::new(&path, encryption_key.map(str::to_owned), config)
            .map_err(map_storage_error)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            encrypted = pool.is_encrypted(),
            "database pool initialised"
        );

        Ok(Self { pool: Arc::new(pool), path })
    }

    /// Open the database described by `config` and apply migrations.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let manager =
            Self::new(&config.path, config.pool_size, config.encryption_key.as_deref())?;
        manager.run_migrations()?;
        Ok(manager)
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &Arc<SqlCipherPool> {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<PooledConnection> {
        self.pool.get().map_err(map_storage_error)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
            params![SCHEMA_VERSION],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_sql_error)?;
        Ok(())
    }
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> SellerDeskError {
    SellerDeskError::from(InfraError::from(err))
}

fn map_storage_error(err: StorageError) -> SellerDeskError {
    SellerDeskError::from(InfraError::from(err))
}
