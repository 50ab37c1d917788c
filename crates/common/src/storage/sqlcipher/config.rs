//! Pool settings and the per-connection pragmas derived from them

use std::time::Duration;

use crate::storage::error::{StorageError, StorageResult};

/// Settings for [`SqlCipherPool`](super::SqlCipherPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCipherPoolConfig {
    pub max_size: u32,
    /// How long `get()` waits for a free connection.
    pub connection_timeout: Duration,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Readers keep seeing the last committed cache while a rebuild
    /// transaction is open only in WAL mode.
    pub enable_wal: bool,
    pub enable_foreign_keys: bool,
}

impl Default for SqlCipherPoolConfig {
    fn default() -> Self {
        Self {
            max_size: 4,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl SqlCipherPoolConfig {
    /// # Errors
    /// `InvalidConfig` for an empty pool or a zero connection timeout.
    pub fn validate(&self) -> StorageResult<()> {
        if self.max_size == 0 {
            return Err(StorageError::InvalidConfig("max_size must be at least 1".into()));
        }
        if self.connection_timeout.is_zero() {
            return Err(StorageError::InvalidConfig("connection_timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// Pragmas run on every new connection, in order.
    pub fn pragma_batch(&self) -> String {
        let mut statements = Vec::with_capacity(4);
        if self.enable_wal {
            statements.push("PRAGMA journal_mode = WAL;");
        }
        statements.push("PRAGMA synchronous = NORMAL;");
        statements.push(if self.enable_foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        });
        statements.join("\n")
    }
}
