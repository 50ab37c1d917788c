//! Connection setup run by the pool's init hook

use rusqlite::Connection;
use tracing::warn;

use super::config::SqlCipherPoolConfig;
use crate::storage::error::{StorageError, StorageResult};

/// Apply `config`'s pragmas and busy timeout to a fresh connection.
///
/// A database that cannot switch to WAL (in-memory, read-only media) keeps
/// its journal mode; that is logged, not fatal.
///
/// # Errors
/// `Query` if a pragma or the busy timeout cannot be set.
pub fn apply_connection_pragmas(conn: &Connection, config: &SqlCipherPoolConfig) -> StorageResult<()> {
    conn.execute_batch(&config.pragma_batch())
        .map_err(|e| StorageError::Query(format!("connection pragmas: {e}")))?;
    conn.busy_timeout(config.busy_timeout)
        .map_err(|e| StorageError::Query(format!("busy timeout: {e}")))?;

    if config.enable_wal {
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .map_err(|e| StorageError::Query(format!("journal_mode: {e}")))?;
        if !mode.eq_ignore_ascii_case("wal") {
            warn!(journal_mode = %mode, "WAL requested but not available");
        }
    }
    Ok(())
}
