//! SQLCipher key handling
//!
//! The key pragma must be the first statement on a fresh connection.
//! Connections opened without a key behave as plain SQLite.

use rusqlite::Connection;
use tracing::{debug, error};

use crate::storage::error::{classify_open_error, StorageError, StorageResult};

/// Apply the SQLCipher key and compatibility settings.
///
/// # Errors
/// Returns an error if any pragma fails to apply
pub fn apply_key(conn: &Connection, key: &str) -> StorageResult<()> {
    conn.pragma_update(None, "key", key).map_err(|e| {
        error!(error = %e, "SQLCipher key setup failed");
        StorageError::Encryption(format!("Failed to set encryption key: {e}"))
    })?;

    // SQLCipher 4.x defaults
    conn.pragma_update(None, "cipher_compatibility", 4).map_err(|e| {
        StorageError::Encryption(format!("Failed to set cipher_compatibility: {e}"))
    })?;

    debug!("SQLCipher key applied");
    Ok(())
}

/// Force a page read so a wrong key surfaces at pool creation.
///
/// # Errors
/// Returns `WrongKeyOrNotEncrypted` if the key is wrong or the database
/// isn't encrypted
pub fn verify_readable(conn: &Connection) -> StorageResult<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
        .map_err(|e| classify_open_error(&e.to_string()))
}
