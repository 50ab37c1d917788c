//! Storage primitives for SQLite databases
//!
//! Provides an r2d2 pool of SQLite connections. The bundled library is
//! SQLCipher, so a database can optionally be encrypted by configuring a key.

pub mod error;
pub mod sqlcipher;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use sqlcipher::{apply_connection_pragmas, PooledConnection, SqlCipherPool, SqlCipherPoolConfig};
