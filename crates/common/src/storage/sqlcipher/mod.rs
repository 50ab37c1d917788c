//! SQLCipher backend implementation
//!
//! Provides an r2d2-based connection pool for SQLite/SQLCipher databases.

pub mod cipher;
pub mod config;
pub mod pool;
pub mod pragmas;

pub use cipher::{apply_key, verify_readable};
pub use config::SqlCipherPoolConfig;
pub use pool::{PooledConnection, SqlCipherPool};
pub use pragmas::apply_connection_pragmas;
