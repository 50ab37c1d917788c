//! Integration tests for the SQLite connection pool

#![cfg(feature = "platform")]

use sellerdesk_common::storage::{SqlCipherPool, SqlCipherPoolConfig, StorageError};
use tempfile::TempDir;

/// Validates data written through one pooled connection is visible through
/// another after reopening the pool with the same key.
///
/// # Test Steps
/// 1. Create an encrypted pool and insert a row
/// 2. Drop the pool and reopen with the same key
/// 3. Verify the row is readable
/// 4. Reopen without a key and verify it is rejected
#[test]
fn test_encrypted_database_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("inventory.db");
    let key = Some("correct horse battery staple".to_string());

    {
        let pool = SqlCipherPool::new(&path, key.clone(), SqlCipherPoolConfig::default()).unwrap();
        assert!(pool.is_encrypted());
        let conn = pool.get().unwrap();
        conn.execute_batch("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT); INSERT INTO kv VALUES ('a', 'b');")
            .unwrap();
    }

    let pool = SqlCipherPool::new(&path, key, SqlCipherPoolConfig::default()).unwrap();
    let conn = pool.get().unwrap();
    let v: String = conn.query_row("SELECT v FROM kv WHERE k = 'a'", [], |r| r.get(0)).unwrap();
    assert_eq!(v, "b");
    drop(conn);
    drop(pool);

    let config = SqlCipherPoolConfig {
        connection_timeout: std::time::Duration::from_millis(500),
        ..SqlCipherPoolConfig::default()
    };
    let err = SqlCipherPool::new(&path, None, config).unwrap_err();
    assert!(
        matches!(err, StorageError::WrongKeyOrNotEncrypted | StorageError::Connection(_)),
        "unexpected error {err:?}"
    );
}

#[test]
fn test_plain_pool_respects_max_size() {
    let temp = TempDir::new().unwrap();
    let config = SqlCipherPoolConfig { max_size: 2, ..SqlCipherPoolConfig::default() };
    let pool = SqlCipherPool::new(&temp.path().join("plain.db"), None, config).unwrap();

    assert!(!pool.is_encrypted());
    assert_eq!(pool.max_size(), 2);
    let a = pool.get().unwrap();
    let b = pool.get().unwrap();
    drop((a, b));
}
