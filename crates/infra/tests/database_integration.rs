//! End-to-end coverage for the SQLite inventory cache.
//!
//! Each test operates on an isolated database with migrations applied and
//! drives the real repository through the core `InventoryCacheIndex`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sellerdesk_core::{InventoryCache, InventoryCacheIndex, InventorySource};
use sellerdesk_domain::{
    InventoryPage, InventoryQuery, InventoryRecord, Result, SellerDeskError, SortKey,
};
use sellerdesk_infra::database::{DbManager, SqliteInventoryRepository};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const TEST_DB_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

struct DbHarness {
    #[allow(dead_code)]
    temp_dir: TempDir,
    manager: Arc<DbManager>,
    repo: Arc<SqliteInventoryRepository>,
}

impl DbHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let db_path = temp_dir.path().join("inventory-integration.db");

        let manager = Arc::new(
            DbManager::new(&db_path, 4, Some(TEST_DB_KEY))
                .expect("database manager should initialise"),
        );
        manager.run_migrations().expect("schema migrations should apply");
        let repo = Arc::new(SqliteInventoryRepository::new(Arc::clone(&manager)));

        Self { temp_dir, manager, repo }
    }

    fn index(&self, source: Arc<StaticPages>) -> InventoryCacheIndex {
        InventoryCacheIndex::new(source, Arc::clone(&self.repo) as Arc<dyn InventoryCache>)
    }
}

/// Serves fixed pages and counts calls.
struct StaticPages {
    pages: Vec<InventoryPage>,
    calls: AtomicUsize,
}

impl StaticPages {
    fn new(pages: Vec<InventoryPage>) -> Arc<Self> {
        Arc::new(Self { pages, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for StaticPages {
    async fn fetch_page(
        &self,
        _next_token: Option<&str>,
        _cancel: &CancellationToken,
    ) -> Result<InventoryPage> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| SellerDeskError::Internal("no more pages".into()))
    }
}

fn record(sku: &str, title: &str, total: i64) -> InventoryRecord {
    InventoryRecord {
        title: title.to_string(),
        total_quantity: total,
        fulfillable_quantity: total,
        inbound_receiving_quantity: 0,
        inbound_shipped_quantity: 0,
        sku: sku.to_string(),
        asin: format!("B0{sku}"),
        upc: None,
    }
}

fn page(records: Vec<InventoryRecord>, next: Option<&str>) -> InventoryPage {
    InventoryPage { records, next_token: next.map(str::to_string) }
}

fn query(keyword: &str, min: Option<i64>, max: Option<i64>, sort: &str) -> InventoryQuery {
    InventoryQuery::new(keyword, min, max, sort.parse::<SortKey>().unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn forced_build_then_zero_quantity_query() {
    let harness = DbHarness::new();
    let source = StaticPages::new(vec![
        page(vec![record("A", "Zebra Mug", 0), record("B", "Apple Crate", 5)], Some("t1")),
        page(vec![record("C", "Mango Box", 0)], None),
    ]);
    let index = harness.index(Arc::clone(&source));

    let report = index.build(true, &CancellationToken::new()).await.unwrap();
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records_fetched, 3);
    assert_eq!(report.rows_indexed, 3);
    assert!(!report.reused);

    let results = index.query(&query("", Some(0), Some(0), "title_asc")).await.unwrap();
    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Mango Box", "Zebra Mug"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn unforced_build_with_rows_makes_no_remote_calls() {
    let harness = DbHarness::new();
    harness.repo.replace_records(vec![record("A", "Cable", 3)]).await.unwrap();
    {
        let conn = harness.manager.get_connection().unwrap();
        conn.execute("DELETE FROM inventory_search", []).unwrap();
    }

    let source = StaticPages::new(vec![page(vec![record("X", "Never", 1)], None)]);
    let report = harness.index(Arc::clone(&source)).build(false, &CancellationToken::new()).await.unwrap();

    assert_eq!(source.calls(), 0);
    assert!(report.reused);
    assert_eq!(report.rows_indexed, 1);
    assert_eq!(harness.repo.search_index_count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn keyword_range_and_numeric_sort() {
    let harness = DbHarness::new();
    harness
        .repo
        .replace_records(vec![
            record("A", "USB Cable Long", 9),
            record("B", "USB Cable Short", 10),
            record("C", "HDMI Cable", 2),
            record("D", "USB Hub", 100),
        ])
        .await
        .unwrap();

    let results = harness
        .repo
        .search(&query("usb cable", Some(1), Some(50), "total_quantity_desc"))
        .await
        .unwrap();
    let skus: Vec<_> = results.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, vec!["B", "A"]);
    assert_eq!(results[0].total_quantity, 10);

    let unbounded = harness.repo.search(&query("", None, None, "total_quantity_asc")).await.unwrap();
    assert_eq!(unbounded.first().map(|r| r.sku.as_str()), Some("C"));
    assert_eq!(unbounded.last().map(|r| r.sku.as_str()), Some("D"));
}

#[tokio::test(flavor = "multi_thread")]
async fn keyword_with_fts_syntax_is_treated_literally() {
    let harness = DbHarness::new();
    harness.repo.replace_records(vec![record("A", "Cable OR Cord", 1)]).await.unwrap();

    let results = harness.repo.search(&query("\"cable* NEAR(", None, None, "title_asc")).await;
    assert!(results.is_ok(), "quoted input must not be parsed as FTS syntax");
}

/// Validates all-or-nothing replacement.
///
/// Assertions:
/// - A row failure during replace leaves base and projection untouched.
#[tokio::test(flavor = "multi_thread")]
async fn failed_replace_keeps_previous_generation() {
    let harness = DbHarness::new();
    harness
        .repo
        .replace_records(vec![record("OLD-1", "Old One", 1), record("OLD-2", "Old Two", 2)])
        .await
        .unwrap();
    {
        let conn = harness.manager.get_connection().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_poison BEFORE INSERT ON fba_inventory
             WHEN NEW.sku = 'POISON'
             BEGIN SELECT RAISE(ABORT, 'poisoned row'); END;",
        )
        .unwrap();
    }

    let err = harness
        .repo
        .replace_records(vec![record("NEW-1", "New", 1), record("POISON", "Bad", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, SellerDeskError::Database(_)), "{err:?}");

    assert_eq!(harness.repo.record_count().await.unwrap(), 2);
    let titles: Vec<_> = harness
        .repo
        .search(&query("", None, None, "title_asc"))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Old One", "Old Two"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn replace_spans_multiple_insert_batches() {
    let harness = DbHarness::new();
    let records: Vec<_> =
        (0..1_203).map(|i| record(&format!("SKU-{i:04}"), &format!("Item {i}"), i % 7)).collect();

    let indexed = harness.repo.replace_records(records).await.unwrap();
    assert_eq!(indexed, 1_203);
    assert_eq!(harness.repo.record_count().await.unwrap(), 1_203);
    assert_eq!(harness.repo.search_index_count().await.unwrap(), 1_203);
}
