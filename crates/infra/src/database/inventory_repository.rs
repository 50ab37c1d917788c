//! SQLite-backed implementation of the `InventoryCache` port.
//!
//! Two tables are involved: `fba_inventory` (the base table, one row per
//! remote summary) and `inventory_search` (an FTS5 projection that every
//! query reads). Writes to either table always run inside a single
//! transaction so the projection is never observed half-built.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection, Row, ToSql, Transaction};
use sellerdesk_core::InventoryCache;
use sellerdesk_domain::constants::INVENTORY_INSERT_BATCH_SIZE;
use sellerdesk_domain::{InventoryQuery, InventoryRecord, Result, SellerDeskError};
use tokio::task;
use tracing::{debug, info};

use super::manager::{map_sql_error, DbManager};

const RECORD_COLUMNS: &str = "title, total_quantity, fulfillable_quantity, \
    inbound_receiving_quantity, inbound_shipped_quantity, sku, asin, upc";
const COLUMN_COUNT: usize = 8;

const PROJECTION_FROM_BASE_SQL: &str = "INSERT INTO inventory_search (title, total_quantity, \
    fulfillable_quantity, inbound_receiving_quantity, inbound_shipped_quantity, sku, asin, upc) \
    SELECT title, total_quantity, fulfillable_quantity, inbound_receiving_quantity, \
    inbound_shipped_quantity, sku, asin, upc FROM fba_inventory ORDER BY id";

/// SQLite repository for the inventory base table and search projection.
pub struct SqliteInventoryRepository {
    db: Arc<DbManager>,
}

impl SqliteInventoryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Rows currently in the search projection.
    pub async fn search_index_count(&self) -> Result<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<usize> {
            let conn = db.get_connection()?;
            count_rows(&conn, "inventory_search")
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl InventoryCache for SqliteInventoryRepository {
    async fn record_count(&self) -> Result<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<usize> {
            let conn = db.get_connection()?;
            count_rows(&conn, "fba_inventory")
        })
        .await
        .map_err(map_join_error)?
    }

    async fn replace_records(&self, records: Vec<InventoryRecord>) -> Result<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            tx.execute("DELETE FROM fba_inventory", []).map_err(map_sql_error)?;
            insert_batched(&tx, "fba_inventory", &records)?;

            tx.execute("DELETE FROM inventory_search", []).map_err(map_sql_error)?;
            let indexed = insert_batched(&tx, "inventory_search", &records)?;

            tx.commit().map_err(map_sql_error)?;
            info!(rows = indexed, "Inventory base table replaced and projection rebuilt");
            Ok(indexed)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn rebuild_search_index(&self) -> Result<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            tx.execute("DELETE FROM inventory_search", []).map_err(map_sql_error)?;
            let indexed = tx.execute(PROJECTION_FROM_BASE_SQL, []).map_err(map_sql_error)?;

            tx.commit().map_err(map_sql_error)?;
            info!(rows = indexed, "Search projection rebuilt from base table");
            Ok(indexed)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn search(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>> {
        let db = Arc::clone(&self.db);
        let query = query.clone();
        task::spawn_blocking(move || -> Result<Vec<InventoryRecord>> {
            let conn = db.get_connection()?;
            search_projection(&conn, &query)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(map_sql_error)?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Multi-row inserts of at most `INVENTORY_INSERT_BATCH_SIZE` records each.
fn insert_batched(tx: &Transaction<'_>, table: &str, records: &[InventoryRecord]) -> Result<usize> {
    let mut inserted = 0;
    for (batch_index, chunk) in records.chunks(INVENTORY_INSERT_BATCH_SIZE).enumerate() {
        let placeholders = vec![row_placeholders(); chunk.len()].join(", ");
        let sql = format!("INSERT INTO {table} ({RECORD_COLUMNS}) VALUES {placeholders}");

        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(chunk.len() * COLUMN_COUNT);
        for record in chunk {
            values.extend_from_slice(&[
                &record.title as &dyn ToSql,
                &record.total_quantity,
                &record.fulfillable_quantity,
                &record.inbound_receiving_quantity,
                &record.inbound_shipped_quantity,
                &record.sku,
                &record.asin,
                &record.upc,
            ]);
        }

        inserted += tx.execute(&sql, params_from_iter(values)).map_err(map_sql_error)?;
        debug!(table, batch = batch_index + 1, rows = chunk.len(), "Inserted batch");
    }
    Ok(inserted)
}

fn row_placeholders() -> String {
    format!("({})", vec!["?"; COLUMN_COUNT].join(", "))
}

fn search_projection(conn: &Connection, query: &InventoryQuery) -> Result<Vec<InventoryRecord>> {
    let mut sql = String::from(
        "SELECT title, CAST(total_quantity AS INTEGER), CAST(fulfillable_quantity AS INTEGER), \
         CAST(inbound_receiving_quantity AS INTEGER), CAST(inbound_shipped_quantity AS INTEGER), \
         sku, asin, upc FROM inventory_search",
    );
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(keyword) = query.keyword.as_deref() {
        if let Some(expression) = match_expression(keyword) {
            clauses.push("inventory_search MATCH ?");
            values.push(Box::new(expression));
        }
    }
    if let Some(min) = query.min_quantity {
        clauses.push("CAST(total_quantity AS INTEGER) >= ?");
        values.push(Box::new(min));
    }
    if let Some(max) = query.max_quantity {
        clauses.push("CAST(total_quantity AS INTEGER) <= ?");
        values.push(Box::new(max));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let column = query.sort.column;
    let direction = query.sort.direction.as_sql();
    let order = if column.is_numeric() {
        format!("CAST({} AS INTEGER) {direction}, title ASC", column.as_str())
    } else {
        format!("title {direction}")
    };
    sql.push_str(&format!(" ORDER BY {order}, rowid ASC"));

    let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter().map(|v| v.as_ref())), map_record_row)
        .map_err(map_sql_error)?;

    let records = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?;
    debug!(matches = records.len(), sort = %query.sort, "Inventory search complete");
    Ok(records)
}

/// Quote every whitespace-separated term so user input is never parsed as
/// FTS5 syntax. Terms are implicitly AND-ed.
fn match_expression(keyword: &str) -> Option<String> {
    let terms: Vec<String> = keyword
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    (!terms.is_empty()).then(|| terms.join(" "))
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        title: row.get(0)?,
        total_quantity: row.get(1)?,
        fulfillable_quantity: row.get(2)?,
        inbound_receiving_quantity: row.get(3)?,
        inbound_shipped_quantity: row.get(4)?,
        sku: row.get(5)?,
        asin: row.get(6)?,
        upc: row.get(7)?,
    })
}

fn map_join_error(err: task::JoinError) -> SellerDeskError {
    SellerDeskError::Internal(format!("database task failed: {err}"))
}
