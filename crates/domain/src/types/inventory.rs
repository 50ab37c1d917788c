//! Inventory cache types
//!
//! The remote listing is authoritative; these records are a disposable local
//! mirror that can be rebuilt at any time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SellerDeskError;

/// One FBA inventory summary as cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub title: String,
    pub total_quantity: i64,
    pub fulfillable_quantity: i64,
    pub inbound_receiving_quantity: i64,
    pub inbound_shipped_quantity: i64,
    pub sku: String,
    pub asin: String,
    /// The FBA inventory summaries listing carries no UPC, so records built
    /// from it leave this `None`. Other sources may fill it in.
    pub upc: Option<String>,
}

/// A single page of the remote inventory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryPage {
    pub records: Vec<InventoryRecord>,
    /// Continuation token; `None` or empty means this was the last page.
    pub next_token: Option<String>,
}

impl InventoryPage {
    /// Token to pass to the next request, if there is another page.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Columns the search projection can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Title,
    TotalQuantity,
    FulfillableQuantity,
    InboundReceivingQuantity,
    InboundShippedQuantity,
}

impl SortColumn {
    /// Column name in the cache tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::TotalQuantity => "total_quantity",
            Self::FulfillableQuantity => "fulfillable_quantity",
            Self::InboundReceivingQuantity => "inbound_receiving_quantity",
            Self::InboundShippedQuantity => "inbound_shipped_quantity",
        }
    }

    /// Whether the column holds a quantity.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Title)
    }
}

impl FromStr for SortColumn {
    type Err = SellerDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "total_quantity" => Ok(Self::TotalQuantity),
            "fulfillable_quantity" => Ok(Self::FulfillableQuantity),
            "inbound_receiving_quantity" => Ok(Self::InboundReceivingQuantity),
            "inbound_shipped_quantity" => Ok(Self::InboundShippedQuantity),
            other => Err(SellerDeskError::InvalidInput(format!("unknown sort column: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort key written as `<column>_<asc|desc>`, e.g. `title_asc` or
/// `fulfillable_quantity_desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortKey {
    #[must_use]
    pub const fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::new(SortColumn::Title, SortDirection::Asc)
    }
}

impl FromStr for SortKey {
    type Err = SellerDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let (column, direction) = normalized
            .rsplit_once('_')
            .ok_or_else(|| SellerDeskError::InvalidInput(format!("invalid sort key: {s}")))?;
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(SellerDeskError::InvalidInput(format!("invalid sort direction: {s}"))),
        };
        Ok(Self { column: column.parse()?, direction })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}_{direction}", self.column.as_str())
    }
}

/// Filter applied to the search projection.
///
/// The quantity range is inclusive and applies to `total_quantity`; a missing
/// bound leaves that side open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    pub keyword: Option<String>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub sort: SortKey,
}

impl InventoryQuery {
    /// Build a query, treating a blank keyword as "no text filter".
    ///
    /// # Errors
    /// Returns `SellerDeskError::InvalidInput` when `min_quantity` exceeds
    /// `max_quantity`.
    pub fn new(
        keyword: &str,
        min_quantity: Option<i64>,
        max_quantity: Option<i64>,
        sort: SortKey,
    ) -> Result<Self, SellerDeskError> {
        if let (Some(min), Some(max)) = (min_quantity, max_quantity) {
            if min > max {
                return Err(SellerDeskError::InvalidInput(format!(
                    "min quantity {min} is greater than max quantity {max}"
                )));
            }
        }
        let keyword = keyword.trim();
        Ok(Self {
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            min_quantity,
            max_quantity,
            sort,
        })
    }
}

/// Summary of one cache build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Base table already held rows and the fetch was skipped.
    pub reused: bool,
    pub pages_fetched: usize,
    pub records_fetched: usize,
    /// Paging stopped early on a transient parse error.
    pub truncated: bool,
    /// Rows written to the search projection, zero if it was already current.
    pub rows_indexed: usize,
}
