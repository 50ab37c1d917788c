//! Ownership-requirement extraction from rejection text
//!
//! The remote service reports missing ownership as free text, one line per
//! offending SKU, for example:
//!
//! ```text
//! ERROR: SKU-1 requires prepOwner but NONE was assigned.
//! ERROR: SKU-2 requires labelOwner but NONE was assigned.
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use sellerdesk_domain::{OwnershipDimension, OwnershipViolation};

static OWNERSHIP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:ERROR:\s*)?([A-Za-z0-9_.\-]+) requires (prepOwner|labelOwner) but NONE was assigned")
        .expect("OWNERSHIP_PATTERN should compile - this is a bug")
});

/// Every `(sku, dimension)` pair mentioned in `text`, in order of first
/// appearance and without duplicates.
///
/// # Examples
///
/// ```
/// use sellerdesk_core::extract_ownership_violations;
/// use sellerdesk_domain::OwnershipDimension;
///
/// let found = extract_ownership_violations("SKU-1 requires labelOwner but NONE was assigned");
/// assert_eq!(found[0].sku, "SKU-1");
/// assert_eq!(found[0].dimension, OwnershipDimension::Label);
/// ```
pub fn extract_ownership_violations(text: &str) -> Vec<OwnershipViolation> {
    let mut found: Vec<OwnershipViolation> = Vec::new();
    for captures in OWNERSHIP_PATTERN.captures_iter(text) {
        let dimension = match &captures[2] {
            "prepOwner" => OwnershipDimension::Prep,
            _ => OwnershipDimension::Label,
        };
        let violation = OwnershipViolation { sku: captures[1].to_string(), dimension };
        if !found.contains(&violation) {
            found.push(violation);
        }
    }
    found
}
