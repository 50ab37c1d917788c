//! JSON store of learned prep and label ownership requirements
//!
//! Format: a pretty-printed object keyed by SKU.
//!
//! ```json
//! {
//!   "SKU-1": { "prep_owner": "SELLER", "label_owner": "NONE" }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sellerdesk_core::PrepRequirementRepository;
use sellerdesk_domain::{PrepRequirements, Result, SellerDeskError};
use tracing::{debug, info};

use super::atomic::write_atomic;

/// [`PrepRequirementRepository`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonPrepRequirementRepository {
    path: PathBuf,
}

impl JsonPrepRequirementRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrepRequirementRepository for JsonPrepRequirementRepository {
    fn load(&self) -> Result<PrepRequirements> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No requirement store yet, starting empty");
                return Ok(PrepRequirements::new());
            }
            Err(err) => {
                return Err(SellerDeskError::Persistence(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(PrepRequirements::new());
        }

        let requirements: PrepRequirements = serde_json::from_str(&content).map_err(|e| {
            SellerDeskError::Persistence(format!("corrupt requirement store {}: {e}", self.path.display()))
        })?;
        debug!(skus = requirements.len(), "Loaded prep requirements");
        Ok(requirements)
    }

    fn save(&self, requirements: &PrepRequirements) -> Result<()> {
        let json = serde_json::to_string_pretty(requirements)
            .map_err(|e| SellerDeskError::Internal(format!("serialize requirements: {e}")))?;
        write_atomic(&self.path, json.as_bytes()).map_err(|e| {
            SellerDeskError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })?;
        info!(skus = requirements.len(), path = %self.path.display(), "Saved prep requirements");
        Ok(())
    }
}
