//! Inventory monitoring use-case service.

use super::ServiceResult;
use crate::model::LowStockDrug;
use crate::repo::drug_repo::DrugRepository;

/// Threshold used when the caller does not supply one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Use-case service wrapper for stock monitoring.
pub struct InventoryService<R: DrugRepository> {
    repo: R,
}

impl<R: DrugRepository> InventoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Drugs whose stored quantity is strictly below `threshold`, lowest
    /// stock first.
    pub fn low_stock_drugs(&self, threshold: i64) -> ServiceResult<Vec<LowStockDrug>> {
        Ok(self.repo.list_low_stock(threshold)?)
    }
}
