//! Stock levels, batches and the transaction ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Active,
    Expired,
    Quarantine,
    WrittenOff,
    Returned,
    #[serde(other)]
    Unknown,
}

/// One received batch at one location. Status is computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBatch {
    #[serde(default)]
    pub id: Option<Id>,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    pub location_id: Id,
    #[serde(default)]
    pub location_name: Option<String>,
    pub batch_no: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_qty: f64,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default = "active_status")]
    pub status: BatchStatus,
}

impl StockBatch {
    /// Days until expiry relative to `today`; negative once expired.
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|d| (d - today).num_days())
    }
}

fn active_status() -> BatchStatus {
    BatchStatus::Active
}

/// Aggregated stock for one item (optionally per location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummaryRow {
    pub item_id: Id,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default, alias = "current_qty")]
    pub total_qty: f64,
    #[serde(default)]
    pub reorder_level: Option<f64>,
    #[serde(default)]
    pub max_level: Option<f64>,
    #[serde(default)]
    pub stock_value: Option<f64>,
    #[serde(default)]
    pub nearest_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockFilter {
    pub location_id: Option<Id>,
    pub item_id: Option<Id>,
    pub q: Option<String>,
}

/// Filter for expiry-window alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpiryFilter {
    pub location_id: Option<Id>,
    /// Window in days for near-expiry batches.
    pub days: Option<u32>,
}

/// Immutable audit entry for a stock movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Id,
    pub txn_type: String,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub batch_id: Option<Id>,
    #[serde(default)]
    pub batch_no: Option<String>,
    pub quantity_change: f64,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub ref_id: Option<Id>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionFilter {
    pub location_id: Option<Id>,
    pub item_id: Option<Id>,
    pub batch_id: Option<Id>,
    pub txn_type: Option<String>,
    pub ref_type: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// A batch offered for picking during dispense, in FEFO order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOption {
    pub batch_id: Id,
    pub batch_no: String,
    #[serde(default)]
    pub item_id: Option<Id>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub available_qty: f64,
    #[serde(default)]
    pub mrp: Option<f64>,
}
