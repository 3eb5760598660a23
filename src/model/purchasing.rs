//! Purchase orders, goods receipt notes and returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Id;

// --- Purchase orders ---

/// Transitions are enforced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoStatus {
    Draft,
    Sent,
    PartiallyReceived,
    Completed,
    Cancelled,
    Closed,
    #[serde(other)]
    Unknown,
}

impl PoStatus {
    /// Wire value, as used in the `status` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Draft => "DRAFT",
            PoStatus::Sent => "SENT",
            PoStatus::PartiallyReceived => "PARTIALLY_RECEIVED",
            PoStatus::Completed => "COMPLETED",
            PoStatus::Cancelled => "CANCELLED",
            PoStatus::Closed => "CLOSED",
            PoStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoLine {
    #[serde(default)]
    pub id: Option<Id>,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    pub ordered_qty: f64,
    #[serde(default)]
    pub received_qty: f64,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub tax_percent: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Id,
    #[serde(default)]
    pub po_number: Option<String>,
    pub supplier_id: Id,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub location_id: Id,
    #[serde(default)]
    pub location_name: Option<String>,
    pub status: PoStatus,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub email_sent_to: Option<String>,
    #[serde(default)]
    pub lines: Vec<PoLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoLinePayload {
    pub item_id: Id,
    pub ordered_qty: f64,
    pub unit_cost: Option<f64>,
    pub tax_percent: Option<f64>,
    pub remarks: Option<String>,
}

/// Create and update share one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrderPayload {
    pub supplier_id: Id,
    pub location_id: Id,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<PoLinePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PoStatus>,
    pub supplier_id: Option<Id>,
    pub location_id: Option<Id>,
    pub q: Option<String>,
}

// --- GRN ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrnStatus {
    Draft,
    Posted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrnLine {
    #[serde(default)]
    pub id: Option<Id>,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    pub batch_no: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub received_qty: f64,
    #[serde(default)]
    pub free_qty: f64,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default)]
    pub tax_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grn {
    pub id: Id,
    #[serde(default)]
    pub grn_number: Option<String>,
    pub supplier_id: Id,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub location_id: Id,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub po_id: Option<Id>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_amount: Option<f64>,
    pub status: GrnStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<GrnLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrnLinePayload {
    pub item_id: Id,
    pub batch_no: String,
    pub expiry_date: Option<NaiveDate>,
    pub received_qty: f64,
    pub free_qty: f64,
    pub unit_cost: Option<f64>,
    pub mrp: Option<f64>,
    pub tax_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrnCreate {
    pub supplier_id: Id,
    pub location_id: Id,
    pub po_id: Option<Id>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_amount: Option<f64>,
    pub notes: Option<String>,
    pub lines: Vec<GrnLinePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrnFilter {
    pub status: Option<GrnStatus>,
    pub supplier_id: Option<Id>,
    pub location_id: Option<Id>,
}

// --- Returns ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnType {
    ToSupplier,
    FromCustomer,
    Internal,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Draft,
    Posted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnLine {
    #[serde(default)]
    pub id: Option<Id>,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    pub batch_id: Id,
    #[serde(default)]
    pub batch_no: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnNote {
    pub id: Id,
    #[serde(default)]
    pub return_number: Option<String>,
    #[serde(rename = "type")]
    pub return_type: ReturnType,
    pub status: ReturnStatus,
    pub location_id: Id,
    #[serde(default)]
    pub supplier_id: Option<Id>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub lines: Vec<ReturnLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnLinePayload {
    pub item_id: Id,
    pub batch_id: Id,
    pub quantity: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnCreate {
    #[serde(rename = "type")]
    pub return_type: ReturnType,
    pub location_id: Id,
    pub supplier_id: Option<Id>,
    pub reason: Option<String>,
    pub lines: Vec<ReturnLinePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnFilter {
    #[serde(rename = "type")]
    pub return_type: Option<ReturnType>,
    pub status: Option<ReturnStatus>,
    pub location_id: Option<Id>,
}
