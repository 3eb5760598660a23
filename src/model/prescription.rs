//! Prescriptions (Rx), the dispense queue and dispense requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Id;
use crate::dispense::remaining_qty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RxType {
    Opd,
    Ipd,
    Ot,
    Counter,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RxStatus {
    Draft,
    Pending,
    Partial,
    Dispensed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl RxStatus {
    /// Whether a dispense may be submitted. Only closed prescriptions refuse.
    pub fn accepts_dispense(&self) -> bool {
        !matches!(self, RxStatus::Dispensed | RxStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RxLine {
    pub id: Id,
    pub item_id: Id,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub requested_qty: f64,
    #[serde(default)]
    pub dispensed_qty: f64,
}

impl RxLine {
    /// Quantity still to dispense, never negative.
    pub fn remaining(&self) -> f64 {
        remaining_qty(self.requested_qty, self.dispensed_qty)
    }

    pub fn medicine_name(&self) -> String {
        self.item_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Item #{}", self.item_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Id,
    #[serde(default)]
    pub rx_number: Option<String>,
    #[serde(rename = "type")]
    pub rx_type: RxType,
    pub status: RxStatus,
    #[serde(default)]
    pub patient_id: Option<Id>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<Id>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub rx_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<RxLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RxLinePayload {
    pub item_id: Id,
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub duration_days: Option<u32>,
    pub route: Option<String>,
    pub instructions: Option<String>,
    pub requested_qty: f64,
}

/// Create and update share one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionPayload {
    #[serde(rename = "type")]
    pub rx_type: RxType,
    pub patient_id: Option<Id>,
    pub doctor_id: Option<Id>,
    pub location_id: Option<Id>,
    pub notes: Option<String>,
    pub lines: Vec<RxLinePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RxFilter {
    pub status: Option<RxStatus>,
    #[serde(rename = "type")]
    pub rx_type: Option<RxType>,
    pub patient_id: Option<Id>,
    pub location_id: Option<Id>,
    pub q: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A row in the pharmacy dispense queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RxQueueRow {
    #[serde(alias = "prescription_id")]
    pub id: Id,
    #[serde(default)]
    pub rx_number: Option<String>,
    #[serde(rename = "type", default = "unknown_type")]
    pub rx_type: RxType,
    pub status: RxStatus,
    #[serde(default)]
    pub patient_id: Option<Id>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub line_count: Option<u32>,
}

fn unknown_type() -> RxType {
    RxType::Unknown
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RxQueueFilter {
    pub location_id: Option<Id>,
    pub status: Option<RxStatus>,
    #[serde(rename = "type")]
    pub rx_type: Option<RxType>,
}

/// Patient record, used only to label queue rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: Id,
    #[serde(default)]
    pub uhid: Option<String>,
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl PatientSummary {
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispenseLineRequest {
    pub line_id: Id,
    pub dispense_qty: f64,
    pub batch_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispenseRequest {
    pub lines: Vec<DispenseLineRequest>,
    pub location_id: Id,
    pub create_sale: bool,
    pub context_type: RxType,
}

/// Server acknowledgement of a dispense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispenseOutcome {
    #[serde(default)]
    pub status: Option<RxStatus>,
    #[serde(default)]
    pub sale_id: Option<Id>,
    #[serde(default)]
    pub message: Option<String>,
}
