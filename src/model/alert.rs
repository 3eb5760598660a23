//! Stock alerts and the alerts dashboard analytics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    OverStock,
    NearExpiry,
    Expired,
    Quarantine,
    NegativeStock,
    SlowMoving,
    NonMoving,
    BatchMismatch,
    PriceVariance,
    ReorderDue,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Crit,
    Warn,
    Info,
    #[serde(other)]
    Unknown,
}

/// A server-computed alert row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    #[serde(default)]
    pub item_id: Option<Id>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub batch_id: Option<Id>,
    #[serde(default)]
    pub batch_no: Option<String>,
    #[serde(default)]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub current_qty: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// KPI aggregates for the alerts dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub warning: u64,
    #[serde(default)]
    pub info: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub stock_value: Option<f64>,
    #[serde(default)]
    pub expired_value: Option<f64>,
    #[serde(default)]
    pub quarantine_value: Option<f64>,
}

/// Filters shared by every dashboard stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFilter {
    pub location_id: Option<Id>,
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
    pub severity: Option<Severity>,
    pub q: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self {
            location_id: None,
            alert_type: None,
            severity: None,
            q: None,
            page: 1,
            page_size: 25,
        }
    }
}

/// Report exported from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReport {
    Alerts,
    Stock,
    Quarantine,
    Batches,
}

impl AlertReport {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReport::Alerts => "alerts",
            AlertReport::Stock => "stock",
            AlertReport::Quarantine => "quarantine",
            AlertReport::Batches => "batches",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_decodes() {
        let alert: StockAlert = serde_json::from_value(json!({
            "type": "NEAR_EXPIRY",
            "severity": "WARN",
            "item_id": 4,
            "batch_no": "B-9"
        }))
        .unwrap();
        assert_eq!(alert.alert_type, AlertType::NearExpiry);
        assert_eq!(alert.severity, Severity::Warn);
    }

    #[test]
    fn test_severity_orders_critical_first() {
        let mut severities = vec![Severity::Info, Severity::Crit, Severity::Warn];
        severities.sort();
        assert_eq!(severities, vec![Severity::Crit, Severity::Warn, Severity::Info]);
    }
}
