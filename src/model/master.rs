//! Master data: locations, suppliers and the item catalogue.

use serde::{Deserialize, Serialize};

use super::Id;

// --- Locations ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Id,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationCreate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// --- Suppliers ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Id,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

/// Create and update share one shape; the backend replaces the record on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplierPayload {
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplierFilter {
    /// Free-text search over code, name and contact fields.
    pub q: Option<String>,
}

// --- Items ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Id,
    pub code: String,
    #[serde(default)]
    pub qr_number: Option<String>,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub pack_size: Option<f64>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub default_price: Option<f64>,
    #[serde(default)]
    pub default_mrp: Option<f64>,
    #[serde(default)]
    pub default_tax_percent: Option<f64>,
    #[serde(default)]
    pub reorder_level: Option<f64>,
    #[serde(default)]
    pub max_level: Option<f64>,
    #[serde(default)]
    pub is_consumable: bool,
    #[serde(default)]
    pub lasa_flag: bool,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Item {
    /// Catalogue label, e.g. `Paracetamol 500 mg Tablet`.
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.strength.as_deref(), self.form.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Create and update share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPayload {
    pub code: String,
    pub name: String,
    pub qr_number: Option<String>,
    pub generic_name: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub unit: Option<String>,
    pub pack_size: Option<f64>,
    pub manufacturer: Option<String>,
    pub default_price: Option<f64>,
    pub default_mrp: Option<f64>,
    pub default_tax_percent: Option<f64>,
    pub reorder_level: Option<f64>,
    pub max_level: Option<f64>,
    pub is_consumable: bool,
    pub lasa_flag: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemFilter {
    pub q: Option<String>,
    pub is_consumable: Option<bool>,
    pub limit: Option<u32>,
}

/// Outcome of a CSV bulk upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUploadResult {
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub updated: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

fn active() -> bool {
    true
}
