//! Form input to request payloads.
//!
//! Forms hold what the user typed, as strings. Converting a form into a payload trims
//! text, turns empty strings into `None`, coerces numeric strings and runs the
//! presence checks the backend would otherwise reject. Every failure is an
//! [`ApiError::Validation`] and no request is sent.

use chrono::NaiveDate;

use crate::dispense::Frequency;
use crate::framework::ApiError;
use crate::model::{
    GrnCreate, GrnLinePayload, Id, Item, ItemPayload, Location, LocationCreate, LocationUpdate, PoLinePayload,
    PrescriptionPayload, PurchaseOrderPayload, ReturnCreate, ReturnLinePayload, ReturnType, RxLinePayload, RxType,
    Supplier, SupplierPayload,
};

/// Trims `input`; blank becomes `None`.
pub fn normalize_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses an optional numeric field. Blank is `None`, anything non-numeric is an error.
pub fn parse_optional_number(field: &str, input: &str) -> Result<Option<f64>, ApiError> {
    let Some(text) = normalize_text(input) else {
        return Ok(None);
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ApiError::validation(format!("{field} must be a number"))),
    }
}

pub fn parse_number(field: &str, input: &str) -> Result<f64, ApiError> {
    require(field, parse_optional_number(field, input)?)
}

pub fn parse_optional_date(field: &str, input: &str) -> Result<Option<NaiveDate>, ApiError> {
    let Some(text) = normalize_text(input) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::validation(format!("{field} must be a date (YYYY-MM-DD)")))
}

pub fn require<T>(field: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

fn require_text(field: &str, input: &str) -> Result<String, ApiError> {
    require(field, normalize_text(input))
}

fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn number_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// =============================================================================
// MASTER DATA
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationForm {
    pub code: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl LocationForm {
    pub fn from_location(location: &Location) -> Self {
        Self {
            code: location.code.clone(),
            name: location.name.clone(),
            description: text_or_empty(location.description.as_deref()),
            is_active: location.is_active,
        }
    }

    pub fn to_create(&self) -> Result<LocationCreate, ApiError> {
        Ok(LocationCreate {
            code: require_text("Code", &self.code)?,
            name: require_text("Name", &self.name)?,
            description: normalize_text(&self.description),
        })
    }

    pub fn to_update(&self) -> Result<LocationUpdate, ApiError> {
        Ok(LocationUpdate {
            code: Some(require_text("Code", &self.code)?),
            name: Some(require_text("Name", &self.name)?),
            description: normalize_text(&self.description),
            is_active: Some(self.is_active),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierForm {
    pub code: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub gst_number: String,
}

impl SupplierForm {
    pub fn from_supplier(supplier: &Supplier) -> Self {
        Self {
            code: supplier.code.clone(),
            name: supplier.name.clone(),
            contact_person: text_or_empty(supplier.contact_person.as_deref()),
            phone: text_or_empty(supplier.phone.as_deref()),
            email: text_or_empty(supplier.email.as_deref()),
            address: text_or_empty(supplier.address.as_deref()),
            gst_number: text_or_empty(supplier.gst_number.as_deref()),
        }
    }

    pub fn to_payload(&self) -> Result<SupplierPayload, ApiError> {
        Ok(SupplierPayload {
            code: require_text("Code", &self.code)?,
            name: require_text("Name", &self.name)?,
            contact_person: normalize_text(&self.contact_person),
            phone: normalize_text(&self.phone),
            email: normalize_text(&self.email),
            address: normalize_text(&self.address),
            gst_number: normalize_text(&self.gst_number),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemForm {
    pub code: String,
    pub name: String,
    pub qr_number: String,
    pub generic_name: String,
    pub form: String,
    pub strength: String,
    pub unit: String,
    pub pack_size: String,
    pub manufacturer: String,
    pub default_price: String,
    pub default_mrp: String,
    pub default_tax_percent: String,
    pub reorder_level: String,
    pub max_level: String,
    pub is_consumable: bool,
    pub lasa_flag: bool,
}

impl ItemForm {
    pub fn from_item(item: &Item) -> Self {
        Self {
            code: item.code.clone(),
            name: item.name.clone(),
            qr_number: text_or_empty(item.qr_number.as_deref()),
            generic_name: text_or_empty(item.generic_name.as_deref()),
            form: text_or_empty(item.form.as_deref()),
            strength: text_or_empty(item.strength.as_deref()),
            unit: text_or_empty(item.unit.as_deref()),
            pack_size: number_text(item.pack_size),
            manufacturer: text_or_empty(item.manufacturer.as_deref()),
            default_price: number_text(item.default_price),
            default_mrp: number_text(item.default_mrp),
            default_tax_percent: number_text(item.default_tax_percent),
            reorder_level: number_text(item.reorder_level),
            max_level: number_text(item.max_level),
            is_consumable: item.is_consumable,
            lasa_flag: item.lasa_flag,
        }
    }

    pub fn to_payload(&self) -> Result<ItemPayload, ApiError> {
        Ok(ItemPayload {
            code: require_text("Code", &self.code)?,
            name: require_text("Name", &self.name)?,
            qr_number: normalize_text(&self.qr_number),
            generic_name: normalize_text(&self.generic_name),
            form: normalize_text(&self.form),
            strength: normalize_text(&self.strength),
            unit: normalize_text(&self.unit),
            pack_size: parse_optional_number("Pack size", &self.pack_size)?,
            manufacturer: normalize_text(&self.manufacturer),
            default_price: parse_optional_number("Price", &self.default_price)?,
            default_mrp: parse_optional_number("MRP", &self.default_mrp)?,
            default_tax_percent: parse_optional_number("Tax %", &self.default_tax_percent)?,
            reorder_level: parse_optional_number("Reorder level", &self.reorder_level)?,
            max_level: parse_optional_number("Max level", &self.max_level)?,
            is_consumable: self.is_consumable,
            lasa_flag: self.lasa_flag,
        })
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoLineForm {
    pub item_id: Option<Id>,
    pub ordered_qty: String,
    pub unit_cost: String,
    pub tax_percent: String,
    pub remarks: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseOrderForm {
    pub supplier_id: Option<Id>,
    pub location_id: Option<Id>,
    pub expected_date: String,
    pub notes: String,
    pub lines: Vec<PoLineForm>,
}

impl PurchaseOrderForm {
    /// Rows without an item are blank rows and are skipped.
    pub fn to_payload(&self) -> Result<PurchaseOrderPayload, ApiError> {
        let supplier_id = require("Supplier", self.supplier_id)?;
        let location_id = require("Location", self.location_id)?;
        let mut lines = Vec::new();
        for line in &self.lines {
            let Some(item_id) = line.item_id else {
                continue;
            };
            lines.push(PoLinePayload {
                item_id,
                ordered_qty: parse_number("Quantity", &line.ordered_qty)?,
                unit_cost: parse_optional_number("Unit cost", &line.unit_cost)?,
                tax_percent: parse_optional_number("Tax %", &line.tax_percent)?,
                remarks: normalize_text(&line.remarks),
            });
        }
        if lines.is_empty() {
            return Err(ApiError::validation("Add at least one line"));
        }
        Ok(PurchaseOrderPayload {
            supplier_id,
            location_id,
            expected_date: parse_optional_date("Expected date", &self.expected_date)?,
            notes: normalize_text(&self.notes),
            lines,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrnLineForm {
    pub item_id: Option<Id>,
    pub batch_no: String,
    pub expiry_date: String,
    pub received_qty: String,
    pub free_qty: String,
    pub unit_cost: String,
    pub mrp: String,
    pub tax_percent: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrnForm {
    pub supplier_id: Option<Id>,
    pub location_id: Option<Id>,
    pub po_id: Option<Id>,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_amount: String,
    pub notes: String,
    pub lines: Vec<GrnLineForm>,
}

impl GrnForm {
    pub fn to_payload(&self) -> Result<GrnCreate, ApiError> {
        let supplier_id = require("Supplier", self.supplier_id)?;
        let location_id = require("Location", self.location_id)?;
        let mut lines = Vec::new();
        for line in &self.lines {
            let Some(item_id) = line.item_id else {
                continue;
            };
            lines.push(GrnLinePayload {
                item_id,
                batch_no: require_text("Batch number", &line.batch_no)?,
                expiry_date: parse_optional_date("Expiry date", &line.expiry_date)?,
                received_qty: parse_number("Received quantity", &line.received_qty)?,
                free_qty: parse_optional_number("Free quantity", &line.free_qty)?.unwrap_or(0.0),
                unit_cost: parse_optional_number("Unit cost", &line.unit_cost)?,
                mrp: parse_optional_number("MRP", &line.mrp)?,
                tax_percent: parse_optional_number("Tax %", &line.tax_percent)?,
            });
        }
        if lines.is_empty() {
            return Err(ApiError::validation("Add at least one line"));
        }
        Ok(GrnCreate {
            supplier_id,
            location_id,
            po_id: self.po_id,
            invoice_number: normalize_text(&self.invoice_number),
            invoice_date: parse_optional_date("Invoice date", &self.invoice_date)?,
            invoice_amount: parse_optional_number("Invoice amount", &self.invoice_amount)?,
            notes: normalize_text(&self.notes),
            lines,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnLineForm {
    pub item_id: Option<Id>,
    pub batch_id: Option<Id>,
    pub quantity: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnForm {
    pub return_type: Option<ReturnType>,
    pub location_id: Option<Id>,
    pub supplier_id: Option<Id>,
    pub reason: String,
    pub lines: Vec<ReturnLineForm>,
}

impl ReturnForm {
    pub fn to_payload(&self) -> Result<ReturnCreate, ApiError> {
        let return_type = require("Return type", self.return_type)?;
        let location_id = require("Location", self.location_id)?;
        let supplier_id = match return_type {
            ReturnType::ToSupplier => Some(require("Supplier", self.supplier_id)?),
            _ => self.supplier_id,
        };
        let mut lines = Vec::new();
        for line in &self.lines {
            let Some(item_id) = line.item_id else {
                continue;
            };
            lines.push(ReturnLinePayload {
                item_id,
                batch_id: require("Batch", line.batch_id)?,
                quantity: parse_number("Quantity", &line.quantity)?,
                reason: normalize_text(&line.reason),
            });
        }
        if lines.is_empty() {
            return Err(ApiError::validation("Add at least one line"));
        }
        Ok(ReturnCreate {
            return_type,
            location_id,
            supplier_id,
            reason: normalize_text(&self.reason),
            lines,
        })
    }
}

// =============================================================================
// PRESCRIPTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RxLineForm {
    pub item_id: Option<Id>,
    pub dose: String,
    pub frequency: String,
    pub duration_days: String,
    pub route: String,
    pub instructions: String,
    pub requested_qty: String,
}

impl RxLineForm {
    /// Quantity implied by frequency and duration, if both are usable.
    pub fn suggested_qty(&self) -> Option<u32> {
        let days = self.duration_days.trim().parse::<u32>().ok();
        Frequency::parse(&self.frequency).suggested_quantity(days)
    }

    /// Fills a blank quantity from the suggestion. A typed quantity is left alone.
    pub fn autofill_quantity(&mut self) -> bool {
        if normalize_text(&self.requested_qty).is_some() {
            return false;
        }
        match self.suggested_qty() {
            Some(qty) => {
                self.requested_qty = qty.to_string();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionForm {
    pub rx_type: RxType,
    pub patient_id: Option<Id>,
    pub doctor_id: Option<Id>,
    pub location_id: Option<Id>,
    pub notes: String,
    pub lines: Vec<RxLineForm>,
}

impl Default for PrescriptionForm {
    fn default() -> Self {
        Self {
            rx_type: RxType::Opd,
            patient_id: None,
            doctor_id: None,
            location_id: None,
            notes: String::new(),
            lines: Vec::new(),
        }
    }
}

impl PrescriptionForm {
    pub fn to_payload(&self) -> Result<PrescriptionPayload, ApiError> {
        if self.rx_type != RxType::Counter {
            require("Patient", self.patient_id)?;
        }
        let mut lines = Vec::new();
        for line in &self.lines {
            let Some(item_id) = line.item_id else {
                continue;
            };
            let typed = parse_optional_number("Quantity", &line.requested_qty)?;
            let requested_qty = require("Quantity", typed.or_else(|| line.suggested_qty().map(f64::from)))?;
            let duration_days = match normalize_text(&line.duration_days) {
                Some(text) => Some(
                    text.parse::<u32>()
                        .map_err(|_| ApiError::validation("Duration must be a whole number of days"))?,
                ),
                None => None,
            };
            lines.push(RxLinePayload {
                item_id,
                dose: normalize_text(&line.dose),
                frequency: normalize_text(&line.frequency),
                duration_days,
                route: normalize_text(&line.route),
                instructions: normalize_text(&line.instructions),
                requested_qty,
            });
        }
        if lines.is_empty() {
            return Err(ApiError::validation("Add at least one medicine"));
        }
        Ok(PrescriptionPayload {
            rx_type: self.rx_type,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            location_id: self.location_id,
            notes: normalize_text(&self.notes),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Paracetamol "), Some("Paracetamol".to_string()));
        assert_eq!(normalize_text("   "), None);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(parse_optional_number("MRP", " 12.50 ").unwrap(), Some(12.5));
        assert_eq!(parse_optional_number("MRP", "").unwrap(), None);
        let err = parse_optional_number("MRP", "12a").unwrap_err();
        assert_eq!(err, ApiError::Validation("MRP must be a number".into()));
        assert!(parse_number("Quantity", "").unwrap_err().is_validation());
    }

    #[test]
    fn test_item_form_normalizes_blank_fields() {
        let form = ItemForm {
            code: "PCM500".into(),
            name: " Paracetamol ".into(),
            strength: "".into(),
            default_mrp: "2.5".into(),
            ..Default::default()
        };
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.name, "Paracetamol");
        assert_eq!(payload.strength, None);
        assert_eq!(payload.default_mrp, Some(2.5));
    }

    #[test]
    fn test_purchase_order_requires_supplier_location_and_lines() {
        let mut form = PurchaseOrderForm::default();
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Supplier is required".into()));

        form.supplier_id = Some(3);
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Location is required".into()));

        form.location_id = Some(1);
        form.lines.push(PoLineForm::default());
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Add at least one line".into()));

        form.lines.push(PoLineForm {
            item_id: Some(12),
            ordered_qty: "100".into(),
            ..Default::default()
        });
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.lines.len(), 1);
        assert_eq!(payload.lines[0].ordered_qty, 100.0);
    }

    #[test]
    fn test_grn_line_needs_batch_number() {
        let form = GrnForm {
            supplier_id: Some(3),
            location_id: Some(1),
            lines: vec![GrnLineForm {
                item_id: Some(12),
                batch_no: " ".into(),
                received_qty: "10".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Batch number is required".into()));
    }

    #[test]
    fn test_supplier_return_needs_supplier_and_batch() {
        let mut form = ReturnForm {
            return_type: Some(ReturnType::ToSupplier),
            location_id: Some(1),
            lines: vec![ReturnLineForm {
                item_id: Some(12),
                batch_id: None,
                quantity: "2".into(),
                reason: String::new(),
            }],
            ..Default::default()
        };
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Supplier is required".into()));

        form.supplier_id = Some(3);
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Batch is required".into()));

        form.lines[0].batch_id = Some(301);
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.supplier_id, Some(3));
    }

    #[test]
    fn test_internal_return_does_not_need_supplier() {
        let form = ReturnForm {
            return_type: Some(ReturnType::Internal),
            location_id: Some(1),
            lines: vec![ReturnLineForm {
                item_id: Some(12),
                batch_id: Some(301),
                quantity: "1".into(),
                reason: String::new(),
            }],
            ..Default::default()
        };
        assert!(form.to_payload().is_ok());
    }

    #[test]
    fn test_rx_line_autofills_quantity() {
        let mut line = RxLineForm {
            item_id: Some(5),
            frequency: "1-0-1".into(),
            duration_days: "5".into(),
            ..Default::default()
        };
        assert!(line.autofill_quantity());
        assert_eq!(line.requested_qty, "10");

        line.requested_qty = "14".into();
        assert!(!line.autofill_quantity());
        assert_eq!(line.requested_qty, "14");
    }

    #[test]
    fn test_prescription_payload_uses_suggestion_for_blank_quantity() {
        let form = PrescriptionForm {
            patient_id: Some(9),
            lines: vec![RxLineForm {
                item_id: Some(5),
                frequency: "BD".into(),
                duration_days: "3".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.lines[0].requested_qty, 6.0);
        assert_eq!(payload.lines[0].duration_days, Some(3));
    }

    #[test]
    fn test_as_needed_line_requires_typed_quantity() {
        let form = PrescriptionForm {
            patient_id: Some(9),
            lines: vec![RxLineForm {
                item_id: Some(5),
                frequency: "SOS".into(),
                duration_days: "3".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(form.to_payload().unwrap_err(), ApiError::Validation("Quantity is required".into()));
    }
}
