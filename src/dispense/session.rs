use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::clients::{CrudResource, PharmacyClient};
use crate::dispense::{DispenseError, Frequency};
use crate::framework::KeyedCache;
use crate::model::{
    BatchOption, DispenseLineRequest, DispenseOutcome, DispenseRequest, Id, Prescription, RxLine, RxType,
};

/// Batch options keyed by `(location_id, item_id)`.
pub type BatchCache = KeyedCache<(Id, Id), Vec<BatchOption>>;

/// Editable state of one prescription line during dispensing.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseLine {
    pub line_id: Id,
    pub item_id: Id,
    pub medicine: String,
    pub frequency: Option<String>,
    pub duration_days: Option<u32>,
    pub remaining: f64,
    pub dispense_qty: f64,
    pub batch_id: Option<Id>,
    /// FEFO-ordered, as returned by the server.
    pub batch_options: Vec<BatchOption>,
}

impl DispenseLine {
    fn new(line: &RxLine, batch_options: Vec<BatchOption>) -> Self {
        let remaining = line.remaining();
        Self {
            line_id: line.id,
            item_id: line.item_id,
            medicine: line.medicine_name(),
            frequency: line.frequency.clone(),
            duration_days: line.duration_days,
            remaining,
            dispense_qty: remaining,
            batch_id: default_batch(&batch_options, remaining),
            batch_options,
        }
    }

    /// Quantity implied by the line's frequency and duration.
    pub fn suggested_qty(&self) -> Option<u32> {
        let frequency = Frequency::parse(self.frequency.as_deref()?);
        frequency.suggested_quantity(self.duration_days)
    }

    pub fn selected_batch(&self) -> Option<&BatchOption> {
        let batch_id = self.batch_id?;
        self.batch_options.iter().find(|b| b.batch_id == batch_id)
    }

    /// Whether the line takes part in the next submit.
    pub fn is_active(&self) -> bool {
        self.dispense_qty > 0.0
    }
}

/// First batch that covers `qty` on its own, else the first batch offered.
pub fn default_batch(options: &[BatchOption], qty: f64) -> Option<Id> {
    options
        .iter()
        .find(|b| b.available_qty >= qty)
        .or_else(|| options.first())
        .map(|b| b.batch_id)
}

/// One pharmacist's pass over a prescription at a location.
pub struct DispenseSession {
    client: PharmacyClient,
    batches: Arc<BatchCache>,
    batch_limit: u32,
    location_id: Id,
    prescription: Prescription,
    lines: Vec<DispenseLine>,
}

impl std::fmt::Debug for DispenseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispenseSession")
            .field("rx_id", &self.prescription.id)
            .field("location_id", &self.location_id)
            .field("lines", &self.lines)
            .finish()
    }
}

impl DispenseSession {
    /// Loads the prescription and the batch options for every line with stock still owed.
    #[instrument(skip(client, batches))]
    pub async fn open(
        client: PharmacyClient,
        batches: Arc<BatchCache>,
        batch_limit: u32,
        rx_id: Id,
        location_id: Id,
    ) -> Result<Self, DispenseError> {
        let prescription = client.get(rx_id).await?;
        let mut session = Self {
            client,
            batches,
            batch_limit,
            location_id,
            prescription,
            lines: Vec::new(),
        };
        session.lines = session.build_lines(false).await?;
        debug!(lines = session.lines.len(), "Dispense session opened");
        Ok(session)
    }

    async fn build_lines(&self, force_refresh: bool) -> Result<Vec<DispenseLine>, DispenseError> {
        let mut lines = Vec::with_capacity(self.prescription.lines.len());
        for rx_line in &self.prescription.lines {
            let options = if rx_line.remaining() > 0.0 {
                self.load_batches(rx_line.item_id, force_refresh).await?
            } else {
                Vec::new()
            };
            lines.push(DispenseLine::new(rx_line, options));
        }
        Ok(lines)
    }

    async fn load_batches(&self, item_id: Id, force_refresh: bool) -> Result<Vec<BatchOption>, DispenseError> {
        let options = self
            .batches
            .get_or_fetch((self.location_id, item_id), force_refresh, || {
                self.client.batch_options(self.location_id, item_id, self.batch_limit)
            })
            .await?;
        Ok(options)
    }

    pub fn prescription(&self) -> &Prescription {
        &self.prescription
    }

    pub fn location_id(&self) -> Id {
        self.location_id
    }

    pub fn lines(&self) -> &[DispenseLine] {
        &self.lines
    }

    pub fn line(&self, line_id: Id) -> Option<&DispenseLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    fn line_mut(&mut self, line_id: Id) -> Result<&mut DispenseLine, DispenseError> {
        self.lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or(DispenseError::UnknownLine(line_id))
    }

    /// Sets the quantity to dispense on a line. Zero excludes the line from submit.
    pub fn set_quantity(&mut self, line_id: Id, qty: f64) -> Result<(), DispenseError> {
        let line = self.line_mut(line_id)?;
        if !qty.is_finite() || qty < 0.0 {
            return Err(DispenseError::InvalidQuantity {
                medicine: line.medicine.clone(),
            });
        }
        line.dispense_qty = qty;
        Ok(())
    }

    pub fn select_batch(&mut self, line_id: Id, batch_id: Id) -> Result<(), DispenseError> {
        let line = self.line_mut(line_id)?;
        if !line.batch_options.iter().any(|b| b.batch_id == batch_id) {
            return Err(DispenseError::UnknownBatch {
                medicine: line.medicine.clone(),
                batch_id,
            });
        }
        line.batch_id = Some(batch_id);
        Ok(())
    }

    /// Replaces the line quantity with the frequency-based suggestion, if there is one.
    pub fn apply_suggestion(&mut self, line_id: Id) -> Result<Option<f64>, DispenseError> {
        let line = self.line_mut(line_id)?;
        let suggestion = line.suggested_qty().map(f64::from);
        if let Some(qty) = suggestion {
            line.dispense_qty = qty;
        }
        Ok(suggestion)
    }

    /// Client-side checks. Sends nothing.
    pub fn validate(&self) -> Result<Vec<DispenseLineRequest>, DispenseError> {
        let mut requests = Vec::new();
        for line in &self.lines {
            if !line.dispense_qty.is_finite() || line.dispense_qty < 0.0 {
                return Err(DispenseError::InvalidQuantity {
                    medicine: line.medicine.clone(),
                });
            }
            if !line.is_active() {
                continue;
            }
            let batch_id = line.batch_id.ok_or_else(|| DispenseError::MissingBatch {
                medicine: line.medicine.clone(),
            })?;
            requests.push(DispenseLineRequest {
                line_id: line.line_id,
                dispense_qty: line.dispense_qty,
                batch_id,
            });
        }
        if requests.is_empty() {
            return Err(DispenseError::NothingToDispense);
        }
        Ok(requests)
    }

    /// Re-fetches batch options for every active line, bypassing the cache, and checks
    /// the selected batches are still offered.
    #[instrument(skip(self), fields(rx_id = self.prescription.id))]
    pub async fn recheck_batches(&mut self) -> Result<(), DispenseError> {
        for index in 0..self.lines.len() {
            if !self.lines[index].is_active() {
                continue;
            }
            let item_id = self.lines[index].item_id;
            let fresh = self.load_batches(item_id, true).await?;
            let line = &mut self.lines[index];
            if let Some(batch_id) = line.batch_id {
                if !fresh.iter().any(|b| b.batch_id == batch_id) {
                    let batch_no = line
                        .selected_batch()
                        .map(|b| b.batch_no.clone())
                        .unwrap_or_else(|| batch_id.to_string());
                    warn!(medicine = %line.medicine, %batch_no, "Selected batch no longer available");
                    line.batch_options = fresh;
                    line.batch_id = None;
                    return Err(DispenseError::BatchUnavailable {
                        medicine: line.medicine.clone(),
                        batch_no,
                    });
                }
            }
            line.batch_options = fresh;
        }
        Ok(())
    }

    /// Validates, re-checks batches, posts the dispense and reloads the prescription.
    #[instrument(skip(self), fields(rx_id = self.prescription.id))]
    pub async fn submit(&mut self, create_sale: bool, context_type: RxType) -> Result<DispenseOutcome, DispenseError> {
        if !self.prescription.status.accepts_dispense() {
            return Err(DispenseError::NotDispensable(self.prescription.status));
        }
        self.validate()?;
        self.recheck_batches().await?;

        let request = DispenseRequest {
            lines: self.validate()?,
            location_id: self.location_id,
            create_sale,
            context_type,
        };
        let outcome = self.client.dispense(self.prescription.id, &request).await?;
        info!(lines = request.lines.len(), create_sale, "Dispensed");

        for line in &request.lines {
            if let Some(item_id) = self.line(line.line_id).map(|l| l.item_id) {
                self.batches.invalidate(&(self.location_id, item_id));
            }
        }
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Dispensed but could not reload the prescription");
        }
        Ok(outcome)
    }

    /// Re-fetches the prescription and rebuilds the lines. Local edits are discarded.
    pub async fn reload(&mut self) -> Result<(), DispenseError> {
        self.prescription = self.client.get(self.prescription.id).await?;
        self.lines = self.build_lines(false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(batch_id: Id, available_qty: f64) -> BatchOption {
        BatchOption {
            batch_id,
            batch_no: format!("B-{batch_id}"),
            item_id: Some(5),
            expiry_date: None,
            available_qty,
            mrp: None,
        }
    }

    #[test]
    fn test_default_batch_prefers_one_that_covers_quantity() {
        let options = vec![option(1, 2.0), option(2, 10.0), option(3, 50.0)];
        assert_eq!(default_batch(&options, 6.0), Some(2));
    }

    #[test]
    fn test_default_batch_falls_back_to_first() {
        let options = vec![option(1, 2.0), option(2, 3.0)];
        assert_eq!(default_batch(&options, 6.0), Some(1));
        assert_eq!(default_batch(&[], 6.0), None);
    }

    #[test]
    fn test_line_defaults_from_rx_line() {
        let rx_line: RxLine = serde_json::from_value(serde_json::json!({
            "id": 1, "item_id": 5, "item_name": "Amoxicillin 500",
            "frequency": "1-0-1", "duration_days": 5,
            "requested_qty": 10, "dispensed_qty": 4
        }))
        .unwrap();
        let line = DispenseLine::new(&rx_line, vec![option(7, 3.0), option(8, 20.0)]);
        assert_eq!(line.remaining, 6.0);
        assert_eq!(line.dispense_qty, 6.0);
        assert_eq!(line.batch_id, Some(8));
        assert_eq!(line.suggested_qty(), Some(10));
    }
}
