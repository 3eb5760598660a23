//! The prescription register: list, create/edit, sign, cancel and print.

use std::sync::Arc;

use tracing::info;

use crate::clients::{CrudResource, PharmacyClient, UpdatableResource};
use crate::forms::{PrescriptionForm, RxLineForm};
use crate::framework::{ApiError, Blob, ObjectUrlRegistry, PreviewSlot, ResourceList};
use crate::model::{Id, Prescription, RxFilter};
use crate::views::Dialog;

pub struct RxView {
    client: PharmacyClient,
    registry: Arc<ObjectUrlRegistry>,
    pub prescriptions: ResourceList<Prescription, RxFilter>,
    pub dialog: Dialog<PrescriptionForm>,
    pub preview: PreviewSlot,
}

impl RxView {
    pub fn new(client: PharmacyClient, registry: Arc<ObjectUrlRegistry>, filters: RxFilter) -> Self {
        let fetcher = client.clone();
        let prescriptions = ResourceList::new("prescriptions", filters, move |filters: RxFilter| {
            let client = fetcher.clone();
            async move { client.rx_list(&filters).await }
        });
        Self {
            client,
            registry,
            prescriptions,
            dialog: Dialog::new(),
            preview: PreviewSlot::new(),
        }
    }

    pub async fn set_filters(&mut self, filters: RxFilter) {
        self.prescriptions.set_filters(filters).await;
    }

    /// Opens the editor for an existing prescription, one form row per line.
    pub fn edit(&mut self, rx: &Prescription) {
        let form = PrescriptionForm {
            rx_type: rx.rx_type,
            patient_id: rx.patient_id,
            doctor_id: rx.doctor_id,
            location_id: rx.location_id,
            notes: rx.notes.clone().unwrap_or_default(),
            lines: rx
                .lines
                .iter()
                .map(|line| RxLineForm {
                    item_id: Some(line.item_id),
                    dose: line.dose.clone().unwrap_or_default(),
                    frequency: line.frequency.clone().unwrap_or_default(),
                    duration_days: line.duration_days.map(|d| d.to_string()).unwrap_or_default(),
                    route: line.route.clone().unwrap_or_default(),
                    instructions: line.instructions.clone().unwrap_or_default(),
                    requested_qty: line.requested_qty.to_string(),
                })
                .collect(),
        };
        self.dialog.open_edit(rx.id, form);
    }

    pub async fn save(&mut self) -> Result<Prescription, ApiError> {
        let client = &self.client;
        let editing = self.dialog.editing();
        let saved = self
            .dialog
            .submit(PrescriptionForm::to_payload, |payload| async move {
                match editing {
                    Some(id) => client.update(id, &payload).await,
                    None => client.create(&payload).await,
                }
            })
            .await?;
        info!(rx_id = saved.id, "Prescription saved");
        self.prescriptions.refresh().await;
        Ok(saved)
    }

    pub async fn sign(&self, id: Id) -> Result<Prescription, ApiError> {
        let rx = self.client.sign(id).await?;
        self.prescriptions.refresh().await;
        Ok(rx)
    }

    pub async fn cancel(&self, id: Id) -> Result<Prescription, ApiError> {
        let rx = self.client.cancel(id).await?;
        self.prescriptions.refresh().await;
        Ok(rx)
    }

    pub async fn pdf(&self, id: Id) -> Result<Blob, ApiError> {
        self.client.pdf(id).await
    }

    /// Shows the printable prescription, releasing the previous preview.
    pub async fn preview_pdf(&mut self, id: Id) -> Result<String, ApiError> {
        let blob = self.client.pdf(id).await?;
        let url = self.registry.create(blob);
        Ok(self.preview.replace(url).as_str().to_string())
    }
}
