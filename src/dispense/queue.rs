use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::clients::PharmacyClient;
use crate::dispense::{BatchCache, DispenseError, DispenseSession};
use crate::framework::{ApiError, KeyedCache, ResourceList};
use crate::model::{DispenseOutcome, Id, RxQueueFilter, RxQueueRow, RxType};

/// Patient display names keyed by patient id.
pub type PatientCache = KeyedCache<Id, String>;

/// Label for rows with no patient attached (counter sales).
pub const WALK_IN_LABEL: &str = "Walk-in";

/// A queue row with its patient label resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub row: RxQueueRow,
    pub patient_label: String,
}

/// Prescriptions waiting to be dispensed, with patient names filled in.
pub struct DispenseQueue {
    client: PharmacyClient,
    rows: ResourceList<RxQueueRow, RxQueueFilter>,
    patients: Arc<PatientCache>,
    batches: Arc<BatchCache>,
    batch_limit: u32,
}

impl DispenseQueue {
    pub fn new(
        client: PharmacyClient,
        patients: Arc<PatientCache>,
        batches: Arc<BatchCache>,
        batch_limit: u32,
        filters: RxQueueFilter,
    ) -> Self {
        let fetcher = client.clone();
        let rows = ResourceList::new("rx-queue", filters, move |filters: RxQueueFilter| {
            let client = fetcher.clone();
            async move { client.rx_queue(&filters).await }
        });
        Self {
            client,
            rows,
            patients,
            batches,
            batch_limit,
        }
    }

    /// Reloads the queue. On failure the previous rows stay and the error is returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<QueueEntry>, ApiError> {
        let state = self.rows.refresh().await;
        if let Some(e) = state.error {
            return Err(e);
        }
        Ok(self.entries().await)
    }

    pub async fn set_filters(&mut self, filters: RxQueueFilter) -> Result<Vec<QueueEntry>, ApiError> {
        self.rows.set_filters(filters).await;
        match self.rows.last_error() {
            Some(e) => Err(e),
            None => Ok(self.entries().await),
        }
    }

    pub fn filters(&self) -> &RxQueueFilter {
        self.rows.filters()
    }

    pub fn is_loading(&self) -> bool {
        self.rows.is_loading()
    }

    pub fn rows(&self) -> &ResourceList<RxQueueRow, RxQueueFilter> {
        &self.rows
    }

    /// Current rows with patient labels. Label lookups never fail the list.
    pub async fn entries(&self) -> Vec<QueueEntry> {
        let mut entries = Vec::new();
        for row in self.rows.items() {
            let patient_label = self.patient_label(&row).await;
            entries.push(QueueEntry { row, patient_label });
        }
        entries
    }

    async fn patient_label(&self, row: &RxQueueRow) -> String {
        if let Some(name) = row.patient_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let Some(patient_id) = row.patient_id else {
            return WALK_IN_LABEL.to_string();
        };
        let lookup = self
            .patients
            .get_or_fetch(patient_id, false, || async {
                let patient = self.client.patient(patient_id).await?;
                Ok::<_, ApiError>(patient.display_name().unwrap_or_else(|| fallback_label(patient_id)))
            })
            .await;
        match lookup {
            Ok(label) => label,
            Err(e) => {
                warn!(patient_id, error = %e, "Patient lookup failed");
                fallback_label(patient_id)
            }
        }
    }

    /// Opens a dispense session for a queued prescription.
    pub async fn open(&self, rx_id: Id, location_id: Id) -> Result<DispenseSession, DispenseError> {
        DispenseSession::open(
            self.client.clone(),
            self.batches.clone(),
            self.batch_limit,
            rx_id,
            location_id,
        )
        .await
    }

    /// Submits the session, then reloads the queue.
    #[instrument(skip(self, session))]
    pub async fn dispense(
        &self,
        session: &mut DispenseSession,
        create_sale: bool,
        context_type: RxType,
    ) -> Result<DispenseOutcome, DispenseError> {
        let outcome = session.submit(create_sale, context_type).await?;
        let state = self.rows.refresh().await;
        debug!(rows = ?state.data.map(|rows| rows.len()), "Queue reloaded");
        Ok(outcome)
    }
}

fn fallback_label(patient_id: Id) -> String {
    format!("Patient #{patient_id}")
}
