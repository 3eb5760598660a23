use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::clients::{CrudResource, UpdatableResource};
use crate::framework::{ApiClient, ApiError, Blob, Query};
use crate::model::{
    BatchOption, DispenseOutcome, DispenseRequest, Id, ListBody, PatientSummary, Prescription,
    PrescriptionPayload, RxFilter, RxQueueFilter, RxQueueRow,
};

/// Client for prescriptions, the dispense queue and batch picking.
#[derive(Debug, Clone)]
pub struct PharmacyClient {
    api: ApiClient,
}

impl PharmacyClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The Rx register as shown on the pharmacy list page.
    #[instrument(skip(self))]
    pub async fn rx_list(&self, filters: &RxFilter) -> Result<Vec<Prescription>, ApiError> {
        let query = Query::from_filters(filters)?;
        debug!(?query, "Sending request");
        let body: ListBody<Prescription> = self.api.get("/pharmacy/rx", query).await?.into_data();
        Ok(body.into_vec())
    }

    /// Moves a draft prescription to pending.
    #[instrument(skip(self))]
    pub async fn sign(&self, id: Id) -> Result<Prescription, ApiError> {
        let rx = self.action(id, "sign").await?;
        info!(status = ?rx.status, "Prescription signed");
        Ok(rx)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Id) -> Result<Prescription, ApiError> {
        let rx = self.action(id, "cancel").await?;
        info!("Prescription cancelled");
        Ok(rx)
    }

    async fn action(&self, id: Id, action: &str) -> Result<Prescription, ApiError> {
        debug!(action, "Sending request");
        Ok(self
            .api
            .post_with::<Value, _>(format!("{}/{id}/{action}", Self::PATH), Query::new(), None)
            .await?
            .into_data())
    }

    /// Dispenses against the prescription. The server validates stock and batches.
    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn dispense(&self, id: Id, request: &DispenseRequest) -> Result<DispenseOutcome, ApiError> {
        debug!(?request, "Sending request");
        let outcome: Option<DispenseOutcome> = self
            .api
            .post(format!("{}/{id}/dispense", Self::PATH), request)
            .await?
            .into_data();
        info!("Dispense accepted");
        Ok(outcome.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn pdf(&self, id: Id) -> Result<Blob, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .download(format!("{}/{id}/pdf", Self::PATH), Query::new())
            .await?
            .into_data())
    }

    /// Prescriptions waiting to be dispensed.
    #[instrument(skip(self))]
    pub async fn rx_queue(&self, filters: &RxQueueFilter) -> Result<Vec<RxQueueRow>, ApiError> {
        let query = Query::from_filters(filters)?;
        debug!(?query, "Sending request");
        let body: ListBody<RxQueueRow> = self.api.get("/pharmacy/rx-queue", query).await?.into_data();
        Ok(body.into_vec())
    }

    /// Dispensable batches of one item at a location, in FEFO order.
    #[instrument(skip(self))]
    pub async fn batch_options(&self, location_id: Id, item_id: Id, limit: u32) -> Result<Vec<BatchOption>, ApiError> {
        self.fetch_batches("/pharmacy/batches/pick", location_id, item_id, limit).await
    }

    /// Same listing as [`batch_options`](Self::batch_options) under its older route.
    #[instrument(skip(self))]
    pub async fn batch_picks(&self, location_id: Id, item_id: Id, limit: u32) -> Result<Vec<BatchOption>, ApiError> {
        self.fetch_batches("/pharmacy/batch-picks", location_id, item_id, limit).await
    }

    async fn fetch_batches(&self, path: &str, location_id: Id, item_id: Id, limit: u32) -> Result<Vec<BatchOption>, ApiError> {
        let query = Query::new()
            .push("location_id", location_id)
            .push("item_id", item_id)
            .push("limit", limit);
        debug!(path, ?query, "Sending request");
        let body: ListBody<BatchOption> = self.api.get(path, query).await?.into_data();
        Ok(body.into_vec())
    }

    /// Patient record, used to label queue rows.
    #[instrument(skip(self))]
    pub async fn patient(&self, id: Id) -> Result<PatientSummary, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .get(format!("/patients/{id}"), Query::new())
            .await?
            .into_data())
    }
}

#[async_trait]
impl CrudResource for PharmacyClient {
    const PATH: &'static str = "/pharmacy/prescriptions";

    type Entity = Prescription;
    type Create = PrescriptionPayload;
    type Filter = RxFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl UpdatableResource for PharmacyClient {
    type Update = PrescriptionPayload;
}
