use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::framework::{ApiClient, ApiError, Query};
use crate::model::{ExpiryFilter, Id, ListBody, StockBatch, StockFilter, StockSummaryRow};

/// Stock position and the simple threshold alerts served under `/inventory`.
#[derive(Debug, Clone)]
pub struct StockClient {
    api: ApiClient,
}

impl StockClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<Vec<T>, ApiError> {
        debug!(path, ?query, "Sending request");
        let body: ListBody<T> = self.api.get(path, query).await?.into_data();
        Ok(body.into_vec())
    }

    /// Per-item stock summary.
    #[instrument(skip(self))]
    pub async fn stock(&self, filters: &StockFilter) -> Result<Vec<StockSummaryRow>, ApiError> {
        self.fetch_list("/inventory/stock", Query::from_filters(filters)?).await
    }

    /// Batches expiring within `days` of today.
    #[instrument(skip(self))]
    pub async fn near_expiry(&self, filters: &ExpiryFilter) -> Result<Vec<StockBatch>, ApiError> {
        self.fetch_list("/inventory/alerts/expiry", Query::from_filters(filters)?).await
    }

    #[instrument(skip(self))]
    pub async fn expired(&self, location_id: Option<Id>) -> Result<Vec<StockBatch>, ApiError> {
        self.fetch_list("/inventory/alerts/expired", location_query(location_id)).await
    }

    #[instrument(skip(self))]
    pub async fn quarantine(&self, location_id: Option<Id>) -> Result<Vec<StockBatch>, ApiError> {
        self.fetch_list("/inventory/stock/quarantine", location_query(location_id)).await
    }

    /// Items at or below their reorder level.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, location_id: Option<Id>) -> Result<Vec<StockSummaryRow>, ApiError> {
        self.fetch_list("/inventory/alerts/low-stock", location_query(location_id)).await
    }

    /// Items above their maximum level.
    #[instrument(skip(self))]
    pub async fn max_stock(&self, location_id: Option<Id>) -> Result<Vec<StockSummaryRow>, ApiError> {
        self.fetch_list("/inventory/alerts/max-stock", location_query(location_id)).await
    }
}

fn location_query(location_id: Option<Id>) -> Query {
    Query::new().push_opt("location_id", location_id)
}
