use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::framework::{ApiClient, ApiError, Blob, Query};
use crate::model::{AlertFilter, AlertReport, AlertSummary, ExportFormat, Page, StockAlert, StockBatch, StockSummaryRow};

const BASE: &str = "/inventory/stock-alerts";

/// Server-computed alert analytics backing the stock-alerts dashboard.
#[derive(Debug, Clone)]
pub struct StockAlertClient {
    api: ApiClient,
}

impl StockAlertClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: String, filters: &AlertFilter) -> Result<T, ApiError> {
        let query = Query::from_filters(filters)?;
        debug!(%path, ?query, "Sending request");
        Ok(self.api.get(path, query).await?.into_data())
    }

    /// KPI counts. Paging fields in `filters` are ignored by the server.
    #[instrument(skip(self))]
    pub async fn summary(&self, filters: &AlertFilter) -> Result<AlertSummary, ApiError> {
        self.fetch(format!("{BASE}/summary"), filters).await
    }

    #[instrument(skip(self))]
    pub async fn alerts(&self, filters: &AlertFilter) -> Result<Page<StockAlert>, ApiError> {
        self.fetch(BASE.to_string(), filters).await
    }

    #[instrument(skip(self))]
    pub async fn stock(&self, filters: &AlertFilter) -> Result<Page<StockSummaryRow>, ApiError> {
        self.fetch(format!("{BASE}/stock"), filters).await
    }

    #[instrument(skip(self))]
    pub async fn quarantine(&self, filters: &AlertFilter) -> Result<Page<StockBatch>, ApiError> {
        self.fetch(format!("{BASE}/quarantine"), filters).await
    }

    #[instrument(skip(self))]
    pub async fn batches(&self, filters: &AlertFilter) -> Result<Page<StockBatch>, ApiError> {
        self.fetch(format!("{BASE}/batches"), filters).await
    }

    /// Downloads one report as a spreadsheet or PDF.
    #[instrument(skip(self))]
    pub async fn export(
        &self,
        report: AlertReport,
        format: ExportFormat,
        filters: &AlertFilter,
    ) -> Result<Blob, ApiError> {
        let query = Query::new()
            .push("format", format.extension())
            .push("report", report.as_str())
            .merge(Query::from_filters(filters)?);
        debug!(?query, "Sending request");
        Ok(self.api.download(format!("{BASE}/export"), query).await?.into_data())
    }
}
