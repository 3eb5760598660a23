//! The stock-alerts dashboard.
//!
//! Six independent streams (summary, alerts, stock, quarantine, batches, locations),
//! each a [`QueryStream`]. Reloading a stream aborts its previous request and a late
//! response from an older generation is dropped, so fast filter changes always end
//! with the newest data on screen.

use tracing::{debug, instrument};

use crate::clients::{CrudResource, LocationClient, StockAlertClient};
use crate::framework::{ApiClient, ApiError, Blob, QueryStream};
use crate::model::{
    AlertFilter, AlertReport, AlertSummary, ExportFormat, Location, Page, StockAlert, StockBatch, StockSummaryRow,
};

pub struct StockAlertsDashboard {
    client: StockAlertClient,
    location_client: LocationClient,
    filters: AlertFilter,
    summary: QueryStream<AlertSummary>,
    alerts: QueryStream<Page<StockAlert>>,
    stock: QueryStream<Page<StockSummaryRow>>,
    quarantine: QueryStream<Page<StockBatch>>,
    batches: QueryStream<Page<StockBatch>>,
    locations: QueryStream<Vec<Location>>,
}

impl StockAlertsDashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: StockAlertClient::new(api.clone()),
            location_client: LocationClient::new(api),
            filters: AlertFilter::default(),
            summary: QueryStream::new("alerts-summary"),
            alerts: QueryStream::new("alerts"),
            stock: QueryStream::new("alerts-stock"),
            quarantine: QueryStream::new("alerts-quarantine"),
            batches: QueryStream::new("alerts-batches"),
            locations: QueryStream::new("alerts-locations"),
        }
    }

    pub fn filters(&self) -> &AlertFilter {
        &self.filters
    }

    /// Starts every stream, locations included. Returns without waiting.
    pub fn load_all(&self) {
        let client = self.location_client.clone();
        self.locations.run(async move { client.list(&()).await });
        self.reload_data();
    }

    /// Restarts the five data streams under the current filters.
    pub fn reload_data(&self) {
        let client = self.client.clone();
        let filters = self.filters.clone();
        self.summary.run(async move { client.summary(&filters).await });
        self.reload_pages();
    }

    fn reload_pages(&self) {
        let client = self.client.clone();
        let filters = self.filters.clone();
        self.alerts.run(async move { client.alerts(&filters).await });

        let client = self.client.clone();
        let filters = self.filters.clone();
        self.stock.run(async move { client.stock(&filters).await });

        let client = self.client.clone();
        let filters = self.filters.clone();
        self.quarantine.run(async move { client.quarantine(&filters).await });

        let client = self.client.clone();
        let filters = self.filters.clone();
        self.batches.run(async move { client.batches(&filters).await });
    }

    /// Replaces the filters, goes back to page one and reloads.
    #[instrument(skip(self))]
    pub fn set_filters(&mut self, filters: AlertFilter) {
        self.filters = AlertFilter { page: 1, ..filters };
        self.reload_data();
    }

    /// Moves the paged lists to `page`. The summary does not depend on paging.
    pub fn set_page(&mut self, page: u32) {
        self.filters.page = page.max(1);
        debug!(page = self.filters.page, "Page changed");
        self.reload_pages();
    }

    /// Downloads a report under the current filters.
    pub async fn export(&self, report: AlertReport, format: ExportFormat) -> Result<Blob, ApiError> {
        self.client.export(report, format, &self.filters).await
    }

    /// Aborts every in-flight request. Late responses are discarded.
    pub fn cancel_all(&self) {
        self.summary.cancel();
        self.alerts.cancel();
        self.stock.cancel();
        self.quarantine.cancel();
        self.batches.cancel();
        self.locations.cancel();
    }

    /// Waits until no stream is loading.
    pub async fn settled(&self) {
        self.summary.settled().await;
        self.alerts.settled().await;
        self.stock.settled().await;
        self.quarantine.settled().await;
        self.batches.settled().await;
        self.locations.settled().await;
    }

    pub fn is_loading(&self) -> bool {
        self.summary.is_loading()
            || self.alerts.is_loading()
            || self.stock.is_loading()
            || self.quarantine.is_loading()
            || self.batches.is_loading()
            || self.locations.is_loading()
    }

    pub fn summary(&self) -> &QueryStream<AlertSummary> {
        &self.summary
    }

    pub fn alerts(&self) -> &QueryStream<Page<StockAlert>> {
        &self.alerts
    }

    pub fn stock(&self) -> &QueryStream<Page<StockSummaryRow>> {
        &self.stock
    }

    pub fn quarantine(&self) -> &QueryStream<Page<StockBatch>> {
        &self.quarantine
    }

    pub fn batches(&self) -> &QueryStream<Page<StockBatch>> {
        &self.batches
    }

    pub fn locations(&self) -> &QueryStream<Vec<Location>> {
        &self.locations
    }
}

impl Drop for StockAlertsDashboard {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
