use tracing::{debug, instrument};

use crate::framework::{ApiClient, ApiError, Query};
use crate::model::{ListBody, StockTransaction, TransactionFilter};

/// Read-only access to the stock ledger.
#[derive(Debug, Clone)]
pub struct TransactionClient {
    api: ApiClient,
}

impl TransactionClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filters: &TransactionFilter) -> Result<Vec<StockTransaction>, ApiError> {
        let query = Query::from_filters(filters)?;
        debug!(?query, "Sending request");
        let body: ListBody<StockTransaction> = self.api.get("/inventory/transactions", query).await?.into_data();
        Ok(body.into_vec())
    }
}
