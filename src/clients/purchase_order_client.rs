use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::clients::{CrudResource, UpdatableResource};
use crate::framework::{ApiClient, ApiError, Blob, Query};
use crate::model::{Id, PoStatus, PurchaseOrder, PurchaseOrderFilter, PurchaseOrderPayload};

/// Client for purchase orders. Status transitions are validated by the server.
#[derive(Debug, Clone)]
pub struct PurchaseOrderClient {
    api: ApiClient,
}

impl PurchaseOrderClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Id, status: PoStatus) -> Result<PurchaseOrder, ApiError> {
        debug!("Sending request");
        let query = Query::new().push("status", status.as_str());
        let po: PurchaseOrder = self
            .api
            .post_with::<Value, _>(format!("{}/{id}/status", Self::PATH), query, None)
            .await?
            .into_data();
        info!(status = ?po.status, "Purchase order status changed");
        Ok(po)
    }

    /// The printable purchase order.
    #[instrument(skip(self))]
    pub async fn pdf(&self, id: Id) -> Result<Blob, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .download(format!("{}/{id}/pdf", Self::PATH), Query::new())
            .await?
            .into_data())
    }

    /// Records that the order went out, optionally emailing it to `email_to`.
    #[instrument(skip(self))]
    pub async fn mark_sent(&self, id: Id, email_to: Option<&str>) -> Result<PurchaseOrder, ApiError> {
        debug!("Sending request");
        let query = Query::new().push_opt("email_to", email_to);
        Ok(self
            .api
            .post_with::<Value, _>(format!("{}/{id}/mark-sent", Self::PATH), query, None)
            .await?
            .into_data())
    }
}

#[async_trait]
impl CrudResource for PurchaseOrderClient {
    const PATH: &'static str = "/inventory/purchase-orders";

    type Entity = PurchaseOrder;
    type Create = PurchaseOrderPayload;
    type Filter = PurchaseOrderFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl UpdatableResource for PurchaseOrderClient {
    type Update = PurchaseOrderPayload;
}
