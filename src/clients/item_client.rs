use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::clients::{CrudResource, UpdatableResource};
use crate::framework::{ApiClient, ApiError, Blob, MultipartFile, Query};
use crate::model::{BulkUploadResult, Id, Item, ItemFilter, ItemPayload};

/// Client for the item master, including bulk CSV import and QR lookups.
#[derive(Debug, Clone)]
pub struct ItemClient {
    api: ApiClient,
}

impl ItemClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Template CSV for [`bulk_upload`](Self::bulk_upload).
    #[instrument(skip(self))]
    pub async fn sample_csv(&self) -> Result<Blob, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .download("/inventory/items/sample-csv", Query::new())
            .await?
            .into_data())
    }

    /// Uploads a CSV of items. Existing codes are updated, new ones created.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn bulk_upload(&self, file: MultipartFile) -> Result<BulkUploadResult, ApiError> {
        let result: BulkUploadResult = self
            .api
            .upload("/inventory/items/bulk-upload", file)
            .await?
            .into_data();
        info!(created = result.created, updated = result.updated, "Bulk upload finished");
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn by_qr_number(&self, qr_number: &str) -> Result<Item, ApiError> {
        debug!("Sending request");
        let query = Query::new().push("qr_number", qr_number);
        Ok(self
            .api
            .get("/inventory/items/by-qr-number", query)
            .await?
            .into_data())
    }

    /// Resolves a scanned QR payload.
    #[instrument(skip(self))]
    pub async fn by_qr(&self, qr: &str) -> Result<Item, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .get(format!("/inventory/items/by-qr/{qr}"), Query::new())
            .await?
            .into_data())
    }

    /// QR image for an item, for preview or printing.
    #[instrument(skip(self))]
    pub async fn qr_image(&self, id: Id) -> Result<Blob, ApiError> {
        debug!("Sending request");
        Ok(self
            .api
            .download(format!("/inventory/items/{id}/qr"), Query::new())
            .await?
            .into_data())
    }
}

#[async_trait]
impl CrudResource for ItemClient {
    const PATH: &'static str = "/inventory/items";

    type Entity = Item;
    type Create = ItemPayload;
    type Filter = ItemFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl UpdatableResource for ItemClient {
    type Update = ItemPayload;
}
