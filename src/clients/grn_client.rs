use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::clients::CrudResource;
use crate::framework::{ApiClient, ApiError, Query};
use crate::model::{Grn, GrnCreate, GrnFilter, Id};

/// Goods receipt notes. Posting a GRN creates the stock batches.
#[derive(Debug, Clone)]
pub struct GrnClient {
    api: ApiClient,
}

impl GrnClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn post_grn(&self, id: Id) -> Result<Grn, ApiError> {
        let grn: Grn = self
            .api
            .post_with::<Value, _>(format!("{}/{id}/post", Self::PATH), Query::new(), None)
            .await?
            .into_data();
        info!("GRN posted");
        Ok(grn)
    }
}

#[async_trait]
impl CrudResource for GrnClient {
    const PATH: &'static str = "/inventory/grn";

    type Entity = Grn;
    type Create = GrnCreate;
    type Filter = GrnFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}
