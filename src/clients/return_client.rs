use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::clients::CrudResource;
use crate::framework::{ApiClient, ApiError, Query};
use crate::model::{Id, ReturnCreate, ReturnFilter, ReturnNote};

/// Return notes: to supplier, from customer and internal.
#[derive(Debug, Clone)]
pub struct ReturnClient {
    api: ApiClient,
}

impl ReturnClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Posts the return, moving stock out of the referenced batches.
    #[instrument(skip(self))]
    pub async fn post_return(&self, id: Id) -> Result<ReturnNote, ApiError> {
        let note: ReturnNote = self
            .api
            .post_with::<Value, _>(format!("{}/{id}/post", Self::PATH), Query::new(), None)
            .await?
            .into_data();
        info!("Return posted");
        Ok(note)
    }
}

#[async_trait]
impl CrudResource for ReturnClient {
    const PATH: &'static str = "/inventory/returns";

    type Entity = ReturnNote;
    type Create = ReturnCreate;
    type Filter = ReturnFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}
