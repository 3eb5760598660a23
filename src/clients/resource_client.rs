use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::framework::{ApiClient, ApiError, Query};
use crate::model::{Id, ListBody};

/// Trait for resource-specific clients to inherit standard list/get/create calls.
///
/// A client only names its collection path and its record types; the default methods
/// issue `GET {PATH}`, `GET {PATH}/{id}` and `POST {PATH}`.
#[async_trait]
pub trait CrudResource: Send + Sync {
    /// Collection path, e.g. `/inventory/locations`.
    const PATH: &'static str;

    type Entity: DeserializeOwned + Send + 'static;
    type Create: Serialize + Send + Sync;
    /// Filter struct flattened into the list query. Use `()` for unfiltered lists.
    type Filter: Serialize + Send + Sync;

    /// Access the shared transport handle.
    fn api(&self) -> &ApiClient;

    /// List the collection under `filters`. `None` filter fields are left off the query.
    #[instrument(skip(self, filters))]
    async fn list(&self, filters: &Self::Filter) -> Result<Vec<Self::Entity>, ApiError> {
        let query = Query::from_filters(filters)?;
        debug!(?query, "Sending request");
        let body: ListBody<Self::Entity> = self.api().get(Self::PATH, query).await?.into_data();
        Ok(body.into_vec())
    }

    /// Fetch one record by id.
    #[instrument(skip(self))]
    async fn get(&self, id: Id) -> Result<Self::Entity, ApiError> {
        debug!("Sending request");
        let path = format!("{}/{id}", Self::PATH);
        Ok(self.api().get(path, Query::new()).await?.into_data())
    }

    #[instrument(skip(self, payload))]
    async fn create(&self, payload: &Self::Create) -> Result<Self::Entity, ApiError> {
        debug!("Sending request");
        Ok(self.api().post(Self::PATH, payload).await?.into_data())
    }
}

/// Resources that also accept `PUT {PATH}/{id}`.
#[async_trait]
pub trait UpdatableResource: CrudResource {
    type Update: Serialize + Send + Sync;

    #[instrument(skip(self, payload))]
    async fn update(&self, id: Id, payload: &Self::Update) -> Result<Self::Entity, ApiError> {
        debug!("Sending request");
        let path = format!("{}/{id}", Self::PATH);
        Ok(self.api().put(path, payload).await?.into_data())
    }
}
