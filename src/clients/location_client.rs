use async_trait::async_trait;

use crate::clients::{CrudResource, UpdatableResource};
use crate::framework::ApiClient;
use crate::model::{Location, LocationCreate, LocationUpdate};

/// Client for inventory locations (stores, wards, sub-pharmacies).
#[derive(Debug, Clone)]
pub struct LocationClient {
    api: ApiClient,
}

impl LocationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CrudResource for LocationClient {
    const PATH: &'static str = "/inventory/locations";

    type Entity = Location;
    type Create = LocationCreate;
    type Filter = ();

    fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl UpdatableResource for LocationClient {
    type Update = LocationUpdate;
}
