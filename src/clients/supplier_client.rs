use async_trait::async_trait;

use crate::clients::{CrudResource, UpdatableResource};
use crate::framework::ApiClient;
use crate::model::{Supplier, SupplierFilter, SupplierPayload};

#[derive(Debug, Clone)]
pub struct SupplierClient {
    api: ApiClient,
}

impl SupplierClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CrudResource for SupplierClient {
    const PATH: &'static str = "/inventory/suppliers";

    type Entity = Supplier;
    type Create = SupplierPayload;
    type Filter = SupplierFilter;

    fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl UpdatableResource for SupplierClient {
    type Update = SupplierPayload;
}
