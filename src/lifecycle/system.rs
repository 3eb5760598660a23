use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::clients::{
    GrnClient, ItemClient, LocationClient, PharmacyClient, PurchaseOrderClient, ReturnClient, StockAlertClient,
    StockClient, SupplierClient, TransactionClient,
};
use crate::config::{ClientConfig, ConfigError};
use crate::dispense::{BatchCache, DispenseError, DispenseQueue, DispenseSession, PatientCache};
use crate::framework::{ApiClient, ApiError, ErrorHook, HttpActor, KeyedCache, ObjectUrlRegistry};
use crate::model::{Id, RxFilter, RxQueueFilter};
use crate::views::{InventoryView, RxView, StockAlertsDashboard};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Transport task failed: {0}")]
    Task(String),
}

/// The runtime root: one HTTP transport, every typed client and the shared caches.
///
/// `PharmacySystem` is responsible for:
/// - **Lifecycle**: spawning the [`HttpActor`] and stopping it on [`shutdown`](Self::shutdown)
/// - **Wiring**: handing the same [`ApiClient`] to every client and view
/// - **Shared state**: the patient-name and batch-option caches, and the object-URL registry
///
/// # Example
///
/// ```ignore
/// let system = PharmacySystem::connect(load_config()?)?;
///
/// let queue = system.dispense_queue(RxQueueFilter { location_id: Some(1), ..Default::default() });
/// let entries = queue.refresh().await?;
///
/// system.shutdown().await?;
/// ```
pub struct PharmacySystem {
    pub config: ClientConfig,
    pub api: ApiClient,

    pub locations: LocationClient,
    pub suppliers: SupplierClient,
    pub items: ItemClient,
    pub stock: StockClient,
    pub purchase_orders: PurchaseOrderClient,
    pub grns: GrnClient,
    pub returns: ReturnClient,
    pub transactions: TransactionClient,
    pub pharmacy: PharmacyClient,
    pub stock_alerts: StockAlertClient,

    pub patients: Arc<PatientCache>,
    pub batches: Arc<BatchCache>,
    pub object_urls: Arc<ObjectUrlRegistry>,

    /// Transport task, `None` when built on an external client.
    handle: Option<JoinHandle<()>>,
}

impl PharmacySystem {
    /// Validates `config`, starts the HTTP transport and wires every client.
    pub fn connect(config: ClientConfig) -> Result<Self, SystemError> {
        Self::start(config, None)
    }

    /// Like [`connect`](Self::connect), with a hook that sees every failed request.
    pub fn connect_with(config: ClientConfig, hook: ErrorHook) -> Result<Self, SystemError> {
        Self::start(config, Some(hook))
    }

    fn start(config: ClientConfig, hook: Option<ErrorHook>) -> Result<Self, SystemError> {
        config.validate()?;
        let (actor, api) = HttpActor::new(&config)?;
        let api = match hook {
            Some(hook) => api.with_error_hook(hook),
            None => api,
        };
        let handle = tokio::spawn(actor.run());
        info!(base_url = %config.base_url, "Pharmacy system started");

        let mut system = Self::from_client(api, config);
        system.handle = Some(handle);
        Ok(system)
    }

    /// Wires the clients onto an existing handle, e.g. one from [`MockTransport`](crate::framework::mock::MockTransport).
    pub fn from_client(api: ApiClient, config: ClientConfig) -> Self {
        Self {
            locations: LocationClient::new(api.clone()),
            suppliers: SupplierClient::new(api.clone()),
            items: ItemClient::new(api.clone()),
            stock: StockClient::new(api.clone()),
            purchase_orders: PurchaseOrderClient::new(api.clone()),
            grns: GrnClient::new(api.clone()),
            returns: ReturnClient::new(api.clone()),
            transactions: TransactionClient::new(api.clone()),
            pharmacy: PharmacyClient::new(api.clone()),
            stock_alerts: StockAlertClient::new(api.clone()),
            patients: Arc::new(KeyedCache::new("patients")),
            batches: Arc::new(KeyedCache::new("batches")),
            object_urls: ObjectUrlRegistry::new(),
            api,
            config,
            handle: None,
        }
    }

    pub fn inventory_view(&self) -> InventoryView {
        InventoryView::new(self.api.clone(), self.object_urls.clone())
    }

    pub fn rx_view(&self, filters: RxFilter) -> RxView {
        RxView::new(self.pharmacy.clone(), self.object_urls.clone(), filters)
    }

    pub fn stock_alerts_dashboard(&self) -> StockAlertsDashboard {
        StockAlertsDashboard::new(self.api.clone())
    }

    pub fn dispense_queue(&self, filters: RxQueueFilter) -> DispenseQueue {
        DispenseQueue::new(
            self.pharmacy.clone(),
            self.patients.clone(),
            self.batches.clone(),
            self.config.batch_pick_limit,
            filters,
        )
    }

    pub async fn open_dispense(&self, rx_id: Id, location_id: Id) -> Result<DispenseSession, DispenseError> {
        DispenseSession::open(
            self.pharmacy.clone(),
            self.batches.clone(),
            self.config.batch_pick_limit,
            rx_id,
            location_id,
        )
        .await
    }

    /// Gracefully shuts down the transport.
    ///
    /// Dropping the system's clients closes the request channel once every view and
    /// session created from it is gone too; the actor then drains and exits.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down pharmacy system...");
        let Self {
            api,
            locations,
            suppliers,
            items,
            stock,
            purchase_orders,
            grns,
            returns,
            transactions,
            pharmacy,
            stock_alerts,
            handle,
            ..
        } = self;
        drop((
            api,
            locations,
            suppliers,
            items,
            stock,
            purchase_orders,
            grns,
            returns,
            transactions,
            pharmacy,
            stock_alerts,
        ));

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Transport task failed: {:?}", e);
                return Err(SystemError::Task(e.to_string()));
            }
        }

        info!("Pharmacy system shutdown complete.");
        Ok(())
    }
}
