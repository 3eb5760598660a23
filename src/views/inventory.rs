//! The inventory page: master data, stock, purchasing documents and the ledger.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::clients::{
    CrudResource, GrnClient, ItemClient, LocationClient, PurchaseOrderClient, ReturnClient, StockClient,
    SupplierClient, TransactionClient, UpdatableResource,
};
use crate::forms::{GrnForm, ItemForm, LocationForm, PurchaseOrderForm, ReturnForm, SupplierForm};
use crate::framework::{ApiClient, ApiError, Blob, MultipartFile, ObjectUrlRegistry, PreviewSlot, ResourceList};
use crate::model::{
    BulkUploadResult, ExpiryFilter, Grn, GrnFilter, Id, Item, ItemFilter, Location, PoStatus, PurchaseOrder,
    PurchaseOrderFilter, ReturnFilter, ReturnNote, StockBatch, StockFilter, StockSummaryRow, StockTransaction,
    Supplier, SupplierFilter, TransactionFilter,
};
use crate::views::Dialog;

/// Page state for inventory management.
///
/// Every list is a [`ResourceList`]; every mutation validates its form, sends one
/// request and then reloads the lists it affects.
pub struct InventoryView {
    location_client: LocationClient,
    supplier_client: SupplierClient,
    item_client: ItemClient,
    stock_client: StockClient,
    po_client: PurchaseOrderClient,
    grn_client: GrnClient,
    return_client: ReturnClient,
    registry: Arc<ObjectUrlRegistry>,

    pub locations: ResourceList<Location, ()>,
    pub suppliers: ResourceList<Supplier, SupplierFilter>,
    pub items: ResourceList<Item, ItemFilter>,
    pub stock: ResourceList<StockSummaryRow, StockFilter>,
    pub expiring: ResourceList<StockBatch, ExpiryFilter>,
    pub purchase_orders: ResourceList<PurchaseOrder, PurchaseOrderFilter>,
    pub grns: ResourceList<Grn, GrnFilter>,
    pub returns: ResourceList<ReturnNote, ReturnFilter>,
    pub transactions: ResourceList<StockTransaction, TransactionFilter>,

    pub location_dialog: Dialog<LocationForm>,
    pub supplier_dialog: Dialog<SupplierForm>,
    pub item_dialog: Dialog<ItemForm>,
    pub po_dialog: Dialog<PurchaseOrderForm>,
    pub grn_dialog: Dialog<GrnForm>,
    pub return_dialog: Dialog<ReturnForm>,

    /// QR image or PDF currently shown. Replacing or dropping it releases the URL.
    pub preview: PreviewSlot,
}

impl InventoryView {
    pub fn new(api: ApiClient, registry: Arc<ObjectUrlRegistry>) -> Self {
        let location_client = LocationClient::new(api.clone());
        let supplier_client = SupplierClient::new(api.clone());
        let item_client = ItemClient::new(api.clone());
        let stock_client = StockClient::new(api.clone());
        let po_client = PurchaseOrderClient::new(api.clone());
        let grn_client = GrnClient::new(api.clone());
        let return_client = ReturnClient::new(api.clone());
        let transaction_client = TransactionClient::new(api);

        let locations = {
            let client = location_client.clone();
            ResourceList::new("locations", (), move |filters: ()| {
                let client = client.clone();
                async move { client.list(&filters).await }
            })
        };
        let suppliers = {
            let client = supplier_client.clone();
            ResourceList::new("suppliers", SupplierFilter::default(), move |filters: SupplierFilter| {
                let client = client.clone();
                async move { client.list(&filters).await }
            })
        };
        let items = {
            let client = item_client.clone();
            ResourceList::new("items", ItemFilter::default(), move |filters: ItemFilter| {
                let client = client.clone();
                async move { client.list(&filters).await }
            })
        };
        let stock = {
            let client = stock_client.clone();
            ResourceList::new("stock", StockFilter::default(), move |filters: StockFilter| {
                let client = client.clone();
                async move { client.stock(&filters).await }
            })
        };
        let expiring = {
            let client = stock_client.clone();
            ResourceList::new("expiring", ExpiryFilter::default(), move |filters: ExpiryFilter| {
                let client = client.clone();
                async move { client.near_expiry(&filters).await }
            })
        };
        let purchase_orders = {
            let client = po_client.clone();
            ResourceList::new(
                "purchase-orders",
                PurchaseOrderFilter::default(),
                move |filters: PurchaseOrderFilter| {
                    let client = client.clone();
                    async move { client.list(&filters).await }
                },
            )
        };
        let grns = {
            let client = grn_client.clone();
            ResourceList::new("grns", GrnFilter::default(), move |filters: GrnFilter| {
                let client = client.clone();
                async move { client.list(&filters).await }
            })
        };
        let returns = {
            let client = return_client.clone();
            ResourceList::new("returns", ReturnFilter::default(), move |filters: ReturnFilter| {
                let client = client.clone();
                async move { client.list(&filters).await }
            })
        };
        let transactions = ResourceList::new(
            "transactions",
            TransactionFilter::default(),
            move |filters: TransactionFilter| {
                let client = transaction_client.clone();
                async move { client.list(&filters).await }
            },
        );

        Self {
            location_client,
            supplier_client,
            item_client,
            stock_client,
            po_client,
            grn_client,
            return_client,
            registry,
            locations,
            suppliers,
            items,
            stock,
            expiring,
            purchase_orders,
            grns,
            returns,
            transactions,
            location_dialog: Dialog::new(),
            supplier_dialog: Dialog::new(),
            item_dialog: Dialog::new(),
            po_dialog: Dialog::new(),
            grn_dialog: Dialog::new(),
            return_dialog: Dialog::new(),
            preview: PreviewSlot::new(),
        }
    }

    /// Loads every list concurrently and waits for all of them.
    pub async fn load_all(&self) {
        self.locations.reload();
        self.suppliers.reload();
        self.items.reload();
        self.stock.reload();
        self.expiring.reload();
        self.purchase_orders.reload();
        self.grns.reload();
        self.returns.reload();
        self.transactions.reload();

        self.locations.stream().settled().await;
        self.suppliers.stream().settled().await;
        self.items.stream().settled().await;
        self.stock.stream().settled().await;
        self.expiring.stream().settled().await;
        self.purchase_orders.stream().settled().await;
        self.grns.stream().settled().await;
        self.returns.stream().settled().await;
        self.transactions.stream().settled().await;
    }

    /// Applies a location filter to every location-scoped list.
    #[instrument(skip(self))]
    pub async fn set_location(&mut self, location_id: Option<Id>) {
        self.stock.update_filters(|f| f.location_id = location_id).await;
        self.expiring.update_filters(|f| f.location_id = location_id).await;
        self.purchase_orders.update_filters(|f| f.location_id = location_id).await;
        self.grns.update_filters(|f| f.location_id = location_id).await;
        self.returns.update_filters(|f| f.location_id = location_id).await;
        self.transactions.update_filters(|f| f.location_id = location_id).await;
    }

    // --- master data ---

    pub fn edit_location(&mut self, location: &Location) {
        self.location_dialog
            .open_edit(location.id, LocationForm::from_location(location));
    }

    pub async fn save_location(&mut self) -> Result<Location, ApiError> {
        let client = &self.location_client;
        let saved = match self.location_dialog.editing() {
            Some(id) => {
                self.location_dialog
                    .submit(LocationForm::to_update, |payload| async move { client.update(id, &payload).await })
                    .await?
            }
            None => {
                self.location_dialog
                    .submit(LocationForm::to_create, |payload| async move { client.create(&payload).await })
                    .await?
            }
        };
        info!(location_id = saved.id, "Location saved");
        self.locations.refresh().await;
        Ok(saved)
    }

    pub fn edit_supplier(&mut self, supplier: &Supplier) {
        self.supplier_dialog
            .open_edit(supplier.id, SupplierForm::from_supplier(supplier));
    }

    pub async fn save_supplier(&mut self) -> Result<Supplier, ApiError> {
        let client = &self.supplier_client;
        let editing = self.supplier_dialog.editing();
        let saved = self
            .supplier_dialog
            .submit(SupplierForm::to_payload, |payload| async move {
                match editing {
                    Some(id) => client.update(id, &payload).await,
                    None => client.create(&payload).await,
                }
            })
            .await?;
        info!(supplier_id = saved.id, "Supplier saved");
        self.suppliers.refresh().await;
        Ok(saved)
    }

    pub fn edit_item(&mut self, item: &Item) {
        self.item_dialog.open_edit(item.id, ItemForm::from_item(item));
    }

    pub async fn save_item(&mut self) -> Result<Item, ApiError> {
        let client = &self.item_client;
        let editing = self.item_dialog.editing();
        let saved = self
            .item_dialog
            .submit(ItemForm::to_payload, |payload| async move {
                match editing {
                    Some(id) => client.update(id, &payload).await,
                    None => client.create(&payload).await,
                }
            })
            .await?;
        info!(item_id = saved.id, "Item saved");
        self.items.refresh().await;
        Ok(saved)
    }

    /// Uploads an item CSV and reloads the catalogue.
    pub async fn bulk_upload(&self, file: MultipartFile) -> Result<BulkUploadResult, ApiError> {
        let result = self.item_client.bulk_upload(file).await?;
        self.items.refresh().await;
        Ok(result)
    }

    pub async fn sample_csv(&self) -> Result<Blob, ApiError> {
        self.item_client.sample_csv().await
    }

    pub async fn find_by_qr(&self, qr_number: &str) -> Result<Item, ApiError> {
        self.item_client.by_qr_number(qr_number).await
    }

    /// Shows an item's QR image, releasing whatever was previewed before.
    pub async fn preview_item_qr(&mut self, item_id: Id) -> Result<String, ApiError> {
        let blob = self.item_client.qr_image(item_id).await?;
        let url = self.registry.create(blob);
        Ok(self.preview.replace(url).as_str().to_string())
    }

    pub fn close_preview(&mut self) {
        self.preview.clear();
    }

    // --- purchase orders ---

    pub async fn save_purchase_order(&mut self) -> Result<PurchaseOrder, ApiError> {
        let client = &self.po_client;
        let editing = self.po_dialog.editing();
        let saved = self
            .po_dialog
            .submit(PurchaseOrderForm::to_payload, |payload| async move {
                match editing {
                    Some(id) => client.update(id, &payload).await,
                    None => client.create(&payload).await,
                }
            })
            .await?;
        info!(po_id = saved.id, "Purchase order saved");
        self.purchase_orders.refresh().await;
        Ok(saved)
    }

    pub async fn set_po_status(&self, id: Id, status: PoStatus) -> Result<PurchaseOrder, ApiError> {
        let po = self.po_client.set_status(id, status).await?;
        self.purchase_orders.refresh().await;
        Ok(po)
    }

    pub async fn mark_po_sent(&self, id: Id, email_to: Option<&str>) -> Result<PurchaseOrder, ApiError> {
        let po = self.po_client.mark_sent(id, email_to).await?;
        self.purchase_orders.refresh().await;
        Ok(po)
    }

    pub async fn preview_po_pdf(&mut self, id: Id) -> Result<String, ApiError> {
        let blob = self.po_client.pdf(id).await?;
        let url = self.registry.create(blob);
        Ok(self.preview.replace(url).as_str().to_string())
    }

    // --- goods receipt and returns ---

    /// Creates a GRN, then reloads GRNs and the stock summary.
    pub async fn create_grn(&mut self) -> Result<Grn, ApiError> {
        let client = &self.grn_client;
        let grn = self
            .grn_dialog
            .submit(GrnForm::to_payload, |payload| async move { client.create(&payload).await })
            .await?;
        info!(grn_id = grn.id, "GRN created");
        self.grns.refresh().await;
        self.stock.refresh().await;
        Ok(grn)
    }

    /// Posts a GRN. Stock, expiry and the ledger all change, so all are reloaded.
    pub async fn post_grn(&self, id: Id) -> Result<Grn, ApiError> {
        let grn = self.grn_client.post_grn(id).await?;
        self.grns.refresh().await;
        self.stock.refresh().await;
        self.expiring.refresh().await;
        self.transactions.refresh().await;
        Ok(grn)
    }

    pub async fn create_return(&mut self) -> Result<ReturnNote, ApiError> {
        let client = &self.return_client;
        let note = self
            .return_dialog
            .submit(ReturnForm::to_payload, |payload| async move { client.create(&payload).await })
            .await?;
        info!(return_id = note.id, "Return created");
        self.returns.refresh().await;
        Ok(note)
    }

    pub async fn post_return(&self, id: Id) -> Result<ReturnNote, ApiError> {
        let note = self.return_client.post_return(id).await?;
        self.returns.refresh().await;
        self.stock.refresh().await;
        self.transactions.refresh().await;
        Ok(note)
    }

    // --- stock alerts served under /inventory/alerts ---

    pub async fn expired(&self, location_id: Option<Id>) -> Result<Vec<StockBatch>, ApiError> {
        self.stock_client.expired(location_id).await
    }

    pub async fn quarantined(&self, location_id: Option<Id>) -> Result<Vec<StockBatch>, ApiError> {
        self.stock_client.quarantine(location_id).await
    }

    pub async fn low_stock(&self, location_id: Option<Id>) -> Result<Vec<StockSummaryRow>, ApiError> {
        self.stock_client.low_stock(location_id).await
    }

    pub async fn over_stock(&self, location_id: Option<Id>) -> Result<Vec<StockSummaryRow>, ApiError> {
        self.stock_client.max_stock(location_id).await
    }
}
