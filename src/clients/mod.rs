//! Typed wrappers around [`ApiClient`](crate::framework::ApiClient), one per backend concern.

pub mod grn_client;
pub mod item_client;
pub mod location_client;
pub mod pharmacy_client;
pub mod purchase_order_client;
pub mod resource_client;
pub mod return_client;
pub mod stock_alert_client;
pub mod stock_client;
pub mod supplier_client;
pub mod transaction_client;

pub use grn_client::*;
pub use item_client::*;
pub use location_client::*;
pub use pharmacy_client::*;
pub use purchase_order_client::*;
pub use resource_client::*;
pub use return_client::*;
pub use stock_alert_client::*;
pub use stock_client::*;
pub use supplier_client::*;
pub use transaction_client::*;
