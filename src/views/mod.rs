//! Page-level state holders.
//!
//! A view owns its lists, dialogs and previews. Nothing is shared between views;
//! two views showing the same stock only agree after each reloads.

pub mod dialog;
pub mod inventory;
pub mod pharmacy;
pub mod stock_alerts;

pub use dialog::*;
pub use inventory::*;
pub use pharmacy::*;
pub use stock_alerts::*;
