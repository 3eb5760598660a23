//! Records exchanged with the backend.
//!
//! Every type here is a plain `serde` DTO. The server owns all invariants (stock levels,
//! batch status, document state machines); the client only reads them back. Unknown
//! fields are ignored and enum values the client does not know decode as `Unknown`.

pub mod alert;
pub mod master;
pub mod page;
pub mod prescription;
pub mod purchasing;
pub mod stock;

pub use alert::*;
pub use master::*;
pub use page::*;
pub use prescription::*;
pub use purchasing::*;
pub use stock::*;

/// Server-side identifier.
pub type Id = i64;
