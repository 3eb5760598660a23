//! Runtime orchestration and lifecycle management.
//!
//! # Main Components
//!
//! - [`PharmacySystem`] - starts the transport, wires every client and shuts down cleanly
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod system;
pub mod tracing;

pub use self::tracing::*;
pub use system::*;
