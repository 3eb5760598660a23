//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); the structured fields
//! (`call`, `stream`, `rx_id`, `location_id`, ...) carry the context instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle events and completed mutations
//! RUST_LOG=info
//!
//! # Every request, payloads included
//! RUST_LOG=debug
//!
//! # Cache hits and misses as well
//! RUST_LOG=trace
//!
//! # Only the transport
//! RUST_LOG=pharmacy_client::framework=debug
//! ```
//!
//! ## What Gets Logged
//!
//! - **Transport**: start/stop at `info`, each dispatched call at `debug`, failures at `warn`
//! - **Streams**: generation changes and discarded stale results at `debug`
//! - **Dispense**: opened sessions at `debug`, vanished batches at `warn`, accepted dispenses at `info`
//!
//! With `RUST_LOG=debug` a dispense looks like:
//!
//! ```text
//! DEBUG Dispatch call=GET /pharmacy/prescriptions/41
//! DEBUG Dispatch call=GET /pharmacy/batches/pick
//! DEBUG open: Dispense session opened lines=2
//! DEBUG submit: Dispatch call=GET /pharmacy/batches/pick
//! DEBUG submit: Sending request request=DispenseRequest { .. }
//! INFO submit: Dispensed lines=2 create_sale=true
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Panics if one is already set.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Installs the global subscriber unless one is already set. Safe to call from tests.
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_refused() {
        try_setup_tracing();
        assert!(!try_setup_tracing());
    }
}
