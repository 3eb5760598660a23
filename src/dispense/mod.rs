//! Batch-aware dispensing.
//!
//! The flow a pharmacist follows at the counter:
//!
//! 1. [`DispenseQueue`] lists prescriptions waiting at a location, with patient names
//!    hydrated through a keyed cache.
//! 2. [`DispenseSession::open`] loads one prescription, computes what remains on each
//!    line and pre-selects a batch per line from the FEFO-ordered options.
//! 3. The pharmacist adjusts quantities and batches.
//! 4. [`DispenseSession::submit`] checks every line has a batch, re-fetches batch
//!    options to catch stock consumed in the meantime, then posts the dispense.
//!
//! This is a sequence of requests, not a reservation protocol. The server decides
//! what can actually be dispensed.

pub mod error;
pub mod frequency;
pub mod queue;
pub mod session;

pub use error::*;
pub use frequency::*;
pub use queue::*;
pub use session::*;

/// Quantity still to dispense on a line. Clamped at zero for over-dispensed data.
pub fn remaining_qty(requested: f64, dispensed: f64) -> f64 {
    let remaining = requested - dispensed;
    if remaining.is_finite() && remaining > 0.0 {
        remaining
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_quantity() {
        assert_eq!(remaining_qty(10.0, 4.0), 6.0);
        assert_eq!(remaining_qty(5.0, 5.0), 0.0);
    }

    #[test]
    fn test_over_dispensed_clamps_to_zero() {
        assert_eq!(remaining_qty(5.0, 7.0), 0.0);
        assert_eq!(remaining_qty(f64::NAN, 1.0), 0.0);
    }
}
