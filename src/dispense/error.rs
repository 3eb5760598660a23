//! Error types for the dispense workflow.

use thiserror::Error;

use crate::framework::ApiError;
use crate::model::{Id, RxStatus};

/// Errors that can occur while preparing or submitting a dispense.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispenseError {
    /// A line with a positive quantity has no batch selected.
    #[error("Select a batch for {medicine}")]
    MissingBatch { medicine: String },

    /// The selected batch disappeared between selection and submit.
    #[error("Batch {batch_no} of {medicine} is no longer available. Select another batch.")]
    BatchUnavailable { medicine: String, batch_no: String },

    /// The batch is not among the options offered for the line.
    #[error("Batch {batch_id} is not offered for {medicine}")]
    UnknownBatch { medicine: String, batch_id: Id },

    #[error("Enter a valid quantity for {medicine}")]
    InvalidQuantity { medicine: String },

    #[error("Enter a quantity to dispense")]
    NothingToDispense,

    #[error("Prescription line {0} not found")]
    UnknownLine(Id),

    #[error("Prescription is {0:?} and cannot be dispensed")]
    NotDispensable(RxStatus),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl DispenseError {
    /// Whether the error was raised locally, before any dispense request was sent.
    pub fn is_client_side(&self) -> bool {
        !matches!(self, DispenseError::Api(_) | DispenseError::BatchUnavailable { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            DispenseError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
