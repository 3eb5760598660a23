//! Create/edit dialog state.

use std::future::Future;

use tracing::{debug, warn};

use crate::framework::ApiError;
use crate::model::Id;

/// Open/closed state, the form being edited and the last submit error.
///
/// A successful submit closes the dialog and resets the form. A failed one leaves it
/// open with the error so the user can correct and resubmit.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog<F> {
    form: F,
    open: bool,
    editing: Option<Id>,
    error: Option<String>,
    submitting: bool,
}

impl<F: Default> Default for Dialog<F> {
    fn default() -> Self {
        Self {
            form: F::default(),
            open: false,
            editing: None,
            error: None,
            submitting: false,
        }
    }
}

impl<F: Default> Dialog<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens with a blank form.
    pub fn open_new(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    /// Opens pre-filled for editing record `id`.
    pub fn open_edit(&mut self, id: Id, form: F) {
        *self = Self {
            form,
            open: true,
            editing: Some(id),
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Id of the record being edited; `None` when creating.
    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Builds the payload from the form and sends it.
    ///
    /// Validation failures never reach `send`.
    pub async fn submit<P, T, B, S, Fut>(&mut self, build: B, send: S) -> Result<T, ApiError>
    where
        B: FnOnce(&F) -> Result<P, ApiError>,
        S: FnOnce(P) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.error = None;
        let payload = match build(&self.form) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "Form rejected");
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        self.submitting = true;
        let result = send(payload).await;
        self.submitting = false;

        match result {
            Ok(value) => {
                self.close();
                Ok(value)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!(error = %e, "Submit failed");
                    self.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }
}
