//! # Latest-Wins Query Streams
//!
//! A [`QueryStream`] is one independent data stream (a list, a KPI summary, a page of
//! alerts). Starting a new request on the stream aborts the previous one, and a
//! generation counter makes sure a late result never overwrites a newer one:
//!
//! 1. [`QueryStream::begin`] bumps the generation and returns a [`QueryTicket`].
//! 2. [`QueryStream::commit`] applies a result only if its ticket is still current.
//! 3. [`QueryStream::run`] does both around a spawned future and keeps its abort handle.
//!
//! State is published through a `watch` channel, so any number of observers can
//! [`subscribe`](QueryStream::subscribe).

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::framework::ApiError;

/// Observable state of a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// Last successfully applied data. Kept when a later request fails.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
    /// Generation of the last applied result.
    pub generation: u64,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

/// Proof of which request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct StreamInner<T> {
    name: &'static str,
    generation: AtomicU64,
    inflight: Mutex<Option<AbortHandle>>,
    state: watch::Sender<QueryState<T>>,
}

/// A cancellable, latest-wins data stream. Clones share the same stream.
pub struct QueryStream<T> {
    inner: Arc<StreamInner<T>>,
}

impl<T> Clone for QueryStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> QueryStream<T> {
    pub fn name(&self) -> &'static str {
        self.inner.name
    }
}

impl<T: Send + Sync + 'static> QueryStream<T> {
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            inner: Arc::new(StreamInner {
                name,
                generation: AtomicU64::new(0),
                inflight: Mutex::new(None),
                state,
            }),
        }
    }

    /// Generation of the most recently started request.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Starts a new request generation and aborts the one in flight.
    pub fn begin(&self) -> QueryTicket {
        self.abort_inflight();
        self.begin_locked()
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.generation == self.generation()
    }

    /// Applies `result` if `ticket` is still the latest generation.
    ///
    /// Returns `false` for stale results, which are dropped untouched. Cancellations
    /// only clear `loading`; other errors are recorded while the previous data stays.
    pub fn commit(&self, ticket: QueryTicket, result: Result<T, ApiError>) -> bool {
        let name = self.inner.name;
        let applied = self.inner.state.send_if_modified(|state| {
            if self.inner.generation.load(Ordering::SeqCst) != ticket.generation {
                return false;
            }
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    warn!(stream = name, generation = ticket.generation, error = %e, "Load failed");
                    state.error = Some(e);
                }
            }
            state.loading = false;
            state.generation = ticket.generation;
            true
        });
        if !applied {
            debug!(stream = name, generation = ticket.generation, "Discarded stale result");
        }
        applied
    }

    /// Spawns `fut` as the stream's current request.
    pub fn run<F>(&self, fut: F) -> QueryTicket
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut inflight = self
            .inner
            .inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = inflight.take() {
            previous.abort();
        }
        let ticket = self.begin_locked();
        let stream = self.clone();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            stream.commit(ticket, result);
        });
        *inflight = Some(handle.abort_handle());
        ticket
    }

    /// Aborts the in-flight request and invalidates any result it might still deliver.
    pub fn cancel(&self) {
        self.abort_inflight();
        let name = self.inner.name;
        self.inner.state.send_modify(|state| {
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(stream = name, generation, "Cancelled");
            state.loading = false;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    fn abort_inflight(&self) {
        let mut inflight = self
            .inner
            .inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = inflight.take() {
            previous.abort();
        }
    }

    // Same as `begin` for callers already holding the in-flight lock.
    fn begin_locked(&self) -> QueryTicket {
        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        debug!(stream = self.inner.name, generation, "Begin");
        QueryTicket { generation }
    }
}

impl<T: Clone + Send + Sync + 'static> QueryStream<T> {
    pub fn snapshot(&self) -> QueryState<T> {
        self.inner.state.borrow().clone()
    }

    /// Waits until no request is pending and returns the state.
    pub async fn settled(&self) -> QueryState<T> {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }
}
