//! Filtered resource lists.
//!
//! A [`ResourceList`] keeps a local copy of one server collection under a filter set.
//! It is a thin layer over [`QueryStream`]: changing filters or refreshing starts a
//! new generation, so responses that arrive out of order are discarded.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;

use crate::framework::{ApiError, QueryState, QueryStream, QueryTicket};

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, ApiError>> + Send>>;
type Fetcher<T, F> = Arc<dyn Fn(F) -> FetchFuture<T> + Send + Sync>;

pub struct ResourceList<T, F> {
    stream: QueryStream<Vec<T>>,
    filters: F,
    fetcher: Fetcher<T, F>,
}

impl<T, F: fmt::Debug> fmt::Debug for ResourceList<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceList")
            .field("name", &self.stream.name())
            .field("filters", &self.filters)
            .finish()
    }
}

impl<T, F> ResourceList<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + Send + Sync + 'static,
{
    pub fn new<G, Fut>(name: &'static str, filters: F, fetch: G) -> Self
    where
        G: Fn(F) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        let fetcher: Fetcher<T, F> = Arc::new(move |filters| Box::pin(fetch(filters)));
        Self {
            stream: QueryStream::new(name),
            filters,
            fetcher,
        }
    }

    /// Starts a reload with the current filters without waiting for it.
    pub fn reload(&self) -> QueryTicket {
        let fut = (self.fetcher)(self.filters.clone());
        self.stream.run(fut)
    }

    /// Reloads and waits for the result.
    pub async fn refresh(&self) -> QueryState<Vec<T>> {
        self.reload();
        self.stream.settled().await
    }

    /// Replaces the filters and reloads.
    pub async fn set_filters(&mut self, filters: F) -> QueryState<Vec<T>> {
        self.filters = filters;
        self.refresh().await
    }

    /// Edits the filters in place and reloads.
    pub async fn update_filters(&mut self, edit: impl FnOnce(&mut F)) -> QueryState<Vec<T>> {
        edit(&mut self.filters);
        self.refresh().await
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    /// Current items; empty until the first successful load.
    pub fn items(&self) -> Vec<T> {
        self.stream.snapshot().data.unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.stream.is_loading()
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.stream.snapshot().error
    }

    pub fn cancel(&self) {
        self.stream.cancel();
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<T>>> {
        self.stream.subscribe()
    }

    pub fn stream(&self) -> &QueryStream<Vec<T>> {
        &self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default)]
    struct Filters {
        location_id: Option<i64>,
    }

    #[tokio::test]
    async fn test_debug_shows_name_and_filters() {
        let list = ResourceList::new("stock", Filters { location_id: Some(2) }, |_f: Filters| async {
            Ok(Vec::<i64>::new())
        });
        let text = format!("{list:?}");
        assert!(text.contains("\"stock\""));
        assert!(text.contains("location_id: Some(2)"));
    }

    #[tokio::test]
    async fn test_refresh_replaces_items_and_clears_loading() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let mut list = ResourceList::new("stock", Filters::default(), move |f: Filters| {
            recorder.lock().unwrap().push(f.location_id);
            async move { Ok(vec![f.location_id.unwrap_or(0) * 10]) }
        });

        let state = list.refresh().await;
        assert_eq!(state.data, Some(vec![0]));
        assert!(!list.is_loading());

        let state = list
            .set_filters(Filters {
                location_id: Some(4),
            })
            .await;
        assert_eq!(state.data, Some(vec![40]));
        assert_eq!(list.items(), vec![40]);
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(4)]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_items_and_reports_error() {
        let fail = Arc::new(Mutex::new(false));
        let flag = fail.clone();
        let list = ResourceList::new("items", (), move |_: ()| {
            let fail = *flag.lock().unwrap();
            async move {
                if fail {
                    Err(ApiError::Transport("connection refused".into()))
                } else {
                    Ok(vec!["PCM500"])
                }
            }
        });

        list.refresh().await;
        *fail.lock().unwrap() = true;
        let state = list.refresh().await;

        assert_eq!(state.data, Some(vec!["PCM500"]));
        assert!(!state.loading);
        assert!(list.last_error().is_some());
    }
}
