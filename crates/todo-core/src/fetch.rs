use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::watch::{Listeners, Subscription};

/// Issues a GET and yields the response body of a 2xx response.
pub trait HttpClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Shared handle on one remote JSON resource.
///
/// Requests are never cancelled or merged: whichever response resolves last
/// decides `data`/`error`.
pub struct RemoteResource<T> {
    url: Rc<str>,
    state: Rc<RefCell<FetchState<T>>>,
    listeners: Listeners<FetchState<T>>,
}

impl<T> Clone for RemoteResource<T> {
    fn clone(&self) -> Self {
        Self {
            url: Rc::clone(&self.url),
            state: Rc::clone(&self.state),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T> PartialEq for RemoteResource<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> RemoteResource<T>
where
    T: Clone + DeserializeOwned + 'static,
{
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: Rc::from(url),
            state: Rc::new(RefCell::new(FetchState::default())),
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FetchState<T>) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Marks a request as in flight and clears the previous error.
    pub fn begin(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            state.error = None;
        }
        self.publish();
    }

    /// Records a resolved request. Failures keep whatever data was loaded
    /// before.
    pub fn complete(&self, result: Result<T, FetchError>) {
        {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(data) => state.data = Some(data),
                Err(error) => state.error = Some(error),
            }
            state.loading = false;
        }
        self.publish();
    }

    /// Performs one GET and returns what it resolved to.
    #[tracing::instrument(skip(self, client), fields(url = %self.url))]
    pub async fn fetch<C: HttpClient>(&self, client: &C) -> Result<T, FetchError> {
        self.begin();
        let result = match client.get(&self.url).await {
            Ok(body) => {
                serde_json::from_str::<T>(&body).map_err(|err| FetchError::Decode(err.to_string()))
            }
            Err(error) => Err(error),
        };

        match &result {
            Ok(_) => debug!("remote resource loaded"),
            Err(error) => warn!(%error, "remote resource failed"),
        }
        self.complete(result.clone());
        result
    }

    pub async fn refetch<C: HttpClient>(&self, client: &C) -> Result<T, FetchError> {
        self.fetch(client).await
    }

    fn publish(&self) {
        let snapshot = self.state();
        self.listeners.notify(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{HttpClient, RemoteResource};
    use crate::error::FetchError;

    struct Scripted {
        body: Result<String, FetchError>,
        yields: usize,
    }

    impl HttpClient for Scripted {
        async fn get(&self, _url: &str) -> Result<String, FetchError> {
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            self.body.clone()
        }
    }

    fn ok(body: &str, yields: usize) -> Scripted {
        Scripted {
            body: Ok(body.to_string()),
            yields,
        }
    }

    #[tokio::test]
    async fn success_stores_data_and_clears_loading() {
        let remote = RemoteResource::<Vec<u32>>::new("https://example.test/n");
        let loaded = remote.fetch(&ok("[1,2]", 0)).await.expect("fetch");

        assert_eq!(loaded, vec![1, 2]);
        let state = remote.state();
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_keeps_previous_data() {
        let remote = RemoteResource::<Vec<u32>>::new("https://example.test/n");
        remote.fetch(&ok("[5]", 0)).await.expect("first fetch");

        let failing = Scripted {
            body: Err(FetchError::Status { status: 503 }),
            yields: 0,
        };
        let err = remote.refetch(&failing).await.expect_err("should fail");
        assert_eq!(err, FetchError::Status { status: 503 });

        let state = remote.state();
        assert_eq!(state.data, Some(vec![5]));
        assert_eq!(state.error, Some(FetchError::Status { status: 503 }));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let remote = RemoteResource::<Vec<u32>>::new("https://example.test/n");
        let err = remote.fetch(&ok("{\"oops\":", 0)).await.expect_err("decode");
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn later_resolution_wins() {
        let remote = RemoteResource::<Vec<u32>>::new("https://example.test/n");
        let slow = ok("[1]", 4);
        let fast = ok("[2]", 1);

        let (first, second) = tokio::join!(remote.fetch(&slow), remote.refetch(&fast));
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(remote.data(), Some(vec![1]));
    }

    #[tokio::test]
    async fn begin_clears_error_and_notifies() {
        let remote = RemoteResource::<Vec<u32>>::new("https://example.test/n");
        remote.complete(Err(FetchError::Network("offline".into())));

        let loading_seen = Rc::new(Cell::new(false));
        let _sub = {
            let loading_seen = Rc::clone(&loading_seen);
            remote.subscribe(move |state| {
                if state.loading && state.error.is_none() {
                    loading_seen.set(true);
                }
            })
        };

        remote.begin();
        assert!(loading_seen.get());
        assert!(remote.is_loading());
    }
}
