//! Keyed, cancellable fetches behind each read-only view
//!
//! A [`ViewModel`] owns at most one in-flight request. [`ViewModel::load`]
//! joins a request that is already running; [`ViewModel::refresh`] aborts
//! it and starts over. Each start bumps a generation counter and a
//! completion only lands if its generation is still current, so a
//! superseded response can never overwrite a newer one.

use std::future::Future;
use std::sync::{Arc, Weak};

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// What a view currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Last successful result; kept when a later fetch fails
    pub data: Option<T>,
    pub loading: bool,
    /// Message of the most recent failure, cleared by the next success
    pub error: Option<String>,
    /// Generation that produced `data` or `error`
    pub generation: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

struct Flight {
    generation: u64,
    abort: AbortHandle,
}

struct Inner<T> {
    name: &'static str,
    state: watch::Sender<Snapshot<T>>,
    flight: Mutex<Option<Flight>>,
    next_generation: std::sync::atomic::AtomicU64,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Some(flight) = self.flight.get_mut().take() {
            flight.abort.abort();
        }
    }
}

/// A named, single-flight view over one remote list or record
pub struct ViewModel<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ViewModel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ViewModel<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                name,
                state,
                flight: Mutex::new(None),
                next_generation: std::sync::atomic::AtomicU64::new(1),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Start `fetch` unless a request is already in flight
    ///
    /// Returns whether `fetch` was started; a joined call drops it unpolled.
    pub async fn load<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let mut flight = self.inner.flight.lock().await;
        if flight.is_some() {
            debug!("{}: joining in-flight fetch", self.inner.name);
            return false;
        }
        *flight = Some(self.start(fetch));
        true
    }

    /// Abort any in-flight request and start `fetch` in its place
    pub async fn refresh<F>(&self, fetch: F)
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let mut flight = self.inner.flight.lock().await;
        if let Some(previous) = flight.take() {
            debug!(
                "{}: superseding fetch #{}",
                self.inner.name, previous.generation
            );
            previous.abort.abort();
        }
        *flight = Some(self.start(fetch));
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.inner.state.subscribe()
    }

    /// Wait until no request is in flight and return the resulting state
    pub async fn settled(&self) -> Snapshot<T> {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|snapshot| !snapshot.loading).await {
            Ok(snapshot) => snapshot.clone(),
            // the sender lives in `inner`, which `self` keeps alive
            Err(_) => self.snapshot(),
        }
    }

    /// Wait for the view to settle, turning a recorded failure into an error
    pub async fn settled_ok(&self) -> ClientResult<Snapshot<T>> {
        let snapshot = self.settled().await;
        match &snapshot.error {
            Some(message) => Err(ClientError::Refresh {
                view: self.inner.name,
                message: message.clone(),
            }),
            None => Ok(snapshot),
        }
    }

    fn start<F>(&self, fetch: F) -> Flight
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let generation = self
            .inner
            .next_generation
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let (abort, registration) = AbortHandle::new_pair();
        self.inner.state.send_modify(|snapshot| snapshot.loading = true);

        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let Ok(result) = Abortable::new(fetch, registration).await else {
                return;
            };
            complete(weak, generation, result).await;
        });

        Flight { generation, abort }
    }
}

async fn complete<T>(weak: Weak<Inner<T>>, generation: u64, result: ClientResult<T>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let mut flight = inner.flight.lock().await;
    if flight.as_ref().map(|f| f.generation) != Some(generation) {
        debug!("{}: dropping stale fetch #{}", inner.name, generation);
        return;
    }
    *flight = None;

    inner.state.send_modify(|snapshot| {
        snapshot.loading = false;
        snapshot.generation = generation;
        match result {
            Ok(data) => {
                snapshot.data = Some(data);
                snapshot.error = None;
            }
            Err(e) => {
                warn!("{}: fetch failed: {}", inner.name, e);
                snapshot.error = Some(e.to_string());
            }
        }
    });
}
