//! Status-tracked asynchronous fetch for a single query key.
//!
//! `AsyncResource` owns the lifecycle of one logical query. The caller reports
//! the current key with [`AsyncResource::observe`] every update cycle; a changed
//! key replaces the request state and spawns a fetch. Fetch outcomes come back
//! over a channel tagged with the epoch they were issued under, and are applied
//! only if that epoch is still current.
//!
//! ```text
//! observe(k) ──changed──> Idle ──non-empty key──> Pending ──settle(epoch)──> Resolved | Rejected
//!     │                                                  │
//!     └──unchanged──> no-op                              └──epoch superseded──> discarded
//! ```
//!
//! Failures are stored, not thrown. They surface only when the state is read
//! through [`AsyncResource::render`], which returns `Err(RenderError::Rejected)`
//! so an enclosing boundary can substitute its fallback.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;

use pokedex_types::{FailureInfo, QueryKey, RenderError, RequestState, RequestStatus};

use crate::boundary::panic_message;

const SETTLEMENT_CHANNEL_CAPACITY: usize = 16;

/// Fetch future type alias.
pub type FetchFut<T> = Pin<Box<dyn Future<Output = Result<T, FailureInfo>> + Send + 'static>>;

/// The external request a resource performs for a key.
///
/// Implementations own the transport; the resource depends only on this contract.
pub trait Fetcher<T>: Send + Sync {
    fn fetch(&self, key: QueryKey) -> FetchFut<T>;
}

/// Presentation of each request status.
///
/// [`AsyncResource::render`] never calls `render_rejected`. A rejected state is
/// raised as an error instead, and only a boundary that captured it hands it to
/// `render_rejected` as its fallback.
pub trait Renderer<T> {
    type Output;

    fn render_idle(&mut self) -> Self::Output;
    fn render_pending(&mut self, key: &QueryKey) -> Self::Output;
    fn render_resolved(&mut self, data: &T) -> Self::Output;
    fn render_rejected(&mut self, error: &RenderError) -> Self::Output;
}

/// Generation tag for the request state currently accepting settlements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to a settlement delivered to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The settlement matched the current epoch and moved the state here.
    Applied(RequestStatus),
    /// The key changed after the request was issued; the result was dropped.
    Stale,
}

struct Settlement<T> {
    epoch: Epoch,
    key: QueryKey,
    outcome: Result<T, FailureInfo>,
}

pub struct AsyncResource<T> {
    fetcher: Arc<dyn Fetcher<T>>,
    key: QueryKey,
    epoch: Epoch,
    state: RequestState<T>,
    fetches_issued: u64,
    in_flight: usize,
    settle_tx: mpsc::Sender<Settlement<T>>,
    settle_rx: mpsc::Receiver<Settlement<T>>,
}

impl<T> fmt::Debug for AsyncResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResource")
            .field("key", &self.key)
            .field("epoch", &self.epoch)
            .field("status", &self.state.status())
            .field("fetches_issued", &self.fetches_issued)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> AsyncResource<T> {
    /// A fresh resource tracks the empty key and is idle.
    pub fn new(fetcher: Arc<dyn Fetcher<T>>) -> Self {
        let (settle_tx, settle_rx) = mpsc::channel(SETTLEMENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            key: QueryKey::empty(),
            epoch: Epoch::default(),
            state: RequestState::Idle,
            fetches_issued: 0,
            in_flight: 0,
            settle_tx,
            settle_rx,
        }
    }

    /// Reports the caller's current key.
    ///
    /// An unchanged key is a no-op. A changed key discards the current state,
    /// opens a new epoch, and (for a non-empty key) spawns a fetch, leaving the
    /// state `Pending` by the time this returns. Must be called from within a
    /// tokio runtime.
    pub fn observe(&mut self, key: &QueryKey) -> &RequestState<T> {
        if self.key == *key {
            return &self.state;
        }

        self.epoch = self.epoch.next();
        self.key = key.clone();
        self.state = RequestState::Idle;

        if !self.key.is_empty() {
            self.start_fetch();
        }
        &self.state
    }

    fn start_fetch(&mut self) {
        let epoch = self.epoch;
        let key = self.key.clone();
        let request = self.fetcher.fetch(key.clone());
        let tx = self.settle_tx.clone();

        self.state = RequestState::Pending;
        self.fetches_issued += 1;
        self.in_flight += 1;
        tracing::debug!(key = %key, epoch = %epoch, "fetch scheduled");

        tokio::spawn(async move {
            // A panicking fetch still settles its epoch, as a rejection.
            let outcome = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(FailureInfo::new("fetch panicked")
                    .with_cause(panic_message(payload.as_ref()))),
            };
            // Send fails only once the resource has been dropped.
            let _ = tx.send(Settlement { epoch, key, outcome }).await;
        });
    }

    /// Applies every settlement already delivered, without waiting.
    ///
    /// Returns the number of settlements that changed the state.
    pub fn process_settlements(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(settlement) = self.settle_rx.try_recv() {
            if matches!(self.apply(settlement), SettleOutcome::Applied(_)) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next settlement and applies it.
    ///
    /// Returns `None` immediately when no request is in flight.
    pub async fn settle_next(&mut self) -> Option<SettleOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let settlement = self.settle_rx.recv().await?;
        Some(self.apply(settlement))
    }

    fn apply(&mut self, settlement: Settlement<T>) -> SettleOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if settlement.epoch != self.epoch {
            tracing::debug!(
                key = %settlement.key,
                epoch = %settlement.epoch,
                current = %self.epoch,
                "discarding stale settlement"
            );
            return SettleOutcome::Stale;
        }

        self.state = RequestState::settled(settlement.outcome);
        let status = self.state.status();
        tracing::debug!(key = %self.key, epoch = %self.epoch, %status, "settlement applied");
        SettleOutcome::Applied(status)
    }
}

impl<T> AsyncResource<T> {
    /// Maps the current status onto the renderer.
    ///
    /// A rejected state is returned as `Err` on every read while it stays current.
    pub fn render<R: Renderer<T>>(&self, renderer: &mut R) -> Result<R::Output, RenderError> {
        match &self.state {
            RequestState::Idle => Ok(renderer.render_idle()),
            RequestState::Pending => Ok(renderer.render_pending(&self.key)),
            RequestState::Resolved(data) => Ok(renderer.render_resolved(data)),
            RequestState::Rejected(info) => Err(RenderError::Rejected(info.clone())),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.state.status()
    }

    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Total fetches started over the resource's lifetime.
    #[must_use]
    pub fn fetches_issued(&self) -> u64 {
        self.fetches_issued
    }

    /// Fetches spawned whose settlement has not been received yet, stale ones included.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
