//! Failure isolation for rendered subtrees.
//!
//! A [`RecoverableBoundary`] runs a subtree's render and captures any failure it
//! raises, either as an `Err(RenderError)` or as a panic. Once a failure is
//! captured the boundary stays failed: it keeps returning the fallback and never
//! runs the subtree again.
//!
//! Recovery happens only by replacement. [`KeyedBoundary`] ties a boundary and
//! the subtree state it protects to an identity value; when the identity changes,
//! both are dropped and rebuilt from scratch.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use pokedex_types::{BoundaryRecord, RenderError};

use crate::resource::{AsyncResource, Renderer};

/// Result of rendering through a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wrapped<T> {
    /// The subtree rendered normally.
    Rendered(T),
    /// The boundary is failed; render the fallback for this error instead.
    Fallback(RenderError),
}

impl<T> Wrapped<T> {
    /// Collapses to a single output, rendering the fallback when needed.
    pub fn or_fallback(self, fallback: impl FnOnce(&RenderError) -> T) -> T {
        match self {
            Wrapped::Rendered(output) => output,
            Wrapped::Fallback(error) => fallback(&error),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Wrapped::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    Healthy,
    Failed,
}

/// Capability to intercept failures raised while a child subtree renders.
pub trait CatchesFailures {
    fn record(&self) -> &BoundaryRecord;

    /// Renders `subtree` unless a failure is already captured.
    fn wrap<T, F>(&mut self, subtree: F) -> Wrapped<T>
    where
        F: FnOnce() -> Result<T, RenderError>;

    fn state(&self) -> BoundaryState {
        if self.record().has_failed() {
            BoundaryState::Failed
        } else {
            BoundaryState::Healthy
        }
    }
}

#[derive(Debug, Default)]
pub struct RecoverableBoundary {
    record: BoundaryRecord,
}

impl RecoverableBoundary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fail<T>(&mut self, error: RenderError) -> Wrapped<T> {
        tracing::warn!(error = %error, "render failure captured by boundary");
        Wrapped::Fallback(self.record.capture(error).clone())
    }
}

impl CatchesFailures for RecoverableBoundary {
    fn record(&self) -> &BoundaryRecord {
        &self.record
    }

    fn wrap<T, F>(&mut self, subtree: F) -> Wrapped<T>
    where
        F: FnOnce() -> Result<T, RenderError>,
    {
        if let Some(error) = self.record.captured_error() {
            return Wrapped::Fallback(error.clone());
        }

        match panic::catch_unwind(AssertUnwindSafe(subtree)) {
            Ok(Ok(output)) => Wrapped::Rendered(output),
            Ok(Err(error)) => self.fail(error),
            Err(payload) => self.fail(RenderError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Identifies one mounted boundary instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(u64);

impl MountId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Mount<S> {
    id: MountId,
    boundary: RecoverableBoundary,
    subtree: S,
}

/// A boundary plus the subtree it protects, remounted whenever its identity changes.
pub struct KeyedBoundary<K, S> {
    identity: K,
    mount: Mount<S>,
    next_id: u64,
    factory: Box<dyn FnMut() -> S>,
}

impl<K: fmt::Debug, S> fmt::Debug for KeyedBoundary<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedBoundary")
            .field("identity", &self.identity)
            .field("mount", &self.mount.id)
            .field("record", &self.mount.boundary.record)
            .finish_non_exhaustive()
    }
}

impl<K, S> KeyedBoundary<K, S>
where
    K: Clone + PartialEq + fmt::Display,
{
    pub fn new(identity: K, factory: impl FnMut() -> S + 'static) -> Self {
        let mut factory: Box<dyn FnMut() -> S> = Box::new(factory);
        let subtree = factory();
        Self {
            identity,
            mount: Mount {
                id: MountId(0),
                boundary: RecoverableBoundary::new(),
                subtree,
            },
            next_id: 1,
            factory,
        }
    }

    /// Remounts when `identity` differs from the last one seen.
    ///
    /// Returns whether a remount happened. An unchanged identity keeps the current
    /// instance, failed or not.
    pub fn reset(&mut self, identity: &K) -> bool {
        if self.identity == *identity {
            return false;
        }

        let id = MountId(self.next_id);
        self.next_id += 1;
        tracing::info!(
            from = %self.identity,
            to = %identity,
            previous = %self.mount.id,
            mount = %id,
            "remounting boundary"
        );

        self.identity = identity.clone();
        self.mount = Mount {
            id,
            boundary: RecoverableBoundary::new(),
            subtree: (self.factory)(),
        };
        true
    }

    /// Renders the subtree through the current boundary instance.
    pub fn wrap<T>(&mut self, render: impl FnOnce(&S) -> Result<T, RenderError>) -> Wrapped<T> {
        let Mount {
            boundary, subtree, ..
        } = &mut self.mount;
        let subtree = &*subtree;
        boundary.wrap(|| render(subtree))
    }

    #[must_use]
    pub fn identity(&self) -> &K {
        &self.identity
    }

    #[must_use]
    pub fn mount_id(&self) -> MountId {
        self.mount.id
    }

    #[must_use]
    pub fn state(&self) -> BoundaryState {
        self.mount.boundary.state()
    }

    #[must_use]
    pub fn record(&self) -> &BoundaryRecord {
        self.mount.boundary.record()
    }

    #[must_use]
    pub fn subtree(&self) -> &S {
        &self.mount.subtree
    }

    pub fn subtree_mut(&mut self) -> &mut S {
        &mut self.mount.subtree
    }
}

impl<K, T> KeyedBoundary<K, AsyncResource<T>>
where
    K: Clone + PartialEq + fmt::Display,
{
    /// Renders the resource, falling back to `render_rejected` when the boundary
    /// has captured a failure.
    pub fn render<R: Renderer<T>>(&mut self, renderer: &mut R) -> R::Output {
        self.wrap(|resource| resource.render(renderer))
            .or_fallback(|error| renderer.render_rejected(error))
    }
}
