//! Core request lifecycle and failure isolation for Pokedex.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`resource`] | `AsyncResource`: one query key, one live request state, epoch-guarded settlement |
//! | [`boundary`] | `RecoverableBoundary` and the identity-keyed `KeyedBoundary` |
//! | [`errors`] | Fallback formatting for captured failures |
//!
//! The two halves compose: a resource raises its rejected state as an `Err` while
//! rendering, the boundary around it captures that error and keeps showing the
//! fallback until the caller supplies a new identity.

pub mod boundary;
pub mod errors;
pub mod resource;

pub use boundary::{
    BoundaryState, CatchesFailures, KeyedBoundary, MountId, RecoverableBoundary, Wrapped,
};
pub use errors::{FALLBACK_HEADLINE, FailureReport, failure_report, truncate_with_ellipsis};
pub use resource::{AsyncResource, Epoch, FetchFut, Fetcher, Renderer, SettleOutcome};

pub use pokedex_types::{
    BoundaryRecord, FailureInfo, QueryKey, RenderError, RequestState, RequestStatus,
};
