//! Core domain types for Pokedex.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod pokemon;
mod request;

pub use pokemon::{Attack, Attacks, EXAMPLE_POKEMON, Pokemon};
pub use request::{RequestState, RequestStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Query Keys
// ============================================================================

/// Identifies what is being fetched.
///
/// Keys compare by value. The empty key is legal and means "nothing submitted":
/// it never triggers a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    /// Builds a key from user input, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QueryKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for QueryKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ============================================================================
// Failures
// ============================================================================

/// Why a fetch failed: a user-facing message and an optional underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FailureInfo {
    message: String,
    cause: Option<String>,
}

impl FailureInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

/// A failure raised while rendering a subtree.
///
/// This is what a boundary captures and hands to its fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A resource in the `rejected` state was read.
    #[error("{0}")]
    Rejected(FailureInfo),
    /// A panic unwound out of the wrapped render.
    #[error("render panicked: {0}")]
    Panicked(String),
    /// Any other failure the subtree reported while rendering.
    #[error("{0}")]
    Failed(String),
}

impl RenderError {
    /// The message shown to the user in a fallback.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            RenderError::Rejected(info) => info.message(),
            RenderError::Panicked(msg) | RenderError::Failed(msg) => msg,
        }
    }
}

impl From<FailureInfo> for RenderError {
    fn from(info: FailureInfo) -> Self {
        RenderError::Rejected(info)
    }
}

// ============================================================================
// Boundary Record
// ============================================================================

/// Captured-failure record held by a boundary.
///
/// `has_failed` is derived from the presence of the captured error, so the
/// flag and the payload cannot disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryRecord {
    captured: Option<RenderError>,
}

impl BoundaryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.captured.is_some()
    }

    #[must_use]
    pub fn captured_error(&self) -> Option<&RenderError> {
        self.captured.as_ref()
    }

    /// Records a failure. The first captured failure wins; later ones are ignored
    /// because a failed boundary never re-renders its subtree.
    pub fn capture(&mut self, error: RenderError) -> &RenderError {
        self.captured.get_or_insert(error)
    }
}
