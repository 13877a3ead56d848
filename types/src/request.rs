//! Lifecycle of a single fetch attempt.

use std::fmt;

use crate::FailureInfo;

/// Discrete status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Resolved,
    Rejected,
}

impl RequestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Pending => "pending",
            RequestStatus::Resolved => "resolved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status, data and error of one fetch attempt, as a single value.
///
/// Data exists only in `Resolved` and the error only in `Rejected`, so every
/// transition replaces all three at once. There is no way to observe a resolved
/// status next to stale data, or a pending status next to a leftover error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Pending,
    Resolved(T),
    Rejected(FailureInfo),
}

impl<T> RequestState<T> {
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        match self {
            RequestState::Idle => RequestStatus::Idle,
            RequestState::Pending => RequestStatus::Pending,
            RequestState::Resolved(_) => RequestStatus::Resolved,
            RequestState::Rejected(_) => RequestStatus::Rejected,
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Resolved(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&FailureInfo> {
        match self {
            RequestState::Rejected(info) => Some(info),
            _ => None,
        }
    }

    /// Builds the settled state for a request outcome.
    pub fn settled(outcome: Result<T, FailureInfo>) -> Self {
        match outcome {
            Ok(data) => RequestState::Resolved(data),
            Err(info) => RequestState::Rejected(info),
        }
    }
}
