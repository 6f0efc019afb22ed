use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification attached where a collaborator call fails.
///
/// Downstream code branches on this tag; it never re-derives the kind from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Quota exhausted. Critical and never retried.
    RateLimited,
    /// Network error, timeout or 5xx. Retried once.
    Transient,
    /// The service has nothing for this profile.
    NotFound,
    /// The service answered with something unusable.
    Malformed,
}

impl FailureKind {
    /// Aborts the remaining stages of the affected profile.
    #[inline]
    pub fn is_critical(&self) -> bool {
        matches!(self, FailureKind::RateLimited)
    }

    /// Eligible for the single in-stage retry.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Transient)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Failure reported by an external collaborator (extractor or discovery service).
pub enum CollaboratorError {
    /// Quota exhausted (HTTP 429).
    #[error("{service} rate limit exceeded: {message}")]
    RateLimited { service: String, message: String },

    /// Timeout, connection failure or 5xx.
    #[error("{service} temporarily unavailable: {message}")]
    Transient { service: String, message: String },

    /// No data for this profile (HTTP 404).
    #[error("{service} found no data: {message}")]
    NotFound { service: String, message: String },

    /// Body that does not decode into the expected payload.
    #[error("{service} returned a malformed response: {message}")]
    Malformed { service: String, message: String },
}

impl CollaboratorError {
    /// Builds a [`CollaboratorError::RateLimited`].
    pub fn rate_limited(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Builds a [`CollaboratorError::Transient`].
    pub fn transient(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Builds a [`CollaboratorError::NotFound`].
    pub fn not_found(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Builds a [`CollaboratorError::Malformed`].
    pub fn malformed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            service: service.into(),
            message: message.into(),
        }
    }

    /// The structured failure tag.
    pub fn kind(&self) -> FailureKind {
        match self {
            CollaboratorError::RateLimited { .. } => FailureKind::RateLimited,
            CollaboratorError::Transient { .. } => FailureKind::Transient,
            CollaboratorError::NotFound { .. } => FailureKind::NotFound,
            CollaboratorError::Malformed { .. } => FailureKind::Malformed,
        }
    }

    /// Name of the collaborator that failed.
    pub fn service(&self) -> &str {
        match self {
            CollaboratorError::RateLimited { service, .. }
            | CollaboratorError::Transient { service, .. }
            | CollaboratorError::NotFound { service, .. }
            | CollaboratorError::Malformed { service, .. } => service,
        }
    }
}

/// Convenience result type for collaborator calls.
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
