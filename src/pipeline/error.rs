use thiserror::Error;

use crate::extraction::{CollaboratorError, Dimension};

#[derive(Debug, Error)]
/// Filter criteria rejected at the pipeline boundary.
pub enum CriteriaError {
    /// Input did not match the criteria schema.
    #[error("malformed filter criteria: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A threshold outside its valid range.
    #[error("invalid {dimension} threshold '{field}': {reason}")]
    InvalidThreshold {
        dimension: Dimension,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
/// Errors that end a pipeline run before any candidate is screened.
pub enum PipelineError {
    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),

    #[error("invalid search request: {reason}")]
    InvalidRequest { reason: String },

    #[error("candidate discovery failed: {0}")]
    Discovery(#[source] CollaboratorError),
}

/// Convenience result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;
