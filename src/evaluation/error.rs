use thiserror::Error;

use crate::scoring::WeightError;

#[derive(Debug, Clone, Error, PartialEq)]
/// Request rejected before any extraction work started.
pub enum EvaluationError {
    /// Neither a name, document text nor external profile id was supplied.
    #[error("evaluation request needs a name, document text or external profile id")]
    MissingIdentity,

    /// Weights with negative or non-finite components.
    #[error("invalid weights: {0}")]
    InvalidWeights(#[from] WeightError),
}
