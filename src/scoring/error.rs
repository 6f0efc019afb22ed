use thiserror::Error;

use crate::extraction::Dimension;

#[derive(Debug, Clone, Error, PartialEq)]
/// Why a weight vector was rejected.
pub enum WeightError {
    #[error("weight for {dimension} is negative: {value}")]
    Negative { dimension: Dimension, value: f64 },

    #[error("weight for {dimension} is not a finite number")]
    NonFinite { dimension: Dimension },

    #[error("weights sum to {sum:.4}, expected 1.0 (±{tolerance})")]
    BadSum { sum: f64, tolerance: f64 },
}

/// Convenience result type for weight validation.
pub type WeightResult<T> = Result<T, WeightError>;
