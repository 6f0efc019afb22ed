//! Deterministic composite scoring.
//!
//! Each dimension gets a raw score from fixed tables in [`rules`], is rescaled to 0-10
//! (`normalized`), then multiplied by its weight. The composite is the sum of the
//! weighted scores; the percentage is taken against `Σ 10 × weight`.
//!
//! Scoring is a pure function: identical extractions and weights always produce an
//! identical [`ScoreBreakdown`].

pub mod engine;
pub mod error;
pub mod rules;
pub mod types;
pub mod weights;


pub use engine::{score, score_default};
pub use error::{WeightError, WeightResult};
pub use types::{Breakdown, DimensionScore, Grade, ScoreBreakdown};
pub use weights::{DEFAULT_WEIGHTS, WeightVector};
