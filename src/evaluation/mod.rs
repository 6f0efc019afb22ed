//! Single-profile evaluation.
//!
//! Stages run strictly in order: education, publications, patents, code, then work
//! experience with the publication and code outputs as context. Terminal states are
//! `complete` (every stage ran, possibly degraded) and `critical` (halted early).

pub mod error;
pub mod orchestrator;
pub mod types;


pub use error::EvaluationError;
pub use orchestrator::Evaluator;
pub use types::{EvaluationRequest, EvaluationResult};
