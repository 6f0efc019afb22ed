//! Lens library crate (used by the `lens` binary and integration tests).
//!
//! Evaluates a professional profile across five dimensions (education,
//! publications, patents, code contributions, work experience) and screens
//! discovered candidates through per-dimension filters.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`CacheStore`] - Durable TTL cache shared by every extraction stage
//! - [`StageSet`], [`ExtractionStage`] - Cache-aware collaborator wrappers
//! - [`score`], [`ScoreBreakdown`], [`WeightVector`] - Deterministic scoring
//! - [`Evaluator`] - Single-profile orchestration
//! - [`CandidatePipeline`] - Short-circuit candidate filtering
//! - [`Config`], [`ConfigError`] - Environment configuration
//!
//! ## Collaborators
//! - [`Extractor`] / [`CandidateSource`] traits, with HTTP implementations
//!   [`RemoteExtractor`] and [`RemoteDiscovery`]
//!
//! ## Test/Mock Support
//! Mock collaborators are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod evaluation;
pub mod extraction;
pub mod hashing;
pub mod pipeline;
pub mod scoring;

pub use cache::{CacheEntry, CacheError, CacheResult, CacheStats, CacheStore};
pub use config::{Config, ConfigError};
pub use evaluation::{EvaluationError, EvaluationRequest, EvaluationResult, Evaluator};
#[cfg(any(test, feature = "mock"))]
pub use extraction::MockExtractor;
pub use extraction::{
    CollaboratorError, CollaboratorResult, Dimension, ExhaustedServices, Extracted,
    ExtractionStage, Extractions, Extractor, ExtractorSet, FailureKind, ProfileRef,
    RemoteExtractor, StageContext, StageOptions, StageSet, StageStatus,
};
pub use hashing::{cache_key_hex, hash_cache_key, normalize_query};
#[cfg(any(test, feature = "mock"))]
pub use pipeline::MockCandidateSource;
pub use pipeline::{
    CandidatePipeline, CandidateProfile, CandidateSource, CriteriaError, FilterCriteria,
    PipelineError, RemoteDiscovery, SearchRequest, SearchResponse, Strategy,
};
pub use scoring::{DEFAULT_WEIGHTS, Grade, ScoreBreakdown, WeightError, WeightVector, score};
