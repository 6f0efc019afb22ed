//! Extraction stages: one cache-aware wrapper per evaluation dimension.
//!
//! A stage looks up `(dimension, profile query)` in the shared [`CacheStore`](crate::cache::CacheStore),
//! calls its collaborator on a miss, and folds every failure into a fully-populated
//! [`Extracted`] value:
//!
//! | Failure       | Outcome                                              |
//! |---------------|------------------------------------------------------|
//! | `RateLimited` | `Critical`; no retry; collaborator paused for the run |
//! | `Transient`   | one retry, then `Degraded`                           |
//! | `NotFound`    | `Degraded` (neutral default + warning)               |
//! | `Malformed`   | `Degraded` (neutral default + warning)               |

pub mod collaborator;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod remote;
pub mod stage;
pub mod types;

#[cfg(test)]
mod tests;

pub use collaborator::{Extractor, ExtractorSet, ProfileRef, StageContext};
pub use error::{CollaboratorError, CollaboratorResult, FailureKind};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockExtractor;
pub use remote::RemoteExtractor;
pub use stage::{ExhaustedServices, ExtractionStage, StageOptions, StageSet};
pub use types::{
    CodeActivity, DegreeLevel, Dimension, EducationProfile, Extracted, ExtractionPayload,
    Extractions, FieldRelevance, InstituteTier, PatentRecord, Position, PublicationRecord,
    StageStatus, WorkHistory,
};
