//! Candidate filter pipeline.
//!
//! Pulls candidates from a [`CandidateSource`], then screens each one through the
//! enabled per-dimension filters with short-circuiting: the first failed filter ends
//! that candidate and no further extraction calls are made for it. One runner serves
//! both strategies; sequential is a concurrency of one.

pub mod criteria;
pub mod discovery;
pub mod error;
pub mod runner;
pub mod types;


pub use criteria::{
    CodeFilter, DimensionFilter, EducationFilter, FilterCriteria, PatentFilter, PublicationFilter,
    WorkExperienceFilter,
};
#[cfg(any(test, feature = "mock"))]
pub use discovery::MockCandidateSource;
pub use discovery::{CandidateSource, RemoteDiscovery};
pub use error::{CriteriaError, PipelineError, PipelineResult};
pub use runner::CandidatePipeline;
pub use types::{
    CandidateProfile, DiscoveredProfile, SearchRequest, SearchResponse, SearchSummary, Strategy,
};
