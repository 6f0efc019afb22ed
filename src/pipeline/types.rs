use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::criteria::FilterCriteria;
use super::error::PipelineError;
use crate::constants::{DEFAULT_CONCURRENCY, MAX_PROFILES_LIMIT, MAX_SEARCH_RESULTS_LIMIT};
use crate::extraction::{Dimension, Extractions, ProfileRef};
use crate::scoring::ScoreBreakdown;

const DEFAULT_MAX_PROFILES: usize = 10;
const DEFAULT_MAX_SEARCH_RESULTS: usize = 50;

/// Candidate identity returned by discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredProfile {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl DiscoveredProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn profile(&self) -> ProfileRef {
        ProfileRef {
            name: self.name.clone(),
            document_text: None,
            external_id: Some(self.username.clone()),
            url: self.url.clone(),
        }
    }
}

/// Candidate search request.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: FilterCriteria,
    /// Stop once this many candidates have passed every enabled filter.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_max_profiles")]
    pub max_profiles: usize,
    /// Upper bound on candidates pulled from discovery.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

fn default_max_profiles() -> usize {
    DEFAULT_MAX_PROFILES
}

fn default_max_search_results() -> usize {
    DEFAULT_MAX_SEARCH_RESULTS
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            filters: FilterCriteria::default(),
            max_profiles: DEFAULT_MAX_PROFILES,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
        }
    }
}

impl SearchRequest {
    pub fn new(filters: FilterCriteria, max_profiles: usize, max_search_results: usize) -> Self {
        Self {
            filters,
            max_profiles,
            max_search_results,
        }
    }

    /// Rejects out-of-range limits and invalid criteria before any work starts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_profiles == 0 || self.max_profiles > MAX_PROFILES_LIMIT {
            return Err(PipelineError::InvalidRequest {
                reason: format!(
                    "maxProfiles must be between 1 and {}, got {}",
                    MAX_PROFILES_LIMIT, self.max_profiles
                ),
            });
        }
        if self.max_search_results == 0 || self.max_search_results > MAX_SEARCH_RESULTS_LIMIT {
            return Err(PipelineError::InvalidRequest {
                reason: format!(
                    "maxSearchResults must be between 1 and {}, got {}",
                    MAX_SEARCH_RESULTS_LIMIT, self.max_search_results
                ),
            });
        }
        self.filters.validate()?;
        Ok(())
    }
}

/// How candidates are scheduled. Both produce the same passing set in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One candidate at a time.
    Sequential,
    /// Up to `batch` candidates in flight.
    Concurrent { batch: usize },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Concurrent {
            batch: DEFAULT_CONCURRENCY,
        }
    }
}

impl Strategy {
    /// Concurrency of one is sequential.
    pub fn with_concurrency(concurrency: usize) -> Self {
        if concurrency <= 1 {
            Strategy::Sequential
        } else {
            Strategy::Concurrent { batch: concurrency }
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Strategy::Sequential => 1,
            Strategy::Concurrent { batch } => (*batch).max(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Concurrent { .. } => "concurrent",
        }
    }
}

/// A candidate that passed every enabled filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub username: String,
    pub profile_name: String,
    pub url: Option<String>,
    pub parsing: Extractions,
    pub scoring: ScoreBreakdown,
    /// Dimension names, in the order they were passed.
    pub passed_filters: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    /// Candidates screened (passed, rejected or dropped).
    pub profiles_processed: usize,
    /// Candidates returned by discovery.
    pub search_results: usize,
    /// Wall-clock milliseconds.
    pub processing_time: u64,
    pub processing_method: String,
    pub passed_profiles: usize,
    /// Dimensions whose collaborator hit a rate limit during the run.
    pub exhausted_services: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    /// Passing candidates in discovery order.
    pub profiles: Vec<CandidateProfile>,
    pub summary: SearchSummary,
}

impl SearchResponse {
    pub fn usernames(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.username.as_str()).collect()
    }
}
