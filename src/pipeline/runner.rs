use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::criteria::{DimensionFilter, FilterCriteria};
use super::discovery::CandidateSource;
use super::error::{PipelineError, PipelineResult};
use super::types::{
    CandidateProfile, DiscoveredProfile, SearchRequest, SearchResponse, SearchSummary, Strategy,
};
use crate::constants::DEFAULT_RETRY_BACKOFF;
use crate::evaluation::orchestrator::{context_from, record};
use crate::extraction::{
    Dimension, ExhaustedServices, Extracted, ExtractionPayload, ExtractionStage, Extractions,
    ProfileRef, StageContext, StageSet,
};
use crate::scoring;

/// Verdict of one dimension's filter.
enum Gate {
    Pass,
    Fail,
    Critical,
}

/// Final state of one screened candidate.
enum Screened {
    Passed(Box<CandidateProfile>),
    Rejected { at: Dimension },
    Dropped { at: Dimension },
}

/// Discovers candidates and screens each through the enabled filters.
pub struct CandidatePipeline {
    stages: Arc<StageSet>,
    source: Arc<dyn CandidateSource>,
    retry_backoff: Duration,
}

impl std::fmt::Debug for CandidatePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidatePipeline")
            .field("stages", &self.stages)
            .field("retry_backoff", &self.retry_backoff)
            .finish_non_exhaustive()
    }
}

impl CandidatePipeline {
    pub fn new(stages: Arc<StageSet>, source: Arc<dyn CandidateSource>) -> Self {
        Self {
            stages,
            source,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Pause before retrying a transient discovery failure.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Runs one search.
    ///
    /// Candidates are screened in batches of `strategy.width()`. Each candidate runs
    /// only its enabled dimensions, in stage order, and stops at the first failed
    /// filter. A critical stage failure drops that candidate alone; the exhausted
    /// collaborator is then skipped for the rest of the run.
    #[instrument(skip_all, fields(method = strategy.as_str(), max_profiles = request.max_profiles))]
    pub async fn run(
        &self,
        request: &SearchRequest,
        strategy: Strategy,
    ) -> PipelineResult<SearchResponse> {
        let started = Instant::now();
        request.validate()?;

        let enabled = request.filters.enabled_dimensions();
        let mut discovered = self.discover(request).await?;
        discovered.truncate(request.max_search_results);
        let search_results = discovered.len();
        info!(
            search_results,
            enabled = ?enabled,
            "Screening discovered candidates"
        );

        let exhausted = ExhaustedServices::new();
        let mut passed = Vec::new();
        let mut processed = 0usize;

        for batch in discovered.chunks(strategy.width()) {
            if passed.len() >= request.max_profiles {
                break;
            }

            let screened = join_all(
                batch
                    .iter()
                    .map(|candidate| self.screen(candidate, &request.filters, &enabled, &exhausted)),
            )
            .await;
            processed += batch.len();

            for (candidate, outcome) in batch.iter().zip(screened) {
                match outcome {
                    Screened::Passed(profile) => {
                        info!(username = %candidate.username, "Candidate passed all filters");
                        passed.push(*profile);
                    }
                    Screened::Rejected { at } => {
                        debug!(username = %candidate.username, dimension = %at, "Candidate rejected");
                    }
                    Screened::Dropped { at } => {
                        warn!(username = %candidate.username, dimension = %at, "Candidate dropped after critical failure");
                    }
                }
            }
        }
        passed.truncate(request.max_profiles);

        let summary = SearchSummary {
            profiles_processed: processed,
            search_results,
            processing_time: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            processing_method: strategy.as_str().to_string(),
            passed_profiles: passed.len(),
            exhausted_services: exhausted.snapshot(),
        };
        info!(
            processed = summary.profiles_processed,
            passed = summary.passed_profiles,
            elapsed_ms = summary.processing_time,
            "Candidate search complete"
        );

        Ok(SearchResponse {
            success: true,
            profiles: passed,
            summary,
        })
    }

    async fn discover(&self, request: &SearchRequest) -> PipelineResult<Vec<DiscoveredProfile>> {
        let limit = request.max_search_results;
        match self.source.discover(&request.filters, limit).await {
            Ok(found) => Ok(found),
            Err(e) if e.kind().is_retryable() => {
                warn!(error = %e, "Transient discovery failure, retrying once");
                if !self.retry_backoff.is_zero() {
                    tokio::time::sleep(self.retry_backoff).await;
                }
                self.source
                    .discover(&request.filters, limit)
                    .await
                    .map_err(PipelineError::Discovery)
            }
            Err(e) => Err(PipelineError::Discovery(e)),
        }
    }

    async fn screen(
        &self,
        candidate: &DiscoveredProfile,
        filters: &FilterCriteria,
        enabled: &[Dimension],
        exhausted: &ExhaustedServices,
    ) -> Screened {
        let profile = candidate.profile();
        let none = StageContext::default();
        let mut parsing = Extractions::default();
        let mut errors = Vec::new();
        let mut passed_filters = Vec::new();

        for &dimension in enabled {
            let gate = match dimension {
                Dimension::Education => {
                    let (result, gate) = check(
                        &self.stages.education,
                        &filters.education,
                        &profile,
                        &none,
                        exhausted,
                        &mut errors,
                    )
                    .await;
                    parsing.education = result;
                    gate
                }
                Dimension::Publications => {
                    let (result, gate) = check(
                        &self.stages.publications,
                        &filters.publications,
                        &profile,
                        &none,
                        exhausted,
                        &mut errors,
                    )
                    .await;
                    parsing.publications = result;
                    gate
                }
                Dimension::Patents => {
                    let (result, gate) = check(
                        &self.stages.patents,
                        &filters.patents,
                        &profile,
                        &none,
                        exhausted,
                        &mut errors,
                    )
                    .await;
                    parsing.patents = result;
                    gate
                }
                Dimension::Code => {
                    let (result, gate) = check(
                        &self.stages.code,
                        &filters.code,
                        &profile,
                        &none,
                        exhausted,
                        &mut errors,
                    )
                    .await;
                    parsing.code = result;
                    gate
                }
                Dimension::WorkExperience => {
                    let context = context_from(&parsing);
                    let (result, gate) = check(
                        &self.stages.work_experience,
                        &filters.work_experience,
                        &profile,
                        &context,
                        exhausted,
                        &mut errors,
                    )
                    .await;
                    parsing.work_experience = result;
                    gate
                }
            };

            match gate {
                Gate::Pass => passed_filters.push(dimension.as_str().to_string()),
                Gate::Fail => return Screened::Rejected { at: dimension },
                Gate::Critical => return Screened::Dropped { at: dimension },
            }
        }

        let scoring = scoring::score_default(&parsing);
        Screened::Passed(Box::new(CandidateProfile {
            username: candidate.username.clone(),
            profile_name: profile_name(candidate, &profile),
            url: candidate.url.clone(),
            parsing,
            scoring,
            passed_filters,
            errors,
        }))
    }
}

async fn check<T, F>(
    stage: &ExtractionStage<T>,
    filter: &F,
    profile: &ProfileRef,
    context: &StageContext,
    exhausted: &ExhaustedServices,
    errors: &mut Vec<String>,
) -> (Extracted<T>, Gate)
where
    T: ExtractionPayload,
    F: DimensionFilter<T>,
{
    let result = stage.run(profile, context, exhausted).await;
    let gate = if record(&result, errors) {
        Gate::Critical
    } else if filter.admits(&result.data) {
        Gate::Pass
    } else {
        Gate::Fail
    };
    (result, gate)
}

fn profile_name(candidate: &DiscoveredProfile, profile: &ProfileRef) -> String {
    match candidate.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => profile.display_name(),
    }
}
