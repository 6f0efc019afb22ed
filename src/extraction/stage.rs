use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::collaborator::{Extractor, ExtractorSet, ProfileRef, StageContext};
use super::error::{CollaboratorError, FailureKind};
use super::types::{
    CodeActivity, Dimension, EducationProfile, Extracted, ExtractionPayload, PatentRecord,
    PublicationRecord, WorkHistory,
};
use crate::cache::CacheStore;
use crate::constants::{DEFAULT_MAX_EXTERNAL_CALLS, DEFAULT_RETRY_BACKOFF};

/// Dimensions whose collaborator hit a rate limit during one run.
///
/// Created per orchestrator evaluation or pipeline run. Once a dimension is marked,
/// stages stop calling its collaborator for the rest of that run; cache hits still serve.
#[derive(Debug, Default)]
pub struct ExhaustedServices {
    inner: Mutex<BTreeSet<Dimension>>,
}

impl ExhaustedServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, dimension: Dimension) -> bool {
        self.inner.lock().insert(dimension)
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.inner.lock().contains(&dimension)
    }

    /// Marked dimensions in stage order.
    pub fn snapshot(&self) -> Vec<Dimension> {
        self.inner.lock().iter().copied().collect()
    }
}

/// Knobs shared by every stage of a [`StageSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOptions {
    /// Permits of the semaphore guarding collaborator calls.
    pub max_external_calls: usize,
    /// Pause before the single transient retry.
    pub retry_backoff: Duration,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            max_external_calls: DEFAULT_MAX_EXTERNAL_CALLS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Cache-aware wrapper around one dimension's collaborator.
pub struct ExtractionStage<T: ExtractionPayload> {
    extractor: Arc<dyn Extractor<T>>,
    cache: Arc<CacheStore>,
    limiter: Arc<Semaphore>,
    retry_backoff: Duration,
}

impl<T: ExtractionPayload> std::fmt::Debug for ExtractionStage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionStage")
            .field("dimension", &T::DIMENSION)
            .field("cache", &self.cache.root())
            .field("available_permits", &self.limiter.available_permits())
            .finish_non_exhaustive()
    }
}

enum Attempt<T> {
    Done(T),
    Failed(CollaboratorError),
}

impl<T: ExtractionPayload> ExtractionStage<T> {
    pub fn new(
        extractor: Arc<dyn Extractor<T>>,
        cache: Arc<CacheStore>,
        limiter: Arc<Semaphore>,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            extractor,
            cache,
            limiter,
            retry_backoff,
        }
    }

    pub fn dimension(&self) -> Dimension {
        T::DIMENSION
    }

    /// Produces this dimension's value for `profile`. Never fails: errors are folded
    /// into the returned status (degraded or critical).
    #[instrument(skip_all, fields(dimension = T::DIMENSION.as_str(), profile = %profile.display_name()))]
    pub async fn run(
        &self,
        profile: &ProfileRef,
        context: &StageContext,
        exhausted: &ExhaustedServices,
    ) -> Extracted<T> {
        let category = T::DIMENSION.as_str();
        let query = profile.cache_query();

        if let Some(value) = self.cache.get_as::<T>(category, &query) {
            debug!("Serving stage result from cache");
            return Extracted::cached(value);
        }

        if exhausted.contains(T::DIMENSION) {
            debug!("Collaborator exhausted for this run, not calling");
            return Extracted::critical(format!(
                "{} service rate limit exhausted earlier in this run",
                category
            ));
        }

        let mut retried = false;
        let error = loop {
            match self.attempt(profile, context).await {
                Attempt::Done(value) => {
                    let value = value.normalized();
                    if let Err(e) = self.cache.persist_as(category, &query, &value).await {
                        warn!(error = %e, "Failed to cache stage result");
                    }
                    info!("Stage extraction succeeded");
                    return Extracted::fresh(value);
                }
                Attempt::Failed(e) if e.kind().is_retryable() && !retried => {
                    warn!(error = %e, "Transient collaborator failure, retrying once");
                    retried = true;
                    if !self.retry_backoff.is_zero() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
                Attempt::Failed(e) => break e,
            }
        };

        match error.kind() {
            FailureKind::RateLimited => {
                exhausted.mark(T::DIMENSION);
                warn!(error = %error, "Collaborator rate limited, aborting profile");
                Extracted::critical(error.to_string())
            }
            FailureKind::Transient | FailureKind::NotFound | FailureKind::Malformed => {
                warn!(error = %error, kind = ?error.kind(), "Stage degraded to neutral default");
                Extracted::degraded(error.to_string())
            }
        }
    }

    async fn attempt(&self, profile: &ProfileRef, context: &StageContext) -> Attempt<T> {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return Attempt::Failed(CollaboratorError::transient(
                    T::DIMENSION.as_str(),
                    "call limiter closed",
                ));
            }
        };

        match self.extractor.extract(profile, context).await {
            Ok(value) => Attempt::Done(value),
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// The five stages sharing one cache and one call limiter.
#[derive(Debug)]
pub struct StageSet {
    pub education: ExtractionStage<EducationProfile>,
    pub publications: ExtractionStage<PublicationRecord>,
    pub patents: ExtractionStage<PatentRecord>,
    pub code: ExtractionStage<CodeActivity>,
    pub work_experience: ExtractionStage<WorkHistory>,
    cache: Arc<CacheStore>,
    limiter: Arc<Semaphore>,
}

impl StageSet {
    pub fn new(extractors: ExtractorSet, cache: Arc<CacheStore>, options: StageOptions) -> Self {
        let limiter = Arc::new(Semaphore::new(options.max_external_calls.max(1)));
        let backoff = options.retry_backoff;

        Self {
            education: ExtractionStage::new(
                extractors.education,
                cache.clone(),
                limiter.clone(),
                backoff,
            ),
            publications: ExtractionStage::new(
                extractors.publications,
                cache.clone(),
                limiter.clone(),
                backoff,
            ),
            patents: ExtractionStage::new(
                extractors.patents,
                cache.clone(),
                limiter.clone(),
                backoff,
            ),
            code: ExtractionStage::new(extractors.code, cache.clone(), limiter.clone(), backoff),
            work_experience: ExtractionStage::new(
                extractors.work_experience,
                cache.clone(),
                limiter.clone(),
                backoff,
            ),
            cache,
            limiter,
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Collaborator-call permits currently free.
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }
}
