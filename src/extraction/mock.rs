//! In-memory extractor for tests: scripted results, scripted failures, call counting.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::collaborator::{Extractor, ProfileRef, StageContext};
use super::error::{CollaboratorError, CollaboratorResult};
use super::types::{Dimension, ExtractionPayload};

#[derive(Default)]
struct MockState {
    results: HashMap<(Dimension, String), serde_json::Value>,
    defaults: HashMap<Dimension, serde_json::Value>,
    queued_failures: HashMap<Dimension, VecDeque<CollaboratorError>>,
    persistent_failures: HashMap<(Dimension, String), CollaboratorError>,
    calls: HashMap<(Dimension, String), usize>,
    contexts: Vec<(Dimension, String, StageContext)>,
}

#[derive(Default)]
/// Scriptable extractor serving every dimension.
///
/// Profiles are routed by [`MockExtractor::profile_key`]: the external id, else the
/// name. Calls with nothing scripted fail with `NotFound`.
pub struct MockExtractor {
    state: Mutex<MockState>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Routing key for a profile.
    pub fn profile_key(profile: &ProfileRef) -> String {
        profile
            .external_id
            .clone()
            .or_else(|| profile.name.clone())
            .unwrap_or_default()
    }

    /// Scripts the value returned for `profile_key` on `T`'s dimension.
    pub fn with_result<T: ExtractionPayload>(self, profile_key: &str, value: T) -> Self {
        self.set_result(profile_key, value);
        self
    }

    pub fn set_result<T: ExtractionPayload>(&self, profile_key: &str, value: T) {
        let json = serde_json::to_value(value).unwrap_or_default();
        self.state
            .lock()
            .results
            .insert((T::DIMENSION, profile_key.to_string()), json);
    }

    /// Scripts the value returned for any profile without a specific result.
    pub fn with_default<T: ExtractionPayload>(self, value: T) -> Self {
        let json = serde_json::to_value(value).unwrap_or_default();
        self.state.lock().defaults.insert(T::DIMENSION, json);
        self
    }

    /// Scripts a raw JSON answer (useful for malformed payloads).
    pub fn with_raw(self, dimension: Dimension, profile_key: &str, json: serde_json::Value) -> Self {
        self.state
            .lock()
            .results
            .insert((dimension, profile_key.to_string()), json);
        self
    }

    /// Fails the next call on `dimension` (any profile) with `error`. Queues in order.
    pub fn fail_next(&self, dimension: Dimension, error: CollaboratorError) {
        self.state
            .lock()
            .queued_failures
            .entry(dimension)
            .or_default()
            .push_back(error);
    }

    /// Fails every call for `(dimension, profile_key)` with `error`.
    pub fn with_failure(self, dimension: Dimension, profile_key: &str, error: CollaboratorError) -> Self {
        self.state
            .lock()
            .persistent_failures
            .insert((dimension, profile_key.to_string()), error);
        self
    }

    /// Calls made on `dimension` across all profiles.
    pub fn calls(&self, dimension: Dimension) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|((d, _), _)| *d == dimension)
            .map(|(_, n)| *n)
            .sum()
    }

    /// Calls made on `dimension` for one profile.
    pub fn calls_for(&self, dimension: Dimension, profile_key: &str) -> usize {
        self.state
            .lock()
            .calls
            .get(&(dimension, profile_key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Calls made for one profile across all dimensions.
    pub fn calls_for_profile(&self, profile_key: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|((_, k), _)| k == profile_key)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    /// Context passed on each call to `dimension`, in call order.
    pub fn contexts(&self, dimension: Dimension) -> Vec<StageContext> {
        self.state
            .lock()
            .contexts
            .iter()
            .filter(|(d, _, _)| *d == dimension)
            .map(|(_, _, c)| c.clone())
            .collect()
    }

    /// Highest number of calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(
        &self,
        dimension: Dimension,
        key: &str,
        context: &StageContext,
    ) -> CollaboratorResult<serde_json::Value> {
        let mut state = self.state.lock();
        *state.calls.entry((dimension, key.to_string())).or_insert(0) += 1;
        state
            .contexts
            .push((dimension, key.to_string(), context.clone()));

        if let Some(error) = state
            .queued_failures
            .get_mut(&dimension)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if let Some(error) = state.persistent_failures.get(&(dimension, key.to_string())) {
            return Err(error.clone());
        }

        state
            .results
            .get(&(dimension, key.to_string()))
            .or_else(|| state.defaults.get(&dimension))
            .cloned()
            .ok_or_else(|| {
                CollaboratorError::not_found(dimension.as_str(), format!("no data for '{}'", key))
            })
    }
}

impl std::fmt::Debug for MockExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockExtractor")
            .field("total_calls", &self.total_calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: ExtractionPayload> Extractor<T> for MockExtractor {
    async fn extract(&self, profile: &ProfileRef, context: &StageContext) -> CollaboratorResult<T> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let key = Self::profile_key(profile);
        let result = self
            .respond(T::DIMENSION, &key, context)
            .and_then(|json| {
                serde_json::from_value::<T>(json)
                    .map_err(|e| CollaboratorError::malformed(T::DIMENSION.as_str(), e.to_string()))
            });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
