//! Cross-cutting, shared constants.
//!
//! Scoring scales live here so the rules, the normalizer and the tests agree on them.

use std::time::Duration;

/// Lifetime of a cache entry before it is considered logically absent.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound of the common scoring scale every dimension is normalized to.
pub const NORMALIZED_SCALE_MAX: f64 = 10.0;

/// Native upper bound of the code-contribution raw score.
pub const CODE_RAW_SCALE_MAX: f64 = 16.0;

/// Tolerance allowed when checking that a weight vector sums to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Default number of candidates kept in flight by the concurrent pipeline.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default cap on simultaneous calls into external collaborators.
pub const DEFAULT_MAX_EXTERNAL_CALLS: usize = 4;

/// Default pause before the single retry of a transient collaborator failure.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Hard ceiling for `maxProfiles` in a candidate search.
pub const MAX_PROFILES_LIMIT: usize = 100;

/// Hard ceiling for `maxSearchResults` in a candidate search.
pub const MAX_SEARCH_RESULTS_LIMIT: usize = 1_000;
