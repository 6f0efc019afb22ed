use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::debug;

use super::criteria::FilterCriteria;
use super::types::DiscoveredProfile;
use crate::extraction::CollaboratorResult;
use crate::extraction::remote::{build_client, post_json};

const SERVICE: &str = "discovery";

#[async_trait]
/// Source of candidate identities for the filter pipeline.
pub trait CandidateSource: Send + Sync {
    /// Returns at most `limit` candidates, best match first.
    async fn discover(
        &self,
        criteria: &FilterCriteria,
        limit: usize,
    ) -> CollaboratorResult<Vec<DiscoveredProfile>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    filters: &'a FilterCriteria,
    limit: usize,
}

/// Discovery service reached over HTTP at `POST {base}/search`.
#[derive(Debug, Clone)]
pub struct RemoteDiscovery {
    http: HttpClient,
    base_url: String,
}

impl RemoteDiscovery {
    pub fn new(base_url: &str, timeout: Duration) -> CollaboratorResult<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CandidateSource for RemoteDiscovery {
    async fn discover(
        &self,
        criteria: &FilterCriteria,
        limit: usize,
    ) -> CollaboratorResult<Vec<DiscoveredProfile>> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, limit, "Calling discovery service");
        post_json(
            &self.http,
            SERVICE,
            &url,
            &SearchBody {
                filters: criteria,
                limit,
            },
        )
        .await
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockCandidateSource;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::extraction::CollaboratorError;

    /// Fixed candidate list with scriptable failures.
    #[derive(Debug, Default)]
    pub struct MockCandidateSource {
        candidates: Vec<DiscoveredProfile>,
        failures: Mutex<VecDeque<CollaboratorError>>,
        limits: Mutex<Vec<usize>>,
    }

    impl MockCandidateSource {
        pub fn new(candidates: Vec<DiscoveredProfile>) -> Self {
            Self {
                candidates,
                ..Default::default()
            }
        }

        pub fn from_usernames<I, S>(usernames: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(usernames.into_iter().map(DiscoveredProfile::new).collect())
        }

        /// Fails the next call with `error`. Queues in order.
        pub fn fail_next(&self, error: CollaboratorError) {
            self.failures.lock().push_back(error);
        }

        pub fn calls(&self) -> usize {
            self.limits.lock().len()
        }

        /// Limits passed on each call.
        pub fn limits(&self) -> Vec<usize> {
            self.limits.lock().clone()
        }
    }

    #[async_trait]
    impl CandidateSource for MockCandidateSource {
        async fn discover(
            &self,
            _criteria: &FilterCriteria,
            limit: usize,
        ) -> CollaboratorResult<Vec<DiscoveredProfile>> {
            self.limits.lock().push(limit);
            if let Some(error) = self.failures.lock().pop_front() {
                return Err(error);
            }
            Ok(self.candidates.clone())
        }
    }
}
