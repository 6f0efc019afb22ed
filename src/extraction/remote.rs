//! HTTP-backed extractor.
//!
//! Talks to an extraction service exposing `POST {base}/extract/{dimension}`. Status
//! codes are classified into [`FailureKind`](super::FailureKind)s right here, at the
//! point of failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::collaborator::{Extractor, ProfileRef, StageContext};
use super::error::{CollaboratorError, CollaboratorResult};
use super::types::ExtractionPayload;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractBody<'a> {
    profile: &'a ProfileRef,
    context: &'a StageContext,
}

#[derive(Debug, Clone)]
/// Extraction collaborator reached over HTTP.
pub struct RemoteExtractor {
    http: HttpClient,
    base_url: String,
}

impl RemoteExtractor {
    /// Creates a client for `base_url`; `timeout` bounds each request.
    pub fn new(base_url: &str, timeout: Duration) -> CollaboratorResult<Self> {
        let http = build_client(timeout)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl<T: ExtractionPayload> Extractor<T> for RemoteExtractor {
    async fn extract(&self, profile: &ProfileRef, context: &StageContext) -> CollaboratorResult<T> {
        let service = T::DIMENSION.as_str();
        let url = format!("{}/extract/{}", self.base_url, service);
        debug!(url = %url, "Calling remote extractor");

        post_json(&self.http, service, &url, &ExtractBody { profile, context }).await
    }
}

pub(crate) fn build_client(timeout: Duration) -> CollaboratorResult<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CollaboratorError::transient("http", e.to_string()))
}

/// POSTs `body` and decodes the JSON answer, classifying every failure.
pub(crate) async fn post_json<B, R>(
    http: &HttpClient,
    service: &str,
    url: &str,
    body: &B,
) -> CollaboratorResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| classify_transport(service, &e))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(classify_status(service, status, &detail));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| CollaboratorError::malformed(service, e.to_string()))
}

pub(crate) fn classify_status(service: &str, status: StatusCode, detail: &str) -> CollaboratorError {
    let message = if detail.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail.chars().take(200).collect::<String>())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => CollaboratorError::rate_limited(service, message),
        StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
            CollaboratorError::not_found(service, message)
        }
        StatusCode::REQUEST_TIMEOUT => CollaboratorError::transient(service, message),
        s if s.is_server_error() => CollaboratorError::transient(service, message),
        _ => CollaboratorError::malformed(service, message),
    }
}

fn classify_transport(service: &str, error: &reqwest::Error) -> CollaboratorError {
    if error.is_decode() || error.is_body() {
        CollaboratorError::malformed(service, error.to_string())
    } else {
        CollaboratorError::transient(service, error.to_string())
    }
}
