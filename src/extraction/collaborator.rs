use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::CollaboratorResult;
use super::types::{
    CodeActivity, EducationProfile, ExtractionPayload, PatentRecord, PublicationRecord,
    WorkHistory,
};
use crate::hashing::text_fingerprint;

/// Identifies the profile a stage extracts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRef {
    pub name: Option<String>,
    pub document_text: Option<String>,
    pub external_id: Option<String>,
    pub url: Option<String>,
}

impl ProfileRef {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn from_external_id(id: impl Into<String>) -> Self {
        Self {
            external_id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Human-readable label: name, then external id, then `"Unknown"`.
    pub fn display_name(&self) -> String {
        non_blank(&self.name)
            .or_else(|| non_blank(&self.external_id))
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Stable identity used for cache lookups and mock routing.
    ///
    /// An external id wins when present. Otherwise the name and a digest of the
    /// document text are combined, so two different resumes under one name do not
    /// collide. The cache store normalizes case and whitespace on top of this.
    pub fn cache_query(&self) -> String {
        if let Some(id) = non_blank(&self.external_id) {
            return format!("id:{}", id);
        }
        let name = non_blank(&self.name).unwrap_or("");
        match non_blank(&self.document_text) {
            Some(text) => format!("name:{}|doc:{}", name, text_fingerprint(text)),
            None => format!("name:{}", name),
        }
    }

    /// `true` when the reference carries at least one usable identifier.
    pub fn is_identifiable(&self) -> bool {
        non_blank(&self.name).is_some()
            || non_blank(&self.document_text).is_some()
            || non_blank(&self.external_id).is_some()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Earlier stage outputs made available to later stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publications: Option<PublicationRecord>,
    #[serde(rename = "github", skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeActivity>,
}

#[async_trait]
/// External service producing one dimension's structured data.
pub trait Extractor<T: ExtractionPayload>: Send + Sync {
    /// Extracts `T` for `profile`. Failures must carry their [`FailureKind`](super::FailureKind).
    async fn extract(&self, profile: &ProfileRef, context: &StageContext) -> CollaboratorResult<T>;
}

#[derive(Clone)]
/// One collaborator per dimension.
pub struct ExtractorSet {
    pub education: Arc<dyn Extractor<EducationProfile>>,
    pub publications: Arc<dyn Extractor<PublicationRecord>>,
    pub patents: Arc<dyn Extractor<PatentRecord>>,
    pub code: Arc<dyn Extractor<CodeActivity>>,
    pub work_experience: Arc<dyn Extractor<WorkHistory>>,
}

impl ExtractorSet {
    /// Uses one collaborator that serves every dimension.
    pub fn uniform<E>(extractor: Arc<E>) -> Self
    where
        E: Extractor<EducationProfile>
            + Extractor<PublicationRecord>
            + Extractor<PatentRecord>
            + Extractor<CodeActivity>
            + Extractor<WorkHistory>
            + 'static,
    {
        Self {
            education: extractor.clone(),
            publications: extractor.clone(),
            patents: extractor.clone(),
            code: extractor.clone(),
            work_experience: extractor,
        }
    }
}

impl std::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorSet").finish_non_exhaustive()
    }
}
