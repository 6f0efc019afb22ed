use serde::{Deserialize, Serialize};

use super::error::EvaluationError;
use crate::extraction::{Extractions, ProfileRef};
use crate::scoring::{ScoreBreakdown, WeightVector};

/// Single-profile evaluation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationRequest {
    pub name: Option<String>,
    pub document_text: Option<String>,
    pub external_profile_id: Option<String>,
    /// Falls back to the default vector when absent.
    pub weights: Option<WeightVector>,
}

impl EvaluationRequest {
    pub fn for_external_id(id: impl Into<String>) -> Self {
        Self {
            external_profile_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn for_document(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            document_text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Profile reference handed to every stage.
    pub fn profile(&self) -> ProfileRef {
        ProfileRef {
            name: self.name.clone(),
            document_text: self.document_text.clone(),
            external_id: self.external_profile_id.clone(),
            url: None,
        }
    }

    /// Checks identity and weight components. A weight vector with a bad sum passes
    /// here; the scoring engine substitutes the default and records it.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if !self.profile().is_identifiable() {
            return Err(EvaluationError::MissingIdentity);
        }
        if let Some(weights) = &self.weights {
            weights.check_components()?;
        }
        Ok(())
    }
}

/// Outcome of one evaluation.
///
/// After a critical abort, `critical` is set, the stages that never ran are reported
/// as `skipped`, and `scoring` is `None`: an aborted run never carries a score that
/// could be mistaken for a genuine zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub profile_name: String,
    pub parsing: Extractions,
    pub scoring: Option<ScoreBreakdown>,
    pub errors: Vec<String>,
    pub critical: bool,
}

impl EvaluationResult {
    /// `true` when every stage ran (possibly degraded).
    pub fn is_complete(&self) -> bool {
        !self.critical
    }
}
