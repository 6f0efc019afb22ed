use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::error::EvaluationError;
use super::types::{EvaluationRequest, EvaluationResult};
use crate::extraction::{
    ExhaustedServices, Extracted, ExtractionPayload, Extractions, ProfileRef, StageContext,
    StageSet,
};
use crate::scoring;

/// Runs the five stages for one profile and scores the result.
#[derive(Debug, Clone)]
pub struct Evaluator {
    stages: Arc<StageSet>,
}

impl Evaluator {
    pub fn new(stages: Arc<StageSet>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &Arc<StageSet> {
        &self.stages
    }

    /// Evaluates one profile.
    ///
    /// Only request validation fails the call. Stage failures are folded into the
    /// result: degradations append to `errors`, a critical failure halts the run.
    #[instrument(skip_all, fields(profile = %request.profile().display_name()))]
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        request.validate()?;

        let profile = request.profile();
        let exhausted = ExhaustedServices::new();
        let mut parsing = Extractions::default();
        let mut errors = Vec::new();
        let none = StageContext::default();

        parsing.education = self.stages.education.run(&profile, &none, &exhausted).await;
        if record(&parsing.education, &mut errors) {
            return Ok(aborted(&profile, parsing, errors));
        }

        parsing.publications = self
            .stages
            .publications
            .run(&profile, &none, &exhausted)
            .await;
        if record(&parsing.publications, &mut errors) {
            return Ok(aborted(&profile, parsing, errors));
        }

        parsing.patents = self.stages.patents.run(&profile, &none, &exhausted).await;
        if record(&parsing.patents, &mut errors) {
            return Ok(aborted(&profile, parsing, errors));
        }

        parsing.code = self.stages.code.run(&profile, &none, &exhausted).await;
        if record(&parsing.code, &mut errors) {
            return Ok(aborted(&profile, parsing, errors));
        }

        let context = context_from(&parsing);
        parsing.work_experience = self
            .stages
            .work_experience
            .run(&profile, &context, &exhausted)
            .await;
        if record(&parsing.work_experience, &mut errors) {
            return Ok(aborted(&profile, parsing, errors));
        }

        let breakdown = scoring::score(&parsing, request.weights.as_ref());
        info!(
            total_score = breakdown.total_score,
            grade = %breakdown.grade,
            warnings = errors.len(),
            "Evaluation complete"
        );

        Ok(EvaluationResult {
            profile_name: profile.display_name(),
            parsing,
            scoring: Some(breakdown),
            errors,
            critical: false,
        })
    }
}

/// Work-experience context: only outputs backed by real data are forwarded.
pub(crate) fn context_from(parsing: &Extractions) -> StageContext {
    StageContext {
        publications: parsing
            .publications
            .status
            .is_real()
            .then(|| parsing.publications.data.clone()),
        code: parsing
            .code
            .status
            .is_real()
            .then(|| parsing.code.data.clone()),
    }
}

/// Appends the stage's error, if any, as `"<dimension>: <message>"`. Returns `true`
/// when the stage failed critically.
pub(crate) fn record<T: ExtractionPayload>(result: &Extracted<T>, errors: &mut Vec<String>) -> bool {
    if let Some(error) = &result.error {
        errors.push(format!("{}: {}", result.dimension(), error));
    }
    result.is_critical()
}

fn aborted(profile: &ProfileRef, parsing: Extractions, errors: Vec<String>) -> EvaluationResult {
    warn!(errors = errors.len(), "Evaluation aborted by critical stage failure");
    EvaluationResult {
        profile_name: profile.display_name(),
        parsing,
        scoring: None,
        errors,
        critical: true,
    }
}
