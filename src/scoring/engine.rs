use tracing::{debug, warn};

use super::rules;
use super::types::{Breakdown, DimensionScore, Grade, ScoreBreakdown};
use super::weights::WeightVector;
use crate::constants::NORMALIZED_SCALE_MAX;
use crate::extraction::{Dimension, Extractions};

/// Scores `extractions` with `weights`, or the default vector when `None`.
///
/// Invalid weights are replaced by the default vector and the substitution is
/// recorded in [`ScoreBreakdown::weights_substituted`].
pub fn score(extractions: &Extractions, weights: Option<&WeightVector>) -> ScoreBreakdown {
    let (weights, rejected) = WeightVector::resolve(weights);
    if let Some(reason) = &rejected {
        warn!(reason = %reason, "Rejected weight vector, scoring with defaults");
    }

    let mut breakdown = Breakdown::default();
    for dimension in Dimension::ALL {
        let raw = raw_score(extractions, dimension);
        let raw_max = rules::raw_max(dimension);
        let normalized = rescale(raw, raw_max);
        let weight = weights.get(dimension);
        *breakdown.get_mut(dimension) = DimensionScore {
            raw,
            raw_max,
            normalized,
            weight,
            weighted: normalized * weight,
        };
    }

    let total_score: f64 = Dimension::ALL
        .iter()
        .map(|d| breakdown.get(*d).weighted)
        .sum();
    let max_possible_score = NORMALIZED_SCALE_MAX * weights.sum();
    let percentage = if max_possible_score > 0.0 {
        round_percentage(total_score / max_possible_score * 100.0)
    } else {
        0.0
    };
    let grade = Grade::from_percentage(percentage);

    debug!(total_score, percentage, grade = %grade, "Scored profile");

    ScoreBreakdown {
        total_score,
        max_possible_score,
        percentage,
        grade,
        breakdown,
        weights_substituted: rejected.is_some(),
    }
}

/// Scores with the default weight vector.
pub fn score_default(extractions: &Extractions) -> ScoreBreakdown {
    score(extractions, None)
}

fn raw_score(extractions: &Extractions, dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Education => rules::education(&extractions.education.data),
        Dimension::Publications => rules::publications(&extractions.publications.data),
        Dimension::Patents => rules::patents(&extractions.patents.data),
        Dimension::Code => rules::code(&extractions.code.data),
        Dimension::WorkExperience => rules::work_experience(&extractions.work_experience.data),
    }
}

/// Two decimal places. Grading runs on the rounded value, so float noise just under
/// a boundary (59.999999999999986) grades as the boundary itself.
#[inline]
fn round_percentage(percentage: f64) -> f64 {
    (percentage * 100.0).round() / 100.0
}

/// Linear map of `[0, raw_max]` onto `[0, 10]`, clamped.
#[inline]
fn rescale(raw: f64, raw_max: f64) -> f64 {
    if raw_max <= 0.0 {
        return 0.0;
    }
    (raw * NORMALIZED_SCALE_MAX / raw_max).clamp(0.0, NORMALIZED_SCALE_MAX)
}
