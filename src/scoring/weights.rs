use serde::{Deserialize, Serialize};

use super::error::{WeightError, WeightResult};
use crate::constants::WEIGHT_SUM_TOLERANCE;
use crate::extraction::Dimension;

/// Default weighting applied when a caller supplies none, or an invalid one.
pub const DEFAULT_WEIGHTS: WeightVector = WeightVector {
    education: 0.20,
    publications: 0.20,
    patents: 0.15,
    code: 0.15,
    work_experience: 0.30,
};

/// Per-dimension contribution to the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightVector {
    #[serde(default)]
    pub education: f64,
    #[serde(default)]
    pub publications: f64,
    #[serde(default)]
    pub patents: f64,
    #[serde(default, rename = "github", alias = "code")]
    pub code: f64,
    #[serde(default)]
    pub work_experience: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl WeightVector {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Education => self.education,
            Dimension::Publications => self.publications,
            Dimension::Patents => self.patents,
            Dimension::Code => self.code,
            Dimension::WorkExperience => self.work_experience,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Rejects negative or non-finite components. Says nothing about the sum.
    pub fn check_components(&self) -> WeightResult<()> {
        for dimension in Dimension::ALL {
            let value = self.get(dimension);
            if !value.is_finite() {
                return Err(WeightError::NonFinite { dimension });
            }
            if value < 0.0 {
                return Err(WeightError::Negative { dimension, value });
            }
        }
        Ok(())
    }

    /// Full validation: components, then the sum within tolerance of 1.0.
    pub fn validate(&self) -> WeightResult<()> {
        self.check_components()?;
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }

    /// Returns the vector to score with and whether the default was substituted.
    ///
    /// `None` means "use the default" and is not a substitution. An invalid vector is
    /// replaced wholesale; it is never renormalized.
    pub fn resolve(requested: Option<&WeightVector>) -> (WeightVector, Option<WeightError>) {
        match requested {
            None => (DEFAULT_WEIGHTS, None),
            Some(weights) => match weights.validate() {
                Ok(()) => (*weights, None),
                Err(e) => (DEFAULT_WEIGHTS, Some(e)),
            },
        }
    }
}
