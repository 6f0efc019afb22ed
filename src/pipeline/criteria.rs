//! Per-dimension pass/fail filters.
//!
//! Numeric thresholds and flags accept either JSON numbers/booleans or their string
//! forms (`"3"`, `"true"`); coercion happens once, here, during deserialization.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::error::CriteriaError;
use crate::extraction::{
    CodeActivity, DegreeLevel, Dimension, EducationProfile, FieldRelevance, InstituteTier,
    PatentRecord, PublicationRecord, WorkHistory,
};

/// A filter over one dimension's extraction.
pub trait DimensionFilter<T> {
    fn is_enabled(&self) -> bool;

    /// `true` when `value` meets every threshold.
    fn admits(&self, value: &T) -> bool;
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationFilter {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub enabled: bool,
    pub min_degree: Option<DegreeLevel>,
    pub min_institute_tier: Option<InstituteTier>,
    pub min_field_relevance: Option<FieldRelevance>,
}

impl DimensionFilter<EducationProfile> for EducationFilter {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn admits(&self, value: &EducationProfile) -> bool {
        self.min_degree.is_none_or(|min| value.highest_degree >= min)
            && self
                .min_institute_tier
                .is_none_or(|min| value.institute_tier >= min)
            && self
                .min_field_relevance
                .is_none_or(|min| value.field_relevance >= min)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationFilter {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub enabled: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_total: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_first_author: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_top_venue: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_citations: u32,
}

impl DimensionFilter<PublicationRecord> for PublicationFilter {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn admits(&self, value: &PublicationRecord) -> bool {
        value.total >= self.min_total
            && value.first_author >= self.min_first_author
            && value.top_venue >= self.min_top_venue
            && value.citations >= self.min_citations
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatentFilter {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub enabled: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_granted: u32,
    /// Granted plus pending.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_total: u32,
}

impl DimensionFilter<PatentRecord> for PatentFilter {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn admits(&self, value: &PatentRecord) -> bool {
        value.granted >= self.min_granted && value.total() >= self.min_total
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeFilter {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub enabled: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_repos: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_stars: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_contributions: u32,
}

impl DimensionFilter<CodeActivity> for CodeFilter {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn admits(&self, value: &CodeActivity) -> bool {
        value.public_repos >= self.min_repos
            && value.total_stars >= self.min_stars
            && value.contributions_last_year >= self.min_contributions
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperienceFilter {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub enabled: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub min_years: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub require_leadership: bool,
}

impl DimensionFilter<WorkHistory> for WorkExperienceFilter {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn admits(&self, value: &WorkHistory) -> bool {
        value.total_years >= self.min_years && (!self.require_leadership || value.has_leadership)
    }
}

/// Filters for every dimension. Read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub education: EducationFilter,
    pub publications: PublicationFilter,
    pub patents: PatentFilter,
    #[serde(rename = "github", alias = "code")]
    pub code: CodeFilter,
    pub work_experience: WorkExperienceFilter,
}

impl FilterCriteria {
    /// Parses and validates untrusted criteria.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CriteriaError> {
        let criteria: FilterCriteria = serde_json::from_value(value)?;
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        let years = self.work_experience.min_years;
        if !years.is_finite() || years < 0.0 {
            return Err(CriteriaError::InvalidThreshold {
                dimension: Dimension::WorkExperience,
                field: "minYears",
                reason: format!("expected a non-negative number, got {}", years),
            });
        }
        Ok(())
    }

    pub fn is_enabled(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Education => self.education.is_enabled(),
            Dimension::Publications => self.publications.is_enabled(),
            Dimension::Patents => self.patents.is_enabled(),
            Dimension::Code => self.code.is_enabled(),
            Dimension::WorkExperience => self.work_experience.is_enabled(),
        }
    }

    /// Enabled dimensions in stage order.
    pub fn enabled_dimensions(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.is_enabled(*d))
            .collect()
    }
}
