use serde::{Deserialize, Serialize};

use crate::extraction::Dimension;

/// Score of one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    /// Score on the dimension's native scale.
    pub raw: f64,
    /// Upper bound of the native scale.
    pub raw_max: f64,
    /// `raw` rescaled to 0-10.
    pub normalized: f64,
    pub weight: f64,
    /// `normalized * weight`.
    pub weighted: f64,
}

/// Per-dimension scores, keyed like the parsing output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub education: DimensionScore,
    pub publications: DimensionScore,
    pub patents: DimensionScore,
    #[serde(rename = "github")]
    pub code: DimensionScore,
    pub work_experience: DimensionScore,
}

impl Breakdown {
    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Education => &self.education,
            Dimension::Publications => &self.publications,
            Dimension::Patents => &self.patents,
            Dimension::Code => &self.code,
            Dimension::WorkExperience => &self.work_experience,
        }
    }

    pub(crate) fn get_mut(&mut self, dimension: Dimension) -> &mut DimensionScore {
        match dimension {
            Dimension::Education => &mut self.education,
            Dimension::Publications => &mut self.publications,
            Dimension::Patents => &mut self.patents,
            Dimension::Code => &mut self.code,
            Dimension::WorkExperience => &mut self.work_experience,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Letter grade derived from the percentage.
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Inclusive lower bounds: 90 A+, 80 A, 70 B, 60 C, 50 D.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Grade::APlus
        } else if percentage >= 80.0 {
            Grade::A
        } else if percentage >= 70.0 {
            Grade::B
        } else if percentage >= 60.0 {
            Grade::C
        } else if percentage >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite score of one profile. A pure function of extractions and weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Sum of weighted dimension scores (0-10 when weights sum to 1).
    pub total_score: f64,
    /// Sum of `10 * weight`.
    pub max_possible_score: f64,
    pub percentage: f64,
    pub grade: Grade,
    pub breakdown: Breakdown,
    /// Set when the requested weights were rejected and the defaults used instead.
    #[serde(default)]
    pub weights_substituted: bool,
}
