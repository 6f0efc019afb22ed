use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The five evaluation dimensions, in the fixed order stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Education,
    Publications,
    Patents,
    #[serde(rename = "github", alias = "code")]
    Code,
    WorkExperience,
}

impl Dimension {
    /// All dimensions in stage order. Work experience must stay last: it reads the
    /// publication and code results as context.
    pub const ALL: [Dimension; 5] = [
        Dimension::Education,
        Dimension::Publications,
        Dimension::Patents,
        Dimension::Code,
        Dimension::WorkExperience,
    ];

    /// Wire name, also used as the cache category.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Education => "education",
            Dimension::Publications => "publications",
            Dimension::Patents => "patents",
            Dimension::Code => "github",
            Dimension::WorkExperience => "workExperience",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured output of one extraction stage.
///
/// `Default` is the documented neutral value substituted when extraction degrades;
/// every neutral default scores zero.
pub trait ExtractionPayload:
    Serialize + DeserializeOwned + Default + Clone + Debug + Send + Sync + 'static
{
    /// Dimension this payload belongs to.
    const DIMENSION: Dimension;

    /// Clamps and cleans collaborator output into a self-consistent value.
    fn normalized(self) -> Self;
}

/// Highest completed degree. Ordered from lowest to highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum DegreeLevel {
    #[default]
    None,
    Diploma,
    Bachelors,
    Masters,
    Doctorate,
}

/// How closely the field of study matches the evaluated role.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldRelevance {
    #[default]
    Unknown,
    Unrelated,
    Adjacent,
    Core,
}

/// Institute ranking bucket. `Tier1` is the strongest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum InstituteTier {
    #[default]
    Unranked,
    Tier3,
    Tier2,
    Tier1,
}

/// Education dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationProfile {
    pub highest_degree: DegreeLevel,
    pub field_relevance: FieldRelevance,
    pub institute_tier: InstituteTier,
    pub institutions: Vec<String>,
}

impl ExtractionPayload for EducationProfile {
    const DIMENSION: Dimension = Dimension::Education;

    fn normalized(mut self) -> Self {
        self.institutions = clean_strings(self.institutions);
        self
    }
}

/// Publications dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationRecord {
    pub total: u32,
    pub first_author: u32,
    pub top_venue: u32,
    pub citations: u32,
    pub titles: Vec<String>,
}

impl ExtractionPayload for PublicationRecord {
    const DIMENSION: Dimension = Dimension::Publications;

    fn normalized(mut self) -> Self {
        self.titles = clean_strings(self.titles);
        let listed = u32::try_from(self.titles.len()).unwrap_or(u32::MAX);
        self.total = self.total.max(listed);
        self.first_author = self.first_author.min(self.total);
        self.top_venue = self.top_venue.min(self.total);
        self
    }
}

/// Patents dimension. `filed` counts pending applications only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatentRecord {
    pub granted: u32,
    pub filed: u32,
    pub titles: Vec<String>,
}

impl PatentRecord {
    /// Granted plus pending.
    #[inline]
    pub fn total(&self) -> u32 {
        self.granted.saturating_add(self.filed)
    }
}

impl ExtractionPayload for PatentRecord {
    const DIMENSION: Dimension = Dimension::Patents;

    fn normalized(mut self) -> Self {
        self.titles = clean_strings(self.titles);
        self
    }
}

/// Code-contribution dimension (serialized as `github`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeActivity {
    pub public_repos: u32,
    pub total_stars: u32,
    pub contributions_last_year: u32,
    pub top_languages: Vec<String>,
}

impl ExtractionPayload for CodeActivity {
    const DIMENSION: Dimension = Dimension::Code;

    fn normalized(mut self) -> Self {
        self.top_languages = clean_strings(self.top_languages);
        self
    }
}

/// One held position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub title: String,
    pub organization: String,
    pub years: f64,
}

/// Work-experience dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkHistory {
    pub total_years: f64,
    pub has_leadership: bool,
    pub top_tier_employers: u32,
    pub positions: Vec<Position>,
}

impl ExtractionPayload for WorkHistory {
    const DIMENSION: Dimension = Dimension::WorkExperience;

    fn normalized(mut self) -> Self {
        self.positions.retain(|p| !p.title.trim().is_empty());
        for position in &mut self.positions {
            position.title = position.title.trim().to_string();
            position.organization = position.organization.trim().to_string();
            position.years = finite_non_negative(position.years);
        }
        self.total_years = finite_non_negative(self.total_years);
        self
    }
}

/// How a stage produced its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageStatus {
    /// Fresh collaborator result.
    Success,
    /// Served from the cache store.
    Cached,
    /// Neutral default after a non-critical failure.
    Degraded,
    /// Rate-limited; the profile run was aborted here.
    Critical,
    /// Stage never ran.
    #[default]
    Skipped,
}

impl StageStatus {
    /// `true` for values backed by real data.
    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, StageStatus::Success | StageStatus::Cached)
    }
}

/// A stage value plus how it was obtained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extracted<T> {
    #[serde(flatten)]
    pub data: T,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: ExtractionPayload> Extracted<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            status: StageStatus::Success,
            error: None,
        }
    }

    pub fn cached(data: T) -> Self {
        Self {
            data,
            status: StageStatus::Cached,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            status: StageStatus::Degraded,
            error: Some(error.into()),
        }
    }

    pub fn critical(error: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            status: StageStatus::Critical,
            error: Some(error.into()),
        }
    }

    pub fn skipped() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_critical(&self) -> bool {
        self.status == StageStatus::Critical
    }

    #[inline]
    pub fn dimension(&self) -> Dimension {
        T::DIMENSION
    }
}

/// All five stage results for one profile. Missing stages are [`StageStatus::Skipped`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extractions {
    pub education: Extracted<EducationProfile>,
    pub publications: Extracted<PublicationRecord>,
    pub patents: Extracted<PatentRecord>,
    #[serde(rename = "github")]
    pub code: Extracted<CodeActivity>,
    pub work_experience: Extracted<WorkHistory>,
}

impl Extractions {
    /// Status of one dimension.
    pub fn status(&self, dimension: Dimension) -> StageStatus {
        match dimension {
            Dimension::Education => self.education.status,
            Dimension::Publications => self.publications.status,
            Dimension::Patents => self.patents.status,
            Dimension::Code => self.code.status,
            Dimension::WorkExperience => self.work_experience.status,
        }
    }
}

fn clean_strings(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[inline]
fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
