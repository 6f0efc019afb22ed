//! Test fixtures for integration tests.

use std::sync::Arc;
use std::time::Duration;

use lens::extraction::{
    CodeActivity, DegreeLevel, EducationProfile, ExtractorSet, FieldRelevance, InstituteTier,
    MockExtractor, PatentRecord, PublicationRecord, StageOptions, StageSet, WorkHistory,
};
use lens::{CacheStore, FilterCriteria};
use tempfile::TempDir;

/// 2023-12-14T00:00:00Z in Unix milliseconds.
pub const FIXED_TIMESTAMP_MS: i64 = 1_702_512_000_000;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Scripted profile values, one per dimension.
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    education: EducationProfile,
    publications: PublicationRecord,
    patents: PatentRecord,
    code: CodeActivity,
    work: WorkHistory,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Doctorate in a core field from a tier-3 institute (education raw 8).
    pub fn doctorate(mut self) -> Self {
        self.education = EducationProfile {
            highest_degree: DegreeLevel::Doctorate,
            field_relevance: FieldRelevance::Core,
            institute_tier: InstituteTier::Tier3,
            institutions: vec!["Northfield Institute of Technology".into()],
        };
        self
    }

    pub fn degree(mut self, degree: DegreeLevel) -> Self {
        self.education.highest_degree = degree;
        self
    }

    /// Six papers, two at top venues (publications raw 6).
    pub fn published(mut self) -> Self {
        self.publications = PublicationRecord {
            total: 6,
            first_author: 3,
            top_venue: 2,
            citations: 10,
            titles: vec![],
        };
        self
    }

    pub fn papers(mut self, total: u32) -> Self {
        self.publications.total = total;
        self
    }

    pub fn patents(mut self, granted: u32, filed: u32) -> Self {
        self.patents = PatentRecord {
            granted,
            filed,
            titles: vec![],
        };
        self
    }

    pub fn code(mut self, repos: u32, stars: u32, contributions: u32) -> Self {
        self.code = CodeActivity {
            public_repos: repos,
            total_stars: stars,
            contributions_last_year: contributions,
            top_languages: vec!["Rust".into()],
        };
        self
    }

    /// Senior leader at a top-tier employer (work raw 10).
    pub fn senior(mut self) -> Self {
        self.work = WorkHistory {
            total_years: 8.0,
            has_leadership: true,
            top_tier_employers: 1,
            positions: vec![],
        };
        self
    }

    /// Registers every dimension for `key` on `mock`.
    pub fn script(self, mock: &MockExtractor, key: &str) {
        mock.set_result(key, self.education);
        mock.set_result(key, self.publications);
        mock.set_result(key, self.patents);
        mock.set_result(key, self.code);
        mock.set_result(key, self.work);
    }
}

/// Stage set over a fresh temp cache, with no retry backoff.
pub fn create_stages(mock: Arc<MockExtractor>, max_external_calls: usize) -> (Arc<StageSet>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let stages = stages_at(mock, &dir, max_external_calls);
    (stages, dir)
}

/// Stage set over an existing cache directory.
pub fn stages_at(
    mock: Arc<MockExtractor>,
    dir: &TempDir,
    max_external_calls: usize,
) -> Arc<StageSet> {
    let cache = Arc::new(CacheStore::new(dir.path().to_path_buf()));
    Arc::new(StageSet::new(
        ExtractorSet::uniform(mock),
        cache,
        StageOptions {
            max_external_calls,
            retry_backoff: Duration::ZERO,
        },
    ))
}

/// Masters or better, at least three papers.
pub fn academic_criteria() -> FilterCriteria {
    FilterCriteria::from_json(serde_json::json!({
        "education": {"enabled": true, "minDegree": "masters"},
        "publications": {"enabled": "true", "minTotal": "3"}
    }))
    .expect("valid criteria")
}
