//! Fixed per-dimension scoring tables.
//!
//! Every rule maps a normalized extraction to a raw score on its own native scale.
//! Neutral defaults score zero on every dimension.

use crate::constants::{CODE_RAW_SCALE_MAX, NORMALIZED_SCALE_MAX};
use crate::extraction::{
    CodeActivity, DegreeLevel, Dimension, EducationProfile, FieldRelevance, InstituteTier,
    PatentRecord, PublicationRecord, WorkHistory,
};

/// Native maximum of a dimension's raw score.
pub fn raw_max(dimension: Dimension) -> f64 {
    match dimension {
        Dimension::Code => CODE_RAW_SCALE_MAX,
        _ => NORMALIZED_SCALE_MAX,
    }
}

/// Degree (0-4) + field relevance (0-3) + institute tier (0-3).
pub fn education(profile: &EducationProfile) -> f64 {
    let degree = match profile.highest_degree {
        DegreeLevel::None => 0.0,
        DegreeLevel::Diploma => 1.0,
        DegreeLevel::Bachelors => 2.0,
        DegreeLevel::Masters => 3.0,
        DegreeLevel::Doctorate => 4.0,
    };
    let field = match profile.field_relevance {
        FieldRelevance::Unknown => 0.0,
        FieldRelevance::Unrelated => 1.0,
        FieldRelevance::Adjacent => 2.0,
        FieldRelevance::Core => 3.0,
    };
    let tier = match profile.institute_tier {
        InstituteTier::Unranked => 0.0,
        InstituteTier::Tier3 => 1.0,
        InstituteTier::Tier2 => 2.0,
        InstituteTier::Tier1 => 3.0,
    };
    degree + field + tier
}

/// Output volume (0-5) + top-venue papers (0-3) + citations (0-2).
pub fn publications(record: &PublicationRecord) -> f64 {
    let volume = match record.total {
        0 => 0.0,
        1..=2 => 2.0,
        3..=5 => 3.0,
        6..=10 => 4.0,
        _ => 5.0,
    };
    let venue = match record.top_venue {
        0 => 0.0,
        1 => 1.0,
        2..=3 => 2.0,
        _ => 3.0,
    };
    let citations = match record.citations {
        0..=19 => 0.0,
        20..=99 => 1.0,
        _ => 2.0,
    };
    volume + venue + citations
}

/// Three points per granted patent, one per pending filing, capped at the scale.
pub fn patents(record: &PatentRecord) -> f64 {
    let points = f64::from(record.granted) * 3.0 + f64::from(record.filed);
    points.min(NORMALIZED_SCALE_MAX)
}

/// Repositories (0-4) + stars (0-6) + yearly contributions (0-6), on a 0-16 scale.
pub fn code(activity: &CodeActivity) -> f64 {
    let repos = step(activity.public_repos, &[(20, 4.0), (5, 2.0), (1, 1.0)]);
    let stars = step(activity.total_stars, &[(1000, 6.0), (100, 4.0), (10, 2.0)]);
    let contributions = step(
        activity.contributions_last_year,
        &[(1000, 6.0), (200, 4.0), (50, 2.0)],
    );
    repos + stars + contributions
}

/// Tenure (0-6) + leadership (0-2) + top-tier employer (0-2).
pub fn work_experience(history: &WorkHistory) -> f64 {
    let tenure = if history.total_years >= 5.0 {
        6.0
    } else if history.total_years >= 3.0 {
        4.0
    } else if history.total_years >= 1.0 {
        2.0
    } else {
        0.0
    };
    let leadership = if history.has_leadership { 2.0 } else { 0.0 };
    let employers = if history.top_tier_employers > 0 { 2.0 } else { 0.0 };
    tenure + leadership + employers
}

/// First matching `(threshold, points)` pair; thresholds must be descending.
fn step(value: u32, table: &[(u32, f64)]) -> f64 {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0.0, |(_, points)| *points)
}
