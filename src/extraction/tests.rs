use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::cache::CacheStore;

fn options() -> StageOptions {
    StageOptions {
        max_external_calls: 4,
        retry_backoff: Duration::ZERO,
    }
}

fn create_stages(mock: Arc<MockExtractor>) -> (StageSet, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = Arc::new(CacheStore::new(dir.path().to_path_buf()));
    let stages = StageSet::new(ExtractorSet::uniform(mock), cache, options());
    (stages, dir)
}

fn patents(granted: u32, filed: u32) -> PatentRecord {
    PatentRecord {
        granted,
        filed,
        titles: vec![],
    }
}

#[tokio::test]
async fn test_success_is_cached_and_second_call_hits_cache() {
    let mock = Arc::new(MockExtractor::new().with_result("ada", patents(2, 1)));
    let (stages, _dir) = create_stages(mock.clone());
    let profile = ProfileRef::from_external_id("ada");
    let exhausted = ExhaustedServices::new();

    let first = stages
        .patents
        .run(&profile, &StageContext::default(), &exhausted)
        .await;
    assert_eq!(first.status, StageStatus::Success);
    assert_eq!(first.data, patents(2, 1));

    let second = stages
        .patents
        .run(&profile, &StageContext::default(), &exhausted)
        .await;
    assert_eq!(second.status, StageStatus::Cached);
    assert_eq!(second.data, patents(2, 1));
    assert_eq!(mock.calls(Dimension::Patents), 1);
}

#[tokio::test]
async fn test_unwritable_cache_still_returns_fresh_result() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blocked = dir.path().join("not-a-directory");
    std::fs::write(&blocked, b"occupied").expect("write placeholder");
    let mock = Arc::new(MockExtractor::new().with_result("ada", patents(1, 0)));
    let cache = Arc::new(CacheStore::new(blocked));
    let stages = StageSet::new(ExtractorSet::uniform(mock.clone()), cache, options());
    let profile = ProfileRef::from_external_id("ada");
    let exhausted = ExhaustedServices::new();

    for _ in 0..2 {
        let result = stages
            .patents
            .run(&profile, &StageContext::default(), &exhausted)
            .await;
        assert_eq!(result.status, StageStatus::Success);
        assert_eq!(result.data, patents(1, 0));
    }
    assert_eq!(mock.calls(Dimension::Patents), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_misses_persist_on_multi_thread_runtime() {
    let mock = Arc::new(MockExtractor::new().with_default(patents(3, 2)));
    let (stages, dir) = create_stages(mock.clone());
    let stages = Arc::new(stages);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let stages = Arc::clone(&stages);
            tokio::spawn(async move {
                let profile = ProfileRef::from_external_id(format!("inventor-{}", i));
                stages
                    .patents
                    .run(&profile, &StageContext::default(), &ExhaustedServices::new())
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.expect("join").status, StageStatus::Success);
    }

    let store = CacheStore::new(dir.path().to_path_buf());
    let stats = store.stats().expect("stats");
    assert_eq!(stats.total, 8);
    assert_eq!(stats.corrupted, 0);
}

#[tokio::test]
async fn test_cache_hit_ignores_query_case() {
    let mock = Arc::new(MockExtractor::new().with_default(patents(1, 0)));
    let (stages, _dir) = create_stages(mock.clone());
    let exhausted = ExhaustedServices::new();

    stages
        .patents
        .run(&ProfileRef::from_external_id("Octocat"), &StageContext::default(), &exhausted)
        .await;
    let again = stages
        .patents
        .run(&ProfileRef::from_external_id("  octocat "), &StageContext::default(), &exhausted)
        .await;

    assert_eq!(again.status, StageStatus::Cached);
    assert_eq!(mock.calls(Dimension::Patents), 1);
}

#[tokio::test]
async fn test_not_found_degrades_to_neutral_default() {
    let mock = Arc::new(MockExtractor::new());
    let (stages, _dir) = create_stages(mock.clone());

    let result = stages
        .education
        .run(
            &ProfileRef::from_name("Nobody"),
            &StageContext::default(),
            &ExhaustedServices::new(),
        )
        .await;

    assert_eq!(result.status, StageStatus::Degraded);
    assert_eq!(result.data, EducationProfile::default());
    assert!(result.error.as_deref().unwrap_or("").contains("no data"));
    assert_eq!(mock.calls(Dimension::Education), 1, "NotFound is not retried");
}

#[tokio::test]
async fn test_degraded_result_is_not_cached() {
    let mock = Arc::new(MockExtractor::new());
    let (stages, _dir) = create_stages(mock.clone());
    let profile = ProfileRef::from_name("Nobody");

    stages
        .code
        .run(&profile, &StageContext::default(), &ExhaustedServices::new())
        .await;
    assert!(stages.cache().get("github", &profile.cache_query()).is_none());
}

#[tokio::test]
async fn test_malformed_payload_degrades() {
    let mock = Arc::new(MockExtractor::new().with_raw(
        Dimension::Patents,
        "ada",
        json!({"granted": "lots"}),
    ));
    let (stages, _dir) = create_stages(mock.clone());

    let result = stages
        .patents
        .run(
            &ProfileRef::from_external_id("ada"),
            &StageContext::default(),
            &ExhaustedServices::new(),
        )
        .await;

    assert_eq!(result.status, StageStatus::Degraded);
    assert_eq!(result.data, PatentRecord::default());
}

#[tokio::test]
async fn test_transient_failure_retried_once_then_succeeds() {
    let mock = Arc::new(MockExtractor::new().with_result("ada", patents(1, 0)));
    mock.fail_next(
        Dimension::Patents,
        CollaboratorError::transient("patents", "connection reset"),
    );
    let (stages, _dir) = create_stages(mock.clone());

    let result = stages
        .patents
        .run(
            &ProfileRef::from_external_id("ada"),
            &StageContext::default(),
            &ExhaustedServices::new(),
        )
        .await;

    assert_eq!(result.status, StageStatus::Success);
    assert!(result.error.is_none());
    assert_eq!(mock.calls(Dimension::Patents), 2);
}

#[tokio::test]
async fn test_repeated_transient_failure_degrades_after_two_calls() {
    let mock = Arc::new(MockExtractor::new().with_failure(
        Dimension::Code,
        "ada",
        CollaboratorError::transient("github", "timeout"),
    ));
    let (stages, _dir) = create_stages(mock.clone());

    let result = stages
        .code
        .run(
            &ProfileRef::from_external_id("ada"),
            &StageContext::default(),
            &ExhaustedServices::new(),
        )
        .await;

    assert_eq!(result.status, StageStatus::Degraded);
    assert_eq!(result.data, CodeActivity::default());
    assert_eq!(mock.calls(Dimension::Code), 2);
}

#[tokio::test]
async fn test_rate_limit_is_critical_not_retried_and_marks_exhausted() {
    let mock = Arc::new(MockExtractor::new().with_failure(
        Dimension::Publications,
        "ada",
        CollaboratorError::rate_limited("publications", "quota"),
    ));
    let (stages, _dir) = create_stages(mock.clone());
    let exhausted = ExhaustedServices::new();

    let result = stages
        .publications
        .run(&ProfileRef::from_external_id("ada"), &StageContext::default(), &exhausted)
        .await;

    assert!(result.is_critical());
    assert_eq!(mock.calls(Dimension::Publications), 1);
    assert!(exhausted.contains(Dimension::Publications));
    assert_eq!(exhausted.snapshot(), vec![Dimension::Publications]);
}

#[tokio::test]
async fn test_exhausted_service_is_not_called_but_cache_still_serves() {
    let mock = Arc::new(MockExtractor::new().with_default(patents(3, 0)));
    let (stages, _dir) = create_stages(mock.clone());
    let warm = ExhaustedServices::new();
    stages
        .patents
        .run(&ProfileRef::from_external_id("cached"), &StageContext::default(), &warm)
        .await;

    let exhausted = ExhaustedServices::new();
    exhausted.mark(Dimension::Patents);

    let cold = stages
        .patents
        .run(&ProfileRef::from_external_id("uncached"), &StageContext::default(), &exhausted)
        .await;
    assert!(cold.is_critical());

    let hit = stages
        .patents
        .run(&ProfileRef::from_external_id("cached"), &StageContext::default(), &exhausted)
        .await;
    assert_eq!(hit.status, StageStatus::Cached);
    assert_eq!(mock.calls(Dimension::Patents), 1);
}

#[tokio::test]
async fn test_context_is_forwarded_to_collaborator() {
    let mock = Arc::new(MockExtractor::new().with_default(WorkHistory::default()));
    let (stages, _dir) = create_stages(mock.clone());
    let context = StageContext {
        publications: Some(PublicationRecord {
            total: 4,
            ..Default::default()
        }),
        code: None,
    };

    stages
        .work_experience
        .run(&ProfileRef::from_name("ada"), &context, &ExhaustedServices::new())
        .await;

    assert_eq!(mock.contexts(Dimension::WorkExperience), vec![context]);
}

#[tokio::test]
async fn test_limiter_caps_concurrent_calls() {
    let mock = Arc::new(
        MockExtractor::new()
            .with_delay(Duration::from_millis(20))
            .with_default(patents(1, 0)),
    );
    let dir = TempDir::new().expect("temp dir");
    let cache = Arc::new(CacheStore::new(dir.path().to_path_buf()));
    let stages = StageSet::new(
        ExtractorSet::uniform(mock.clone()),
        cache,
        StageOptions {
            max_external_calls: 2,
            retry_backoff: Duration::ZERO,
        },
    );
    let exhausted = ExhaustedServices::new();
    let context = StageContext::default();
    let profiles: Vec<_> = (0..6)
        .map(|i| ProfileRef::from_external_id(format!("user-{}", i)))
        .collect();

    let runs = profiles
        .iter()
        .map(|p| stages.patents.run(p, &context, &exhausted));
    futures_util::future::join_all(runs).await;

    assert_eq!(mock.calls(Dimension::Patents), 6);
    assert!(mock.max_in_flight() <= 2);
    assert_eq!(stages.available_permits(), 2);
}

#[test]
fn test_normalization_clamps_inconsistent_counts() {
    let record = PublicationRecord {
        total: 1,
        first_author: 5,
        top_venue: 9,
        citations: 3,
        titles: vec!["  A ".into(), "".into(), "B".into()],
    }
    .normalized();

    assert_eq!(record.titles, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(record.total, 2);
    assert_eq!(record.first_author, 2);
    assert_eq!(record.top_venue, 2);
}

#[test]
fn test_work_history_normalization_rejects_non_finite_years() {
    let history = WorkHistory {
        total_years: f64::NAN,
        has_leadership: true,
        top_tier_employers: 1,
        positions: vec![
            Position {
                title: " Staff Engineer ".into(),
                organization: "Acme".into(),
                years: -2.0,
            },
            Position {
                title: "   ".into(),
                organization: "Ghost".into(),
                years: 3.0,
            },
        ],
    }
    .normalized();

    assert_eq!(history.total_years, 0.0);
    assert_eq!(history.positions.len(), 1);
    assert_eq!(history.positions[0].title, "Staff Engineer");
    assert_eq!(history.positions[0].years, 0.0);
}

#[test]
fn test_dimension_wire_names() {
    assert_eq!(Dimension::Code.as_str(), "github");
    assert_eq!(
        serde_json::to_value(Dimension::WorkExperience).expect("serialize"),
        json!("workExperience")
    );
    assert_eq!(
        serde_json::from_value::<Dimension>(json!("code")).expect("alias"),
        Dimension::Code
    );
}

#[test]
fn test_extractions_serialize_with_wire_names_and_status() {
    let mut extractions = Extractions::default();
    extractions.code = Extracted::fresh(CodeActivity {
        public_repos: 3,
        ..Default::default()
    });
    let value = serde_json::to_value(&extractions).expect("serialize");

    assert_eq!(value["github"]["publicRepos"], json!(3));
    assert_eq!(value["github"]["status"], json!("success"));
    assert_eq!(value["education"]["status"], json!("skipped"));
    assert!(value["education"].get("error").is_none());
    assert!(value.get("workExperience").is_some());
}

#[test]
fn test_profile_cache_query_prefers_external_id() {
    let profile = ProfileRef {
        name: Some("Ada".into()),
        document_text: Some("resume".into()),
        external_id: Some("ada-l".into()),
        url: None,
    };
    assert_eq!(profile.cache_query(), "id:ada-l");

    let by_doc = ProfileRef {
        external_id: None,
        ..profile.clone()
    };
    assert!(by_doc.cache_query().starts_with("name:Ada|doc:"));

    let other_doc = ProfileRef {
        document_text: Some("another resume".into()),
        ..by_doc.clone()
    };
    assert_ne!(by_doc.cache_query(), other_doc.cache_query());
}

#[test]
fn test_profile_display_name_fallbacks() {
    assert_eq!(ProfileRef::from_name("Ada").display_name(), "Ada");
    assert_eq!(ProfileRef::from_external_id("ada-l").display_name(), "ada-l");
    assert_eq!(ProfileRef::default().display_name(), "Unknown");
    assert!(!ProfileRef::default().is_identifiable());
    assert!(
        ProfileRef {
            name: Some("   ".into()),
            ..Default::default()
        }
        .display_name()
            == "Unknown"
    );
}
