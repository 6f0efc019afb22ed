use super::*;
use crate::pipeline::Strategy;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_lens_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("LENS_CACHE_PATH");
        env::remove_var("LENS_CACHE_TTL_SECS");
        env::remove_var("LENS_CONCURRENCY");
        env::remove_var("LENS_MAX_EXTERNAL_CALLS");
        env::remove_var("LENS_RETRY_BACKOFF_MS");
        env::remove_var("LENS_EXTRACTOR_URL");
        env::remove_var("LENS_REQUEST_TIMEOUT_SECS");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.cache_path, PathBuf::from("./.cache"));
    assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    assert_eq!(config.concurrency, 5);
    assert_eq!(config.max_external_calls, 4);
    assert_eq!(config.retry_backoff, Duration::from_millis(500));
    assert!(config.extractor_url.is_none());
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_lens_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_full_config_parse() {
    clear_lens_env();

    with_env_vars(
        &[
            ("LENS_CACHE_PATH", "/var/cache/lens"),
            ("LENS_CACHE_TTL_SECS", "3600"),
            ("LENS_CONCURRENCY", "8"),
            ("LENS_MAX_EXTERNAL_CALLS", "2"),
            ("LENS_RETRY_BACKOFF_MS", "0"),
            ("LENS_EXTRACTOR_URL", "http://extractor.internal:9000"),
            ("LENS_REQUEST_TIMEOUT_SECS", "5"),
        ],
        || {
            let config = Config::from_env().expect("should parse full config");

            assert_eq!(config.cache_path, PathBuf::from("/var/cache/lens"));
            assert_eq!(config.cache_ttl, Duration::from_secs(3600));
            assert_eq!(config.concurrency, 8);
            assert_eq!(config.max_external_calls, 2);
            assert_eq!(config.retry_backoff, Duration::ZERO);
            assert_eq!(
                config.require_extractor_url().expect("set"),
                "http://extractor.internal:9000"
            );
            assert_eq!(config.request_timeout, Duration::from_secs(5));
        },
    );
}

#[test]
#[serial]
fn test_zero_concurrency_rejected() {
    clear_lens_env();

    with_env_vars(&[("LENS_CONCURRENCY", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroNotAllowed {
                name: "LENS_CONCURRENCY"
            }
        ));
    });
}

#[test]
#[serial]
fn test_non_numeric_max_calls_rejected() {
    clear_lens_env();

    with_env_vars(&[("LENS_MAX_EXTERNAL_CALLS", "lots")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
        assert!(err.to_string().contains("LENS_MAX_EXTERNAL_CALLS"));
    });
}

#[test]
#[serial]
fn test_invalid_ttl_falls_back_to_default() {
    clear_lens_env();

    with_env_vars(&[("LENS_CACHE_TTL_SECS", "a day")], || {
        let config = Config::from_env().expect("should parse with fallback");
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    });
}

#[test]
#[serial]
fn test_blank_extractor_url_is_unset() {
    clear_lens_env();

    with_env_vars(&[("LENS_EXTRACTOR_URL", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.extractor_url.is_none());
        assert!(matches!(
            config.require_extractor_url(),
            Err(ConfigError::MissingEnvVar { .. })
        ));
    });
}

#[test]
fn test_validate_cache_path_is_file() {
    let config = Config {
        cache_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_rejects_url_without_scheme() {
    let config = Config {
        extractor_url: Some("extractor.internal:9000".into()),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
}

#[test]
fn test_validate_rejects_zero_counts_set_in_code() {
    let config = Config {
        max_external_calls: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroNotAllowed { .. })
    ));
}

#[test]
fn test_validate_success_with_defaults() {
    let config = Config::default();

    let result = config.validate();
    assert!(
        result.is_ok(),
        "validate() should succeed with default config"
    );
}

#[test]
fn test_derived_stage_options_and_strategy() {
    let config = Config {
        concurrency: 1,
        max_external_calls: 3,
        retry_backoff: Duration::from_millis(10),
        ..Default::default()
    };

    let options = config.stage_options();
    assert_eq!(options.max_external_calls, 3);
    assert_eq!(options.retry_backoff, Duration::from_millis(10));
    assert_eq!(config.strategy(), Strategy::Sequential);

    let config = Config {
        concurrency: 6,
        ..Default::default()
    };
    assert_eq!(config.strategy(), Strategy::Concurrent { batch: 6 });
}
