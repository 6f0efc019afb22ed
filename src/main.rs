//! `lens` command-line entrypoint.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use lens::cache::CacheStore;
use lens::config::Config;
use lens::evaluation::{EvaluationRequest, Evaluator};
use lens::extraction::{ExtractorSet, RemoteExtractor, StageSet};
use lens::pipeline::{CandidatePipeline, RemoteDiscovery, SearchRequest};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "\
usage:
  lens evaluate <request.json>
  lens search <request.json>
  lens cache stats
  lens cache sweep
  lens cache clear [category]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["evaluate", path] => evaluate(&config, Path::new(path)).await,
        ["search", path] => search(&config, Path::new(path)).await,
        ["cache", "stats"] => {
            let store = open_cache(&config)?;
            print_json(&store.stats()?)
        }
        ["cache", "sweep"] => {
            let store = open_cache(&config)?;
            let removed = store.sweep_expired()?;
            tracing::info!(removed, "Swept expired cache entries");
            print_json(&serde_json::json!({ "removed": removed }))
        }
        ["cache", "clear"] => clear(&config, None),
        ["cache", "clear", category] => clear(&config, Some(*category)),
        ["--help"] | ["-h"] | ["help"] => {
            println!("{}", USAGE);
            Ok(())
        }
        _ => bail!("unrecognized arguments\n{}", USAGE),
    }
}

async fn evaluate(config: &Config, path: &Path) -> anyhow::Result<()> {
    let request: EvaluationRequest = read_request(path)?;
    let evaluator = Evaluator::new(build_stages(config)?);

    tracing::info!(cache = %config.cache_path.display(), "Evaluating profile");
    let result = evaluator.evaluate(&request).await?;
    print_json(&result)
}

async fn search(config: &Config, path: &Path) -> anyhow::Result<()> {
    let request: SearchRequest = read_request(path)?;
    let stages = build_stages(config)?;
    let source = Arc::new(RemoteDiscovery::new(
        config.require_extractor_url()?,
        config.request_timeout,
    )?);
    let pipeline = CandidatePipeline::new(stages, source).with_retry_backoff(config.retry_backoff);

    tracing::info!(
        concurrency = config.concurrency,
        max_external_calls = config.max_external_calls,
        "Running candidate search"
    );
    let response = pipeline.run(&request, config.strategy()).await?;
    print_json(&response)
}

fn clear(config: &Config, category: Option<&str>) -> anyhow::Result<()> {
    let store = open_cache(config)?;
    let removed = store.clear(category)?;
    tracing::info!(removed, category = category.unwrap_or("*"), "Cleared cache");
    print_json(&serde_json::json!({ "removed": removed }))
}

fn open_cache(config: &Config) -> anyhow::Result<CacheStore> {
    CacheStore::open(config.cache_path.clone(), config.cache_ttl)
        .with_context(|| format!("opening cache at {}", config.cache_path.display()))
}

fn build_stages(config: &Config) -> anyhow::Result<Arc<StageSet>> {
    let cache = Arc::new(open_cache(config)?);
    let extractor = Arc::new(RemoteExtractor::new(
        config.require_extractor_url()?,
        config.request_timeout,
    )?);
    Ok(Arc::new(StageSet::new(
        ExtractorSet::uniform(extractor),
        cache,
        config.stage_options(),
    )))
}

fn read_request<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing request {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
