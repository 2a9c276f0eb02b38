use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::backends::{
    HuggingFaceBackend, HuggingFaceConfig, InferenceBackend, MockBackend, ModelGateway,
};
use crate::cascades::{CascadeEngine, CascadeRouter, TierTable};
use crate::config::AppConfig;
use crate::console::console;
use crate::storage::{InMemoryLedger, JsonlLedger, QueryLedger};

pub const DEMO_QUERIES: [&str; 5] = [
    "What is 2+2?",
    "Explain the concept of recursion in programming",
    "Write a Python function to calculate fibonacci numbers",
    "What's the capital of France?",
    "Analyze the pros and cons of microservices architecture",
];

/// Wire up router, gateway and ledger from config. `backend` overrides
/// `default_backend`; the mock backend keeps its ledger in memory.
pub fn build_engine(config: &AppConfig, backend: Option<&str>) -> Result<CascadeEngine> {
    let backend_name = backend.unwrap_or(config.default_backend.as_str());
    let tiers = Arc::new(config.tier_table().context("Invalid tier configuration")?);

    let backend: Arc<dyn InferenceBackend>;
    let ledger: Arc<dyn QueryLedger>;
    match backend_name {
        "huggingface" => {
            backend = Arc::new(HuggingFaceBackend::new(HuggingFaceConfig {
                api_key: config.api_key().unwrap_or_default(),
                base_url: config.base_url.clone(),
            })?);
            ledger = Arc::new(
                JsonlLedger::new(config.ledger_dir()?).context("Failed to open query ledger")?,
            );
        }
        "mock" => {
            backend = Arc::new(MockBackend::new());
            ledger = Arc::new(InMemoryLedger::new());
        }
        other => bail!("Unknown backend '{}'. Expected huggingface or mock", other),
    }

    let router = CascadeRouter::with_cache(Arc::new(config.decision_cache()));
    let gateway = ModelGateway::new(backend, tiers);
    Ok(CascadeEngine::new(Arc::new(router), gateway, ledger))
}

pub async fn handle_query(engine: &CascadeEngine, query: &str, force: Option<&str>) -> Result<()> {
    let outcome = engine.process(query, force).await?;
    console().response(&outcome);
    console().outcome_summary(&outcome);
    Ok(())
}

pub async fn handle_stats(engine: &CascadeEngine) -> Result<()> {
    let stats = engine.stats().await.context("Failed to read query ledger")?;
    console().stats(&stats);
    Ok(())
}

pub fn handle_models(tiers: &TierTable) {
    console().header("🧠 Model tiers");
    for spec in tiers.iter() {
        console().tier(spec);
    }
}

pub async fn handle_demo(engine: &CascadeEngine) -> Result<()> {
    console().header(&format!(
        "🚀 Cascade demo ({} backend)",
        engine.backend_name()
    ));

    for query in DEMO_QUERIES {
        console().newline();
        console().plain(&format!("> {}", query));
        let outcome = engine.process(query, None).await?;
        console().outcome_summary(&outcome);
        console().verbose(&outcome.response);
    }

    console().newline();
    handle_stats(engine).await
}
