use std::sync::Arc;

use cascade_learn::backends::{HuggingFaceBackend, HuggingFaceConfig, ModelGateway};
use cascade_learn::cascades::{CascadeEngine, CascadeRouter, ModelTier, TierTable};
use cascade_learn::storage::{JsonlLedger, QueryLedger};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOD_ANSWER: &str = "Two plus two is four, which is the sum you get when adding the numbers together.";

fn engine(server: &MockServer, ledger_dir: &TempDir) -> CascadeEngine {
    let backend = HuggingFaceBackend::new(HuggingFaceConfig {
        api_key: "hf-test".to_string(),
        base_url: server.uri(),
    })
    .unwrap();
    let gateway = ModelGateway::new(Arc::new(backend), Arc::new(TierTable::default()));
    let ledger = JsonlLedger::new(ledger_dir.path()).unwrap();
    CascadeEngine::new(Arc::new(CascadeRouter::new()), gateway, Arc::new(ledger))
}

#[tokio::test]
async fn failed_tier_falls_back_and_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/microsoft/phi-2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Model is loading"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mistralai/Mistral-7B-Instruct-v0.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": GOOD_ANSWER}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let ledger_dir = TempDir::new().unwrap();
    let engine = engine(&server, &ledger_dir);

    let outcome = engine.process("What is 2+2?", None).await.unwrap();

    assert_eq!(outcome.decision.tier, ModelTier::Tiny);
    assert_eq!(outcome.tier_used, ModelTier::Medium);
    assert_eq!(outcome.model_name, "Mistral-7B");
    assert!(!outcome.escalated);
    assert_eq!(outcome.response, GOOD_ANSWER);

    let reopened = JsonlLedger::new(ledger_dir.path()).unwrap();
    let queries = reopened.queries().await.unwrap();
    let savings = reopened.savings().await.unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(savings.len(), 1);
    assert_eq!(queries[0].model_size, ModelTier::Medium);
    assert_eq!(queries[0].query_hash, savings[0].query_hash);
    assert_eq!(
        savings[0].baseline_cost - savings[0].actual_cost,
        savings[0].saved
    );
}

#[tokio::test]
async fn all_tiers_down_yields_error_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(3)
        .mount(&server)
        .await;

    let ledger_dir = TempDir::new().unwrap();
    let engine = engine(&server, &ledger_dir);

    let outcome = engine.process("What is 2+2?", None).await.unwrap();

    assert!(outcome.is_error());
    assert!(outcome.response.starts_with("Error: All models failed."));
    assert_eq!(outcome.cost.actual, 0.0);
    assert_eq!(outcome.tokens, 0);

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total_queries, 1);
    assert_eq!(stats.total_cost, 0.0);
    assert_eq!(stats.savings_percentage, 0.0);
}

#[tokio::test]
async fn short_answer_escalates_to_next_tier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/microsoft/phi-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "4"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mistralai/Mistral-7B-Instruct-v0.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_text": GOOD_ANSWER
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ledger_dir = TempDir::new().unwrap();
    let engine = engine(&server, &ledger_dir);

    let outcome = engine.process("What is 2+2?", None).await.unwrap();

    assert!(outcome.escalated);
    assert_eq!(outcome.tier_used, ModelTier::Medium);
    assert_eq!(outcome.response, GOOD_ANSWER);
    assert!(engine.stats().await.unwrap().total_saved > 0.0);
}

#[tokio::test]
async fn repeated_query_reuses_routing_decision() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": GOOD_ANSWER}
        ])))
        .mount(&server)
        .await;

    let ledger_dir = TempDir::new().unwrap();
    let engine = engine(&server, &ledger_dir);

    let first = engine.process("What is 2+2?", None).await.unwrap();
    let second = engine.process("What is 2+2?", None).await.unwrap();

    assert_eq!(first.decision, second.decision);
    assert_eq!(engine.router().cache().len(), 1);
    assert_eq!(engine.stats().await.unwrap().total_queries, 2);
}
