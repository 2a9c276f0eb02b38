use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use super::{InferenceBackend, LlmError};
use crate::cascades::{ModelTier, TierTable};

const TOKENS_PER_WORD: f64 = 1.3;

/// Approximate token count: 1.3 tokens per whitespace-separated word, rounded down.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.split_whitespace().count() as f64 * TOKENS_PER_WORD) as u64
}

/// Outcome of one gateway invocation, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub text: String,
    /// Tier that produced `text`; on failure, the last tier tried.
    pub tier: ModelTier,
    pub model_name: String,
    pub tokens: u64,
    pub cost: f64,
    #[serde(skip)]
    pub error: Option<LlmError>,
    pub attempts: Vec<ModelTier>,
}

impl InferenceResult {
    pub fn completed(
        text: String,
        tier: ModelTier,
        model_name: String,
        tokens: u64,
        cost: f64,
        attempts: Vec<ModelTier>,
    ) -> Self {
        Self {
            text,
            tier,
            model_name,
            tokens,
            cost,
            error: None,
            attempts,
        }
    }

    pub fn failed(
        tier: ModelTier,
        model_name: String,
        error: LlmError,
        attempts: Vec<ModelTier>,
    ) -> Self {
        Self {
            text: format!("Error: All models failed. Last error: {}", error),
            tier,
            model_name,
            tokens: 0,
            cost: 0.0,
            error: Some(error),
            attempts,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Sends prompts to the tier backends, falling back to larger tiers on failure.
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn InferenceBackend>,
    tiers: Arc<TierTable>,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn InferenceBackend>, tiers: Arc<TierTable>) -> Self {
        Self { backend, tiers }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn backend_name(&self) -> &str {
        self.backend.backend_name()
    }

    /// Try `tier`, then each larger tier in turn, one call at a time.
    ///
    /// Never fails: when every tier in the chain fails, or a failure is
    /// terminal, the returned result carries the last error with zero
    /// tokens and zero cost.
    pub async fn invoke(&self, tier: ModelTier, prompt: &str) -> InferenceResult {
        let mut attempts = Vec::with_capacity(ModelTier::ALL.len());
        let mut last_failure = None;

        for current in tier.fallback_chain() {
            let spec = self.tiers.get(current);
            attempts.push(current);

            let outcome =
                match tokio::time::timeout(spec.timeout, self.backend.generate(spec, prompt)).await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(LlmError::Timeout {
                        after: spec.timeout,
                    }),
                };

            match outcome {
                Ok(text) => {
                    let tokens = estimate_tokens(&text);
                    let cost = spec.cost_for(tokens);
                    debug!(tier = %current, model = %spec.name, tokens, cost, "tier answered");
                    return InferenceResult::completed(
                        text,
                        current,
                        spec.name.clone(),
                        tokens,
                        cost,
                        attempts,
                    );
                }
                Err(e) => {
                    warn!(tier = %current, model = %spec.name, error = %e, "tier call failed");
                    let terminal = e.is_terminal();
                    last_failure = Some((current, e));
                    if terminal {
                        break;
                    }
                }
            }
        }

        match last_failure {
            Some((failed_tier, e)) => {
                error!(attempts = attempts.len(), error = %e, "all tiers failed");
                let model_name = self.tiers.get(failed_tier).name.clone();
                InferenceResult::failed(failed_tier, model_name, e, attempts)
            }
            // The chain always holds at least the starting tier.
            None => InferenceResult::failed(
                tier,
                self.tiers.get(tier).name.clone(),
                LlmError::InvalidResponse {
                    message: "no tier attempted".to_string(),
                },
                attempts,
            ),
        }
    }
}
