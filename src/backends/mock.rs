use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{InferenceBackend, LlmError};
use crate::cascades::{ModelTier, TierSpec};

/// Offline backend that answers every prompt by echoing it.
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn generate(&self, spec: &TierSpec, prompt: &str) -> Result<String, LlmError> {
        Ok(format!(
            "Mock response from {} ({} parameters) to: {}",
            spec.name, spec.params, prompt
        ))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(LlmError),
    /// Sleep before answering, to exercise per-tier timeouts.
    Delay(Duration, String),
}

/// Backend with a fixed reply per tier that records every call it receives.
pub struct ScriptedBackend {
    replies: HashMap<ModelTier, ScriptedReply>,
    calls: Mutex<Vec<ModelTier>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, tier: ModelTier, reply: ScriptedReply) -> Self {
        self.replies.insert(tier, reply);
        self
    }

    pub fn text(self, tier: ModelTier, text: impl Into<String>) -> Self {
        self.reply(tier, ScriptedReply::Text(text.into()))
    }

    pub fn fail(self, tier: ModelTier, error: LlmError) -> Self {
        self.reply(tier, ScriptedReply::Fail(error))
    }

    pub fn calls(&self) -> Vec<ModelTier> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn generate(&self, spec: &TierSpec, _prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.tier);
        }

        match self.replies.get(&spec.tier) {
            Some(ScriptedReply::Text(text)) => Ok(text.clone()),
            Some(ScriptedReply::Fail(error)) => Err(error.clone()),
            Some(ScriptedReply::Delay(delay, text)) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            None => Err(LlmError::ServerError {
                status: 404,
                message: format!("no scripted reply for {}", spec.tier),
            }),
        }
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}
