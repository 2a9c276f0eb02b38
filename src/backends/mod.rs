use async_trait::async_trait;

use crate::cascades::TierSpec;

pub mod gateway;
pub mod huggingface;
pub mod llm_error;
pub mod mock;

pub use gateway::{InferenceResult, ModelGateway, estimate_tokens};
pub use huggingface::{HuggingFaceBackend, HuggingFaceConfig};
pub use llm_error::LlmError;
pub use mock::{MockBackend, ScriptedBackend, ScriptedReply};

/// A remote text generator reachable per tier.
///
/// Implementations make exactly one attempt per call; fallback across
/// tiers and timeouts belong to [`ModelGateway`].
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, spec: &TierSpec, prompt: &str) -> Result<String, LlmError>;

    fn backend_name(&self) -> &str;
}
