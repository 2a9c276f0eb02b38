use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{InferenceBackend, LlmError};
use crate::cascades::TierSpec;
use crate::cascades::tiers::TEMPERATURE;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

pub struct HuggingFaceBackend {
    client: reqwest::Client,
    config: HuggingFaceConfig,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

impl HuggingFaceBackend {
    pub fn new(config: HuggingFaceConfig) -> Result<Self> {
        let mut client_builder =
            reqwest::Client::builder().connect_timeout(std::time::Duration::from_secs(10));

        if let Ok(https_proxy) = std::env::var("HTTPS_PROXY") {
            if let Ok(proxy) = reqwest::Proxy::https(&https_proxy) {
                client_builder = client_builder.proxy(proxy);
            }
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, spec: &TierSpec) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            spec.model_id
        )
    }

    fn create_request<'a>(spec: &TierSpec, prompt: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: spec.max_new_tokens(),
                temperature: TEMPERATURE,
                return_full_text: false,
            },
        }
    }

    fn http_error_to_llm_error(status: reqwest::StatusCode, error_text: String) -> LlmError {
        let status_code = status.as_u16();

        match status_code {
            429 => LlmError::RateLimit {
                retry_after: None,
                message: error_text,
            },
            401 | 403 => LlmError::AuthenticationError {
                message: error_text,
            },
            _ => LlmError::ServerError {
                status: status_code,
                message: error_text,
            },
        }
    }
}

/// Pull the first candidate's text out of either response shape:
/// `[{"generated_text": ..}, ..]` or `{"generated_text": ..}`.
/// Anything else yields an empty string.
pub fn extract_generated_text(body: &Value) -> String {
    let candidate = match body {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(body),
        _ => None,
    };

    candidate
        .and_then(|c| c.get("generated_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl InferenceBackend for HuggingFaceBackend {
    async fn generate(&self, spec: &TierSpec, prompt: &str) -> Result<String, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::NotConfigured {
                message: "HuggingFace API key not configured. Set HUGGINGFACE_API_KEY or run: cascade config set api_key <your_key>".to_string(),
            });
        }

        let request = Self::create_request(spec, prompt);
        let response = self
            .client
            .post(self.endpoint(spec))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response.text().await.unwrap_or_default();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = headers
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok());
                return Err(LlmError::RateLimit {
                    retry_after,
                    message: error_text,
                });
            }

            return Err(Self::http_error_to_llm_error(status, error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(extract_generated_text(&body))
    }

    fn backend_name(&self) -> &str {
        "huggingface"
    }
}

#[cfg(test)]
#[path = "huggingface_tests.rs"]
mod tests;
