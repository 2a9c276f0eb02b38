use std::time::Duration;

use serde::Serialize;

use crate::cascades::{CascadeError, ModelTier};

/// Generation cap requested from the remote model regardless of the tier's own limit.
pub const MAX_NEW_TOKENS: u32 = 256;
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct TierSpec {
    pub tier: ModelTier,
    pub model_id: String,
    pub name: String,
    pub params: String,
    pub cost_per_token: f64,
    pub max_tokens: u32,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl TierSpec {
    pub fn max_new_tokens(&self) -> u32 {
        MAX_NEW_TOKENS.min(self.max_tokens)
    }

    pub fn cost_per_1k_tokens(&self) -> f64 {
        self.cost_per_token * 1000.0
    }

    pub fn cost_for(&self, tokens: u64) -> f64 {
        tokens as f64 * self.cost_per_token
    }
}

/// The fixed catalogue of tiers, indexed by `ModelTier`.
#[derive(Debug, Clone, Serialize)]
pub struct TierTable {
    specs: [TierSpec; 3],
}

impl TierTable {
    pub fn new(specs: [TierSpec; 3]) -> Result<Self, CascadeError> {
        for (i, spec) in specs.iter().enumerate() {
            if spec.tier.index() != i {
                return Err(CascadeError::InvalidConfig(format!(
                    "tier '{}' listed in position {}",
                    spec.tier, i
                )));
            }
        }

        for pair in specs.windows(2) {
            let (smaller, larger) = (&pair[0], &pair[1]);
            if smaller.cost_per_token >= larger.cost_per_token {
                return Err(CascadeError::InvalidConfig(format!(
                    "cost per token must increase from {} to {}",
                    smaller.tier, larger.tier
                )));
            }
            if smaller.timeout >= larger.timeout {
                return Err(CascadeError::InvalidConfig(format!(
                    "timeout must increase from {} to {}",
                    smaller.tier, larger.tier
                )));
            }
        }

        Ok(Self { specs })
    }

    pub fn get(&self, tier: ModelTier) -> &TierSpec {
        &self.specs[tier.index()]
    }

    pub fn largest(&self) -> &TierSpec {
        self.get(ModelTier::Large)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TierSpec> {
        self.specs.iter()
    }

    /// Replace the remote model id of one tier, keeping its cost and timeout.
    pub fn with_model_id(mut self, tier: ModelTier, model_id: impl Into<String>) -> Self {
        self.specs[tier.index()].model_id = model_id.into();
        self
    }

    /// Replace every timeout at once; they must still increase with tier size.
    pub fn with_timeouts(self, timeouts: [Duration; 3]) -> Result<Self, CascadeError> {
        let mut specs = self.specs;
        for (spec, timeout) in specs.iter_mut().zip(timeouts) {
            spec.timeout = timeout;
        }
        Self::new(specs)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            specs: [
                TierSpec {
                    tier: ModelTier::Tiny,
                    model_id: "microsoft/phi-2".to_string(),
                    name: "Phi-2".to_string(),
                    params: "2.7B".to_string(),
                    cost_per_token: 0.000_000_1,
                    max_tokens: 2048,
                    timeout: Duration::from_secs(10),
                },
                TierSpec {
                    tier: ModelTier::Medium,
                    model_id: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
                    name: "Mistral-7B".to_string(),
                    params: "7B".to_string(),
                    cost_per_token: 0.000_000_5,
                    max_tokens: 4096,
                    timeout: Duration::from_secs(15),
                },
                TierSpec {
                    tier: ModelTier::Large,
                    model_id: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
                    name: "Llama-3-8B".to_string(),
                    params: "8B".to_string(),
                    cost_per_token: 0.000_001,
                    max_tokens: 8192,
                    timeout: Duration::from_secs(20),
                },
            ],
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
