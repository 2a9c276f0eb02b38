use serde::{Deserialize, Serialize};

use crate::cascades::CascadeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityLevel::Simple => write!(f, "simple"),
            ComplexityLevel::Moderate => write!(f, "moderate"),
            ComplexityLevel::Complex => write!(f, "complex"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Code,
    Math,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Code => "code",
            Domain::Math => "math",
            Domain::General => "general",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost/quality level of a hosted model. Ordered from cheapest to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Tiny,
    Medium,
    Large,
}

impl ModelTier {
    pub const ALL: [ModelTier; 3] = [ModelTier::Tiny, ModelTier::Medium, ModelTier::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Tiny => "tiny",
            ModelTier::Medium => "medium",
            ModelTier::Large => "large",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ModelTier::Tiny => 0,
            ModelTier::Medium => 1,
            ModelTier::Large => 2,
        }
    }

    /// The next larger tier, or `None` at the top.
    pub fn next_larger(&self) -> Option<ModelTier> {
        match self {
            ModelTier::Tiny => Some(ModelTier::Medium),
            ModelTier::Medium => Some(ModelTier::Large),
            ModelTier::Large => None,
        }
    }

    /// Tier used for a quality escalation. Large has nowhere to go and retries itself.
    pub fn escalation_target(&self) -> ModelTier {
        self.next_larger().unwrap_or(ModelTier::Large)
    }

    /// This tier followed by every larger one, in order.
    pub fn fallback_chain(&self) -> impl Iterator<Item = ModelTier> {
        ModelTier::ALL.into_iter().skip(self.index())
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelTier {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiny" => Ok(ModelTier::Tiny),
            "medium" => Ok(ModelTier::Medium),
            "large" => Ok(ModelTier::Large),
            _ => Err(CascadeError::UnknownTier(s.to_string())),
        }
    }
}

/// Content-addressing key for a query: hex SHA-256 of the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHash(String);

impl QueryHash {
    pub fn of(query: &str) -> Self {
        use sha2::{Digest, Sha256};

        let digest = Sha256::digest(query.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const FORCED_REASON: &str = "Forced model selection";

/// Where a decision came from. Both kinds share the `RouteDecision` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DecisionSource {
    Computed {
        complexity: ComplexityLevel,
        domain: Domain,
    },
    Forced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub tier: ModelTier,
    pub confidence: f64,
    pub reason: String,
    pub query_hash: Option<QueryHash>,
    pub source: DecisionSource,
}

impl RouteDecision {
    pub fn computed(
        tier: ModelTier,
        confidence: f64,
        reason: impl Into<String>,
        query_hash: QueryHash,
        complexity: ComplexityLevel,
        domain: Domain,
    ) -> Self {
        Self {
            tier,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            query_hash: Some(query_hash),
            source: DecisionSource::Computed { complexity, domain },
        }
    }

    pub fn forced(tier: ModelTier) -> Self {
        Self {
            tier,
            confidence: 1.0,
            reason: FORCED_REASON.to_string(),
            query_hash: None,
            source: DecisionSource::Forced,
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self.source, DecisionSource::Forced)
    }
}
