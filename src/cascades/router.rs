use std::sync::Arc;

use tracing::debug;

use crate::cascades::{
    ComplexityAnalyzer, ComplexityLevel, ConfidenceMatrix, DecisionCache,
    DefaultComplexityAnalyzer, Domain, ModelTier, QueryHash, RouteDecision,
};

/// Tier policy for a classified query, with the reason shown to the caller.
pub fn select_tier(level: ComplexityLevel, domain: Domain) -> (ModelTier, &'static str) {
    match (level, domain) {
        (ComplexityLevel::Simple, _) => (
            ModelTier::Tiny,
            "efficiency: simple query routed to smallest tier.",
        ),
        (ComplexityLevel::Moderate, Domain::Code) => {
            (ModelTier::Medium, "code-related moderate query.")
        }
        (ComplexityLevel::Moderate, _) => (
            ModelTier::Tiny,
            "moderate query, attempting smallest tier first.",
        ),
        (ComplexityLevel::Complex, Domain::Code) => (ModelTier::Large, "complex code query."),
        (ComplexityLevel::Complex, _) => (ModelTier::Medium, "complex query."),
    }
}

pub struct CascadeRouter {
    analyzer: Arc<dyn ComplexityAnalyzer>,
    confidence: ConfidenceMatrix,
    cache: Arc<DecisionCache>,
}

impl CascadeRouter {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(DecisionCache::default()))
    }

    pub fn with_cache(cache: Arc<DecisionCache>) -> Self {
        Self {
            analyzer: Arc::new(DefaultComplexityAnalyzer::new()),
            confidence: ConfidenceMatrix::default(),
            cache,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn ComplexityAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceMatrix) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn query_hash(query: &str) -> QueryHash {
        QueryHash::of(query)
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    pub fn route(&self, query: &str) -> RouteDecision {
        let hash = Self::query_hash(query);
        if let Some(cached) = self.cache.get(&hash) {
            debug!(query_hash = %hash, tier = %cached.tier, "Routing decision served from cache");
            return cached;
        }

        let analysis = self.analyzer.analyze(query);
        let (tier, reason) = select_tier(analysis.level, analysis.domain);
        let confidence = self.confidence.estimate(analysis.level, tier);

        debug!(
            query_hash = %hash,
            complexity = %analysis.level,
            domain = %analysis.domain,
            tier = %tier,
            confidence,
            "Routed query"
        );

        let decision = RouteDecision::computed(
            tier,
            confidence,
            reason,
            hash.clone(),
            analysis.level,
            analysis.domain,
        );
        self.cache.insert(hash, decision.clone());
        decision
    }

    /// Caller-selected tier. Never touches the cache.
    pub fn force(&self, tier: ModelTier) -> RouteDecision {
        RouteDecision::forced(tier)
    }
}

impl Default for CascadeRouter {
    fn default() -> Self {
        Self::new()
    }
}
