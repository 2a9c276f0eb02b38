pub mod accounting;
pub mod cache;
pub mod complexity_analyzer;
pub mod confidence;
pub mod context;
pub mod engine;
pub mod errors;
pub mod escalation;
pub mod router;
pub mod tiers;
pub mod types;


pub use accounting::{AggregateStats, CostRecord};
pub use cache::{DEFAULT_CACHE_CAPACITY, DecisionCache};
pub use complexity_analyzer::{
    ComplexityAnalyzer, ComplexitySignals, DefaultComplexityAnalyzer, QueryAnalysis,
};
pub use confidence::ConfidenceMatrix;
pub use context::CascadeContext;
pub use engine::{CascadeEngine, QueryOutcome};
pub use errors::{CascadeError, CascadeResult};
pub use escalation::{EscalationPolicy, EscalationTrigger, should_escalate};
pub use router::{CascadeRouter, select_tier};
pub use tiers::{TierSpec, TierTable};
pub use types::{
    ComplexityLevel, DecisionSource, Domain, FORCED_REASON, ModelTier, QueryHash, RouteDecision,
};
