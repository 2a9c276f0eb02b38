use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::backends::{InferenceResult, LlmError, ModelGateway};
use crate::cascades::{
    AggregateStats, CascadeContext, CascadeResult, CascadeRouter, CostRecord, EscalationPolicy,
    ModelTier, QueryHash, RouteDecision, TierTable,
};
use crate::storage::{QueryLedger, QueryRecord, SavingsRecord};

/// Final answer for one query plus everything needed to explain its cost.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub response: String,
    pub model_name: String,
    pub tier_used: ModelTier,
    pub tokens: u64,
    pub cost: CostRecord,
    pub response_time: Duration,
    pub decision: RouteDecision,
    pub escalated: bool,
    pub error: Option<LlmError>,
}

impl QueryOutcome {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Route, invoke, maybe escalate once, then record.
pub struct CascadeEngine {
    router: Arc<CascadeRouter>,
    gateway: ModelGateway,
    escalation: EscalationPolicy,
    ledger: Arc<dyn QueryLedger>,
}

impl CascadeEngine {
    pub fn new(
        router: Arc<CascadeRouter>,
        gateway: ModelGateway,
        ledger: Arc<dyn QueryLedger>,
    ) -> Self {
        Self {
            router,
            gateway,
            escalation: EscalationPolicy::default(),
            ledger,
        }
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn router(&self) -> &CascadeRouter {
        &self.router
    }

    pub fn tiers(&self) -> &TierTable {
        self.gateway.tiers()
    }

    pub fn backend_name(&self) -> &str {
        self.gateway.backend_name()
    }

    pub async fn process(&self, query: &str, force: Option<&str>) -> CascadeResult<QueryOutcome> {
        let started = Instant::now();

        let decision = match force {
            Some(tier) => self.router.force(tier.parse()?),
            None => self.router.route(query),
        };
        let mut context = CascadeContext::new(decision);

        let mut result = self.gateway.invoke(context.routed_tier(), query).await;
        context.record_attempts(&result.attempts);

        if !result.is_error() {
            if let Some(trigger) = self
                .escalation
                .trigger(&result.text, context.decision.confidence)
            {
                let target = context.escalate()?;
                info!(
                    from = %context.routed_tier(),
                    to = %target,
                    trigger = ?trigger,
                    "Escalating query"
                );
                result = self.gateway.invoke(target, query).await;
                context.record_attempts(&result.attempts);
            }
        }

        let response_time = started.elapsed();
        let cost = CostRecord::for_result(&result, self.tiers());
        debug!(summary = %context.escalation_summary(), "Query finished");

        self.persist(query, &context, &result, &cost, response_time)
            .await;

        Ok(QueryOutcome {
            response: result.text,
            model_name: result.model_name,
            tier_used: result.tier,
            tokens: result.tokens,
            cost,
            response_time,
            decision: context.decision,
            escalated: context.escalated,
            error: result.error,
        })
    }

    async fn persist(
        &self,
        query: &str,
        context: &CascadeContext,
        result: &InferenceResult,
        cost: &CostRecord,
        response_time: Duration,
    ) {
        let query_hash = context
            .decision
            .query_hash
            .clone()
            .unwrap_or_else(|| QueryHash::of(query));

        let query_record = QueryRecord::new(
            query_hash.clone(),
            query,
            &result.model_name,
            result.tier,
            response_time.as_secs_f64(),
            result.tokens,
            result.cost,
            context.decision.confidence,
            &context.decision.reason,
            context.escalated,
        );
        let savings_record = SavingsRecord::new(query_hash, cost);

        if let Err(e) = self.ledger.append(query_record, savings_record).await {
            error!(error = %e, "Failed to record query in ledger");
        }
    }

    pub async fn stats(&self) -> CascadeResult<AggregateStats> {
        let queries = self.ledger.queries().await?;
        let savings = self.ledger.savings().await?;
        Ok(AggregateStats::compute(&queries, &savings))
    }
}
