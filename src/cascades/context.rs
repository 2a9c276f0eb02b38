use serde::{Deserialize, Serialize};

use crate::cascades::{CascadeError, ModelTier, RouteDecision};

/// Tier history of a single query as it moves through the cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeContext {
    pub decision: RouteDecision,
    pub current_tier: ModelTier,
    pub escalated: bool,
    pub tiers_attempted: Vec<ModelTier>,
}

impl CascadeContext {
    pub fn new(decision: RouteDecision) -> Self {
        let tier = decision.tier;
        Self {
            decision,
            current_tier: tier,
            escalated: false,
            tiers_attempted: Vec::new(),
        }
    }

    pub fn routed_tier(&self) -> ModelTier {
        self.decision.tier
    }

    pub fn record_attempts(&mut self, tiers: &[ModelTier]) {
        self.tiers_attempted.extend_from_slice(tiers);
    }

    pub fn can_escalate(&self) -> bool {
        !self.escalated
    }

    /// Move one tier above the routed tier. Allowed once per query.
    pub fn escalate(&mut self) -> Result<ModelTier, CascadeError> {
        if self.escalated {
            return Err(CascadeError::EscalationExhausted);
        }

        let target = self.routed_tier().escalation_target();
        self.current_tier = target;
        self.escalated = true;
        Ok(target)
    }

    pub fn escalation_summary(&self) -> String {
        if self.escalated {
            format!(
                "Routed to {}, escalated to {} after {} attempt(s)",
                self.routed_tier(),
                self.current_tier,
                self.tiers_attempted.len()
            )
        } else {
            format!(
                "Routed to {}, no escalation, {} attempt(s)",
                self.routed_tier(),
                self.tiers_attempted.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_starts_at_routed_tier() {
        let ctx = CascadeContext::new(RouteDecision::forced(ModelTier::Tiny));
        assert_eq!(ctx.current_tier, ModelTier::Tiny);
        assert!(ctx.can_escalate());
        assert!(ctx.tiers_attempted.is_empty());
    }

    #[test]
    fn test_escalate_from_tiny_to_medium() {
        let mut ctx = CascadeContext::new(RouteDecision::forced(ModelTier::Tiny));
        assert_eq!(ctx.escalate().unwrap(), ModelTier::Medium);
        assert_eq!(ctx.current_tier, ModelTier::Medium);
        assert!(ctx.escalated);
    }

    #[test]
    fn test_large_escalates_to_itself() {
        let mut ctx = CascadeContext::new(RouteDecision::forced(ModelTier::Large));
        assert_eq!(ctx.escalate().unwrap(), ModelTier::Large);
    }

    #[test]
    fn test_escalation_is_single_shot() {
        let mut ctx = CascadeContext::new(RouteDecision::forced(ModelTier::Tiny));
        assert!(ctx.escalate().is_ok());
        assert!(matches!(
            ctx.escalate(),
            Err(CascadeError::EscalationExhausted)
        ));
        assert_eq!(ctx.current_tier, ModelTier::Medium);
    }

    #[test]
    fn test_escalation_summary() {
        let mut ctx = CascadeContext::new(RouteDecision::forced(ModelTier::Medium));
        ctx.record_attempts(&[ModelTier::Medium]);
        ctx.escalate().unwrap();
        ctx.record_attempts(&[ModelTier::Large]);

        assert_eq!(
            ctx.escalation_summary(),
            "Routed to medium, escalated to large after 2 attempt(s)"
        );
    }
}
