use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backends::InferenceResult;
use crate::cascades::{ModelTier, TierTable};
use crate::storage::{QueryRecord, SavingsRecord};

/// Actual spend of one answer against what the largest tier would have charged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub actual: f64,
    pub baseline: f64,
    pub saved: f64,
}

impl CostRecord {
    pub fn new(actual: f64, baseline: f64) -> Self {
        Self {
            actual,
            baseline,
            saved: baseline - actual,
        }
    }

    /// Baseline uses the largest tier's rate whichever tier answered.
    pub fn for_result(result: &InferenceResult, tiers: &TierTable) -> Self {
        let baseline = tiers.largest().cost_for(result.tokens);
        Self::new(result.cost, baseline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_queries: u64,
    pub total_cost: f64,
    pub total_saved: f64,
    pub avg_response_time: f64,
    pub model_distribution: BTreeMap<ModelTier, u64>,
    pub savings_percentage: f64,
}

impl AggregateStats {
    pub fn compute<'a, Q, S>(queries: Q, savings: S) -> Self
    where
        Q: IntoIterator<Item = &'a QueryRecord>,
        S: IntoIterator<Item = &'a SavingsRecord>,
    {
        let mut total_queries = 0u64;
        let mut total_cost = 0.0;
        let mut total_time = 0.0;
        let mut model_distribution = BTreeMap::new();

        for record in queries {
            total_queries += 1;
            total_cost += record.cost;
            total_time += record.response_time;
            *model_distribution.entry(record.model_size).or_insert(0) += 1;
        }

        let total_saved: f64 = savings.into_iter().map(|record| record.saved).sum();

        let avg_response_time = if total_queries > 0 {
            total_time / total_queries as f64
        } else {
            0.0
        };

        let savings_percentage = if total_cost > 0.0 {
            total_saved * 100.0 / (total_cost + total_saved)
        } else {
            0.0
        };

        Self {
            total_queries,
            total_cost,
            total_saved,
            avg_response_time,
            model_distribution,
            savings_percentage,
        }
    }

    pub fn empty() -> Self {
        Self::compute(
            std::iter::empty::<&QueryRecord>(),
            std::iter::empty::<&SavingsRecord>(),
        )
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascades::QueryHash;

    fn query(tier: ModelTier, cost: f64, response_time: f64) -> QueryRecord {
        QueryRecord::new(
            QueryHash::of("q"),
            "q",
            "model",
            tier,
            response_time,
            100,
            cost,
            0.9,
            "reason",
            false,
        )
    }

    fn saving(actual: f64, baseline: f64) -> SavingsRecord {
        SavingsRecord::new(QueryHash::of("q"), &CostRecord::new(actual, baseline))
    }

    #[test]
    fn test_cost_identity() {
        let record = CostRecord::new(0.000_01, 0.000_1);
        assert_eq!(record.baseline - record.actual, record.saved);
        assert!(record.saved >= 0.0);
    }

    #[test]
    fn test_cost_record_for_large_saves_nothing() {
        let tiers = TierTable::default();
        let result = InferenceResult::completed(
            "ok".to_string(),
            ModelTier::Large,
            "Llama-3-8B".to_string(),
            13,
            tiers.get(ModelTier::Large).cost_for(13),
            vec![ModelTier::Large],
        );

        let record = CostRecord::for_result(&result, &tiers);
        assert_eq!(record.saved, 0.0);
    }

    #[test]
    fn test_cost_record_for_tiny_uses_large_baseline() {
        let tiers = TierTable::default();
        let result = InferenceResult::completed(
            "ok".to_string(),
            ModelTier::Tiny,
            "Phi-2".to_string(),
            1000,
            tiers.get(ModelTier::Tiny).cost_for(1000),
            vec![ModelTier::Tiny],
        );

        let record = CostRecord::for_result(&result, &tiers);
        assert_eq!(record.baseline, tiers.largest().cost_for(1000));
        assert!(record.saved > 0.0);
        assert_eq!(record.baseline - record.actual, record.saved);
    }

    #[test]
    fn test_empty_stats_have_no_division_by_zero() {
        let stats = AggregateStats::empty();

        assert_eq!(stats.total_queries, 0);
        assert_eq!(stats.total_cost, 0.0);
        assert_eq!(stats.total_saved, 0.0);
        assert_eq!(stats.avg_response_time, 0.0);
        assert_eq!(stats.savings_percentage, 0.0);
        assert!(stats.model_distribution.is_empty());
    }

    #[test]
    fn test_aggregate_over_records() {
        let queries = vec![
            query(ModelTier::Tiny, 1.0, 2.0),
            query(ModelTier::Tiny, 1.0, 4.0),
            query(ModelTier::Large, 2.0, 6.0),
        ];
        let savings = vec![saving(1.0, 4.0), saving(1.0, 4.0), saving(2.0, 2.0)];

        let stats = AggregateStats::compute(&queries, &savings);

        assert_eq!(stats.total_queries, 3);
        assert_eq!(stats.total_cost, 4.0);
        assert_eq!(stats.total_saved, 6.0);
        assert_eq!(stats.avg_response_time, 4.0);
        assert_eq!(stats.savings_percentage, 60.0);
        assert_eq!(stats.model_distribution.get(&ModelTier::Tiny), Some(&2));
        assert_eq!(stats.model_distribution.get(&ModelTier::Large), Some(&1));
        assert_eq!(stats.model_distribution.get(&ModelTier::Medium), None);
    }
}
