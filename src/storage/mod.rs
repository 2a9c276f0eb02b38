mod ledger;
mod memory;

pub use ledger::JsonlLedger;
pub use memory::InMemoryLedger;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cascades::{CostRecord, ModelTier, QueryHash};

pub const MAX_STORED_QUERY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt ledger line {line} in {file}: {message}")]
    Corrupt {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Could not acquire lock on {0}")]
    Locked(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// One answered query, as written to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: Uuid,
    pub query_hash: QueryHash,
    pub query_text: String,
    pub model_used: String,
    pub model_size: ModelTier,
    /// Seconds.
    pub response_time: f64,
    pub tokens_used: u64,
    pub cost: f64,
    pub confidence: f64,
    pub routing_reason: String,
    pub was_escalated: bool,
    pub timestamp: DateTime<Utc>,
}

impl QueryRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query_hash: QueryHash,
        query_text: &str,
        model_used: &str,
        model_size: ModelTier,
        response_time: f64,
        tokens_used: u64,
        cost: f64,
        confidence: f64,
        routing_reason: &str,
        was_escalated: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_hash,
            query_text: query_text.chars().take(MAX_STORED_QUERY_CHARS).collect(),
            model_used: model_used.to_string(),
            model_size,
            response_time,
            tokens_used,
            cost,
            confidence,
            routing_reason: routing_reason.to_string(),
            was_escalated,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRecord {
    pub id: Uuid,
    pub query_hash: QueryHash,
    pub actual_cost: f64,
    pub baseline_cost: f64,
    pub saved: f64,
    pub timestamp: DateTime<Utc>,
}

impl SavingsRecord {
    pub fn new(query_hash: QueryHash, cost: &CostRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_hash,
            actual_cost: cost.actual,
            baseline_cost: cost.baseline,
            saved: cost.saved,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only sink for finished queries and their savings.
#[async_trait]
pub trait QueryLedger: Send + Sync {
    async fn append(&self, query: QueryRecord, savings: SavingsRecord) -> LedgerResult<()>;

    async fn queries(&self) -> LedgerResult<Vec<QueryRecord>>;

    async fn savings(&self) -> LedgerResult<Vec<SavingsRecord>>;
}
