use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LedgerResult, QueryLedger, QueryRecord, SavingsRecord};

/// Ledger kept in process memory. Used by mock runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    queries: Mutex<Vec<QueryRecord>>,
    savings: Mutex<Vec<SavingsRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryLedger for InMemoryLedger {
    async fn append(&self, query: QueryRecord, savings: SavingsRecord) -> LedgerResult<()> {
        self.queries.lock().await.push(query);
        self.savings.lock().await.push(savings);
        Ok(())
    }

    async fn queries(&self) -> LedgerResult<Vec<QueryRecord>> {
        Ok(self.queries.lock().await.clone())
    }

    async fn savings(&self) -> LedgerResult<Vec<SavingsRecord>> {
        Ok(self.savings.lock().await.clone())
    }
}
