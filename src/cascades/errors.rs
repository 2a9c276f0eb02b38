use thiserror::Error;

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("Unknown model tier: {0}. Expected one of: tiny, medium, large")]
    UnknownTier(String),

    #[error("Invalid cascade config: {0}")]
    InvalidConfig(String),

    #[error("Escalation already used for this query")]
    EscalationExhausted,

    #[error("Ledger error: {0}")]
    Ledger(#[from] crate::storage::LedgerError),
}

pub type CascadeResult<T> = Result<T, CascadeError>;
