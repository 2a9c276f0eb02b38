pub mod backends;
pub mod cascades;
pub mod cli;
pub mod config;
pub mod console;
pub mod storage;

pub use backends::{InferenceBackend, InferenceResult, LlmError, MockBackend, ModelGateway};
pub use cascades::{
    AggregateStats, CascadeEngine, CascadeError, CascadeRouter, ModelTier, QueryOutcome,
    RouteDecision, TierTable,
};
pub use config::AppConfig;
pub use console::{Console, VerbosityLevel, console, init_console};
pub use storage::{InMemoryLedger, JsonlLedger, QueryLedger};
