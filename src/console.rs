use colored::Colorize;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::cascades::{AggregateStats, ModelTier, QueryOutcome, TierSpec};

/// Verbosity levels for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet = 0,
    /// Normal output (default)
    #[default]
    Normal = 1,
    /// Verbose output with additional info
    Verbose = 2,
    /// Debug output with detailed information
    Debug = 3,
}

impl VerbosityLevel {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbosityLevel::Quiet => write!(f, "quiet"),
            VerbosityLevel::Normal => write!(f, "normal"),
            VerbosityLevel::Verbose => write!(f, "verbose"),
            VerbosityLevel::Debug => write!(f, "debug"),
        }
    }
}

fn tier_label(tier: ModelTier) -> colored::ColoredString {
    match tier {
        ModelTier::Tiny => tier.as_str().green(),
        ModelTier::Medium => tier.as_str().yellow(),
        ModelTier::Large => tier.as_str().red(),
    }
}

#[derive(Debug, Clone)]
pub struct Console {
    verbosity: VerbosityLevel,
}

impl Console {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    fn should_show(&self, level: VerbosityLevel) -> bool {
        self.verbosity >= level
    }

    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    pub fn warning(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("⚠️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("✅ {}", message);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.should_show(VerbosityLevel::Verbose) {
            println!("{}", message);
        }
    }

    pub fn plain(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{}", message);
        }
    }

    pub fn newline(&self) {
        if self.should_show(VerbosityLevel::Normal) {
            println!();
        }
    }

    pub fn header(&self, title: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{}", title.bold());
        }
    }

    /// The answer itself is printed even in quiet mode.
    pub fn response(&self, outcome: &QueryOutcome) {
        println!("{}", outcome.response);
    }

    pub fn outcome_summary(&self, outcome: &QueryOutcome) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }

        let escalated = if outcome.escalated {
            format!(" (escalated from {})", outcome.decision.tier)
        } else {
            String::new()
        };
        println!(
            "{} {} [{}]{}",
            "⏺".dimmed(),
            outcome.model_name.cyan(),
            tier_label(outcome.tier_used),
            escalated.dimmed()
        );
        println!(
            "  {} cost ${:.6}, saved ${:.6}, {:.2}s, {} tokens",
            "⎿".dimmed(),
            outcome.cost.actual,
            outcome.cost.saved,
            outcome.response_time.as_secs_f64(),
            outcome.tokens
        );
        self.verbose(&format!(
            "  routing: {} (confidence {:.2})",
            outcome.decision.reason, outcome.decision.confidence
        ));
        if let Some(error) = &outcome.error {
            self.warning(&error.short_message());
        }
    }

    pub fn stats(&self, stats: &AggregateStats) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }

        self.header("📊 Cascade statistics");
        println!("  total queries:      {}", stats.total_queries);
        println!("  total cost:         ${:.4}", stats.total_cost);
        println!("  total saved:        ${:.4}", stats.total_saved);
        println!("  avg response time:  {:.2}s", stats.avg_response_time);
        println!("  savings:            {:.2}%", stats.savings_percentage);
        if !stats.model_distribution.is_empty() {
            println!("  model distribution:");
            for (tier, count) in &stats.model_distribution {
                println!("    {:<8} {}", tier_label(*tier), count);
            }
        }
    }

    pub fn tier(&self, spec: &TierSpec) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }

        println!(
            "  {:<8} {:<12} {:>5} params  ${:.4} / 1K tokens",
            tier_label(spec.tier),
            spec.name,
            spec.params,
            spec.cost_per_1k_tokens()
        );
        self.verbose(&format!(
            "           {} (max {} tokens, timeout {}s)",
            spec.model_id,
            spec.max_tokens,
            spec.timeout.as_secs()
        ));
    }
}

static GLOBAL_CONSOLE: OnceLock<Arc<Console>> = OnceLock::new();

pub fn init_console(verbosity: VerbosityLevel) {
    let _ = GLOBAL_CONSOLE.set(Arc::new(Console::new(verbosity)));
}

pub fn console() -> Arc<Console> {
    GLOBAL_CONSOLE
        .get_or_init(|| Arc::new(Console::default()))
        .clone()
}

impl Default for Console {
    fn default() -> Self {
        Self {
            verbosity: VerbosityLevel::Normal,
        }
    }
}
