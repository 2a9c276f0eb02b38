use crate::console::VerbosityLevel;
use clap::{Parser, Subcommand};

mod cascade;
mod config;

pub use cascade::{DEMO_QUERIES, build_engine, handle_demo, handle_models, handle_query, handle_stats};
pub use config::handle_config;

#[derive(Parser)]
#[command(author, version, about = "Route queries to the cheapest model tier that can answer them")]
pub struct Cli {
    /// Increase verbosity (-v verbose, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode - only show errors and answers
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Inference backend (huggingface or mock)
    #[arg(short, long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a single query
    Query {
        query: String,
        /// Skip routing and use this tier (tiny, medium, large)
        #[arg(short, long)]
        force: Option<String>,
    },
    /// Show cost and routing statistics from the ledger
    Stats,
    /// List the model tiers
    Models,
    /// Run a fixed set of sample queries
    Demo,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

impl Cli {
    pub fn get_verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else {
            match self.verbose {
                0 => VerbosityLevel::Normal,
                1 => VerbosityLevel::Verbose,
                _ => VerbosityLevel::Debug,
            }
        }
    }

    pub fn get_effective_verbosity(&self, config_verbosity: VerbosityLevel) -> VerbosityLevel {
        if self.quiet || self.verbose > 0 {
            self.get_verbosity()
        } else {
            config_verbosity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_with_force() {
        let cli = Cli::try_parse_from(["cascade", "query", "What is 2+2?", "--force", "large"])
            .unwrap();

        match cli.command {
            Commands::Query { query, force } => {
                assert_eq!(query, "What is 2+2?");
                assert_eq!(force.as_deref(), Some("large"));
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cascade", "demo", "--backend", "mock", "-vv"]).unwrap();

        assert_eq!(cli.backend.as_deref(), Some("mock"));
        assert_eq!(cli.get_verbosity(), VerbosityLevel::Debug);
    }

    #[test]
    fn test_cli_verbosity_overrides_config() {
        let cli = Cli::try_parse_from(["cascade", "-q", "stats"]).unwrap();
        assert_eq!(
            cli.get_effective_verbosity(VerbosityLevel::Debug),
            VerbosityLevel::Quiet
        );

        let cli = Cli::try_parse_from(["cascade", "models"]).unwrap();
        assert_eq!(
            cli.get_effective_verbosity(VerbosityLevel::Verbose),
            VerbosityLevel::Verbose
        );
    }

    #[test]
    fn test_config_set_parses() {
        let cli =
            Cli::try_parse_from(["cascade", "config", "set", "cache.capacity", "500"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Set { .. }
            }
        ));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cascade", "-q", "-v", "stats"]).is_err());
    }
}
