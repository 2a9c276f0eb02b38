use anyhow::Result;
use cascade_learn::{
    cli::{
        Cli, Commands, build_engine, handle_config, handle_demo, handle_models, handle_query,
        handle_stats,
    },
    config::AppConfig,
    console::{VerbosityLevel, init_console},
};
use clap::Parser;

fn init_tracing(verbosity: VerbosityLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cascade_learn={},warn", verbosity.log_filter()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_default();

    let effective_verbosity = cli.get_effective_verbosity(config.get_verbosity());
    init_console(effective_verbosity);
    init_tracing(effective_verbosity);

    match cli.command {
        Commands::Query { query, force } => {
            let engine = build_engine(&config, cli.backend.as_deref())?;
            handle_query(&engine, &query, force.as_deref()).await?;
        }
        Commands::Stats => {
            let engine = build_engine(&config, cli.backend.as_deref())?;
            handle_stats(&engine).await?;
        }
        Commands::Models => {
            handle_models(&config.tier_table()?);
        }
        Commands::Demo => {
            let engine = build_engine(&config, cli.backend.as_deref())?;
            handle_demo(&engine).await?;
        }
        Commands::Config { action } => {
            handle_config(action)?;
        }
    }

    Ok(())
}
