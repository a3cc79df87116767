//! NODU - tutoring chat in the terminal
//!
#![doc = "Main entry point for the NODU tutoring client."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nodu::cli::{Cli, Commands};
use nodu::commands;
use nodu::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(&cli);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/nodu.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { tutor } => {
            if let Some(t) = &tutor {
                tracing::debug!("Using tutor override: {}", t);
            }
            commands::chat::run_chat(config, tutor).await?;
            Ok(())
        }
        Commands::Tutors { json } => {
            commands::tutors::list_tutors(json)?;
            Ok(())
        }
        Commands::History { json } => {
            tracing::info!("Fetching conversation history");
            commands::history::show_history(config, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the chat on stdout.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose { "nodu=debug" } else { "nodu=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
