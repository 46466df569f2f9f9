//! Silo - chunked conversation history storage
//!
//! Main entry point for the Silo CLI.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use silo::cli::{Cli, Commands};
use silo::commands;
use silo::config::Config;
use silo::metrics::init_metrics_exporter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);
    init_metrics_exporter();

    let config_path = cli.config.as_deref().unwrap_or("config/silo.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    match cli.command {
        Commands::Append {
            session,
            user,
            role,
            attachments,
            content,
        } => {
            tracing::debug!("Appending to session {}", session);
            commands::append::handle_append(config, session, user, role, content, attachments)
        }
        Commands::Show { session } => {
            tracing::debug!("Showing session {}", session);
            commands::history::handle_show(config, session)
        }
        Commands::Tail { session, count } => {
            tracing::debug!("Tailing {} messages of session {}", count, session);
            commands::history::handle_tail(config, session, count)
        }
        Commands::Page {
            session,
            offset,
            limit,
        } => {
            tracing::debug!(
                "Paging session {} (offset {}, limit {})",
                session,
                offset,
                limit
            );
            commands::history::handle_page(config, session, offset, limit)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "silo=debug" } else { "silo=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
