//! CLI entry point for Jar.
//!
//! This binary provides the `jar` command: an interactive assistant REPL
//! plus diagnostic subcommands for inspecting intents and routing.

mod builtins;
mod cli;
mod commands;
mod helpers;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use jar_kernel::JarConfig;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::helpers::{QUIET_LEVEL, VERBOSE_LEVEL, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(if cli.verbose { VERBOSE_LEVEL } else { QUIET_LEVEL });

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let config = JarConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    info!(name = %config.assistant.name, "starting Jar");

    let assistant = builtins::build_assistant(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => repl::cmd_run(assistant).await,
        Commands::Intents => {
            commands::cmd_intents(&assistant);
            Ok(())
        }
        Commands::Route { text } => {
            commands::cmd_route(&assistant, &text.join(" "));
            Ok(())
        }
    }
}
