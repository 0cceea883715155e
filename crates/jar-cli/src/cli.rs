//! CLI argument definitions for Jar.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Jar -- a plugin-driven personal assistant.
#[derive(Parser)]
#[command(
    name = "jar",
    version,
    about = "Jar -- plugin-driven personal assistant",
    long_about = "Routes what you type to the best matching plugin intent, falling back \
                  to free-form chat when nothing matches confidently."
)]
pub struct Cli {
    /// Log at `info` instead of `warn` (RUST_LOG still takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Configuration file.
    #[arg(long, global = true, default_value = jar_kernel::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive assistant (default).
    Run,

    /// List registered intents and plugin load errors.
    Intents,

    /// Show how a line of input would be routed, without running a handler.
    Route {
        /// The input to route.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}
