//! Subcommand: `jar run` -- interactive REPL.

use std::io::{self, Write as _};

use anyhow::Result;
use jar_kernel::Assistant;
use tracing::{error, info};

/// Reply printed when a handler fails.
const HANDLER_FAILED: &str = "Something went wrong while handling that request.";

/// What a line of REPL input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    Empty,
    Quit,
    Reload,
    Input(&'a str),
}

/// Classify one raw input line.
pub fn classify_line(raw: &str) -> Line<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Line::Empty;
    }
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return Line::Quit;
    }
    if trimmed == ":reload" {
        return Line::Reload;
    }
    Line::Input(trimmed)
}

/// Run the interactive REPL until `exit`, `quit` or EOF.
pub async fn cmd_run(mut assistant: Assistant) -> Result<()> {
    let name = assistant.name().to_owned();

    report_plugin_errors(&assistant);

    println!("{name}: Hi - I'm {name}, your personal AI assistant. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        print!("You: ");
        io::stdout().flush().ok();

        line_buf.clear();
        match stdin.read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                println!("{name}: Goodbye.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        match classify_line(&line_buf) {
            Line::Empty => continue,
            Line::Quit => {
                info!("user requested exit");
                println!("{name}: Goodbye.");
                break;
            }
            Line::Reload => {
                assistant.discover();
                println!("{name}: Reloaded {} intents.", assistant.intents().len());
                report_plugin_errors(&assistant);
            }
            Line::Input(text) => match assistant.handle(text).await {
                Ok(Some(reply)) => println!("{name}: {reply}"),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "handler failed");
                    println!("{name}: {HANDLER_FAILED}");
                }
            },
        }
    }

    Ok(())
}

/// Print every recorded plugin load failure as a warning.
pub fn report_plugin_errors(assistant: &Assistant) {
    for (plugin, reason) in assistant.plugin_errors() {
        eprintln!("  warning: plugin `{plugin}` failed to load: {reason}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
