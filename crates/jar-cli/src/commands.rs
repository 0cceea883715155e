//! Subcommands: `jar intents` and `jar route`.

use jar_kernel::{Assistant, Decision, IntentMatch};

use crate::helpers::quoted_list;

/// List registered intents and plugin errors.
pub fn cmd_intents(assistant: &Assistant) {
    let intents = assistant.intents();
    if intents.is_empty() {
        println!("No intents registered.");
    }

    for intent in intents {
        println!(
            "{:<16} plugin={:<12} threshold={:.2}",
            intent.name(),
            intent.plugin(),
            intent.threshold()
        );
        if !intent.description().is_empty() {
            println!("    {}", intent.description());
        }
        println!("    examples: {}", quoted_list(intent.examples()));
    }

    let errors = assistant.plugin_errors();
    if !errors.is_empty() {
        println!();
        println!("Plugin errors:");
        for (plugin, reason) in errors {
            println!("  {plugin}: {reason}");
        }
    }
}

/// Print every intent's score for `text` and the resulting decision.
pub fn cmd_route(assistant: &Assistant, text: &str) {
    let mut scores = assistant.score_all(text);
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("Input: {text:?}");
    for m in &scores {
        println!("  {}", format_match(m));
    }

    println!("Decision: {}", describe(&assistant.decide(text)));
}

fn format_match(m: &IntentMatch) -> String {
    format!("{:<16} score={:.3} ({})", m.intent.name(), m.score, m.reason)
}

/// One-line summary of a routing decision.
pub fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Matched(m) => format!("dispatch to `{}` (score {:.3})", m.intent.name(), m.score),
        Decision::Fallback { intent, rejected } => match rejected {
            Some(m) => format!(
                "fall back to `{}` (best was `{}` at {:.3})",
                intent.name(),
                m.intent.name(),
                m.score
            ),
            None => format!("fall back to `{}`", intent.name()),
        },
        Decision::NotUnderstood { .. } => "not understood".to_owned(),
    }
}
