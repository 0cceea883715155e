//! Model output cleaning.
//!
//! Reasoning models leak scratchpad text.  The cleaner strips
//! `<think>...</think>` blocks (case-insensitive, spanning lines) and keeps
//! only what follows a final-answer marker when one is present.

use regex::Regex;

use crate::error::Result;

/// Markers are applied in this order; each keeps the text after its last
/// occurrence.
pub const FINAL_MARKERS: [&str; 4] = ["FINAL ANSWER:", "Final Answer:", "FINAL:", "Final:"];

/// Strips reasoning artifacts from completions.
#[derive(Debug, Clone)]
pub struct OutputCleaner {
    think: Regex,
}

impl OutputCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            think: Regex::new(r"(?is)<think>.*?</think>")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let mut out = self.think.replace_all(trimmed, "").trim().to_owned();

        for marker in FINAL_MARKERS {
            if let Some((_, tail)) = out.rsplit_once(marker) {
                out = tail.trim().to_owned();
            }
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
