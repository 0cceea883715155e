//! Hybrid lexical + semantic intent router.
//!
//! Every registered intent is scored against the input:
//!
//! | Component | Value | Weight |
//! |-----------|-------|--------|
//! | semantic  | max similarity between the input and the intent's examples | 0.6 |
//! | lexical   | 1.0 if an example phrase occurs in the input, else 0.0 | 0.4 |
//!
//! The highest blended score wins; on an exact tie the intent registered
//! first wins.  The router never fails as a whole: an intent whose score
//! cannot be computed is kept with a score of 0.0 and the failure is logged
//! and written into its `reason`.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::embedding::Embedding;
use crate::error::{KernelError, Result};
use crate::intent::{Intent, IntentMatch};
use crate::registry::IntentRegistry;

/// Weight of the semantic component in the blended score.
pub const SEMANTIC_WEIGHT: f64 = 0.6;

/// Weight of the lexical phrase hit in the blended score.
pub const LEXICAL_WEIGHT: f64 = 0.4;

/// Scores inputs against the intents of one registry.
pub struct Router<'a> {
    registry: &'a IntentRegistry,
}

impl<'a> Router<'a> {
    pub fn new(registry: &'a IntentRegistry) -> Self {
        Self { registry }
    }

    /// Return the best-scoring intent, or `None` if none are registered.
    pub fn route(&self, text: &str) -> Option<IntentMatch> {
        let mut best: Option<IntentMatch> = None;

        for candidate in self.score_all(text) {
            if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        if let Some(ref m) = best {
            debug!(
                text = %text,
                intent = %m.intent.name(),
                score = m.score,
                reason = %m.reason,
                "routed"
            );
        }

        best
    }

    /// Score every registered intent, in registry order.
    pub fn score_all(&self, text: &str) -> Vec<IntentMatch> {
        let embedder = self.registry.embedder();

        let input = match embedder.embed(text) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "failed to embed input; semantic scores degraded to 0");
                None
            }
        };

        let hits = self.registry.phrase_hits(text);

        self.registry
            .intents()
            .iter()
            .map(|intent| match self.score_intent(intent, input.as_ref(), &hits) {
                Ok((semantic, lexical)) => {
                    let score = (SEMANTIC_WEIGHT * semantic + LEXICAL_WEIGHT * lexical)
                        .clamp(0.0, 1.0);
                    IntentMatch {
                        intent: intent.clone(),
                        score,
                        semantic,
                        lexical,
                        reason: format!("sim={semantic:.2}, phrase={lexical:.1}"),
                    }
                }
                Err(e) => {
                    warn!(intent = %intent.name(), error = %e, "intent scoring failed");
                    IntentMatch {
                        intent: intent.clone(),
                        score: 0.0,
                        semantic: 0.0,
                        lexical: 0.0,
                        reason: format!("scoring failed: {e}"),
                    }
                }
            })
            .collect()
    }

    /// Compute `(semantic, lexical)` for a single intent.
    fn score_intent(
        &self,
        intent: &Intent,
        input: Option<&Embedding>,
        hits: &HashSet<String>,
    ) -> Result<(f64, f64)> {
        let lexical = if hits.contains(intent.name()) { 1.0 } else { 0.0 };

        let Some(input) = input else {
            return Ok((0.0, lexical));
        };

        let embedder = self.registry.embedder();
        let mut semantic: f64 = 0.0;

        for example in intent.examples() {
            let cached = self
                .registry
                .example_embedding(intent.name(), example)
                .ok_or_else(|| KernelError::MissingEmbedding {
                    intent: intent.name().to_owned(),
                    example: example.clone(),
                })?;

            if cached.is_empty() {
                continue;
            }

            let sim = embedder.similarity(input, cached);
            if !sim.is_finite() {
                return Err(KernelError::InvalidScore {
                    intent: intent.name().to_owned(),
                });
            }
            semantic = semantic.max(sim.clamp(0.0, 1.0));
        }

        Ok((semantic, lexical))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
