//! Intent registry.
//!
//! The registry owns the authoritative, insertion-ordered list of intents and
//! the structures derived from it:
//!
//! - an embedding cache keyed by `(intent name, example phrase)`, filled at
//!   registration time;
//! - the [`PhraseMatcher`] over all example phrases, rebuilt in full by
//!   [`IntentRegistry::rebuild_matchers`].
//!
//! Names are not deduplicated.  A second intent with an existing name is
//! kept alongside the first (with a warning); name lookups such as
//! [`IntentRegistry::find`] return the earliest registration.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::intent::Intent;
use crate::matcher::PhraseMatcher;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered intents plus their cached embeddings and phrase index.
pub struct IntentRegistry {
    embedder: Arc<dyn EmbeddingProvider>,

    /// Registered intents in registration order.
    intents: Vec<Intent>,

    /// `(intent name, example) -> embedding`.
    example_embeddings: HashMap<(String, String), Embedding>,

    /// Lexical index over all examples.
    matcher: PhraseMatcher,
}

impl IntentRegistry {
    /// Create an empty registry that embeds with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            intents: Vec::new(),
            example_embeddings: HashMap::new(),
            matcher: PhraseMatcher::new(),
        }
    }

    /// Append an intent and cache the embedding of each of its examples.
    ///
    /// An example the provider cannot embed is cached as an empty embedding
    /// and contributes no semantic signal.
    pub fn register(&mut self, intent: Intent) {
        if let Some(existing) = self.find(intent.name()) {
            warn!(
                intent = %intent.name(),
                plugin = %intent.plugin(),
                existing_plugin = %existing.plugin(),
                "duplicate intent name registered; earlier registration wins name lookups"
            );
        }

        for example in intent.examples() {
            let key = (intent.name().to_owned(), example.clone());
            if self.example_embeddings.contains_key(&key) {
                continue;
            }

            let embedding = match self.embedder.embed(example) {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        intent = %intent.name(),
                        example = %example,
                        error = %e,
                        "failed to embed example; treating as empty"
                    );
                    Embedding::empty()
                }
            };
            self.example_embeddings.insert(key, embedding);
        }

        debug!(
            intent = %intent.name(),
            plugin = %intent.plugin(),
            examples = intent.examples().len(),
            "intent registered"
        );

        self.intents.push(intent);
    }

    /// Rebuild the phrase index from the current intent list.
    ///
    /// The new index replaces the old one in a single assignment.  If the
    /// automaton cannot be built the registry is left with an empty index
    /// and routing continues on semantic scores alone.
    pub fn rebuild_matchers(&mut self) {
        let entries = self.intents.iter().flat_map(|intent| {
            intent.examples().iter().map(|example| {
                (
                    intent.name().to_owned(),
                    self.embedder.make_pattern(example),
                )
            })
        });

        self.matcher = match PhraseMatcher::build(entries) {
            Ok(matcher) => matcher,
            Err(e) => {
                error!(error = %e, "failed to build phrase index");
                PhraseMatcher::new()
            }
        };

        trace!(
            intents = self.intents.len(),
            phrases = self.matcher.phrase_count(),
            "matchers rebuilt"
        );
    }

    /// Drop every intent, cached embedding and the phrase index.
    pub fn clear(&mut self) {
        self.intents.clear();
        self.example_embeddings.clear();
        self.matcher = PhraseMatcher::new();
    }

    /// Registered intents in registration order.
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    /// The first intent registered under `name`.
    pub fn find(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name() == name)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Cached embedding for one example of one intent.
    pub fn example_embedding(&self, intent: &str, example: &str) -> Option<&Embedding> {
        self.example_embeddings
            .get(&(intent.to_owned(), example.to_owned()))
    }

    /// Names of intents with a phrase hit inside `text`.
    pub fn phrase_hits(&self, text: &str) -> HashSet<String> {
        self.matcher.matches(&self.embedder.make_pattern(text))
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
