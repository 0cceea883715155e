//! Lexical phrase index.
//!
//! The index holds every example phrase of every intent in a single
//! [`aho_corasick`] automaton, so one pass over the input finds all phrase
//! hits regardless of how many intents are registered.  Both phrases and
//! input are expected in normalized form (see [`crate::embedding::normalize`]):
//! lowercase tokens separated by single spaces.  A hit only counts when it
//! starts and ends on a token boundary, so `"hi"` does not fire inside
//! `"this"`.
//!
//! # Example
//!
//! ```rust
//! # use jar_kernel::matcher::PhraseMatcher;
//! let matcher = PhraseMatcher::build([
//!     ("chat".to_owned(), "hello".to_owned()),
//!     ("weather".to_owned(), "what's the weather".to_owned()),
//! ])
//! .unwrap();
//!
//! let hits = matcher.matches("hello there");
//! assert!(hits.contains("chat"));
//! assert!(!hits.contains("weather"));
//! ```

use std::collections::{BTreeMap, HashSet};

use aho_corasick::{AhoCorasick, MatchKind};

use crate::error::{KernelError, Result};

/// Case-insensitive, token-aligned phrase matcher keyed by intent name.
#[derive(Debug, Clone, Default)]
pub struct PhraseMatcher {
    /// Unique phrases, index-aligned with the automaton's pattern IDs.
    phrases: Vec<String>,

    /// The keys (intent names) that registered each phrase.
    owners: Vec<Vec<String>>,

    /// `None` when no phrases are registered.
    automaton: Option<AhoCorasick>,
}

impl PhraseMatcher {
    /// An index that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(key, normalized phrase)` pairs.
    ///
    /// Empty phrases are ignored.  A phrase registered under several keys is
    /// stored once and reports every key on a hit.
    pub fn build<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, phrase) in entries {
            if phrase.is_empty() {
                continue;
            }
            let owners = grouped.entry(phrase).or_default();
            if !owners.contains(&key) {
                owners.push(key);
            }
        }

        if grouped.is_empty() {
            return Ok(Self::new());
        }

        let (phrases, owners): (Vec<String>, Vec<Vec<String>>) = grouped.into_iter().unzip();

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(true)
            .build(&phrases)
            .map_err(|e| KernelError::MatcherBuildError {
                reason: e.to_string(),
            })?;

        tracing::trace!(count = phrases.len(), "phrase automaton rebuilt");

        Ok(Self {
            phrases,
            owners,
            automaton: Some(automaton),
        })
    }

    /// Return the set of keys with at least one token-aligned phrase inside
    /// `normalized`.
    pub fn matches(&self, normalized: &str) -> HashSet<String> {
        let mut hits = HashSet::new();

        let Some(ac) = self.automaton.as_ref() else {
            return hits;
        };

        let bytes = normalized.as_bytes();

        for mat in ac.find_overlapping_iter(normalized) {
            let starts_on_boundary = mat.start() == 0 || bytes[mat.start() - 1] == b' ';
            let ends_on_boundary = mat.end() == bytes.len() || bytes[mat.end()] == b' ';
            if !(starts_on_boundary && ends_on_boundary) {
                continue;
            }

            for key in &self.owners[mat.pattern().as_usize()] {
                hits.insert(key.clone());
            }
        }

        hits
    }

    /// Number of unique phrases in the index.
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, phrase: &str) -> (String, String) {
        (key.to_owned(), phrase.to_owned())
    }

    #[test]
    fn empty_index_matches_nothing() {
        let matcher = PhraseMatcher::build(Vec::new()).unwrap();
        assert!(matcher.is_empty());
        assert!(matcher.matches("hello").is_empty());
    }

    #[test]
    fn matches_phrase_inside_input() {
        let matcher = PhraseMatcher::build([entry("timer", "set a timer")]).unwrap();
        let hits = matcher.matches("please set a timer for ten minutes");
        assert!(hits.contains("timer"));
    }

    #[test]
    fn rejects_partial_token_matches() {
        let matcher = PhraseMatcher::build([entry("chat", "hi")]).unwrap();
        assert!(matcher.matches("this is it").is_empty());
        assert!(matcher.matches("hit me").is_empty());
        assert!(matcher.matches("oh hi").contains("chat"));
    }

    #[test]
    fn boundary_hit_found_after_unaligned_occurrence() {
        let matcher = PhraseMatcher::build([entry("chat", "hi")]).unwrap();
        assert!(matcher.matches("this hi").contains("chat"));
    }

    #[test]
    fn shared_phrase_reports_every_owner() {
        let matcher =
            PhraseMatcher::build([entry("a", "help"), entry("b", "help"), entry("a", "help")])
                .unwrap();
        assert_eq!(matcher.phrase_count(), 1);

        let hits = matcher.matches("help");
        assert_eq!(hits.len(), 2);
        assert!(hits.contains("a") && hits.contains("b"));
    }

    #[test]
    fn case_insensitive() {
        let matcher = PhraseMatcher::build([entry("chat", "hello")]).unwrap();
        assert!(matcher.matches("HELLO").contains("chat"));
    }

    #[test]
    fn empty_phrases_are_skipped() {
        let matcher = PhraseMatcher::build([entry("blank", "")]).unwrap();
        assert!(matcher.is_empty());
    }
}
