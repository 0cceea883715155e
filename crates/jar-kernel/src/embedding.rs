//! Text embeddings and similarity.
//!
//! The router only depends on the [`EmbeddingProvider`] trait.  The default
//! implementation, [`HashingEmbedder`], maps word tokens and character
//! trigrams into a fixed number of buckets (feature hashing) and compares
//! L2-normalized vectors with cosine similarity.  It needs no model files and
//! is fully deterministic, which keeps routing reproducible across runs.
//!
//! # Example
//!
//! ```rust
//! # use jar_kernel::embedding::{EmbeddingProvider, HashingEmbedder};
//! let embedder = HashingEmbedder::new();
//! let a = embedder.embed("what's the weather").unwrap();
//! let b = embedder.embed("What's the weather?").unwrap();
//! assert!((embedder.similarity(&a, &b) - 1.0).abs() < 1e-6);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{KernelError, Result};

/// Default number of hash buckets produced by [`HashingEmbedder`].
pub const EMBEDDING_DIM: usize = 256;

/// Relative weight of a character trigram compared to a whole word.
const TRIGRAM_WEIGHT: f64 = 0.5;

/// Distance from 1.0 below which a similarity is reported as exactly 1.0.
const UNIT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

/// An L2-normalized text vector.
///
/// An embedding with no components (or only zeros) is *empty*: it carries no
/// semantic signal and the router skips it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embedding {
    vector: Vec<f64>,
}

impl Embedding {
    /// Build an embedding from raw components, normalizing to unit length.
    ///
    /// A zero vector becomes [`Embedding::empty`].
    pub fn new(vector: Vec<f64>) -> Self {
        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();

        if norm == 0.0 || !norm.is_finite() {
            return Self::empty();
        }

        Self {
            vector: vector.into_iter().map(|v| v / norm).collect(),
        }
    }

    /// An embedding with no semantic content.
    pub fn empty() -> Self {
        Self { vector: Vec::new() }
    }

    /// Whether this embedding carries no signal.
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Number of dimensions (0 for an empty embedding).
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.vector
    }

    /// Cosine similarity of two normalized vectors, clamped to `[0, 1]`.
    ///
    /// Returns 0.0 when either side is empty or the dimensions differ.
    /// Values within rounding error of 1.0 are reported as exactly 1.0.
    pub fn cosine(&self, other: &Embedding) -> f64 {
        if self.is_empty() || other.is_empty() || self.dimensions() != other.dimensions() {
            return 0.0;
        }

        let dot: f64 = self
            .vector
            .iter()
            .zip(&other.vector)
            .map(|(a, b)| a * b)
            .sum();

        if (1.0 - dot).abs() < UNIT_TOLERANCE {
            return 1.0;
        }
        dot.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Converts text into vectors and compares them.
///
/// Implementations must tolerate empty and very short text: such input should
/// produce [`Embedding::empty`] rather than an error.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Similarity between two embeddings in `[0, 1]`.
    fn similarity(&self, a: &Embedding, b: &Embedding) -> f64 {
        a.cosine(b)
    }

    /// Canonical form of `text` used to build and query the phrase index.
    fn make_pattern(&self, text: &str) -> String {
        normalize(text)
    }
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Split text into lowercased tokens.
///
/// Tokens are whitespace-separated with leading and trailing punctuation
/// removed; inner apostrophes and hyphens survive (`"what's"` stays whole).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tokens re-joined by single spaces.  Phrase matching runs on this form so
/// that token boundaries are exactly the space characters.
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

// ---------------------------------------------------------------------------
// HashingEmbedder
// ---------------------------------------------------------------------------

/// Feature-hashing embedder over words and character trigrams.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder with [`EMBEDDING_DIM`] buckets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimensions: EMBEDDING_DIM,
        }
    }

    /// Create an embedder with a custom bucket count.
    ///
    /// Returns an error for a zero dimension.
    pub fn with_dimensions(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(KernelError::ConfigError {
                reason: "embedding dimension must be positive".into(),
            });
        }
        Ok(Self { dimensions })
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() % self.dimensions as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(Embedding::empty());
        }

        let mut vector = vec![0.0f64; self.dimensions];

        for token in &tokens {
            vector[self.bucket(&format!("w:{token}"))] += 1.0;

            let padded: Vec<char> = format!("^{token}$").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&format!("c:{trigram}"))] += TRIGRAM_WEIGHT;
            }
        }

        Ok(Embedding::new(vector))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_punctuation_and_case() {
        assert_eq!(
            tokenize("  Hello, WORLD!  what's up?"),
            vec!["hello", "world", "what's", "up"]
        );
    }

    #[test]
    fn tokenize_drops_pure_punctuation() {
        assert!(tokenize("?! ... --").is_empty());
    }

    #[test]
    fn identical_text_has_unit_similarity() {
        let embedder = HashingEmbedder::new();
        for text in ["hi", "talk to jarvis", "what's the weather"] {
            let a = embedder.embed(text).unwrap();
            let b = embedder.embed(text).unwrap();
            let sim = embedder.similarity(&a, &b);
            assert!((sim - 1.0).abs() < 1e-6, "{text}: {sim}");
        }
    }

    #[test]
    fn self_similarity_is_exactly_one() {
        let embedder = HashingEmbedder::new();
        for text in [
            "what's the weather",
            "let's talk",
            "talk to jarvis",
            "set a timer for ten minutes",
        ] {
            let e = embedder.embed(text).unwrap();
            assert_eq!(embedder.similarity(&e, &e), 1.0, "{text}");
        }
    }

    #[test]
    fn empty_text_yields_empty_embedding() {
        let embedder = HashingEmbedder::new();
        let e = embedder.embed("   ").unwrap();
        assert!(e.is_empty());

        let other = embedder.embed("hello").unwrap();
        assert_eq!(embedder.similarity(&e, &other), 0.0);
    }

    #[test]
    fn related_text_scores_above_unrelated() {
        let embedder = HashingEmbedder::new();
        let query = embedder.embed("what is the weather today").unwrap();
        let weather = embedder.embed("what's the weather").unwrap();
        let greeting = embedder.embed("hello").unwrap();

        assert!(embedder.similarity(&query, &weather) > embedder.similarity(&query, &greeting));
    }

    #[test]
    fn similarity_is_bounded() {
        let embedder = HashingEmbedder::with_dimensions(8).unwrap();
        let a = embedder.embed("the quick brown fox").unwrap();
        let b = embedder.embed("jumps over the lazy dog").unwrap();
        let sim = embedder.similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(HashingEmbedder::with_dimensions(0).is_err());
    }

    #[test]
    fn make_pattern_normalizes() {
        let embedder = HashingEmbedder::new();
        assert_eq!(embedder.make_pattern("Talk   to JARVIS."), "talk to jarvis");
    }
}
