use crate::vocabulary::Vocabulary;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Source of randomness for stimulus sampling and challenge operands
pub trait RandomSource {
    /// Draw `n` distinct tokens in random order.
    fn sample(&mut self, tokens: &[String], n: usize) -> Vec<String>;

    /// Uniform integer in `low..=high`.
    fn range(&mut self, low: i64, high: i64) -> i64;
}

/// RandomSource backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<ThreadRng> {
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn sample(&mut self, tokens: &[String], n: usize) -> Vec<String> {
        let n = n.min(tokens.len());
        // index::sample shuffles its output, so the draw order is random too
        rand::seq::index::sample(&mut self.rng, tokens.len(), n)
            .into_iter()
            .map(|i| tokens[i].clone())
            .collect()
    }

    fn range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StimulusError {
    #[error("cannot draw {requested} items from {vocabulary} ({available} available)")]
    TooMany {
        requested: usize,
        available: usize,
        vocabulary: String,
    },
    #[error("a stimulus needs at least one item")]
    Empty,
}

/// The ordered tokens shown to the user for one round
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    tokens: Vec<String>,
}

impl Stimulus {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Draw `count` distinct tokens from `vocab`.
pub fn generate_stimulus(
    vocab: &Vocabulary,
    count: usize,
    rng: &mut dyn RandomSource,
) -> Result<Stimulus, StimulusError> {
    if count == 0 {
        return Err(StimulusError::Empty);
    }
    if count > vocab.len() {
        return Err(StimulusError::TooMany {
            requested: count,
            available: vocab.len(),
            vocabulary: vocab.name().to_string(),
        });
    }

    let tokens = rng.sample(vocab.tokens(), count);
    tracing::debug!(count, vocabulary = vocab.name(), "generated stimulus");
    Ok(Stimulus { tokens })
}
