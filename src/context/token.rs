//! Token estimation.

use unicode_normalization::UnicodeNormalization;

/// Maps text to an approximate cost unit. Must be deterministic and side-effect free.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Character-count heuristic for mixed-script text.
///
/// Text is NFC-normalized first so composed and decomposed forms cost the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.nfc().count() / self.chars_per_token
    }
}
