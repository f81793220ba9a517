//! Vocabulary construction settings.

/// Rules that decide which tokens become feature-space terms.
///
/// Two builds over the same corpus with equal configs produce identical
/// feature matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Shortest token (in characters) kept as a term
    pub min_term_len: usize,
    /// Drop common English function words
    pub stop_words: bool,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self {
            min_term_len: 2,
            stop_words: true,
            min_df: 1,
        }
    }

    /// Configure the minimum term length (default: 2)
    ///
    /// Values below 1 are treated as 1.
    pub fn with_min_term_len(mut self, len: usize) -> Self {
        self.min_term_len = len.max(1);
        self
    }

    /// Enable or disable stop-word removal (default: enabled)
    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    /// Configure the minimum document frequency (default: 1)
    ///
    /// Values below 1 are treated as 1.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::new()
    }
}
