//! Error types for feature building.

use thiserror::Error;

/// Reasons a feature space cannot be defined for a corpus.
///
/// Both variants are fatal at startup: there is nothing to compare movies
/// against, so no recommender can be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    /// The corpus has no records
    #[error("cannot build a feature space from an empty corpus")]
    EmptyCorpus,

    /// No term survived tokenization in any document
    #[error("feature space is degenerate: no terms found across {documents} documents")]
    DegenerateFeatureSpace { documents: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FeatureError>;
