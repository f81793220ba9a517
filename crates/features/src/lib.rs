//! Feature building for content-based recommendations.
//!
//! This crate maps each movie to a TF-IDF weighted term vector:
//! - tokenizer: content document (overview + genres) -> normalised terms
//! - tfidf: vocabulary fitting, IDF weighting, sparse L2-normalised rows
//! - config: vocabulary construction rules
//!
//! ## Example Usage
//! ```ignore
//! use features::{build_features, FeatureConfig};
//!
//! let (model, matrix) = build_features(corpus.movies(), &FeatureConfig::default())?;
//! assert_eq!(matrix.len(), corpus.len());
//! ```
//!
//! Output is deterministic: the vocabulary is ordered lexicographically and
//! rows keep corpus order.

pub mod config;
pub mod error;
pub mod tokenizer;
pub mod tfidf;

// Re-export main types
pub use config::FeatureConfig;
pub use error::{FeatureError, Result};
pub use tfidf::{build_features, FeatureMatrix, FeatureModel, FeatureVector, TermId};
