//! # Similarity Crate
//!
//! Pairwise movie similarity and nearest-neighbor queries.
//!
//! ## Components
//!
//! - **matrix**: cosine similarity over TF-IDF rows, dense `n x n` matrix
//! - **row_index**: explicit movie id <-> row mapping stored with the matrix
//! - **engine**: `EngineBuilder` (unbuilt) -> `SimilarityEngine` (ready)
//! - **error**: configuration / not-found / invalid-argument taxonomy
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::EngineBuilder;
//! use std::sync::Arc;
//!
//! let engine = EngineBuilder::new(Arc::new(corpus)).build()?;
//! for rec in engine.recommend("The Matrix", 10)? {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! ```
//!
//! The ready engine is immutable. Any number of threads may query it at
//! once through an `Arc` without locking.

pub mod engine;
pub mod error;
pub mod matrix;
pub mod row_index;

// Re-export commonly used types
pub use engine::{
    build, recommend, validate_top_n, EngineBuilder, Recommendation, SimilarityEngine,
};
pub use error::{EngineError, Result};
pub use matrix::{cosine_similarity, SimilarityMatrix};
pub use row_index::RowIndex;
