//! Error taxonomy of the recommendation engine.
//!
//! - `Configuration`: the engine cannot be built (fatal at startup)
//! - `NotFound` / `NotFoundId`: a query names no movie (caller maps to 404)
//! - `InvalidArgument`: malformed query parameters
//!
//! All operations are deterministic and in-memory, so nothing here is
//! retryable: the same input always produces the same error.

use data_loader::MovieId;
use features::FeatureError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Corpus empty, feature space degenerate, or inputs out of sync
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No movie carries this title
    #[error("Movie '{title}' not found")]
    NotFound { title: String },

    /// No movie carries this id
    #[error("Movie with id {id} not found")]
    NotFoundId { id: MovieId },

    /// Query parameters are malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    /// Whether this is a not-found condition (either lookup kind)
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. } | EngineError::NotFoundId { .. })
    }
}

impl From<FeatureError> for EngineError {
    fn from(err: FeatureError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
