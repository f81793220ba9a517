//! Server crate for the movie recommender.
//!
//! This crate contains the `MovieService` context object that front ends
//! (the CLI, or an HTTP layer) hold for the lifetime of the process, plus
//! the serializable response shapes it returns.

pub mod service;
pub mod summary;

pub use service::{
    MovieService, DEFAULT_RECOMMENDATIONS, DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_LIMIT,
};
pub use summary::{MovieSummary, RecommendationResponse, RecommendedMovie};
