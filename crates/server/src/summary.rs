//! Response shapes handed to presentation layers.
//!
//! These mirror what the public API returns for a movie: ids, display
//! fields, the rating rounded to one decimal and the release year as text.

use data_loader::{MovieId, MovieRecord};
use serde::Serialize;

/// Display view of one movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    /// `vote_average` rounded to one decimal
    pub rating: f32,
    /// Four-digit year, or empty when unknown
    pub year: String,
    pub genres: Vec<String>,
}

impl From<&MovieRecord> for MovieSummary {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            rating: (movie.vote_average * 10.0).round() / 10.0,
            year: movie.year().map(|y| y.to_string()).unwrap_or_default(),
            genres: movie.genres.clone(),
        }
    }
}

/// A recommended movie with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedMovie {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub similarity: f32,
    /// Strongest terms shared with the queried movie
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_terms: Vec<String>,
}

/// Answer to a recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    /// Title as it was asked for
    pub movie: String,
    pub recommendations: Vec<RecommendedMovie>,
}
