//! # Movie Service
//!
//! The one context object a front end needs. It is built once at startup:
//! 1. Take the loaded corpus
//! 2. Build the similarity engine (features + pairwise matrix)
//! 3. Cache the sorted genre list
//!
//! After that it is immutable. Share it through an `Arc` and call any query
//! from any number of threads.
//!
//! Besides recommendations it answers the catalog queries of the public API:
//! genre list, full listing, trending, per-genre top list, title search and
//! single-movie detail.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use data_loader::{Corpus, MovieId, MovieRecord};
use features::FeatureConfig;
use similarity::{validate_top_n, EngineBuilder, EngineError, Result, SimilarityEngine};

use crate::summary::{MovieSummary, RecommendationResponse, RecommendedMovie};

/// Movies returned by `trending` and `by_genre` unless asked otherwise
pub const DEFAULT_TOP_LIMIT: usize = 20;
/// Matches returned by `search` unless asked otherwise
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Recommendations returned unless asked otherwise
pub const DEFAULT_RECOMMENDATIONS: usize = 10;
/// Shared terms attached to each recommendation
const EXPLAIN_TERMS: usize = 5;

/// Corpus, similarity engine and derived catalog data
#[derive(Debug, Clone)]
pub struct MovieService {
    engine: SimilarityEngine,
    genres: Vec<String>,
}

impl MovieService {
    /// Build the service with default feature settings
    pub fn new(corpus: Arc<Corpus>) -> Result<Self> {
        Self::with_feature_config(corpus, FeatureConfig::default())
    }

    /// Build the service with explicit feature settings
    ///
    /// Fails with `EngineError::Configuration` for an empty corpus or a
    /// corpus without any usable text.
    #[instrument(skip(corpus, config), fields(movies = corpus.len()))]
    pub fn with_feature_config(corpus: Arc<Corpus>, config: FeatureConfig) -> Result<Self> {
        let start = Instant::now();
        let genres = corpus.genres().map(str::to_string).collect();
        let engine = EngineBuilder::new(corpus)
            .with_feature_config(config)
            .build()?;

        info!(
            "Model ready: {} movies loaded in {:.2?}",
            engine.len(),
            start.elapsed()
        );
        Ok(Self { engine, genres })
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn corpus(&self) -> &Corpus {
        self.engine.corpus()
    }

    /// Distinct genre labels, sorted
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Every movie in corpus order
    pub fn movies(&self) -> Vec<MovieSummary> {
        self.corpus().movies().iter().map(MovieSummary::from).collect()
    }

    /// Highest rated movies
    pub fn trending(&self, limit: usize) -> Vec<MovieSummary> {
        let positions: Vec<usize> = (0..self.corpus().len()).collect();
        self.top_rated(&positions, limit)
    }

    /// Highest rated movies carrying `genre` (exact label)
    pub fn by_genre(&self, genre: &str, limit: usize) -> Vec<MovieSummary> {
        self.top_rated(self.corpus().positions_by_genre(genre), limit)
    }

    /// Movies whose title contains `query`, case-insensitively, in corpus order
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MovieSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let matches: Vec<MovieSummary> = self
            .corpus()
            .movies()
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(MovieSummary::from)
            .collect();

        debug!("Search '{}' matched {} movies", query, matches.len());
        matches
    }

    /// Detail view of one movie
    pub fn movie(&self, id: MovieId) -> Result<MovieSummary> {
        self.corpus()
            .get_movie(id)
            .map(MovieSummary::from)
            .ok_or(EngineError::NotFoundId { id })
    }

    /// Movies most similar to the one titled `title`
    ///
    /// Errors: `NotFound` for an unknown title, `InvalidArgument` for
    /// `top_n == 0`. Duplicate titles resolve to the first movie in corpus
    /// order.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, top_n: usize) -> Result<RecommendationResponse> {
        let start = Instant::now();
        validate_top_n(top_n)?;
        let row = self.engine.resolve_title(title)?;
        let recommendations = self
            .engine
            .recommend_row(row, top_n)?
            .into_iter()
            .filter_map(|rec| {
                // Enrich from the ranked row itself, never by re-matching the title
                let movie = self.corpus().get(rec.position)?;
                Some(self.enrich(row, rec.position, movie, rec.score))
            })
            .collect::<Vec<_>>();

        debug!(
            "Recommended {} movies for '{}' in {:.2?}",
            recommendations.len(),
            title,
            start.elapsed()
        );
        Ok(RecommendationResponse {
            movie: title.to_string(),
            recommendations,
        })
    }

    fn enrich(&self, from: usize, to: usize, movie: &MovieRecord, score: f32) -> RecommendedMovie {
        RecommendedMovie {
            movie: MovieSummary::from(movie),
            similarity: score,
            shared_terms: self
                .engine
                .explain(from, to, EXPLAIN_TERMS)
                .into_iter()
                .map(|(term, _)| term.to_string())
                .collect(),
        }
    }

    /// Rank positions by rating DESC, ties by corpus order, and keep `limit`
    fn top_rated(&self, positions: &[usize], limit: usize) -> Vec<MovieSummary> {
        let movies = self.corpus().movies();
        let mut ranked: Vec<usize> = positions.to_vec();
        ranked.sort_by(|&a, &b| {
            movies[b]
                .vote_average
                .total_cmp(&movies[a].vote_average)
                .then(a.cmp(&b))
        });
        ranked.truncate(limit);
        ranked.into_iter().map(|pos| MovieSummary::from(&movies[pos])).collect()
    }
}
