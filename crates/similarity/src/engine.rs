//! The similarity engine and its query operations.
//!
//! The engine has two states, expressed as two types:
//! - `EngineBuilder` (unbuilt): holds the corpus and settings, can only `build`
//! - `SimilarityEngine` (ready): holds the finished structure, can only be queried
//!
//! `build` consumes the builder, so there is no path back to the unbuilt
//! state. A changed corpus means constructing a new engine.
//!
//! ## Title resolution
//! Titles are not unique. A title query resolves to the FIRST row in corpus
//! order carrying exactly that title; use `recommend_by_id` to address a
//! specific movie.

use crate::error::{EngineError, Result};
use crate::matrix::SimilarityMatrix;
use crate::row_index::RowIndex;
use data_loader::{Corpus, MovieId, MovieRecord};
use features::{build_features, FeatureConfig, FeatureMatrix, FeatureModel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// One ranked neighbor of a queried movie
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// Row of the recommended movie in the corpus
    pub position: usize,
    pub movie_id: MovieId,
    pub title: String,
    /// Cosine similarity in `[0, 1]`
    pub score: f32,
}

/// Unbuilt engine: collects the corpus and feature settings
pub struct EngineBuilder {
    corpus: Arc<Corpus>,
    feature_config: FeatureConfig,
}

impl EngineBuilder {
    /// Create a builder over a shared corpus
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self {
            corpus,
            feature_config: FeatureConfig::default(),
        }
    }

    /// Configure vocabulary construction (default: `FeatureConfig::default()`)
    pub fn with_feature_config(mut self, config: FeatureConfig) -> Self {
        self.feature_config = config;
        self
    }

    /// Build features and the full similarity matrix.
    ///
    /// This is the one-time O(n^2 * d) step. It must finish before any
    /// query is served.
    ///
    /// A corpus where no movie has usable text fails with `Configuration`.
    /// A single movie with content builds fine and recommends nothing; a
    /// single movie without content is rejected.
    #[instrument(skip(self), fields(movies = self.corpus.len()))]
    pub fn build(self) -> Result<SimilarityEngine> {
        let start = Instant::now();
        let movies = self.corpus.movies();
        if movies.is_empty() {
            return Err(EngineError::Configuration(
                "cannot build an engine over an empty corpus".to_string(),
            ));
        }

        let index = RowIndex::from_movies(movies)?;
        let (model, features) = build_features(movies, &self.feature_config)?;
        let matrix = SimilarityMatrix::build(&features, index)?;

        let mut title_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, movie) in movies.iter().enumerate() {
            title_index
                .entry(movie.title.clone())
                .or_default()
                .push(position);
        }
        let ambiguous = title_index.values().filter(|rows| rows.len() > 1).count();
        if ambiguous > 0 {
            debug!("{} titles are shared by more than one movie", ambiguous);
        }

        info!(
            "Similarity engine ready: {} movies, {} terms, built in {:.2?}",
            movies.len(),
            model.dimension(),
            start.elapsed()
        );

        Ok(SimilarityEngine {
            corpus: self.corpus,
            model,
            features,
            matrix,
            title_index,
        })
    }
}

/// Ready engine: immutable, shareable across threads
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    corpus: Arc<Corpus>,
    model: FeatureModel,
    features: FeatureMatrix,
    matrix: SimilarityMatrix,
    /// Exact title -> rows, in corpus order
    title_index: HashMap<String, Vec<usize>>,
}

impl SimilarityEngine {
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn model(&self) -> &FeatureModel {
        &self.model
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Number of movies
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Row for a title: the first match in corpus order
    pub fn resolve_title(&self, title: &str) -> Result<usize> {
        let rows = self
            .title_index
            .get(title)
            .ok_or_else(|| EngineError::NotFound {
                title: title.to_string(),
            })?;

        if rows.len() > 1 {
            warn!(
                "Title '{}' matches {} movies, using the first (row {})",
                title,
                rows.len(),
                rows[0]
            );
        }
        Ok(rows[0])
    }

    /// Row for a movie id
    pub fn resolve_id(&self, id: MovieId) -> Result<usize> {
        self.matrix.row_of(id).ok_or(EngineError::NotFoundId { id })
    }

    /// Up to `top_n` movies most similar to the one titled `title`
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;
        let row = self.resolve_title(title)?;
        self.recommend_row(row, top_n)
    }

    /// Up to `top_n` movies most similar to movie `id`
    #[instrument(skip(self))]
    pub fn recommend_by_id(&self, id: MovieId, top_n: usize) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;
        let row = self.resolve_id(id)?;
        self.recommend_row(row, top_n)
    }

    /// Up to `top_n` neighbors of an already-resolved row
    pub fn recommend_row(&self, row: usize, top_n: usize) -> Result<Vec<Recommendation>> {
        validate_top_n(top_n)?;
        if row >= self.len() {
            return Err(EngineError::InvalidArgument(format!(
                "row {} out of range for {} movies",
                row,
                self.len()
            )));
        }

        let recommendations: Vec<Recommendation> = self
            .matrix
            .ranked_neighbors(row, top_n)
            .into_iter()
            .filter_map(|(position, score)| {
                let movie = self.corpus.get(position)?;
                Some(Recommendation {
                    position,
                    movie_id: movie.id,
                    title: movie.title.clone(),
                    score,
                })
            })
            .collect();

        debug!("Row {} -> {} recommendations", row, recommendations.len());
        Ok(recommendations)
    }

    /// Shared terms behind the similarity of two rows, strongest first
    pub fn explain(&self, from: usize, to: usize, k: usize) -> Vec<(&str, f32)> {
        match (self.features.row(from), self.features.row(to)) {
            (Some(a), Some(b)) => self.model.shared_terms(a, b, k),
            _ => Vec::new(),
        }
    }
}

/// Reject a zero result size with `InvalidArgument`
pub fn validate_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(EngineError::InvalidArgument(
            "top_n must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Build the feature model and similarity matrix for a corpus slice with
/// default feature settings.
pub fn build(movies: &[MovieRecord]) -> Result<(FeatureModel, SimilarityMatrix)> {
    let index = RowIndex::from_movies(movies)?;
    let (model, features) = build_features(movies, &FeatureConfig::default())?;
    let matrix = SimilarityMatrix::build(&features, index)?;
    Ok((model, matrix))
}

/// Rank the movies most similar to `title`.
///
/// The title resolves to the first record in `movies` carrying it. Rows of
/// `matrix` are mapped back to records by id, so `movies` need not be in
/// the order the matrix was built from, but must contain the same ids.
pub fn recommend(
    title: &str,
    movies: &[MovieRecord],
    matrix: &SimilarityMatrix,
    top_n: usize,
) -> Result<Vec<(String, f32)>> {
    validate_top_n(top_n)?;

    let query = movies
        .iter()
        .find(|m| m.title == title)
        .ok_or_else(|| EngineError::NotFound {
            title: title.to_string(),
        })?;

    let row = matrix.row_of(query.id).ok_or_else(|| {
        EngineError::Configuration(format!(
            "movie id {} is missing from the similarity matrix",
            query.id
        ))
    })?;

    let titles: HashMap<MovieId, &str> = movies.iter().map(|m| (m.id, m.title.as_str())).collect();

    matrix
        .ranked_neighbors(row, top_n)
        .into_iter()
        .map(|(neighbor, score)| -> Result<(String, f32)> {
            let title = matrix
                .index()
                .id_at(neighbor)
                .and_then(|id| titles.get(&id))
                .ok_or_else(|| {
                    EngineError::Configuration(format!(
                        "matrix row {} has no matching movie record",
                        neighbor
                    ))
                })?;
            Ok((title.to_string(), score))
        })
        .collect()
}
