//! TF-IDF feature model.
//!
//! ## Algorithm
//! 1. Tokenize every movie's content document
//! 2. Count document frequency `df(t)` for every term
//! 3. Keep terms with `df(t) >= min_df`, assign ids in lexicographic order
//! 4. `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! 5. Row weight = raw count in the document x idf, then L2-normalise
//!
//! Rows are stored sparsely: only non-zero `(term_id, weight)` pairs, sorted
//! by term id. The logical width of every row is the vocabulary size.

use crate::config::FeatureConfig;
use crate::error::{FeatureError, Result};
use crate::tokenizer::tokenize_movie;
use data_loader::MovieRecord;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Column index in the feature space
pub type TermId = u32;

// =============================================================================
// FeatureVector
// =============================================================================

/// One sparse row of the feature matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    /// Non-zero weights sorted by term id
    entries: Vec<(TermId, f32)>,
}

impl FeatureVector {
    /// Build a vector from `(term, weight)` pairs.
    ///
    /// Pairs are sorted by term id and zero weights dropped. Duplicate term
    /// ids are summed.
    pub fn from_entries(mut entries: Vec<(TermId, f32)>) -> Self {
        entries.sort_unstable_by_key(|&(term, _)| term);
        let mut merged: Vec<(TermId, f32)> = Vec::with_capacity(entries.len());
        for (term, weight) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == term => last.1 += weight,
                _ => merged.push((term, weight)),
            }
        }
        merged.retain(|&(_, weight)| weight != 0.0);
        Self { entries: merged }
    }

    pub fn entries(&self) -> &[(TermId, f32)] {
        &self.entries
    }

    /// Number of non-zero dimensions
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// True when every component is zero (movie had no usable content)
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight of a single term, zero if absent
    pub fn weight(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Euclidean length
    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Dot product via a merge over the two sorted entry lists
    pub fn dot(&self, other: &FeatureVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            if a_term == b_term {
                sum += a_weight * b_weight;
                i += 1;
                j += 1;
            } else if a_term < b_term {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    /// Expand into a dense row of the given width
    pub fn to_dense(&self, dimension: usize) -> Vec<f32> {
        let mut dense = vec![0.0; dimension];
        for &(term, weight) in &self.entries {
            if let Some(slot) = dense.get_mut(term as usize) {
                *slot = weight;
            }
        }
        dense
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
        self
    }
}

// =============================================================================
// FeatureMatrix
// =============================================================================

/// Feature rows aligned with the corpus: `rows[i]` describes `movies[i]`
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
    dimension: usize,
}

impl FeatureMatrix {
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> Option<&FeatureVector> {
        self.rows.get(position)
    }

    /// Number of rows (movies)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of every row (vocabulary size)
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

// =============================================================================
// FeatureModel
// =============================================================================

/// Fitted vocabulary and IDF weights
#[derive(Debug, Clone)]
pub struct FeatureModel {
    config: FeatureConfig,
    /// Term text by id; ids follow lexicographic order
    terms: Vec<String>,
    term_ids: HashMap<String, TermId>,
    idf: Vec<f32>,
    document_count: usize,
}

impl FeatureModel {
    /// Fit a vocabulary over the corpus.
    ///
    /// Fails with `EmptyCorpus` for no records and `DegenerateFeatureSpace`
    /// when no term survives tokenization.
    pub fn fit(movies: &[MovieRecord], config: &FeatureConfig) -> Result<Self> {
        let documents = tokenize_all(movies, config)?;
        Self::fit_tokens(&documents, config)
    }

    fn fit_tokens(documents: &[Vec<String>], config: &FeatureConfig) -> Result<Self> {
        let n = documents.len();
        if n == 0 {
            return Err(FeatureError::EmptyCorpus);
        }

        // BTreeMap gives the lexicographic term order used for ids
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in documents {
            let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in distinct {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let min_df = config.min_df.max(1);
        let mut terms = Vec::new();
        let mut idf = Vec::new();
        for (term, df) in document_frequency {
            if df >= min_df {
                terms.push(term.to_string());
                idf.push(smoothed_idf(n, df));
            }
        }

        if terms.is_empty() {
            return Err(FeatureError::DegenerateFeatureSpace { documents: n });
        }

        let term_ids = terms
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as TermId))
            .collect();

        debug!("Fitted vocabulary of {} terms over {} documents", terms.len(), n);

        Ok(Self {
            config: config.clone(),
            terms,
            term_ids,
            idf,
            document_count: n,
        })
    }

    /// Map one movie into this model's feature space.
    ///
    /// Terms outside the vocabulary are ignored; a movie without known
    /// terms maps to the zero vector.
    pub fn transform(&self, movie: &MovieRecord) -> FeatureVector {
        self.vectorize(&tokenize_movie(movie, &self.config))
    }

    fn vectorize(&self, tokens: &[String]) -> FeatureVector {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for token in tokens {
            if let Some(&id) = self.term_ids.get(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(id, count)| (id, count as f32 * self.idf[id as usize]))
            .collect();

        FeatureVector::from_entries(entries).l2_normalized()
    }

    /// Vocabulary size, i.e. the width of every feature row
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    /// Number of documents the model was fitted on
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.term_ids.get(term).copied()
    }

    pub fn idf(&self, id: TermId) -> Option<f32> {
        self.idf.get(id as usize).copied()
    }

    /// Highest-weighted terms of a row, heaviest first (ties by term order)
    pub fn top_terms(&self, row: &FeatureVector, k: usize) -> Vec<(&str, f32)> {
        let mut weighted: Vec<(TermId, f32)> = row.entries().to_vec();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        self.named(weighted, k)
    }

    /// Terms two rows have in common, ranked by their contribution to the
    /// dot product
    pub fn shared_terms(&self, a: &FeatureVector, b: &FeatureVector, k: usize) -> Vec<(&str, f32)> {
        let mut shared: Vec<(TermId, f32)> = a
            .entries()
            .iter()
            .filter_map(|&(term, weight)| {
                let other = b.weight(term);
                (other > 0.0).then_some((term, weight * other))
            })
            .collect();
        shared.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        self.named(shared, k)
    }

    fn named(&self, weighted: Vec<(TermId, f32)>, k: usize) -> Vec<(&str, f32)> {
        weighted
            .into_iter()
            .take(k)
            .filter_map(|(id, weight)| Some((self.term(id)?, weight)))
            .collect()
    }
}

/// Smoothed inverse document frequency
///
/// Adding one to both counts behaves as if an extra document contained every
/// term once, so no term gets an infinite or zero weight.
fn smoothed_idf(document_count: usize, document_frequency: usize) -> f32 {
    ((1.0 + document_count as f32) / (1.0 + document_frequency as f32)).ln() + 1.0
}

fn tokenize_all(movies: &[MovieRecord], config: &FeatureConfig) -> Result<Vec<Vec<String>>> {
    if movies.is_empty() {
        return Err(FeatureError::EmptyCorpus);
    }
    Ok(movies
        .par_iter()
        .map(|movie| tokenize_movie(movie, config))
        .collect())
}

/// Fit a model over the corpus and build its feature matrix in one pass.
///
/// Row `i` of the returned matrix describes `movies[i]`.
///
/// Fails with `DegenerateFeatureSpace` when no document contains a term.
/// This includes a corpus of a single movie without overview or genres.
#[instrument(skip(movies, config), fields(count = movies.len()))]
pub fn build_features(
    movies: &[MovieRecord],
    config: &FeatureConfig,
) -> Result<(FeatureModel, FeatureMatrix)> {
    let documents = tokenize_all(movies, config)?;
    let model = FeatureModel::fit_tokens(&documents, config)?;

    let rows: Vec<FeatureVector> = documents
        .par_iter()
        .map(|tokens| model.vectorize(tokens))
        .collect();

    let empty_rows = rows.iter().filter(|row| row.is_zero()).count();
    info!(
        "Built {} feature rows over {} terms ({} without content)",
        rows.len(),
        model.dimension(),
        empty_rows
    );

    let matrix = FeatureMatrix {
        dimension: model.dimension(),
        rows,
    };
    Ok((model, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u32, overview: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord::new(id, format!("Movie {}", id))
            .with_overview(overview)
            .with_genres(genres.iter().copied())
    }

    #[test]
    fn test_idf_smoothing() {
        // Term in every document still gets weight 1
        assert!((smoothed_idf(3, 3) - 1.0).abs() < 1e-6);
        // Rarer terms weigh more
        assert!(smoothed_idf(3, 1) > smoothed_idf(3, 2));
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let movies = vec![movie(1, "zebra apple", &[]), movie(2, "mango", &[])];
        let model = FeatureModel::fit(&movies, &FeatureConfig::default()).unwrap();

        assert_eq!(model.dimension(), 3);
        assert_eq!(model.term(0), Some("apple"));
        assert_eq!(model.term(1), Some("mango"));
        assert_eq!(model.term(2), Some("zebra"));
        assert_eq!(model.term_id("mango"), Some(1));
        assert_eq!(model.term_id("banana"), None);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let movies = vec![
            movie(1, "space battle", &["Action"]),
            movie(2, "space war fleet", &["Action"]),
        ];
        let (_, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        for row in matrix.rows() {
            assert!((row.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_common_terms_weigh_less() {
        let movies = vec![
            movie(1, "space battle", &[]),
            movie(2, "space opera", &[]),
            movie(3, "space race", &[]),
        ];
        let (model, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        let row = matrix.row(0).unwrap();
        let space = row.weight(model.term_id("space").unwrap());
        let battle = row.weight(model.term_id("battle").unwrap());
        assert!(battle > space);
    }

    #[test]
    fn test_empty_content_gives_zero_row() {
        let movies = vec![movie(1, "space battle", &["Action"]), movie(2, "", &[])];
        let (_, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        assert_eq!(matrix.len(), 2);
        assert!(matrix.row(1).unwrap().is_zero());
        assert_eq!(matrix.row(1).unwrap().norm(), 0.0);
    }

    #[test]
    fn test_empty_content_stays_zero_without_length_floor() {
        let movies = vec![movie(1, "space battle.", &[]), movie(2, "", &[]), movie(3, "", &[])];
        let config = FeatureConfig {
            min_term_len: 0,
            ..FeatureConfig::default()
        };
        let (model, matrix) = build_features(&movies, &config).unwrap();

        assert_eq!(model.term_id(""), None);
        assert_eq!(model.dimension(), 2);
        assert!(matrix.row(1).unwrap().is_zero());
        assert!(matrix.row(2).unwrap().is_zero());
    }

    #[test]
    fn test_single_empty_movie_is_degenerate() {
        let err = build_features(&[movie(1, "", &[])], &FeatureConfig::default()).unwrap_err();
        assert_eq!(err, FeatureError::DegenerateFeatureSpace { documents: 1 });
    }

    #[test]
    fn test_empty_corpus_fails() {
        let err = build_features(&[], &FeatureConfig::default()).unwrap_err();
        assert_eq!(err, FeatureError::EmptyCorpus);
    }

    #[test]
    fn test_degenerate_feature_space_fails() {
        let movies = vec![movie(1, "", &[]), movie(2, "the a of", &[])];
        let err = build_features(&movies, &FeatureConfig::default()).unwrap_err();
        assert_eq!(err, FeatureError::DegenerateFeatureSpace { documents: 2 });
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let movies = vec![
            movie(1, "space battle", &[]),
            movie(2, "space war", &[]),
        ];
        let config = FeatureConfig::default().with_min_df(2);
        let model = FeatureModel::fit(&movies, &config).unwrap();

        assert_eq!(model.dimension(), 1);
        assert_eq!(model.term(0), Some("space"));
    }

    #[test]
    fn test_transform_matches_matrix_row() {
        let movies = vec![
            movie(1, "space battle", &["Action"]),
            movie(2, "family reunion", &["Drama"]),
        ];
        let (model, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        assert_eq!(&model.transform(&movies[1]), matrix.row(1).unwrap());
        // Unknown vocabulary maps to zero
        assert!(model.transform(&movie(9, "zeppelin", &[])).is_zero());
    }

    #[test]
    fn test_dot_and_dense_agree() {
        let a = FeatureVector::from_entries(vec![(3, 0.5), (0, 1.0), (3, 0.5)]);
        let b = FeatureVector::from_entries(vec![(1, 2.0), (3, 2.0)]);

        assert_eq!(a.entries(), &[(0, 1.0), (3, 1.0)]);
        assert_eq!(a.dot(&b), 2.0);

        let dense_a = a.to_dense(4);
        let dense_b = b.to_dense(4);
        let dense_dot: f32 = dense_a.iter().zip(&dense_b).map(|(x, y)| x * y).sum();
        assert_eq!(dense_dot, a.dot(&b));
    }

    #[test]
    fn test_shared_terms_explain_overlap() {
        let movies = vec![
            movie(1, "space battle", &["Action"]),
            movie(2, "space war fleet", &["Action"]),
            movie(3, "family reunion", &["Drama"]),
        ];
        let (model, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        let shared = model.shared_terms(matrix.row(0).unwrap(), matrix.row(1).unwrap(), 5);
        let names: Vec<&str> = shared.iter().map(|(t, _)| *t).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"space"));
        assert!(names.contains(&"action"));

        assert!(model
            .shared_terms(matrix.row(0).unwrap(), matrix.row(2).unwrap(), 5)
            .is_empty());
    }

    #[test]
    fn test_top_terms_ordering() {
        let movies = vec![movie(1, "space space battle", &[]), movie(2, "battle", &[])];
        let (model, matrix) = build_features(&movies, &FeatureConfig::default()).unwrap();

        let top = model.top_terms(matrix.row(0).unwrap(), 1);
        assert_eq!(top[0].0, "space");
    }
}
