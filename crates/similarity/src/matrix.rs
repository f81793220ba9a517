//! Dense pairwise similarity matrix.
//!
//! ## Algorithm
//! 1. Precompute the norm of every feature row
//! 2. For every pair `i < j` (rows in parallel with rayon):
//!    `sim = (u . v) / (|u| |v|)`, or `0` if either norm is zero
//! 3. Clamp into `[0, 1]`, mirror into `j, i`, set the diagonal to `1`
//!
//! Memory is `4 * n^2` bytes: about 100 MB for 5,000 movies. The corpus is
//! assumed to fit comfortably; larger catalogs need a top-k index instead.

use crate::error::{EngineError, Result};
use crate::row_index::RowIndex;
use data_loader::MovieId;
use features::{FeatureMatrix, FeatureVector};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{info, instrument};

/// Cosine similarity of two feature rows, clamped into `[0, 1]`.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f32 {
    cosine_with_norms(a, a.norm(), b, b.norm())
}

fn cosine_with_norms(a: &FeatureVector, a_norm: f32, b: &FeatureVector, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    // Clamping absorbs rounding such as 1.0000001
    (a.dot(b) / (a_norm * b_norm)).clamp(0.0, 1.0)
}

/// Descending score, then ascending row: a total order, so rankings are
/// reproducible even with tied scores
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Symmetric `n x n` similarity scores with the id <-> row mapping they were
/// built with.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    /// Row-major scores
    scores: Vec<f32>,
    index: RowIndex,
}

impl SimilarityMatrix {
    /// Compute all pairwise similarities.
    ///
    /// `index` must describe the same rows as `features`.
    #[instrument(skip(features, index), fields(rows = features.len(), dimension = features.dimension()))]
    pub fn build(features: &FeatureMatrix, index: RowIndex) -> Result<Self> {
        let n = features.len();
        if n != index.len() {
            return Err(EngineError::Configuration(format!(
                "feature matrix has {} rows but row index has {}",
                n,
                index.len()
            )));
        }

        let rows = features.rows();
        let norms: Vec<f32> = rows.par_iter().map(FeatureVector::norm).collect();

        // Upper triangle, one Vec per row i holding scores for j > i
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| cosine_with_norms(&rows[i], norms[i], &rows[j], norms[j]))
                    .collect()
            })
            .collect();

        let mut scores = vec![0.0f32; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            scores[i * n + i] = 1.0;
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                scores[i * n + j] = score;
                scores[j * n + i] = score;
            }
        }

        info!(
            "Built {}x{} similarity matrix ({:.1} MiB)",
            n,
            n,
            (n * n * std::mem::size_of::<f32>()) as f64 / (1024.0 * 1024.0)
        );

        Ok(Self { n, scores, index })
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Score between two rows
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.n && j < self.n {
            Some(self.scores[i * self.n + j])
        } else {
            None
        }
    }

    /// Full score row
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i < self.n {
            Some(&self.scores[i * self.n..(i + 1) * self.n])
        } else {
            None
        }
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    /// Row of a movie id
    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.index.row_of(id)
    }

    /// Score between two movies by id
    pub fn between(&self, a: MovieId, b: MovieId) -> Option<f32> {
        self.get(self.row_of(a)?, self.row_of(b)?)
    }

    /// The `top_n` most similar rows to `row`, excluding `row` itself.
    ///
    /// Sorted by descending score, ties by ascending row. Returns
    /// `min(top_n, n - 1)` entries; an out-of-range row yields nothing.
    pub fn ranked_neighbors(&self, row: usize, top_n: usize) -> Vec<(usize, f32)> {
        let Some(scores) = self.row(row) else {
            return Vec::new();
        };
        if top_n == 0 {
            return Vec::new();
        }

        let mut neighbors: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != row)
            .collect();

        if top_n < neighbors.len() {
            neighbors.select_nth_unstable_by(top_n - 1, rank_order);
            neighbors.truncate(top_n);
        }
        neighbors.sort_by(rank_order);
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;
    use features::{build_features, FeatureConfig};

    fn build(movies: &[MovieRecord]) -> SimilarityMatrix {
        let (_, features) = build_features(movies, &FeatureConfig::default()).unwrap();
        SimilarityMatrix::build(&features, RowIndex::from_movies(movies).unwrap()).unwrap()
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = FeatureVector::default();
        let v = FeatureVector::from_entries(vec![(0, 1.0)]);
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_unnormalized_inputs() {
        let a = FeatureVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        let b = FeatureVector::from_entries(vec![(0, 6.0), (1, 8.0)]);
        let c = FeatureVector::from_entries(vec![(2, 1.0)]);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
    }

    #[test]
    fn test_diagonal_and_symmetry() {
        let movies = vec![
            MovieRecord::new(1, "A").with_overview("space battle").with_genres(["Action"]),
            MovieRecord::new(2, "B").with_overview("space war fleet").with_genres(["Action"]),
            MovieRecord::new(3, "C").with_overview("family reunion").with_genres(["Drama"]),
            MovieRecord::new(4, "D"),
        ];
        let matrix = build(&movies);

        for i in 0..matrix.len() {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..matrix.len() {
                let s = matrix.get(i, j).unwrap();
                assert_eq!(s, matrix.get(j, i).unwrap());
                assert!((0.0..=1.0).contains(&s));
            }
        }
        // Empty-content movie is only similar to itself
        assert_eq!(matrix.get(3, 0), Some(0.0));
    }

    #[test]
    fn test_ranked_neighbors_ties_by_row() {
        let movies = vec![
            MovieRecord::new(1, "Query").with_overview("heist"),
            MovieRecord::new(2, "Twin One").with_overview("heist"),
            MovieRecord::new(3, "Other").with_overview("romance"),
            MovieRecord::new(4, "Twin Two").with_overview("heist"),
        ];
        let matrix = build(&movies);

        let ranked = matrix.ranked_neighbors(0, 3);
        let rows: Vec<usize> = ranked.iter().map(|&(r, _)| r).collect();
        assert_eq!(rows, vec![1, 3, 2]);

        let top_one = matrix.ranked_neighbors(0, 1);
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].0, 1);
    }

    #[test]
    fn test_ranked_neighbors_bounds() {
        let movies = vec![
            MovieRecord::new(1, "A").with_overview("alpha"),
            MovieRecord::new(2, "B").with_overview("beta"),
        ];
        let matrix = build(&movies);

        assert_eq!(matrix.ranked_neighbors(0, 10).len(), 1);
        assert!(matrix.ranked_neighbors(0, 0).is_empty());
        assert!(matrix.ranked_neighbors(5, 3).is_empty());
    }

    #[test]
    fn test_lookup_by_id() {
        let movies = vec![
            MovieRecord::new(10, "A").with_overview("ocean storm"),
            MovieRecord::new(20, "B").with_overview("ocean storm"),
        ];
        let matrix = build(&movies);

        assert_eq!(matrix.row_of(20), Some(1));
        assert!((matrix.between(10, 20).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(matrix.between(10, 99), None);
    }

    #[test]
    fn test_mismatched_index_rejected() {
        let movies = vec![MovieRecord::new(1, "A").with_overview("alpha")];
        let (_, features) = build_features(&movies, &FeatureConfig::default()).unwrap();
        let err = SimilarityMatrix::build(&features, RowIndex::default()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
