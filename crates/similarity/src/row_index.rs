//! Explicit mapping between movie ids and matrix rows.
//!
//! The similarity matrix keeps its own copy of the id <-> row relation
//! captured at build time, so lookups never depend on a caller's slice
//! still being in the same order.

use crate::error::{EngineError, Result};
use data_loader::{MovieId, MovieRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    row_ids: Vec<MovieId>,
    id_to_row: HashMap<MovieId, usize>,
}

impl RowIndex {
    /// Capture the id of every record in order.
    ///
    /// Fails with `Configuration` if two records share an id.
    pub fn from_movies(movies: &[MovieRecord]) -> Result<Self> {
        let mut id_to_row = HashMap::with_capacity(movies.len());
        for (row, movie) in movies.iter().enumerate() {
            if let Some(first) = id_to_row.insert(movie.id, row) {
                return Err(EngineError::Configuration(format!(
                    "movie id {} appears at rows {} and {}",
                    movie.id, first, row
                )));
            }
        }

        Ok(Self {
            row_ids: movies.iter().map(|m| m.id).collect(),
            id_to_row,
        })
    }

    /// Row of a movie id
    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.id_to_row.get(&id).copied()
    }

    /// Movie id stored at a row
    pub fn id_at(&self, row: usize) -> Option<MovieId> {
        self.row_ids.get(row).copied()
    }

    pub fn ids(&self) -> &[MovieId] {
        &self.row_ids
    }

    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }
}
