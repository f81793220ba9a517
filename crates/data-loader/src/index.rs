//! Corpus building and indexing logic.
//!
//! Turns parsed records into a `Corpus`:
//! - Validate that movie ids are unique
//! - Build the id -> position index
//! - Build the genre -> positions index

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info, instrument};

impl Corpus {
    /// Load and index a corpus file
    ///
    /// This is the main entry point for loading data.
    #[instrument]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading movie corpus from {:?}", path);

        let movies = parser::parse_corpus_file(path)?;
        let corpus = Self::from_records(movies)?;

        info!(
            "Loaded {} movies across {} genres",
            corpus.len(),
            corpus.genre_index.len()
        );
        Ok(corpus)
    }

    /// Build a corpus from records that are already normalised
    ///
    /// Record order is kept as-is. Fails with `DuplicateId` if two records
    /// share an id.
    pub fn from_records(movies: Vec<MovieRecord>) -> Result<Self> {
        let mut corpus = Corpus {
            movies,
            ..Default::default()
        };
        corpus.build_indices()?;
        Ok(corpus)
    }

    fn build_indices(&mut self) -> Result<()> {
        for (position, movie) in self.movies.iter().enumerate() {
            match self.id_index.entry(movie.id) {
                Entry::Occupied(existing) => {
                    return Err(DataLoadError::DuplicateId {
                        id: movie.id,
                        first: *existing.get(),
                        second: position,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }

            for genre in &movie.genres {
                self.genre_index
                    .entry(genre.clone())
                    .or_default()
                    .push(position);
            }
        }

        debug!(
            "Indexed {} ids and {} genres",
            self.id_index.len(),
            self.genre_index.len()
        );
        Ok(())
    }
}
