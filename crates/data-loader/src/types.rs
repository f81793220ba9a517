//! Core domain types for the movie corpus.
//!
//! This module defines the records the recommender works on and the
//! `Corpus` container that holds them for the lifetime of the process.
//! Key points:
//! - `MovieId` is the stable primary key; titles may repeat
//! - Record order inside a `Corpus` is meaningful: row `i` of every
//!   derived matrix describes `movies[i]`
//! - Secondary indices (id, genre) are built once at load time

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (TMDB id in the shipped dataset)
pub type MovieId = u32;

/// Upper bound of the rating scale used by `vote_average`
pub const MAX_VOTE_AVERAGE: f32 = 10.0;

// =============================================================================
// Movie Record
// =============================================================================

/// One normalised row of the corpus.
///
/// Records are produced by the loader (trimmed, genres deduplicated, blank
/// release dates turned into `None`) and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    /// Display title. Not unique across the corpus.
    pub title: String,
    /// Free-text synopsis, possibly empty
    pub overview: String,
    /// Genre labels in source order; matching treats them as a set
    pub genres: Vec<String>,
    /// Average rating in `0.0..=10.0`
    pub vote_average: f32,
    /// Date-like string such as `"1999-03-30"`; only the year is used
    pub release_date: Option<String>,
}

impl MovieRecord {
    /// Create a record with the given id and title and empty content.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            genres: Vec::new(),
            vote_average: 0.0,
            release_date: None,
        }
    }

    /// Set the overview text (builder pattern)
    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    /// Set the genre labels (builder pattern)
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// Set the average rating (builder pattern)
    pub fn with_vote_average(mut self, vote_average: f32) -> Self {
        self.vote_average = vote_average;
        self
    }

    /// Set the release date (builder pattern)
    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    /// Leading four-digit year of the release date.
    ///
    /// Example: `"1999-03-30"` -> `Some(1999)`, `"TBA"` -> `None`
    pub fn year(&self) -> Option<u16> {
        let date = self.release_date.as_deref()?;
        let year = date.get(..4)?;
        if year.bytes().all(|b| b.is_ascii_digit()) {
            year.parse().ok()
        } else {
            None
        }
    }

    /// Whether this movie carries the given genre label (exact match)
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

// =============================================================================
// Corpus - ordered, immutable movie table
// =============================================================================

/// The loaded movie table plus lookup indices.
///
/// Positions (`usize`) index into `movies` and are the row numbers used by
/// the feature and similarity matrices built on top of this corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub(crate) movies: Vec<MovieRecord>,
    /// Movie id -> position
    pub(crate) id_index: HashMap<MovieId, usize>,
    /// Genre label -> positions, in corpus order
    pub(crate) genre_index: BTreeMap<String, Vec<usize>>,
}

impl Corpus {
    /// All records in corpus order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Record at a corpus position
    pub fn get(&self, position: usize) -> Option<&MovieRecord> {
        self.movies.get(position)
    }

    /// Get a movie by id
    pub fn get_movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.position_of(id).map(|pos| &self.movies[pos])
    }

    /// Corpus position of a movie id
    pub fn position_of(&self, id: MovieId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    /// Distinct genre labels, sorted
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre_index.keys().map(String::as_str)
    }

    /// Positions of all movies carrying a genre label, in corpus order
    ///
    /// Returns an empty slice for unknown genres
    pub fn positions_by_genre(&self, genre: &str) -> &[usize] {
        self.genre_index
            .get(genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
