//! Parser for the JSON movie corpus.
//!
//! The corpus file is a JSON array of TMDB-style movie objects:
//!
//! ```text
//! [{"id": 603, "title": "The Matrix", "overview": "...",
//!   "genres": [{"id": 28, "name": "Action"}],
//!   "vote_average": 8.2, "release_date": "1999-03-30"}]
//! ```
//!
//! Exports from different tools disagree on how genres are written, so
//! plain string lists and pipe-joined strings (`"Action|Sci-Fi"`) are
//! accepted too. Missing or null text fields become empty strings.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieId, MovieRecord, MAX_VOTE_AVERAGE};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A movie as it appears in the file, before normalisation
#[derive(Debug, Deserialize)]
struct RawMovie {
    id: MovieId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    genres: Option<RawGenres>,
    #[serde(default)]
    vote_average: Option<f32>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGenres {
    List(Vec<RawGenre>),
    Joined(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGenre {
    Name(String),
    Object { name: String },
}

impl RawGenre {
    fn into_name(self) -> String {
        match self {
            RawGenre::Name(name) | RawGenre::Object { name } => name,
        }
    }
}

/// Read and parse a corpus file
pub fn parse_corpus_file(path: &Path) -> Result<Vec<MovieRecord>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_corpus_str(&content, &file)
}

/// Parse corpus JSON held in memory
///
/// `file` is only used to label parse errors.
pub fn parse_corpus_str(content: &str, file: &str) -> Result<Vec<MovieRecord>> {
    let raw: Vec<RawMovie> =
        serde_json::from_str(content).map_err(|source| DataLoadError::ParseError {
            file: file.to_string(),
            source,
        })?;

    // Normalisation is independent per record; rayon keeps the output order
    raw.into_par_iter()
        .enumerate()
        .map(|(position, movie)| normalize(movie, position))
        .collect()
}

/// Trim fields, flatten genres and validate ranges for one record
fn normalize(raw: RawMovie, position: usize) -> Result<MovieRecord> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(DataLoadError::InvalidValue {
            field: "title".to_string(),
            value: format!("{:?}", raw.title),
            position,
        });
    }

    let vote_average = raw.vote_average.unwrap_or(0.0);
    if !(0.0..=MAX_VOTE_AVERAGE).contains(&vote_average) {
        return Err(DataLoadError::InvalidValue {
            field: "vote_average".to_string(),
            value: vote_average.to_string(),
            position,
        });
    }

    let release_date = raw
        .release_date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(MovieRecord {
        id: raw.id,
        title: title.to_string(),
        overview: raw.overview.as_deref().map(str::trim).unwrap_or_default().to_string(),
        genres: normalize_genres(raw.genres),
        vote_average,
        release_date,
    })
}

/// Flatten any accepted genre encoding into trimmed, deduplicated labels
///
/// Example: `"Action| Sci-Fi |Action"` -> `["Action", "Sci-Fi"]`
fn normalize_genres(raw: Option<RawGenres>) -> Vec<String> {
    let names: Vec<String> = match raw {
        None => Vec::new(),
        Some(RawGenres::Joined(joined)) => joined.split('|').map(str::to_string).collect(),
        Some(RawGenres::List(list)) => list.into_iter().map(RawGenre::into_name).collect(),
    };

    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}
