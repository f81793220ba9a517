//! # Data Loader Crate
//!
//! This crate loads the movie corpus the recommender is built from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, Corpus)
//! - **parser**: Parse the JSON corpus file into normalised records
//! - **index**: Build the id and genre indices
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Corpus;
//! use std::path::Path;
//!
//! let corpus = Corpus::load_from_file(Path::new("data/movies.json"))?;
//!
//! let movie = corpus.get_movie(603).unwrap();
//! println!("{} ({:?})", movie.title, movie.year());
//! ```
//!
//! The corpus is loaded once at startup and treated as immutable for the
//! rest of the process. Position `i` in `Corpus::movies()` is the row
//! number used by every matrix derived from it.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{Corpus, MovieId, MovieRecord, MAX_VOTE_AVERAGE};
