//! Error types for the data-loader crate.
//!
//! Every failure while reading or normalising the movie corpus ends up as a
//! `DataLoadError`. The variants carry enough context (file, record position,
//! offending value) to point at the broken row without re-reading the file.

use thiserror::Error;

/// Errors that can occur while loading and validating the corpus
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The corpus file is not valid JSON, or a record has the wrong shape
    #[error("Parse error in {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record field had an invalid value
    ///
    /// `position` is the zero-based index of the record in the corpus file.
    #[error("Invalid value for {field} in record {position}: {value}")]
    InvalidValue {
        field: String,
        value: String,
        position: usize,
    },

    /// Two records share the same movie id
    #[error("Duplicate movie id {id} (records {first} and {second})")]
    DuplicateId { id: u32, first: usize, second: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
