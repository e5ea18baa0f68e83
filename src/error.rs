//! Error types, built with `thiserror` rather than hand-rolled
//! `impl std::error::Error`.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("dictionary file not found: {path}")]
    DictionaryNotFound { path: String },

    #[error("failed to read dictionary file {path}: {source}")]
    DictionaryUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dictionary: {reason}")]
    DictionaryMalformed { reason: String },
}
