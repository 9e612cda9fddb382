// src/error.rs
//! Error types for locating, encoding and rewriting tables.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input does not tokenize or parse as Ruby. Fatal: nothing is rewritten.
    #[error("invalid source at line {line}, column {column}: {message}")]
    InvalidSource {
        line: usize,
        column: usize,
        message: String,
    },

    /// A matched table literal has no elements, so no width can be chosen.
    #[error("table `{name}` at line {line} has no elements")]
    EmptyTable { name: String, line: usize },

    /// Buffers handed to a codec do not fit its variant.
    #[error("malformed bitmap buffers: {0}")]
    MalformedBuffers(String),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures local to choosing an encoding for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("cannot encode an empty table")]
    Empty,

    /// Soft failure: the caller keeps the literal as it is.
    #[error("maximum value {max} needs {width} bytes; at most 8 are supported")]
    Oversize { max: u128, width: usize },
}
