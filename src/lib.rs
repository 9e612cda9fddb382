// src/lib.rs
//! Compacts the integer tables in Ragel-generated Ruby parsers.
//!
//! Each `self._name = [int, ...]` assignment is replaced by a one-line
//! constructor for a packed byte-string codec, e.g.
//! `self._trans_keys = ::Ragel::Bitmap::Array8.new("\x01\x02")`. The
//! [`bitmap`] module holds the matching decoders.

pub mod bitmap;
pub mod config;
pub mod encode;
pub mod error;
pub mod lexer;
pub mod locate;
pub mod parser;
pub mod rewrite;

pub use bitmap::{Bitmap, Variant};
pub use config::Options;
pub use encode::{EncodedTable, select};
pub use error::{EncodeError, Error, Result};
pub use locate::{NumericTable, locate};
pub use rewrite::{Replacement, Rewrite, Skipped, replace, replace_path, rewrite};
