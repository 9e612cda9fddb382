// src/rewrite/mod.rs
//! Splices codec constructors over located tables.

pub mod buffer;
pub mod literal;

use std::{fs, path::Path};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

pub use buffer::Buffer;
pub use literal::byte_string_literal;

use crate::{
    bitmap::Variant,
    config::Options,
    encode::{self, EncodedTable},
    error::{EncodeError, Error, Result},
    locate::{NumericTable, locate},
};

/// One table replaced by a codec constructor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde_as(as = "DisplayFromStr")]
    pub variant: Variant,
    pub width: usize,
    pub len: usize,
    /// Bytes of the original assignment text.
    pub literal_bytes: usize,
    /// Bytes held by the codec buffers.
    pub packed_bytes: usize,
}

/// A table left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rewrite {
    #[serde(skip)]
    pub source: String,
    pub replaced: Vec<Replacement>,
    pub skipped: Vec<Skipped>,
}

impl Rewrite {
    pub fn saved_bytes(&self) -> isize {
        self.replaced
            .iter()
            .map(|r| r.literal_bytes as isize - r.packed_bytes as isize)
            .sum()
    }
}

/// `<receiver>.<name> = <Namespace>::<Variant>.new("<plane>", ...)`
pub fn constructor_statement(table: &NumericTable, enc: &EncodedTable, opts: &Options) -> String {
    let args: Vec<String> = enc
        .buffers
        .iter()
        .map(|b| byte_string_literal(b))
        .collect();
    format!(
        "{}.{} = {}::{}.new({})",
        table.receiver,
        table.name,
        opts.namespace,
        enc.variant,
        args.join(", ")
    )
}

/// Rewrites every table in `source`. Invalid source or an empty table fails
/// the whole call; oversize tables are reported in `skipped` and kept.
pub fn rewrite(source: &str, opts: &Options) -> Result<Rewrite> {
    let tables = locate(source, opts)?;

    let mut planned = Vec::with_capacity(tables.len());
    let mut skipped = Vec::new();
    for table in tables {
        match encode::select(&table.numbers, opts) {
            Ok(enc) => planned.push((table, enc)),
            Err(EncodeError::Empty) => {
                return Err(Error::EmptyTable {
                    name: table.name,
                    line: table.start_line,
                });
            }
            Err(e @ EncodeError::Oversize { .. }) => {
                warn!(
                    "leaving table {} at line {} as written: {e}",
                    table.name, table.start_line
                );
                skipped.push(Skipped {
                    name: table.name,
                    start_line: table.start_line,
                    end_line: table.end_line,
                    reason: e.to_string(),
                });
            }
        }
    }

    if planned.is_empty() {
        return Ok(Rewrite {
            source: source.to_string(),
            replaced: Vec::new(),
            skipped,
        });
    }

    // Back to front, so earlier line numbers stay valid.
    let mut buf = Buffer::new(source);
    let mut replaced = Vec::with_capacity(planned.len());
    for (table, enc) in planned.iter().rev() {
        let stmt = constructor_statement(table, enc, opts);
        debug!(
            "{} -> {} (width {}, {} elements)",
            table.name,
            enc.variant,
            enc.width,
            table.numbers.len()
        );
        let literal_bytes = buf.replace(
            table.start_line,
            table.end_line,
            table.start_col,
            table.end_col,
            &stmt,
        );
        replaced.push(Replacement {
            name: table.name.clone(),
            start_line: table.start_line,
            end_line: table.end_line,
            variant: enc.variant,
            width: enc.width,
            len: table.numbers.len(),
            literal_bytes,
            packed_bytes: enc.packed_len(),
        });
    }
    replaced.reverse();

    Ok(Rewrite {
        source: buf.into_source(),
        replaced,
        skipped,
    })
}

/// [`rewrite`] with default options, returning only the text.
pub fn replace(source: &str) -> Result<String> {
    rewrite(source, &Options::default()).map(|r| r.source)
}

/// Rewrites the file at `path` in place. The file is only written when its
/// text changes.
pub fn replace_path(path: impl AsRef<Path>, opts: &Options) -> Result<Rewrite> {
    let path = path.as_ref();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let source = fs::read_to_string(path).map_err(io_err)?;
    let out = rewrite(&source, opts)?;
    if out.source != source {
        fs::write(path, &out.source).map_err(io_err)?;
    }
    info!(
        "{}: {} tables compacted, {} left as written, {} bytes saved",
        path.display(),
        out.replaced.len(),
        out.skipped.len(),
        out.saved_bytes()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planes() -> Options {
        Options::default().with_flat_offsets(false)
    }

    #[test]
    fn single_table_keeps_indentation() {
        let out = replace("  self._trans_keys = [1, 2, 3, 4, 5]\n").unwrap();
        assert_eq!(
            out,
            "  self._trans_keys = ::Ragel::Bitmap::Array8.new(\"\\x01\\x02\\x03\\x04\\x05\")\n"
        );
    }

    #[test]
    fn two_byte_values_use_two_planes() {
        let out = replace("self._a = [65533, 65534, 65535]\n").unwrap();
        assert_eq!(
            out,
            r#"self._a = ::Ragel::Bitmap::Array16.new("\xFF\xFF\xFF", "\xFD\xFE\xFF")
"#
        );
    }

    #[test]
    fn four_byte_tables_follow_the_offset_flag() {
        let src = "self._a = [0x01020304]\n";
        let flat = rewrite(src, &Options::default().with_flat_offsets(true)).unwrap();
        assert_eq!(
            flat.source,
            "self._a = ::Ragel::Bitmap::Array32Offset.new(\"\\x04\\x03\\x02\\x01\")\n"
        );
        let planar = rewrite(src, &planes()).unwrap();
        assert_eq!(
            planar.source,
            "self._a = ::Ragel::Bitmap::Array32.new(\"\\x01\", \"\\x02\", \"\\x03\", \"\\x04\")\n"
        );
    }

    #[test]
    fn multi_line_tables_splice_back_to_front() {
        let src = "\
module Lexer
  self._a = [
    1, 2,
    3
  ]
  keep_me = 1
  self._b = [
    300
  ]
  # trailing
end
";
        let out = rewrite(src, &planes()).unwrap();
        assert_eq!(
            out.source,
            "\
module Lexer
  self._a = ::Ragel::Bitmap::Array8.new(\"\\x01\\x02\\x03\")
  keep_me = 1
  self._b = ::Ragel::Bitmap::Array16.new(\"\\x01\", \",\")
  # trailing
end
"
        );
        let lines: Vec<_> = out.replaced.iter().map(|r| (r.start_line, r.end_line)).collect();
        assert_eq!(lines, vec![(2, 5), (7, 9)]);
    }

    #[test]
    fn prefix_and_suffix_text_survive() {
        let out = replace("x = 1; self._a = [7] # note\r\ny\r\n").unwrap();
        assert_eq!(
            out,
            "x = 1; self._a = ::Ragel::Bitmap::Array8.new(\"\\a\") # note\r\ny\r\n"
        );
    }

    #[test]
    fn terminator_is_added_when_missing() {
        assert_eq!(
            replace("self._a = [1]").unwrap(),
            "self._a = ::Ragel::Bitmap::Array8.new(\"\\x01\")\n"
        );
        assert_eq!(
            replace("a\r\nself._a = [1]").unwrap(),
            "a\r\nself._a = ::Ragel::Bitmap::Array8.new(\"\\x01\")\r\n"
        );
    }

    #[test]
    fn sources_without_tables_are_untouched() {
        for src in ["", "x = 1", "x = [1, 2]\n", "self._a = [-1]\r\n"] {
            assert_eq!(replace(src).unwrap(), src);
        }
    }

    #[test]
    fn custom_namespace() {
        let opts = Options::default().with_namespace("::Compact");
        let out = rewrite("self._a = [1]\n", &opts).unwrap();
        assert_eq!(out.source, "self._a = ::Compact::Array8.new(\"\\x01\")\n");
    }

    #[test]
    fn oversize_tables_are_left_as_written() {
        let src = "self._big = [1, 18446744073709551616]\nself._a = [2]\n";
        let out = rewrite(src, &Options::default()).unwrap();
        assert_eq!(
            out.source,
            "self._big = [1, 18446744073709551616]\nself._a = ::Ragel::Bitmap::Array8.new(\"\\x02\")\n"
        );
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].name, "_big");
        assert_eq!(out.replaced.len(), 1);
    }

    #[test]
    fn eight_byte_values_still_fit() {
        let src = "self._a = [18446744073709551615]\n";
        let out = rewrite(src, &planes()).unwrap();
        assert_eq!(out.replaced[0].variant, Variant::ArrayGeneric);
        assert_eq!(out.replaced[0].width, 8);
        let flat = rewrite(src, &Options::default().with_flat_offsets(true)).unwrap();
        assert_eq!(flat.replaced[0].variant, Variant::Array64Offset);
    }

    #[test]
    fn empty_table_aborts_the_file() {
        let err = replace("self._a = [1]\nself._b = []\n").unwrap_err();
        assert!(matches!(err, Error::EmptyTable { ref name, line: 2 } if name == "_b"));
    }

    #[test]
    fn invalid_source_aborts() {
        let err = replace("self._a = [1]\nend\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSource { line: 2, .. }));
    }

    #[test]
    fn report_counts_bytes() {
        let out = replace_report("self._trans_keys = [1, 2, 3, 4, 5]\n");
        let r = &out.replaced[0];
        assert_eq!(r.len, 5);
        assert_eq!(r.width, 1);
        assert_eq!(r.packed_bytes, 5);
        assert_eq!(r.literal_bytes, "self._trans_keys = [1, 2, 3, 4, 5]".len());
        assert_eq!(out.saved_bytes(), 29);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["replaced"][0]["variant"], "Array8");
        assert!(json.get("source").is_none());
        let back: Replacement = serde_json::from_value(json["replaced"][0].clone()).unwrap();
        assert_eq!(&back, r);
    }

    fn replace_report(src: &str) -> Rewrite {
        rewrite(src, &Options::default()).unwrap()
    }
}
