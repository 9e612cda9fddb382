// src/config.rs

pub const DEFAULT_NAMESPACE: &str = "::Ragel::Bitmap";
pub const DEFAULT_PREFIX: char = '_';

/// Knobs shared by the locator, selector and rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Ruby constant path the codec classes live under.
    pub namespace: String,
    /// First character of a table field name.
    pub prefix: char,
    /// Use `Array32Offset`/`Array64Offset` for 4- and 8-byte tables.
    pub flat_offsets: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            prefix: DEFAULT_PREFIX,
            flat_offsets: cfg!(feature = "offset"),
        }
    }
}

impl Options {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_flat_offsets(mut self, on: bool) -> Self {
        self.flat_offsets = on;
        self
    }
}
