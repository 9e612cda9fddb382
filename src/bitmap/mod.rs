// src/bitmap/mod.rs
//! Decoders for packed integer tables.
//!
//! Each variant mirrors one runtime class the rewritten source constructs
//! (`::Ragel::Bitmap::Array8` and friends). A table is stored either as byte
//! planes, most-significant plane first, or as one flat little-endian buffer
//! with a fixed stride. Lookups are O(1) and never allocate.

pub mod offset;
pub mod planes;

use std::{fmt, str::FromStr};

pub use offset::Flat;
pub use planes::Planes;

use crate::error::{Error, Result};

/// Codec tag, spelled exactly like the runtime class it constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Array8,
    Array16,
    Array24,
    Array32,
    Array32Offset,
    Array64Offset,
    ArrayGeneric,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::Array8,
        Variant::Array16,
        Variant::Array24,
        Variant::Array32,
        Variant::Array32Offset,
        Variant::Array64Offset,
        Variant::ArrayGeneric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Array8 => "Array8",
            Variant::Array16 => "Array16",
            Variant::Array24 => "Array24",
            Variant::Array32 => "Array32",
            Variant::Array32Offset => "Array32Offset",
            Variant::Array64Offset => "Array64Offset",
            Variant::ArrayGeneric => "ArrayGeneric",
        }
    }

    /// Number of planes a fixed plane variant takes. `None` for the flat
    /// variants and for `ArrayGeneric`, whose plane count is its width.
    pub fn plane_count(self) -> Option<usize> {
        match self {
            Variant::Array8 => Some(1),
            Variant::Array16 => Some(2),
            Variant::Array24 => Some(3),
            Variant::Array32 => Some(4),
            _ => None,
        }
    }

    /// Element stride of the flat little-endian variants.
    pub fn stride(self) -> Option<usize> {
        match self {
            Variant::Array32Offset => Some(4),
            Variant::Array64Offset => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown bitmap variant `{s}`"))
    }
}

/// An immutable, index-addressable view of a packed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bitmap {
    Array8(Planes),
    Array16(Planes),
    Array24(Planes),
    Array32(Planes),
    Array32Offset(Flat<4>),
    Array64Offset(Flat<8>),
    ArrayGeneric(Planes),
}

impl Bitmap {
    /// Takes ownership of the buffers emitted for `variant`.
    pub fn new(variant: Variant, buffers: Vec<Vec<u8>>) -> Result<Self> {
        if let Some(expected) = variant.plane_count() {
            if buffers.len() != expected {
                return Err(Error::MalformedBuffers(format!(
                    "{variant} takes {expected} planes, got {}",
                    buffers.len()
                )));
            }
        }

        let bitmap = match variant {
            Variant::Array8 => Bitmap::Array8(Planes::new(buffers)?),
            Variant::Array16 => Bitmap::Array16(Planes::new(buffers)?),
            Variant::Array24 => Bitmap::Array24(Planes::new(buffers)?),
            Variant::Array32 => Bitmap::Array32(Planes::new(buffers)?),
            Variant::ArrayGeneric => Bitmap::ArrayGeneric(Planes::new(buffers)?),
            Variant::Array32Offset => Bitmap::Array32Offset(Flat::new(single(variant, buffers)?)?),
            Variant::Array64Offset => Bitmap::Array64Offset(Flat::new(single(variant, buffers)?)?),
        };
        Ok(bitmap)
    }

    pub fn variant(&self) -> Variant {
        match self {
            Bitmap::Array8(_) => Variant::Array8,
            Bitmap::Array16(_) => Variant::Array16,
            Bitmap::Array24(_) => Variant::Array24,
            Bitmap::Array32(_) => Variant::Array32,
            Bitmap::Array32Offset(_) => Variant::Array32Offset,
            Bitmap::Array64Offset(_) => Variant::Array64Offset,
            Bitmap::ArrayGeneric(_) => Variant::ArrayGeneric,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Bitmap::Array8(p)
            | Bitmap::Array16(p)
            | Bitmap::Array24(p)
            | Bitmap::Array32(p)
            | Bitmap::ArrayGeneric(p) => p.len(),
            Bitmap::Array32Offset(f) => f.len(),
            Bitmap::Array64Offset(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded value at `idx`. Panics when `idx >= self.len()`.
    #[inline]
    pub fn get(&self, idx: usize) -> u64 {
        match self {
            Bitmap::Array8(p) => p.byte(0, idx),
            Bitmap::Array16(p) => (p.byte(0, idx) << 8) | p.byte(1, idx),
            Bitmap::Array24(p) => (p.byte(0, idx) << 16) | (p.byte(1, idx) << 8) | p.byte(2, idx),
            Bitmap::Array32(p) => {
                (p.byte(0, idx) << 24)
                    | (p.byte(1, idx) << 16)
                    | (p.byte(2, idx) << 8)
                    | p.byte(3, idx)
            }
            Bitmap::Array32Offset(f) => f.get(idx),
            Bitmap::Array64Offset(f) => f.get(idx),
            Bitmap::ArrayGeneric(p) => p.get(idx),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

fn single(variant: Variant, mut buffers: Vec<Vec<u8>>) -> Result<Vec<u8>> {
    if buffers.len() != 1 {
        return Err(Error::MalformedBuffers(format!(
            "{variant} takes one flat buffer, got {}",
            buffers.len()
        )));
    }
    Ok(buffers.remove(0))
}
