// src/encode.rs
//! Encoding selection: pick the narrowest codec for a table and emit its buffers.

use crate::{
    bitmap::{Bitmap, Variant, planes::MAX_PLANES},
    config::Options,
    error::{EncodeError, Result},
};

/// Parameters of the codec chosen for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTable {
    pub variant: Variant,
    /// Bytes per element, 1..=8.
    pub width: usize,
    /// `width` planes of `len` bytes each, or one flat buffer of `len * width` bytes.
    pub buffers: Vec<Vec<u8>>,
}

impl EncodedTable {
    pub fn packed_len(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    pub fn into_bitmap(self) -> Result<Bitmap> {
        Bitmap::new(self.variant, self.buffers)
    }
}

/// Smallest `w >= 1` with `max < 2^(8w)`.
pub fn byte_width(max: u128) -> usize {
    let bits = (u128::BITS - max.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

pub fn select(numbers: &[u128], opts: &Options) -> std::result::Result<EncodedTable, EncodeError> {
    let max = numbers.iter().copied().max().ok_or(EncodeError::Empty)?;
    let width = byte_width(max);
    if width > MAX_PLANES {
        return Err(EncodeError::Oversize { max, width });
    }
    // Every value fits in `width <= 8` bytes now.
    let numbers: Vec<u64> = numbers.iter().map(|&n| n as u64).collect();

    let (variant, buffers) = match width {
        1 => (Variant::Array8, planes_from(1, &numbers)),
        2 => (Variant::Array16, planes_from(2, &numbers)),
        3 => (Variant::Array24, planes_from(3, &numbers)),
        4 if opts.flat_offsets => (Variant::Array32Offset, vec![flat_from(4, &numbers)]),
        4 => (Variant::Array32, planes_from(4, &numbers)),
        8 if opts.flat_offsets => (Variant::Array64Offset, vec![flat_from(8, &numbers)]),
        w => (Variant::ArrayGeneric, planes_from(w, &numbers)),
    };

    Ok(EncodedTable {
        variant,
        width,
        buffers,
    })
}

// Split numbers into `width` planes, highest byte first. For [10, 100, 1000]
// and width 2:
//
//     "\x00\x00\x03"
//     "\x0a\x64\xe8"
//
// Read vertically, 0x000a, 0x0064 and 0x03e8.
fn planes_from(width: usize, numbers: &[u64]) -> Vec<Vec<u8>> {
    (0..width)
        .map(|k| {
            let shift = 8 * (width - 1 - k);
            numbers.iter().map(|&n| (n >> shift) as u8).collect()
        })
        .collect()
}

fn flat_from(width: usize, numbers: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(numbers.len() * width);
    for &n in numbers {
        out.extend_from_slice(&n.to_le_bytes()[..width]);
    }
    out
}
