// src/bitmap/offset.rs
// Flat little-endian buffer with a fixed element stride:
//   bytes[i*W .. i*W + W] = element i, least significant byte first

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flat<const W: usize> {
    bytes: Box<[u8]>,
}

impl<const W: usize> Flat<W> {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % W != 0 {
            return Err(Error::MalformedBuffers(format!(
                "flat buffer of {} bytes is not a multiple of stride {W}",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / W
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> u64 {
        let p = idx * W;
        let mut le = [0u8; 8];
        le[..W].copy_from_slice(&self.bytes[p..p + W]);
        u64::from_le_bytes(le)
    }
}
