// src/bitmap/planes.rs
// Byte planes: plane k holds byte (w-1-k) of every element, so reading the
// planes top to bottom at one index rebuilds the value.

use crate::error::{Error, Result};

pub const MAX_PLANES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planes {
    planes: Box<[Box<[u8]>]>,
    len: usize,
}

impl Planes {
    pub fn new(buffers: Vec<Vec<u8>>) -> Result<Self> {
        if buffers.is_empty() || buffers.len() > MAX_PLANES {
            return Err(Error::MalformedBuffers(format!(
                "expected 1..={MAX_PLANES} planes, got {}",
                buffers.len()
            )));
        }
        let len = buffers[0].len();
        if let Some(k) = buffers.iter().position(|b| b.len() != len) {
            return Err(Error::MalformedBuffers(format!(
                "plane {k} has {} bytes, plane 0 has {len}",
                buffers[k].len()
            )));
        }
        Ok(Self {
            planes: buffers.into_iter().map(Vec::into_boxed_slice).collect(),
            len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn byte(&self, k: usize, idx: usize) -> u64 {
        self.planes[k][idx] as u64
    }

    /// Width-agnostic decode; the fixed variants unroll this.
    #[inline]
    pub fn get(&self, idx: usize) -> u64 {
        self.planes
            .iter()
            .fold(0u64, |acc, plane| (acc << 8) | plane[idx] as u64)
    }
}
