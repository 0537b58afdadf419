// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The FastLZ boundary.
//!
//! FastLZ itself is an external collaborator: a pure function on fixed-size
//! buffers, out of scope for this codec. [`Decompressor`] and [`Compressor`]
//! are the injection points a caller implements against whatever FastLZ
//! binding they have; this crate ships no concrete algorithm.

use crate::core::error::Result;

/// Decompresses a FastLZ-compressed buffer to an exact known output length.
pub trait Decompressor {
    /// Decompress `src`, producing exactly `dst_len` bytes or an error.
    fn decompress(&self, src: &[u8], dst_len: usize) -> Result<Vec<u8>>;
}

/// Compresses a buffer with FastLZ.
pub trait Compressor {
    /// Compress `src`, returning the compressed bytes.
    fn compress(&self, src: &[u8]) -> Vec<u8>;
}

impl<F> Decompressor for F
where
    F: Fn(&[u8], usize) -> Result<Vec<u8>>,
{
    fn decompress(&self, src: &[u8], dst_len: usize) -> Result<Vec<u8>> {
        self(src, dst_len)
    }
}

impl<F> Compressor for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn compress(&self, src: &[u8]) -> Vec<u8> {
        self(src)
    }
}
