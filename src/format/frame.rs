// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Outer container framing: compressed/decompressed sizes, the empty-file
//! sentinel, and the schema hash, around a FastLZ payload.

use crate::core::error::{CodecError, Result};
use crate::format::compression::{Compressor, Decompressor};
use crate::format::cursor::{ByteCursor, ByteWriter};

const EMPTY_SENTINEL: [u8; 4] = [0x00, 0x02, 0x00, 0x20];
const NONEMPTY_SENTINEL: [u8; 4] = [0x00, 0x00, 0x00, 0x02];
const HASH_SIZE: usize = 0x20;

/// The decompressed, header-stripped contents of an entity-scene file.
pub struct DecodedFrame {
    /// True when this file's sentinel marks it as having no entities.
    pub is_empty: bool,
    /// The 32-byte schema hash, or empty for an empty file.
    pub schema_hash: Vec<u8>,
    /// Everything after the header — the entity-tree stream for
    /// `EntityTree` to decode. Empty when `is_empty` is true.
    pub entity_stream: Vec<u8>,
}

/// Reads and writes the outer file framing.
pub struct FrameCodec;

impl FrameCodec {
    /// Decode a whole file's bytes: outer size header, FastLZ payload, and
    /// inner sentinel/hash header.
    pub fn decode<D: Decompressor>(file_bytes: &[u8], decompressor: &D) -> Result<DecodedFrame> {
        let mut outer = ByteCursor::new(file_bytes);
        let compressed_size = outer.read_u32_le()? as usize;
        let decompressed_size = outer.read_u32_le()? as usize;
        let compressed_payload = outer.read_bytes(compressed_size)?;

        let decompressed = decompressor.decompress(compressed_payload, decompressed_size)?;
        if decompressed.len() != decompressed_size {
            return Err(CodecError::decompression(
                decompressed_size,
                decompressed.len(),
            ));
        }

        let mut body = ByteCursor::new(&decompressed);
        let sentinel = body.read_bytes(4)?;
        let is_empty = if sentinel == EMPTY_SENTINEL {
            true
        } else if sentinel == NONEMPTY_SENTINEL {
            false
        } else {
            return Err(CodecError::malformed(format!(
                "unrecognised frame sentinel {sentinel:02x?}"
            )));
        };

        let hash_size = body.read_u32_be()? as usize;
        let expected_hash_size = if is_empty { 0 } else { HASH_SIZE };
        if hash_size != expected_hash_size {
            return Err(CodecError::malformed(format!(
                "hash_size {hash_size} inconsistent with empty={is_empty}"
            )));
        }
        let schema_hash = body.read_bytes(hash_size)?.to_vec();
        let entity_stream = body.read_bytes(body.remaining())?.to_vec();

        Ok(DecodedFrame {
            is_empty,
            schema_hash,
            entity_stream,
        })
    }

    /// Encode a frame, mirroring [`FrameCodec::decode`] exactly.
    pub fn encode<C: Compressor>(
        is_empty: bool,
        schema_hash: &[u8],
        entity_stream: &[u8],
        compressor: &C,
    ) -> Vec<u8> {
        let mut body = ByteWriter::new();
        if is_empty {
            body.write_bytes(&EMPTY_SENTINEL);
            body.write_u32_be(0);
        } else {
            body.write_bytes(&NONEMPTY_SENTINEL);
            body.write_u32_be(HASH_SIZE as u32);
            body.write_bytes(schema_hash);
        }
        body.write_bytes(entity_stream);
        let decompressed = body.into_bytes();

        let compressed = compressor.compress(&decompressed);

        let mut outer = ByteWriter::new();
        outer.write_u32_le(compressed.len() as u32);
        outer.write_u32_le(decompressed.len() as u32);
        outer.write_bytes(&compressed);
        outer.into_bytes()
    }
}
