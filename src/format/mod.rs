// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level framing: the cursor primitives and the outer container.

pub mod compression;
pub mod cursor;
pub mod frame;

pub use compression::{Compressor, Decompressor};
pub use cursor::{ByteCursor, ByteWriter};
pub use frame::{DecodedFrame, FrameCodec};
