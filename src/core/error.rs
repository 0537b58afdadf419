// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types for the entity-scene codec.

use std::fmt;

/// Errors that can occur while decoding or encoding an entity-scene file.
///
/// All variants are fatal for the current decode: there is no partial
/// recovery, and the decoder does not resynchronise after a bad byte.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// A structural expectation failed (bad sentinel, bool byte > 1, ...).
    Malformed {
        /// What was expected to be true.
        context: String,
    },

    /// FastLZ returned fewer bytes than the declared decompressed size.
    Decompression {
        /// Bytes the frame header declared.
        expected: usize,
        /// Bytes FastLZ actually produced.
        actual: usize,
    },

    /// The schema file was missing, unreadable, or unparseable.
    Schema {
        /// Schema file name (lowercase hex hash + `.xml`).
        schema_file: String,
        /// Why loading failed.
        reason: String,
    },

    /// A type string matched no dispatch rule and is not in the ObjectMap.
    UnknownType {
        /// The offending type string.
        type_string: String,
        /// Byte offset in the decode stream when the lookup failed.
        offset: u64,
    },

    /// A read would exceed the buffer's bounds.
    Truncated {
        /// Bytes requested.
        requested: usize,
        /// Bytes actually available.
        available: usize,
        /// Cursor position when the read was attempted.
        offset: u64,
    },

    /// A literal-byte expectation failed (`ByteCursor::expect`).
    Assertion {
        /// Bytes that were expected.
        expected: Vec<u8>,
        /// Bytes actually read.
        actual: Vec<u8>,
        /// Cursor position of the mismatch.
        offset: u64,
    },

    /// Top-level wrapper attaching the source file path to an inner error.
    InFile {
        /// Path of the file being decoded or encoded.
        path: String,
        /// The underlying failure.
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Build a [`CodecError::Malformed`] from a format-style context string.
    pub fn malformed(context: impl Into<String>) -> Self {
        CodecError::Malformed {
            context: context.into(),
        }
    }

    /// Build a [`CodecError::Decompression`].
    pub fn decompression(expected: usize, actual: usize) -> Self {
        CodecError::Decompression { expected, actual }
    }

    /// Build a [`CodecError::Schema`].
    pub fn schema(schema_file: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Schema {
            schema_file: schema_file.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CodecError::UnknownType`].
    pub fn unknown_type(type_string: impl Into<String>, offset: u64) -> Self {
        CodecError::UnknownType {
            type_string: type_string.into(),
            offset,
        }
    }

    /// Build a [`CodecError::Truncated`].
    pub fn truncated(requested: usize, available: usize, offset: u64) -> Self {
        CodecError::Truncated {
            requested,
            available,
            offset,
        }
    }

    /// Build a [`CodecError::Assertion`].
    pub fn assertion(expected: &[u8], actual: &[u8], offset: u64) -> Self {
        CodecError::Assertion {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
            offset,
        }
    }

    /// Attach a file path to this error, producing the top-level wrapper
    /// that the CLI reports on decode failure.
    pub fn in_file(self, path: impl Into<String>) -> Self {
        CodecError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed { context } => write!(f, "malformed input: {context}"),
            CodecError::Decompression { expected, actual } => write!(
                f,
                "decompression produced {actual} bytes, expected {expected}"
            ),
            CodecError::Schema {
                schema_file,
                reason,
            } => write!(f, "schema '{schema_file}': {reason}"),
            CodecError::UnknownType {
                type_string,
                offset,
            } => write!(f, "unknown type '{type_string}' at offset {offset}"),
            CodecError::Truncated {
                requested,
                available,
                offset,
            } => write!(
                f,
                "read of {requested} bytes at offset {offset} exceeds buffer ({available} bytes available)"
            ),
            CodecError::Assertion {
                expected,
                actual,
                offset,
            } => write!(
                f,
                "expected bytes {expected:02x?} at offset {offset}, found {actual:02x?}"
            ),
            CodecError::InFile { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
