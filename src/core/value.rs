// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unified value representation for decoded entity-scene fields.
//!
//! Every field of every component decodes to a [`TypedValue`]. The variant
//! set mirrors the sum type in spec.md §3: primitives, a length-prefixed
//! string of opaque bytes (no UTF-8 validation — the engine's strings are
//! 8-bit code units, not guaranteed UTF-8), sequences, the handful of
//! templated aggregates the engine's type grammar names directly
//! (`CVector2<T>`, `CXForm<T>`, `LensValue<T>`), an opaque enum integer, an
//! inline uint32 array, a null sentinel, and an ordered named-object map for
//! ObjectMap-driven aggregates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered field-name → value map, as declared by a schema or ObjectMap entry.
pub type FieldMap = IndexMap<String, TypedValue>;

/// A decoded (or to-be-encoded) value for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    /// `bool` — one byte, strictly 0 or 1.
    Bool(bool),

    /// `int`/`int32`.
    Int32(i32),
    /// `__int64`.
    Int64(i64),
    /// `unsigned int`/`uint32`.
    UInt32(u32),
    /// `unsigned __int64`.
    UInt64(u64),
    /// `unsigned short`.
    UInt16(u16),

    /// `float`.
    Float32(f32),
    /// `double`.
    Float64(f64),

    /// `class std::basic_string<char,...>` / `string` — opaque 8-bit bytes,
    /// not validated as UTF-8.
    String(Vec<u8>),

    /// `class std::vector<T,...>`.
    Sequence(Vec<TypedValue>),

    /// `class ceng::math::CVector2<T>` — always exactly two elements,
    /// read/written in order.
    Vector2(Box<TypedValue>, Box<TypedValue>),

    /// `struct ceng::math::CXForm<T>` — `{position, scale, rotation}` in
    /// on-disk order.
    Transform {
        /// `CVector2<T>` position.
        position: Box<TypedValue>,
        /// `CVector2<T>` scale.
        scale: Box<TypedValue>,
        /// Bare `T` rotation.
        rotation: Box<TypedValue>,
    },

    /// `struct LensValue<T>` — `{value, default, frame}`; `frame` is always
    /// decoded as a plain `int` regardless of the outer template parameter.
    Lens {
        /// Current value.
        value: Box<TypedValue>,
        /// Default value.
        default: Box<TypedValue>,
        /// Frame index (always `int`).
        frame: i32,
    },

    /// A type string ending in `Enum` — an opaque unsigned integer whose
    /// on-disk width came from the schema's `size_by_type` table.
    Enum {
        /// The raw integer value.
        value: u64,
        /// Width in bytes as declared by the schema (1, 2, 4, or 8).
        width: u8,
    },

    /// `UintArrayInline` / `struct UintArrayInline` — count-prefixed array
    /// of `u32`.
    InlineUintArray(Vec<u32>),

    /// `struct SpriteStains *` — the only type that reads zero bytes.
    Null,

    /// An ObjectMap-driven named aggregate: ordered field name → value.
    NamedObject(FieldMap),
}

impl TypedValue {
    /// The type's on-disk representation is never zero bytes except for
    /// [`TypedValue::Null`], per spec.md §4.4's edge-case policy. Enforced
    /// by `typecodec::decode`/`encode`, which reject a non-null value that
    /// consumed or produced no bytes.
    pub fn is_zero_byte(&self) -> bool {
        matches!(self, TypedValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_the_only_zero_byte_value() {
        assert!(TypedValue::Null.is_zero_byte());
        assert!(!TypedValue::Bool(true).is_zero_byte());
        assert!(!TypedValue::Sequence(vec![]).is_zero_byte());
    }

    #[test]
    fn named_object_preserves_insertion_order() {
        let mut map = FieldMap::new();
        map.insert("b".to_string(), TypedValue::Int32(2));
        map.insert("a".to_string(), TypedValue::Int32(1));
        let v = TypedValue::NamedObject(map);
        let fields: Vec<&str> = match &v {
            TypedValue::NamedObject(m) => m.keys().map(|s| s.as_str()).collect(),
            _ => panic!("expected NamedObject"),
        };
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn serde_roundtrip() {
        let v = TypedValue::Vector2(
            Box::new(TypedValue::Float32(1.0)),
            Box::new(TypedValue::Float32(-2.5)),
        );
        let json = serde_json::to_string(&v).unwrap();
        let back: TypedValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
