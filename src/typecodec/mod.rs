// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Recursive type interpretation driven by the C++-mangled type grammar.
//!
//! A field's `type_string` is compiled once, at schema-load time, into a
//! closed [`TypeNode`] tree (per spec.md §9's design note — this mirrors
//! the teacher's compiled-decode-plan approach: one indirection per field
//! at decode time instead of repeated string-prefix matching). Strings that
//! match no dispatch rule and aren't in the `ObjectMap` compile to
//! [`TypeNode::Unknown`] rather than failing at compile time, so the error
//! carries the byte offset of the read that actually needed them — that
//! offset isn't known until decode.

pub mod grammar;
pub mod objectmap;

use crate::core::error::{CodecError, Result};
use crate::core::value::{FieldMap, TypedValue};
use crate::format::cursor::{ByteCursor, ByteWriter};
use crate::schema::registry::Schema;

const VECTOR2_PREFIX: &str = "class ceng::math::CVector2<";
const LENS_PREFIX: &str = "struct LensValue<";
const TRANSFORM_PREFIX: &str = "struct ceng::math::CXForm<";
const SEQUENCE_PREFIX: &str = "class std::vector<";
const STRING_MARKER: &str = "class std::basic_string<char,";
const SPRITE_STAINS_NULL: &str = "struct SpriteStains *";

/// A compiled, closed decode/encode program for one field's type string.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// `bool`.
    Bool,
    /// `float`.
    Float32,
    /// `double`.
    Float64,
    /// `int`/`int32`.
    Int32,
    /// `__int64`.
    Int64,
    /// `unsigned int`/`uint32`.
    UInt32,
    /// `unsigned __int64`.
    UInt64,
    /// `unsigned short`.
    UInt16,
    /// `CVector2<T>`.
    Vector2(Box<TypeNode>),
    /// `CXForm<T>`.
    Transform(Box<TypeNode>),
    /// `LensValue<T>` — the third field is always `int`, handled in
    /// `decode`/`encode` directly rather than stored here.
    Lens(Box<TypeNode>),
    /// `std::vector<T,...>`.
    Sequence(Box<TypeNode>),
    /// `std::basic_string<char,...>` / `string`.
    String,
    /// `UintArrayInline`.
    InlineUintArray,
    /// A `...Enum`-suffixed type, with its schema-declared width in bytes.
    Enum {
        /// Byte width of the backing unsigned integer (1, 2, 4, or 8).
        width: u8,
    },
    /// `struct SpriteStains *` — decodes to null, consumes zero bytes.
    SpriteStainsNull,
    /// An ObjectMap-resolved named aggregate, already compiled field by
    /// field in declared order.
    NamedObject(Vec<(String, TypeNode)>),
    /// No dispatch rule matched and the name isn't in the ObjectMap. Kept
    /// as data so the eventual `UnknownTypeError` can carry the offset of
    /// the read that discovered it, not the offset at schema-compile time.
    Unknown(String),
}

/// Compile a field's type string into a [`TypeNode`], recursing through
/// templated aggregates and the `ObjectMap`.
///
/// This performs no I/O and does not fail for unrecognised type strings —
/// those compile to [`TypeNode::Unknown`] and are only reported as errors
/// when `decode`/`encode` actually reach them. It can fail for a type
/// string that matches the `Enum` dispatch rule but has no declared width
/// in the schema, since that's a schema-construction problem rather than a
/// decode-time one.
pub fn compile(type_string: &str, schema: &Schema) -> Result<TypeNode> {
    let t = type_string.trim();

    if t == "bool" {
        return Ok(TypeNode::Bool);
    }
    if t == "float" {
        return Ok(TypeNode::Float32);
    }
    if t == "double" {
        return Ok(TypeNode::Float64);
    }
    if t == "int" || t == "int32" {
        return Ok(TypeNode::Int32);
    }
    if t == "__int64" {
        return Ok(TypeNode::Int64);
    }
    if t == "unsigned int" || t == "uint32" {
        return Ok(TypeNode::UInt32);
    }
    if t == "unsigned __int64" {
        return Ok(TypeNode::UInt64);
    }
    if t == "unsigned short" {
        return Ok(TypeNode::UInt16);
    }

    if let Some(inner) = grammar::strip_template(t, VECTOR2_PREFIX) {
        return Ok(TypeNode::Vector2(Box::new(compile(&inner, schema)?)));
    }
    if let Some(inner) = grammar::strip_template(t, LENS_PREFIX) {
        return Ok(TypeNode::Lens(Box::new(compile(&inner, schema)?)));
    }
    if let Some(inner) = grammar::strip_template(t, TRANSFORM_PREFIX) {
        return Ok(TypeNode::Transform(Box::new(compile(&inner, schema)?)));
    }
    if let Some(content) = grammar::strip_template(t, SEQUENCE_PREFIX) {
        let element_type = grammar::first_top_level_segment(&content);
        return Ok(TypeNode::Sequence(Box::new(compile(element_type, schema)?)));
    }

    if t.starts_with(STRING_MARKER) || t == "string" {
        return Ok(TypeNode::String);
    }
    if t == "UintArrayInline" || t == "struct UintArrayInline" {
        return Ok(TypeNode::InlineUintArray);
    }

    if t.ends_with("Enum") {
        let width = schema.size_of_type(t).ok_or_else(|| {
            CodecError::schema(
                "<in-memory schema>",
                format!("no declared size for enum type '{t}'"),
            )
        })?;
        return Ok(TypeNode::Enum { width: width as u8 });
    }

    if t == SPRITE_STAINS_NULL {
        return Ok(TypeNode::SpriteStainsNull);
    }

    if let Some(entries) = objectmap::lookup(t) {
        let mut fields = Vec::with_capacity(entries.len());
        for &(name, field_type) in entries {
            fields.push((name.to_string(), compile(field_type, schema)?));
        }
        return Ok(TypeNode::NamedObject(fields));
    }

    Ok(TypeNode::Unknown(t.to_string()))
}

/// Decode one value according to a compiled [`TypeNode`].
///
/// Enforces spec.md §4.4's edge-case policy: a type's on-disk
/// representation is never zero bytes except for `SpriteStains *`, which
/// decodes to [`TypedValue::Null`]. Any other type that consumed no bytes
/// indicates a malformed stream rather than a legitimately empty value.
pub fn decode(node: &TypeNode, cursor: &mut ByteCursor) -> Result<TypedValue> {
    let start = cursor.position();
    let value = decode_dispatch(node, cursor)?;
    if !value.is_zero_byte() && cursor.position() == start {
        return Err(CodecError::malformed(format!(
            "type {node:?} consumed zero bytes while decoding a non-null value"
        )));
    }
    Ok(value)
}

fn decode_dispatch(node: &TypeNode, cursor: &mut ByteCursor) -> Result<TypedValue> {
    match node {
        TypeNode::Bool => Ok(TypedValue::Bool(cursor.read_bool()?)),
        TypeNode::Float32 => Ok(TypedValue::Float32(cursor.read_f32_be()?)),
        TypeNode::Float64 => Ok(TypedValue::Float64(cursor.read_f64_be()?)),
        TypeNode::Int32 => Ok(TypedValue::Int32(cursor.read_i32_be()?)),
        TypeNode::Int64 => Ok(TypedValue::Int64(cursor.read_i64_be()?)),
        TypeNode::UInt32 => Ok(TypedValue::UInt32(cursor.read_u32_be()?)),
        TypeNode::UInt64 => Ok(TypedValue::UInt64(cursor.read_u64_be()?)),
        TypeNode::UInt16 => Ok(TypedValue::UInt16(cursor.read_u16_be()?)),

        TypeNode::Vector2(inner) => {
            let a = decode(inner, cursor)?;
            let b = decode(inner, cursor)?;
            Ok(TypedValue::Vector2(Box::new(a), Box::new(b)))
        }

        TypeNode::Transform(inner) => {
            let position = TypedValue::Vector2(
                Box::new(decode(inner, cursor)?),
                Box::new(decode(inner, cursor)?),
            );
            let scale = TypedValue::Vector2(
                Box::new(decode(inner, cursor)?),
                Box::new(decode(inner, cursor)?),
            );
            let rotation = decode(inner, cursor)?;
            Ok(TypedValue::Transform {
                position: Box::new(position),
                scale: Box::new(scale),
                rotation: Box::new(rotation),
            })
        }

        TypeNode::Lens(inner) => {
            let value = decode(inner, cursor)?;
            let default = decode(inner, cursor)?;
            let frame = cursor.read_i32_be()?;
            Ok(TypedValue::Lens {
                value: Box::new(value),
                default: Box::new(default),
                frame,
            })
        }

        TypeNode::Sequence(inner) => {
            let len = cursor.read_u32_be()? as usize;
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(decode(inner, cursor)?);
            }
            Ok(TypedValue::Sequence(values))
        }

        TypeNode::String => Ok(TypedValue::String(
            cursor.read_length_prefixed_bytes()?.to_vec(),
        )),

        TypeNode::InlineUintArray => {
            let count = cursor.read_u32_be()? as usize;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(cursor.read_u32_be()?);
            }
            Ok(TypedValue::InlineUintArray(values))
        }

        TypeNode::Enum { width } => {
            let value = cursor.read_uint_be(*width as usize)?;
            Ok(TypedValue::Enum {
                value,
                width: *width,
            })
        }

        TypeNode::SpriteStainsNull => Ok(TypedValue::Null),

        TypeNode::NamedObject(fields) => {
            let mut map = FieldMap::new();
            for (name, field_node) in fields {
                map.insert(name.clone(), decode(field_node, cursor)?);
            }
            Ok(TypedValue::NamedObject(map))
        }

        TypeNode::Unknown(type_string) => {
            Err(CodecError::unknown_type(type_string.clone(), cursor.position()))
        }
    }
}

/// Encode one value according to a compiled [`TypeNode`], the exact
/// inverse of [`decode`].
///
/// Enforces the same zero-byte edge-case policy as [`decode`]: encoding a
/// non-null value must write at least one byte.
pub fn encode(node: &TypeNode, value: &TypedValue, writer: &mut ByteWriter) -> Result<()> {
    let start = writer.len();
    encode_dispatch(node, value, writer)?;
    if !value.is_zero_byte() && writer.len() == start {
        return Err(CodecError::malformed(format!(
            "type {node:?} wrote zero bytes while encoding a non-null value"
        )));
    }
    Ok(())
}

fn encode_dispatch(node: &TypeNode, value: &TypedValue, writer: &mut ByteWriter) -> Result<()> {
    match (node, value) {
        (TypeNode::Bool, TypedValue::Bool(b)) => writer.write_bool(*b),
        (TypeNode::Float32, TypedValue::Float32(v)) => writer.write_f32_be(*v),
        (TypeNode::Float64, TypedValue::Float64(v)) => writer.write_f64_be(*v),
        (TypeNode::Int32, TypedValue::Int32(v)) => writer.write_i32_be(*v),
        (TypeNode::Int64, TypedValue::Int64(v)) => writer.write_i64_be(*v),
        (TypeNode::UInt32, TypedValue::UInt32(v)) => writer.write_u32_be(*v),
        (TypeNode::UInt64, TypedValue::UInt64(v)) => writer.write_u64_be(*v),
        (TypeNode::UInt16, TypedValue::UInt16(v)) => writer.write_u16_be(*v),

        (TypeNode::Vector2(inner), TypedValue::Vector2(a, b)) => {
            encode(inner, a, writer)?;
            encode(inner, b, writer)?;
        }

        (
            TypeNode::Transform(inner),
            TypedValue::Transform {
                position,
                scale,
                rotation,
            },
        ) => {
            encode_vector2(inner, position, writer)?;
            encode_vector2(inner, scale, writer)?;
            encode(inner, rotation, writer)?;
        }

        (
            TypeNode::Lens(inner),
            TypedValue::Lens {
                value,
                default,
                frame,
            },
        ) => {
            encode(inner, value, writer)?;
            encode(inner, default, writer)?;
            writer.write_i32_be(*frame);
        }

        (TypeNode::Sequence(inner), TypedValue::Sequence(values)) => {
            writer.write_u32_be(values.len() as u32);
            for v in values {
                encode(inner, v, writer)?;
            }
        }

        (TypeNode::String, TypedValue::String(bytes)) => {
            writer.write_length_prefixed_bytes(bytes);
        }

        (TypeNode::InlineUintArray, TypedValue::InlineUintArray(values)) => {
            writer.write_u32_be(values.len() as u32);
            for v in values {
                writer.write_u32_be(*v);
            }
        }

        (TypeNode::Enum { width }, TypedValue::Enum { value, .. }) => {
            writer.write_uint_be(*value, *width as usize);
        }

        (TypeNode::SpriteStainsNull, TypedValue::Null) => {}

        (TypeNode::NamedObject(fields), TypedValue::NamedObject(map)) => {
            for (name, field_node) in fields {
                let field_value = map.get(name).ok_or_else(|| {
                    CodecError::malformed(format!("named object missing field '{name}'"))
                })?;
                encode(field_node, field_value, writer)?;
            }
        }

        (TypeNode::Unknown(type_string), _) => {
            return Err(CodecError::unknown_type(
                type_string.clone(),
                writer.len() as u64,
            ));
        }

        (node, value) => {
            return Err(CodecError::malformed(format!(
                "value {value:?} does not match compiled type {node:?}"
            )));
        }
    }
    Ok(())
}

fn encode_vector2(inner: &TypeNode, value: &TypedValue, writer: &mut ByteWriter) -> Result<()> {
    match value {
        TypedValue::Vector2(a, b) => {
            encode(inner, a, writer)?;
            encode(inner, b, writer)?;
            Ok(())
        }
        other => Err(CodecError::malformed(format!(
            "expected a Vector2 for CXForm position/scale, found {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use indexmap::IndexMap;

    fn empty_schema() -> Schema {
        Schema::new(IndexMap::new(), HashMap::new())
    }

    fn schema_with_enum_width(type_name: &str, width: u64) -> Schema {
        let mut size_by_type = HashMap::new();
        size_by_type.insert(type_name.to_string(), width);
        Schema::new(IndexMap::new(), size_by_type)
    }

    #[test]
    fn compiles_primitive_and_vector_of_float() {
        let schema = empty_schema();
        let node = compile(
            "class std::vector<float,class std::allocator<float> >",
            &schema,
        )
        .unwrap();
        assert_eq!(node, TypeNode::Sequence(Box::new(TypeNode::Float32)));
    }

    #[test]
    fn decodes_vector_of_float_scenario() {
        // spec.md §8 S3.
        let schema = empty_schema();
        let node = compile(
            "class std::vector<float,class std::allocator<float> >",
            &schema,
        )
        .unwrap();
        let bytes = [0x00, 0x00, 0x00, 0x02, 0x3F, 0x80, 0x00, 0x00, 0xC0, 0x20, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&bytes);
        let value = decode(&node, &mut cursor).unwrap();
        match value {
            TypedValue::Sequence(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(v[0], TypedValue::Float32(1.0));
                assert_eq!(v[1], TypedValue::Float32(-2.5));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn decodes_cxform_scenario() {
        // spec.md §8 S4.
        let schema = empty_schema();
        let node = compile("struct ceng::math::CXForm<float>", &schema).unwrap();
        let bytes = [
            0x3F, 0x80, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x40, 0x40, 0x00, 0x00, 0x40, 0x80,
            0x00, 0x00, 0x3F, 0x00, 0x00, 0x00,
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let value = decode(&node, &mut cursor).unwrap();
        match value {
            TypedValue::Transform {
                position,
                scale,
                rotation,
            } => {
                assert_eq!(*position, TypedValue::Vector2(Box::new(TypedValue::Float32(1.0)), Box::new(TypedValue::Float32(2.0))));
                assert_eq!(*scale, TypedValue::Vector2(Box::new(TypedValue::Float32(3.0)), Box::new(TypedValue::Float32(4.0))));
                assert_eq!(*rotation, TypedValue::Float32(0.5));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn decodes_enum_with_declared_width() {
        // spec.md §8 S5.
        let schema = schema_with_enum_width("SomeEnum", 2);
        let node = compile("SomeEnum", &schema).unwrap();
        let bytes = [0x00, 0x07];
        let mut cursor = ByteCursor::new(&bytes);
        let value = decode(&node, &mut cursor).unwrap();
        assert_eq!(value, TypedValue::Enum { value: 7, width: 2 });
    }

    #[test]
    fn sprite_stains_null_consumes_no_bytes() {
        let schema = empty_schema();
        let node = compile("struct SpriteStains *", &schema).unwrap();
        let bytes: [u8; 0] = [];
        let mut cursor = ByteCursor::new(&bytes);
        let value = decode(&node, &mut cursor).unwrap();
        assert_eq!(value, TypedValue::Null);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn unknown_type_reports_offset_not_at_compile_time() {
        let schema = empty_schema();
        let node = compile("struct TotallyUnrecognised", &schema).unwrap();
        assert_eq!(node, TypeNode::Unknown("struct TotallyUnrecognised".to_string()));

        let bytes = [0u8; 4];
        let mut cursor = ByteCursor::new(&bytes);
        cursor.read_u8().unwrap();
        let err = decode(&node, &mut cursor).unwrap_err();
        match err {
            CodecError::UnknownType { offset, .. } => assert_eq!(offset, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn objectmap_named_aggregate_roundtrips() {
        let schema = empty_schema();
        let node = compile("ValueRange", &schema).unwrap();
        let mut writer = ByteWriter::new();
        let mut map = FieldMap::new();
        map.insert("min".to_string(), TypedValue::Float32(0.0));
        map.insert("max".to_string(), TypedValue::Float32(10.0));
        let value = TypedValue::NamedObject(map);
        encode(&node, &value, &mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        let decoded = decode(&node, &mut cursor).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn objectmap_named_aggregate_with_templated_field_roundtrips() {
        // AreaBounds nests CVector2<float> fields inside a NamedObject,
        // exercising the ObjectMap -> compile() -> TypeNode::Vector2 path.
        let schema = empty_schema();
        let node = compile("AreaBounds", &schema).unwrap();
        assert_eq!(
            node,
            TypeNode::NamedObject(vec![
                ("center".to_string(), TypeNode::Vector2(Box::new(TypeNode::Float32))),
                ("half_size".to_string(), TypeNode::Vector2(Box::new(TypeNode::Float32))),
            ])
        );

        let mut writer = ByteWriter::new();
        let mut map = FieldMap::new();
        map.insert(
            "center".to_string(),
            TypedValue::Vector2(Box::new(TypedValue::Float32(1.0)), Box::new(TypedValue::Float32(2.0))),
        );
        map.insert(
            "half_size".to_string(),
            TypedValue::Vector2(Box::new(TypedValue::Float32(0.5)), Box::new(TypedValue::Float32(0.5))),
        );
        let value = TypedValue::NamedObject(map);
        encode(&node, &value, &mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 16); // 4 f32 fields total: center.x/y, half_size.x/y

        let mut cursor = ByteCursor::new(&bytes);
        let decoded = decode(&node, &mut cursor).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_rejects_a_non_null_type_that_consumes_zero_bytes() {
        // SpriteStainsNull is the only TypeNode allowed to consume zero
        // bytes; a NamedObject with no declared fields would otherwise
        // silently decode to an empty map without moving the cursor.
        let node = TypeNode::NamedObject(vec![]);
        let bytes: [u8; 0] = [];
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode(&node, &mut cursor).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn encode_rejects_a_non_null_type_that_writes_zero_bytes() {
        let node = TypeNode::NamedObject(vec![]);
        let value = TypedValue::NamedObject(FieldMap::new());
        let mut writer = ByteWriter::new();
        let err = encode(&node, &value, &mut writer).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }
}
