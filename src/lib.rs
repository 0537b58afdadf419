// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven binary codec for FastLZ-compressed entity-scene files.
//!
//! Control flow at decode time (spec.md §2): [`format::FrameCodec`] strips
//! the outer framing and FastLZ payload, [`schema::SchemaRegistry`]
//! resolves the embedded hash to a component/type dictionary,
//! [`entity::tree`] walks the depth-first entity stream, and
//! [`typecodec`] decodes each field against its compiled type program.
//! Encoding reverses the same pipeline.

pub mod core;
pub mod entity;
pub mod format;
pub mod schema;
pub mod typecodec;

pub use core::error::{CodecError, Result};
pub use entity::Entity;
pub use format::compression::{Compressor, Decompressor};
pub use schema::registry::{Schema, SchemaRegistry};

/// A fully decoded entity-scene file: the schema hash it was built against
/// and the forest of top-level entities.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DecodedScene {
    /// Raw 32-byte schema hash (empty for an empty file).
    pub schema_hash: Vec<u8>,
    /// Top-level entities, in on-disk pre-order.
    pub entities: Vec<Entity>,
}

/// Decode a whole entity-scene file's bytes.
pub fn decode<D: Decompressor>(
    file_bytes: &[u8],
    schema_registry: &SchemaRegistry,
    decompressor: &D,
) -> Result<DecodedScene> {
    let frame = format::frame::FrameCodec::decode(file_bytes, decompressor)?;

    if frame.is_empty {
        return Ok(DecodedScene {
            schema_hash: Vec::new(),
            entities: Vec::new(),
        });
    }

    let schema = schema_registry.load(&frame.schema_hash)?;
    let entities = entity::tree::decode(&schema, &frame.entity_stream)?;

    Ok(DecodedScene {
        schema_hash: frame.schema_hash,
        entities,
    })
}

/// Encode a [`DecodedScene`] back to file bytes, mirroring [`decode`]
/// exactly.
pub fn encode<C: Compressor>(
    scene: &DecodedScene,
    schema_registry: &SchemaRegistry,
    compressor: &C,
) -> Result<Vec<u8>> {
    if scene.entities.is_empty() {
        return Ok(format::frame::FrameCodec::encode(true, &[], &[], compressor));
    }

    let schema = schema_registry.load(&scene.schema_hash)?;
    let entity_stream = entity::tree::encode(&scene.entities, &schema)?;
    Ok(format::frame::FrameCodec::encode(
        false,
        &scene.schema_hash,
        &entity_stream,
        compressor,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::OpaqueText;
    use crate::format::cursor::ByteWriter;
    use std::io::Write;

    struct Identity;
    impl Decompressor for Identity {
        fn decompress(&self, src: &[u8], dst_len: usize) -> Result<Vec<u8>> {
            if src.len() != dst_len {
                return Err(CodecError::decompression(dst_len, src.len()));
            }
            Ok(src.to_vec())
        }
    }
    impl Compressor for Identity {
        fn compress(&self, src: &[u8]) -> Vec<u8> {
            src.to_vec()
        }
    }

    fn wrap_uncompressed(payload: &[u8]) -> Vec<u8> {
        let mut out = ByteWriter::new();
        out.write_u32_le(payload.len() as u32);
        out.write_u32_le(payload.len() as u32);
        out.write_bytes(payload);
        out.into_bytes()
    }

    #[test]
    fn empty_file_decodes_to_no_entities() {
        // spec.md §8 S1.
        let payload = [0x00, 0x02, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00];
        let file = wrap_uncompressed(&payload);
        let tmp = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::new(tmp.path());

        let scene = decode(&file, &registry, &Identity).unwrap();
        assert!(scene.entities.is_empty());
        assert!(scene.schema_hash.is_empty());
    }

    #[test]
    fn end_to_end_roundtrip_with_a_real_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let hash = [0x11u8; 32];
        let file_name = format!("{}.xml", hex::encode(hash));
        let xml = r#"<schema>
            <component component_name="Tag">
                <field name="label" size="0" type="string" />
            </component>
        </schema>"#;
        let mut f = std::fs::File::create(tmp.path().join(&file_name)).unwrap();
        f.write_all(xml.as_bytes()).unwrap();
        let registry = SchemaRegistry::new(tmp.path());

        let mut fields = crate::core::value::FieldMap::new();
        fields.insert(
            "label".to_string(),
            crate::core::value::TypedValue::String(b"hello".to_vec()),
        );
        let component = crate::entity::Component {
            name: OpaqueText::from("Tag"),
            tags: vec![],
            enabled: true,
            flag_byte: 1,
            fields,
        };
        let entity = Entity {
            name: OpaqueText::from("root"),
            path: OpaqueText::from(""),
            tags: vec![],
            x: 1.0,
            y: 2.0,
            size_x: 1.0,
            size_y: 1.0,
            rotation: 0.0,
            flag_byte: 0,
            components: vec![component],
            children: vec![],
        };
        let scene = DecodedScene {
            schema_hash: hash.to_vec(),
            entities: vec![entity],
        };

        let encoded = encode(&scene, &registry, &Identity).unwrap();
        let decoded = decode(&encoded, &registry, &Identity).unwrap();
        assert_eq!(decoded, scene);
    }
}
