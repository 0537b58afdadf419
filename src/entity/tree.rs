// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decodes and encodes the depth-first entity stream, reconstructing the
//! parent/child structure from each node's trailing child count.

use std::collections::VecDeque;

use crate::core::error::{CodecError, Result};
use crate::core::value::FieldMap;
use crate::entity::{join_tags, split_tags, Component, Entity, OpaqueText};
use crate::format::cursor::{ByteCursor, ByteWriter};
use crate::schema::registry::Schema;
use crate::typecodec;

/// Decode the entity-tree stream (everything after the frame header) into
/// the forest of top-level entities.
///
/// Implements spec.md §4.5's reconstruction: every entity record is read
/// sequentially off the stream into a flat queue, then a recursive
/// pop-front assembler turns that flat, pre-order queue plus each node's
/// trailing child count back into nested subtrees.
pub fn decode(schema: &Schema, stream: &[u8]) -> Result<Vec<Entity>> {
    let mut cursor = ByteCursor::new(stream);
    let total_entities = cursor.read_u32_be()? as usize;

    let mut queue: VecDeque<(EntityBody, u32)> = VecDeque::with_capacity(total_entities);
    for _ in 0..total_entities {
        queue.push_back(decode_entity_record(&mut cursor, schema)?);
    }

    let mut roots = Vec::new();
    while !queue.is_empty() {
        roots.push(assemble_one(&mut queue)?);
    }
    Ok(roots)
}

/// Encode a forest of top-level entities back to their byte stream, the
/// exact inverse of [`decode`].
///
/// Each entity's children are written by recursing directly into the
/// shared writer, so a subtree's bytes are always appended in full — the
/// reference implementation's `save_entity` bug (recursing on children but
/// discarding the call's output) has no analogue here.
pub fn encode(entities: &[Entity], schema: &Schema) -> Result<Vec<u8>> {
    let total_entities: u32 = entities.iter().map(|e| e.subtree_len() as u32).sum();
    let mut writer = ByteWriter::new();
    writer.write_u32_be(total_entities);
    for entity in entities {
        encode_entity(entity, schema, &mut writer)?;
    }
    Ok(writer.into_bytes())
}

/// Everything about an entity except its (not yet known) children.
struct EntityBody {
    name: OpaqueText,
    path: OpaqueText,
    tags: Vec<OpaqueText>,
    x: f32,
    y: f32,
    size_x: f32,
    size_y: f32,
    rotation: f32,
    flag_byte: u8,
    components: Vec<Component>,
}

fn read_opaque_text(cursor: &mut ByteCursor) -> Result<OpaqueText> {
    Ok(OpaqueText::from_bytes(
        cursor.read_length_prefixed_bytes()?.to_vec(),
    ))
}

fn read_tags(cursor: &mut ByteCursor) -> Result<Vec<OpaqueText>> {
    Ok(split_tags(cursor.read_length_prefixed_bytes()?))
}

fn decode_entity_record(cursor: &mut ByteCursor, schema: &Schema) -> Result<(EntityBody, u32)> {
    let name = read_opaque_text(cursor)?;
    let flag_byte = cursor.read_u8()?;
    let path = read_opaque_text(cursor)?;
    let tags = read_tags(cursor)?;
    let x = cursor.read_f32_be()?;
    let y = cursor.read_f32_be()?;
    let size_x = cursor.read_f32_be()?;
    let size_y = cursor.read_f32_be()?;
    let rotation = cursor.read_f32_be()?;

    let component_count = cursor.read_u32_be()? as usize;
    let mut components = Vec::with_capacity(component_count);
    for _ in 0..component_count {
        components.push(decode_component(cursor, schema)?);
    }

    let child_count = cursor.read_u32_be()?;

    Ok((
        EntityBody {
            name,
            path,
            tags,
            x,
            y,
            size_x,
            size_y,
            rotation,
            flag_byte,
            components,
        },
        child_count,
    ))
}

fn decode_component(cursor: &mut ByteCursor, schema: &Schema) -> Result<Component> {
    let name = read_opaque_text(cursor)?;
    let flag_byte = cursor.read_u8()?;
    let enabled = cursor.read_bool()?;
    let tags = read_tags(cursor)?;

    let component_name = name.to_string_lossy().into_owned();
    let program = schema.program_for(&component_name)?;

    let mut fields = FieldMap::new();
    for (field_name, node) in program {
        let value = typecodec::decode(node, cursor)?;
        fields.insert(field_name.clone(), value);
    }

    Ok(Component {
        name,
        tags,
        enabled,
        flag_byte,
        fields,
    })
}

fn assemble_one(queue: &mut VecDeque<(EntityBody, u32)>) -> Result<Entity> {
    let (body, child_count) = queue
        .pop_front()
        .ok_or_else(|| CodecError::malformed("entity stream exhausted while assembling tree"))?;

    let mut children = Vec::with_capacity(child_count as usize);
    for _ in 0..child_count {
        children.push(assemble_one(queue)?);
    }

    Ok(Entity {
        name: body.name,
        path: body.path,
        tags: body.tags,
        x: body.x,
        y: body.y,
        size_x: body.size_x,
        size_y: body.size_y,
        rotation: body.rotation,
        flag_byte: body.flag_byte,
        components: body.components,
        children,
    })
}

fn encode_entity(entity: &Entity, schema: &Schema, writer: &mut ByteWriter) -> Result<()> {
    writer.write_length_prefixed_bytes(entity.name.as_bytes());
    writer.write_u8(entity.flag_byte);
    writer.write_length_prefixed_bytes(entity.path.as_bytes());
    writer.write_length_prefixed_bytes(&join_tags(&entity.tags));
    writer.write_f32_be(entity.x);
    writer.write_f32_be(entity.y);
    writer.write_f32_be(entity.size_x);
    writer.write_f32_be(entity.size_y);
    writer.write_f32_be(entity.rotation);

    writer.write_u32_be(entity.components.len() as u32);
    for component in &entity.components {
        encode_component(component, schema, writer)?;
    }

    writer.write_u32_be(entity.children.len() as u32);
    for child in &entity.children {
        encode_entity(child, schema, writer)?;
    }
    Ok(())
}

fn encode_component(component: &Component, schema: &Schema, writer: &mut ByteWriter) -> Result<()> {
    writer.write_length_prefixed_bytes(component.name.as_bytes());
    writer.write_u8(component.flag_byte);
    writer.write_bool(component.enabled);
    writer.write_length_prefixed_bytes(&join_tags(&component.tags));

    let component_name = component.name.to_string_lossy().into_owned();
    let program = schema.program_for(&component_name)?;
    for (field_name, node) in program {
        let value = component.fields.get(field_name).ok_or_else(|| {
            CodecError::malformed(format!(
                "component '{component_name}' missing field '{field_name}'"
            ))
        })?;
        typecodec::encode(node, value, writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use indexmap::IndexMap;

    fn schema_with(components: &[(&str, &[(&str, &str)])]) -> Schema {
        let mut fields_by_component = IndexMap::new();
        for (name, fields) in components {
            let specs = fields
                .iter()
                .map(|(n, t)| crate::entity::FieldSpec::new(*n, *t))
                .collect();
            fields_by_component.insert(name.to_string(), specs);
        }
        Schema::new(fields_by_component, HashMap::new())
    }

    #[test]
    fn decodes_single_root_entity_scenario() {
        // spec.md §8 S2.
        let schema = schema_with(&[]);
        let mut stream = ByteWriter::new();
        stream.write_u32_be(1); // total_entities
        stream.write_length_prefixed_bytes(b"e");
        stream.write_u8(0); // flag
        stream.write_length_prefixed_bytes(b""); // path
        stream.write_length_prefixed_bytes(b""); // tags
        stream.write_f32_be(0.0);
        stream.write_f32_be(0.0);
        stream.write_f32_be(1.0);
        stream.write_f32_be(1.0);
        stream.write_f32_be(0.0);
        stream.write_u32_be(0); // component_count
        stream.write_u32_be(0); // child_count
        let bytes = stream.into_bytes();

        let entities = decode(&schema, &bytes).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name.as_bytes(), b"e");
        assert!(entities[0].children.is_empty());

        let reencoded = encode(&entities, &schema).unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn reconstructs_nested_subtree_from_flat_preorder_queue() {
        let schema = schema_with(&[]);
        let mut stream = ByteWriter::new();
        stream.write_u32_be(3); // A, B, C

        // A has 2 children (B, C).
        write_bare_entity(&mut stream, b"A", 2);
        write_bare_entity(&mut stream, b"B", 0);
        write_bare_entity(&mut stream, b"C", 0);
        let bytes = stream.into_bytes();

        let roots = decode(&schema, &bytes).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name.as_bytes(), b"A");
        assert_eq!(roots[0].children.len(), 2);
        assert_eq!(roots[0].children[0].name.as_bytes(), b"B");
        assert_eq!(roots[0].children[1].name.as_bytes(), b"C");

        let reencoded = encode(&roots, &schema).unwrap();
        assert_eq!(reencoded, bytes);
    }

    fn write_bare_entity(writer: &mut ByteWriter, name: &[u8], child_count: u32) {
        writer.write_length_prefixed_bytes(name);
        writer.write_u8(0);
        writer.write_length_prefixed_bytes(b"");
        writer.write_length_prefixed_bytes(b"");
        writer.write_f32_be(0.0);
        writer.write_f32_be(0.0);
        writer.write_f32_be(1.0);
        writer.write_f32_be(1.0);
        writer.write_f32_be(0.0);
        writer.write_u32_be(0);
        writer.write_u32_be(child_count);
    }

    #[test]
    fn exhausted_stream_during_assembly_is_malformed() {
        let schema = schema_with(&[]);
        let mut stream = ByteWriter::new();
        stream.write_u32_be(1);
        // Entity claims 5 children but only 1 entity total exists.
        write_bare_entity(&mut stream, b"lonely", 5);
        let bytes = stream.into_bytes();
        assert!(decode(&schema, &bytes).is_err());
    }
}
