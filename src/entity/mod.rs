// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The decoded object model: entities, components, and field specs.

pub mod tree;

use std::borrow::Cow;

use serde::Serialize;

use crate::core::value::FieldMap;

/// A length-prefixed byte run: an entity/component name, a path, or one
/// entry of a comma-separated tag list.
///
/// Stored as raw bytes rather than `String` — `ByteCursor`'s
/// length-prefixed reads are documented as opaque 8-bit code units with no
/// UTF-8 validation, and a lossy conversion here would silently break the
/// byte-exact round-trip invariant for any file with non-UTF-8 content in
/// these fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct OpaqueText(pub Vec<u8>);

impl OpaqueText {
    /// Wrap raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        OpaqueText(bytes.into())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Best-effort text rendering for display and JSON dumps; not used on
    /// the encode path, which always re-emits the original bytes.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&str> for OpaqueText {
    fn from(s: &str) -> Self {
        OpaqueText(s.as_bytes().to_vec())
    }
}

impl From<String> for OpaqueText {
    fn from(s: String) -> Self {
        OpaqueText(s.into_bytes())
    }
}

impl Serialize for OpaqueText {
    // Rendered as best-effort text for inspection/JSON-dump purposes only;
    // the encode path always works from the original bytes, never from a
    // JSON round-trip of this representation.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

const TAG_SEPARATOR: u8 = b',';

/// Split a raw comma-separated tag run into its entries. An empty run
/// decodes to an empty tag list, not a single empty tag.
pub fn split_tags(bytes: &[u8]) -> Vec<OpaqueText> {
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .split(|&b| b == TAG_SEPARATOR)
        .map(|chunk| OpaqueText::from_bytes(chunk.to_vec()))
        .collect()
}

/// Join a tag list back into its raw comma-separated run, the inverse of
/// [`split_tags`].
pub fn join_tags(tags: &[OpaqueText]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push(TAG_SEPARATOR);
        }
        out.extend_from_slice(tag.as_bytes());
    }
    out
}

/// A `(field_name, type_string)` pair. The ordered list of a component's
/// `FieldSpec`s is its decoding program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as declared in the schema.
    pub name: String,
    /// C++-mangled type string driving `TypeCodec` dispatch.
    pub type_string: String,
}

impl FieldSpec {
    /// Construct a field spec.
    pub fn new(name: impl Into<String>, type_string: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            type_string: type_string.into(),
        }
    }
}

/// A single attached component on an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Component name; keys into the active `SchemaRegistry`.
    pub name: OpaqueText,
    /// Tag list, decoded from the comma-separated run as-is.
    pub tags: Vec<OpaqueText>,
    /// Whether the component is enabled.
    pub enabled: bool,
    /// Opaque 1-byte flag, preserved verbatim. Observed `0x01`.
    pub flag_byte: u8,
    /// Field values in schema-declared order.
    pub fields: FieldMap,
}

/// A single node in the entity tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Entity name.
    pub name: OpaqueText,
    /// Entity path.
    pub path: OpaqueText,
    /// Tag list, decoded from the comma-separated run as-is.
    pub tags: Vec<OpaqueText>,
    /// Transform position.
    pub x: f32,
    /// Transform position.
    pub y: f32,
    /// Transform scale.
    pub size_x: f32,
    /// Transform scale.
    pub size_y: f32,
    /// Transform rotation.
    pub rotation: f32,
    /// Opaque 1-byte flag, preserved verbatim. Observed `0x00`.
    pub flag_byte: u8,
    /// Attached components, in on-disk order.
    pub components: Vec<Component>,
    /// Child entities, in on-disk (pre-order) order.
    pub children: Vec<Entity>,
}

impl Entity {
    /// Count this entity and every descendant.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Entity::subtree_len)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Entity {
        Entity {
            name: name.into(),
            path: "".into(),
            tags: vec![],
            x: 0.0,
            y: 0.0,
            size_x: 1.0,
            size_y: 1.0,
            rotation: 0.0,
            flag_byte: 0,
            components: vec![],
            children: vec![],
        }
    }

    #[test]
    fn subtree_len_counts_nested_children() {
        let mut root = leaf("root");
        root.children = vec![leaf("a"), leaf("b")];
        assert_eq!(root.subtree_len(), 3);
    }

    #[test]
    fn empty_tag_run_splits_to_no_tags() {
        assert_eq!(split_tags(b""), Vec::new());
    }

    #[test]
    fn tag_run_roundtrips_through_split_and_join() {
        let raw = b"alpha,beta,gamma".to_vec();
        let tags = split_tags(&raw);
        assert_eq!(tags.len(), 3);
        assert_eq!(join_tags(&tags), raw);
    }
}
