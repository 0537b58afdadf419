// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The static named-aggregate table consulted as the last dispatch rule in
//! `TypeCodec`.
//!
//! spec.md §4.6 describes this as a ~100-entry table that is part of the
//! on-disk contract for a specific production schema this crate does not
//! ship. The entries below are a representative, non-exhaustive seed —
//! enough to exercise the mechanism (lookup, ordered recursion into
//! `TypeCodec`) end to end. Extending this table with further named
//! aggregates from a real schema does not require touching anything else in
//! `typecodec`.

use std::collections::HashMap;
use std::sync::OnceLock;

type FieldList = &'static [(&'static str, &'static str)];

static OBJECT_MAP: OnceLock<HashMap<&'static str, FieldList>> = OnceLock::new();

const CONFIG_EXPLOSION_FIELDS: FieldList = &[
    ("load", "float"),
    ("damage", "float"),
    ("radius", "float"),
    ("is_digger", "bool"),
];

const VALUE_RANGE_FIELDS: FieldList = &[("min", "float"), ("max", "float")];

const COLOR_RGBA_FIELDS: FieldList = &[
    ("r", "unsigned int"),
    ("g", "unsigned int"),
    ("b", "unsigned int"),
    ("a", "unsigned int"),
];

// A positional bounding area: its `center`/`half_size` fields are each a
// templated `CVector2<float>`, so compiling this entry recurses back
// through `compile()` into `TypeNode::Vector2` nested inside the
// `NamedObject`, the way a real position/size aggregate would.
const AREA_BOUNDS_FIELDS: FieldList = &[
    ("center", "class ceng::math::CVector2<float>"),
    ("half_size", "class ceng::math::CVector2<float>"),
];

fn build() -> HashMap<&'static str, FieldList> {
    let mut m = HashMap::new();
    m.insert("ConfigExplosion", CONFIG_EXPLOSION_FIELDS);
    m.insert("ValueRange", VALUE_RANGE_FIELDS);
    m.insert("ColorRgba", COLOR_RGBA_FIELDS);
    m.insert("AreaBounds", AREA_BOUNDS_FIELDS);
    m
}

/// Look up a named aggregate's ordered field list, if `type_name` is a
/// known ObjectMap entry.
pub fn lookup(type_name: &str) -> Option<FieldList> {
    OBJECT_MAP.get_or_init(build).get(type_name).copied()
}
