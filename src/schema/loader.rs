// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XML sanitization and parsing for schema descriptor files.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

use crate::core::error::{CodecError, Result};
use crate::entity::FieldSpec;

// Raw `<`/`>` occasionally leak into quoted attribute values in the source
// XML. Only rewrite inside a `"..."` span on the same line, matching the
// producer's own escaping mistake rather than attempting general XML repair.
static GT_IN_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"("[^\n]*)>([^\n]*")"#).unwrap());
static LT_IN_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"("[^\n]*)<([^\n]*")"#).unwrap());

const MAX_SANITIZE_PASSES: usize = 64;

/// Apply the `<`/`>`-in-quotes escaping rule repeatedly until it no longer
/// changes the text (or a pass budget is exhausted, which would indicate a
/// pathological input rather than a legitimate schema file).
pub fn sanitize(xml: &str) -> String {
    let mut current = xml.to_string();
    for _ in 0..MAX_SANITIZE_PASSES {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    current
}

fn sanitize_once(xml: &str) -> String {
    let escaped_gt = GT_IN_QUOTES.replace_all(xml, "${1}&gt;${2}");
    LT_IN_QUOTES.replace_all(&escaped_gt, "${1}&lt;${2}").into_owned()
}

/// The two tables a schema file produces.
pub struct ParsedSchema {
    /// Component name → its fields, in on-disk decode order.
    pub fields_by_component: IndexMap<String, Vec<FieldSpec>>,
    /// Type string → declared size in bytes (enum-width lookup only).
    pub size_by_type: HashMap<String, u64>,
}

/// Parse a sanitized schema document.
///
/// Expected shape: a root element with one child per component, each
/// carrying `component_name`; each component's element children carry
/// `name`, `size`, `type` attributes describing one field.
pub fn parse(xml: &str, schema_file: &str) -> Result<ParsedSchema> {
    let sanitized = sanitize(xml);
    let mut reader = Reader::from_str(&sanitized);
    reader.config_mut().trim_text(true);

    let mut fields_by_component: IndexMap<String, Vec<FieldSpec>> = IndexMap::new();
    let mut size_by_type: HashMap<String, u64> = HashMap::new();
    let mut current_component: Option<String> = None;
    let mut depth: u32 = 0;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CodecError::schema(schema_file, format!("XML parse error: {e}")))?;

        match event {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) => {
                depth += 1;
                let is_empty = matches!(event, Event::Empty(_));
                let attrs = read_attrs(&tag, schema_file)?;

                if depth == 2 {
                    let component_name = attrs.get("component_name").cloned().ok_or_else(|| {
                        CodecError::schema(schema_file, "component element missing component_name")
                    })?;
                    fields_by_component.entry(component_name.clone()).or_default();
                    current_component = Some(component_name);
                } else if depth == 3 {
                    let component_name = current_component.clone().ok_or_else(|| {
                        CodecError::schema(schema_file, "field element outside any component")
                    })?;
                    let name = attrs
                        .get("name")
                        .cloned()
                        .ok_or_else(|| CodecError::schema(schema_file, "field missing name"))?;
                    let type_string = attrs
                        .get("type")
                        .cloned()
                        .ok_or_else(|| CodecError::schema(schema_file, "field missing type"))?;
                    if let Some(size) = attrs.get("size") {
                        if let Ok(n) = size.parse::<u64>() {
                            size_by_type.insert(type_string.clone(), n);
                        }
                    }
                    fields_by_component
                        .get_mut(&component_name)
                        .expect("component entry inserted above")
                        .push(FieldSpec::new(name, type_string));
                }

                if is_empty {
                    depth -= 1;
                    if depth <= 1 {
                        current_component = None;
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    current_component = None;
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    Ok(ParsedSchema {
        fields_by_component,
        size_by_type,
    })
}

fn read_attrs(
    tag: &quick_xml::events::BytesStart<'_>,
    schema_file: &str,
) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| {
            CodecError::schema(schema_file, format!("malformed attribute: {e}"))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| CodecError::schema(schema_file, format!("malformed attribute value: {e}")))?
            .into_owned();
        out.insert(key, value);
    }
    Ok(out)
}
