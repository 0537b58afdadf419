// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resolves a schema hash to its field tables, loading and caching the
//! backing XML file from an external schema directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::core::error::{CodecError, Result};
use crate::entity::FieldSpec;
use crate::schema::loader;
use crate::typecodec::TypeNode;

/// Environment variable that overrides the platform default schema
/// directory, consulted before any CLI-supplied override.
pub const SCHEMA_DIR_ENV_VAR: &str = "SCENECODEC_SCHEMA_DIR";

/// The platform-specific default schema directory for the commercial game
/// engine this format belongs to, mirroring the original tool's own
/// hard-coded Steam library layout.
pub fn default_schema_dir() -> PathBuf {
    const STEAM_APP_DIR: &str = "steamapps/common/SceneForge/data/schemas";
    if cfg!(target_os = "windows") {
        PathBuf::from(r"C:\Program Files (x86)\Steam").join(STEAM_APP_DIR)
    } else {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(".local/share/Steam").join(STEAM_APP_DIR)
    }
}

/// Resolve the schema directory: explicit override, else `$SCENECODEC_SCHEMA_DIR`,
/// else the platform default, in that precedence order.
pub fn resolve_schema_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(SCHEMA_DIR_ENV_VAR) {
        return PathBuf::from(dir);
    }
    default_schema_dir()
}

/// A fully loaded, immutable schema: the two tables `SchemaRegistry`
/// exposes per spec.md §4.3, plus a lazily compiled decode program per
/// component (spec.md §9's design note).
pub struct Schema {
    /// Component name → its fields, in on-disk decode order.
    pub fields_by_component: IndexMap<String, Vec<FieldSpec>>,
    /// Type string → declared size in bytes (enum-width lookup only).
    pub size_by_type: HashMap<String, u64>,
    programs: OnceCell<IndexMap<String, Vec<(String, TypeNode)>>>,
}

impl Schema {
    /// Build a schema from its two parsed tables.
    pub fn new(
        fields_by_component: IndexMap<String, Vec<FieldSpec>>,
        size_by_type: HashMap<String, u64>,
    ) -> Self {
        Schema {
            fields_by_component,
            size_by_type,
            programs: OnceCell::new(),
        }
    }

    /// Look up a component's field list by name.
    pub fn fields_for(&self, component_name: &str) -> Option<&[FieldSpec]> {
        self.fields_by_component
            .get(component_name)
            .map(Vec::as_slice)
    }

    /// Look up a type's declared byte width, used for `Enum`-suffixed
    /// types whose width is schema-declared rather than fixed.
    pub fn size_of_type(&self, type_string: &str) -> Option<u64> {
        self.size_by_type.get(type_string).copied()
    }

    /// The compiled decode program for `component_name`: an ordered list of
    /// `(field_name, TypeNode)`, compiled once on first use and cached for
    /// the lifetime of this schema.
    pub fn program_for(&self, component_name: &str) -> Result<&[(String, TypeNode)]> {
        let programs = self.programs.get_or_try_init(|| self.compile_programs())?;
        programs
            .get(component_name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                CodecError::schema(
                    "<registry>",
                    format!("component '{component_name}' not declared in schema"),
                )
            })
    }

    fn compile_programs(&self) -> Result<IndexMap<String, Vec<(String, TypeNode)>>> {
        let mut compiled = IndexMap::new();
        for (component_name, specs) in &self.fields_by_component {
            let mut program = Vec::with_capacity(specs.len());
            for spec in specs {
                let node = crate::typecodec::compile(&spec.type_string, self)?;
                program.push((spec.name.clone(), node));
            }
            compiled.insert(component_name.clone(), program);
        }
        Ok(compiled)
    }
}

/// Loads a [`Schema`] from a directory keyed by content hash.
///
/// Immutable after construction: safe to share by reference across
/// concurrent decodes of distinct files, per spec.md §5.
pub struct SchemaRegistry {
    schema_dir: PathBuf,
}

impl SchemaRegistry {
    /// Build a registry rooted at `schema_dir`.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        SchemaRegistry {
            schema_dir: schema_dir.into(),
        }
    }

    /// Build a registry using [`resolve_schema_dir`]'s precedence.
    pub fn from_environment(explicit: Option<&Path>) -> Self {
        SchemaRegistry::new(resolve_schema_dir(explicit))
    }

    /// Load the schema keyed by `hash` (raw bytes, hex-encoded to form the
    /// filename).
    pub fn load(&self, hash: &[u8]) -> Result<Schema> {
        let file_name = format!("{}.xml", hex::encode(hash));
        let path = self.schema_dir.join(&file_name);

        tracing::debug!(schema_file = %file_name, "loading schema");

        let text = std::fs::read_to_string(&path)
            .map_err(|e| CodecError::schema(&file_name, format!("read failed: {e}")))?;

        let parsed = loader::parse(&text, &file_name)?;
        Ok(Schema::new(parsed.fields_by_component, parsed.size_by_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_override_wins_over_environment() {
        let dir = PathBuf::from("/explicit/dir");
        assert_eq!(resolve_schema_dir(Some(&dir)), dir);
    }

    #[test]
    fn loads_schema_file_named_by_hex_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let hash = [0xabu8; 32];
        let file_name = format!("{}.xml", hex::encode(hash));
        let xml = r#"<schema><component component_name="C">
            <field name="f" size="4" type="float" />
        </component></schema>"#;
        let mut file = std::fs::File::create(tmp.path().join(&file_name)).unwrap();
        file.write_all(xml.as_bytes()).unwrap();

        let registry = SchemaRegistry::new(tmp.path());
        let schema = registry.load(&hash).unwrap();
        assert!(schema.fields_for("C").is_some());
    }

    #[test]
    fn missing_schema_file_is_a_schema_error() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::new(tmp.path());
        let err = registry.load(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, CodecError::Schema { .. }));
    }
}
