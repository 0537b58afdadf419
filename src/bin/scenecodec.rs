// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `scenecodec` — decode (and optionally re-encode) entity-scene files.
//!
//! External-collaborator layer around the `scenecodec` library: argument
//! parsing, directory walking, JSON dumping, and path-tagged error
//! reporting are all explicitly out of scope for the core codec (spec.md
//! §1) but are implemented here in full as the CLI contract spec.md §6
//! describes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use walkdir::WalkDir;

use scenecodec::core::error::CodecError;
use scenecodec::format::compression::{Compressor, Decompressor};
use scenecodec::schema::registry::SchemaRegistry;

/// Marker substring a directory entry's basename must contain to be
/// treated as an entity-scene file during a directory sweep.
const ENTITY_FILE_MARKER: &str = "entities";

#[derive(Parser, Debug)]
#[command(
    name = "scenecodec",
    about = "Decode (and optionally re-encode) entity-scene files"
)]
struct Cli {
    /// A single entity-scene file, or a directory to sweep for files whose
    /// basename contains "entities".
    path: PathBuf,

    /// Override the resolved schema directory (otherwise
    /// `$SCENECODEC_SCHEMA_DIR`, else the platform default).
    #[arg(long, value_name = "DIR")]
    schema_dir: Option<PathBuf>,

    /// Re-encode the decoded scene and write it to this path. Only valid
    /// when `path` names a single file.
    #[arg(long, value_name = "OUT")]
    encode: Option<PathBuf>,
}

/// No FastLZ implementation ships in this crate (spec.md §1 treats it as an
/// external pure-function collaborator). This placeholder only handles the
/// degenerate case of an already-uncompressed payload, which is enough to
/// exercise the framing/schema/tree pipeline against test fixtures; a real
/// deployment wires in an actual FastLZ binding implementing
/// [`Decompressor`]/[`Compressor`].
struct PassthroughCodec;

impl Decompressor for PassthroughCodec {
    fn decompress(&self, src: &[u8], dst_len: usize) -> scenecodec::Result<Vec<u8>> {
        if src.len() != dst_len {
            return Err(CodecError::malformed(
                "no FastLZ decompressor is linked into this build; \
                 the input is compressed and cannot be read without one",
            ));
        }
        Ok(src.to_vec())
    }
}

impl Compressor for PassthroughCodec {
    fn compress(&self, src: &[u8]) -> Vec<u8> {
        src.to_vec()
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let registry = SchemaRegistry::from_environment(cli.schema_dir.as_deref());

    let result = if cli.path.is_dir() {
        run_directory(&cli.path, &registry)
    } else {
        run_file(&cli.path, &registry, cli.encode.as_deref())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_directory(dir: &Path, registry: &SchemaRegistry) -> anyhow::Result<()> {
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.contains(ENTITY_FILE_MARKER));
        if !matches {
            continue;
        }
        if let Err(err) = run_file(entry.path(), registry, None) {
            eprintln!("{err}");
        }
    }
    Ok(())
}

fn run_file(path: &Path, registry: &SchemaRegistry, encode_to: Option<&Path>) -> anyhow::Result<()> {
    let file_tag = path.display().to_string();

    let bytes = std::fs::read(path)
        .map_err(|e| CodecError::malformed(format!("read failed: {e}")).in_file(file_tag.clone()))?;

    let scene = scenecodec::decode(&bytes, registry, &PassthroughCodec)
        .map_err(|e| e.in_file(file_tag.clone()))?;

    let json = serde_json::to_string_pretty(&scene)?;
    println!("{json}");

    if let Some(out_path) = encode_to {
        let reencoded = scenecodec::encode(&scene, registry, &PassthroughCodec)
            .map_err(|e| e.in_file(file_tag.clone()))?;
        std::fs::write(out_path, reencoded)
            .with_context(|| format!("writing {}", out_path.display()))?;
    }

    Ok(())
}
