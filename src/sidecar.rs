//! Sidecar metadata JSON parsing
//!
//! Model managers drop a JSON description next to each downloaded asset with
//! a pre-computed sha256 and descriptive fields. Parsing one of these is far
//! cheaper than hashing a multi-gigabyte model file.

use crate::records::LocalFileRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Fields we care about in a sidecar description. Everything else in the
/// JSON is ignored.
#[derive(Debug, Default, Deserialize)]
struct SidecarFields {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    base_model: Option<String>,
}

/// Some exporters wrap the description in a single-element array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SidecarDocument {
    One(SidecarFields),
    Many(Vec<SidecarFields>),
}

/// Parse a sidecar file into a local record
///
/// Returns `Ok(None)` for a description that is well-formed JSON but carries
/// no identifying fields (no file name, no path, no digest). Malformed JSON
/// and I/O failures are errors; the scanner counts them and moves on.
pub fn parse_sidecar(path: &Path) -> Result<Option<LocalFileRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sidecar: {}", path.display()))?;

    let document: SidecarDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse sidecar JSON: {}", path.display()))?;

    let fields = match document {
        SidecarDocument::One(fields) => fields,
        SidecarDocument::Many(mut list) => {
            if list.is_empty() {
                return Ok(None);
            }
            list.remove(0)
        }
    };

    let SidecarFields {
        file_name,
        sha256,
        file_path,
        size,
        model_name,
        base_model,
    } = fields;

    // Nothing identifying: not a usable record
    if file_name.is_none() && file_path.is_none() && sha256.is_none() {
        return Ok(None);
    }

    // Derive a display name from the asset path if the sidecar omits one
    let file_name = match file_name {
        Some(name) if !name.is_empty() => name,
        _ => match &file_path {
            Some(p) => Path::new(&p.replace('\\', "/"))
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            None => String::new(),
        },
    };

    Ok(Some(LocalFileRecord {
        file_name,
        sha256: sha256.map(|h| h.to_lowercase()),
        file_path,
        size,
        model_name,
        base_model,
        metadata_path: path.to_string_lossy().into_owned(),
    }))
}
