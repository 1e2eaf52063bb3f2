//! Loading StructureDefinitions from JSON files
//!
//! Non-StructureDefinition resources found while scanning a directory are
//! skipped; an explicitly named file of another type is an error.

use crate::context::DefaultFhirContext;
use crate::error::{Error, Result};
use ferrum_models::StructureDefinition;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse one StructureDefinition from a JSON string
pub fn structure_definition_from_str(json: &str) -> Result<StructureDefinition> {
    let value: Value = serde_json::from_str(json)?;
    Ok(StructureDefinition::from_value(&value)?)
}

/// Load a single StructureDefinition file
pub fn load_file(path: &Path) -> Result<StructureDefinition> {
    let contents = fs::read_to_string(path)?;
    structure_definition_from_str(&contents).map_err(|e| {
        Error::InvalidStructureDefinition(format!("{}: {}", path.display(), e))
    })
}

/// Load every `*.json` StructureDefinition directly inside `dir`, sorted by file name
pub fn load_directory(dir: &Path) -> Result<Vec<StructureDefinition>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut definitions = Vec::new();
    for file in files {
        let value: Value = serde_json::from_str(&fs::read_to_string(&file)?)?;
        if value.get("resourceType").and_then(Value::as_str) != Some("StructureDefinition") {
            tracing::debug!(file = %file.display(), "skipping non-StructureDefinition resource");
            continue;
        }
        definitions.push(StructureDefinition::from_value(&value)?);
    }
    Ok(definitions)
}

/// Load files and directories into a context
pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> Result<DefaultFhirContext> {
    let mut ctx = DefaultFhirContext::new();
    for path in paths {
        let path = path.as_ref();
        let loaded = if path.is_dir() {
            load_directory(path)?
        } else {
            vec![load_file(path)?]
        };
        for sd in loaded {
            ctx.insert(sd)?;
        }
    }
    tracing::debug!(definitions = ctx.len(), "loaded StructureDefinitions");
    Ok(ctx)
}
