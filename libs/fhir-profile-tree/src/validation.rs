//! Sanity checks on differential input and on assembled field lists

use crate::error::{Error, Result};
use crate::field::Field;
use ferrum_models::ElementDefinition;
use std::collections::HashSet;

/// Reject differentials the resolver cannot index
///
/// Every path must be non-blank and free of `#` (reserved for slice indexes).
/// Duplicate paths are rejected only when `enforce_unique_paths` is set, since
/// slices legitimately repeat their root path.
pub fn validate_differential(
    elements: &[ElementDefinition],
    enforce_unique_paths: bool,
) -> Result<()> {
    if let Some(position) = elements.iter().position(|e| e.path.trim().is_empty()) {
        return Err(Error::MalformedInput(format!(
            "differential element {} has an empty path",
            position
        )));
    }

    if let Some(element) = elements.iter().find(|e| e.path.contains('#')) {
        return Err(Error::MalformedInput(format!(
            "path '{}' contains a '#' character",
            element.path
        )));
    }

    if enforce_unique_paths {
        let mut seen = HashSet::new();
        for element in elements {
            if !seen.insert(element.path.as_str()) {
                return Err(Error::MalformedInput(format!(
                    "path '{}' appears more than once",
                    element.path
                )));
            }
        }
    }

    Ok(())
}

/// Every field's parent path must be present somewhere in the list
///
/// Order is not checked: reserved elements such as `id` are merged ahead of
/// the root, and assembly looks children up by path.
pub fn validate_parent_completeness(fields: &[Field]) -> Result<()> {
    let paths: HashSet<&str> = fields.iter().map(|f| f.path.as_str()).collect();
    for field in fields {
        if let Some(parent) = field.parent_path() {
            if !paths.contains(parent) {
                return Err(Error::Structural(format!(
                    "field '{}' has no parent '{}'",
                    field.path, parent
                )));
            }
        }
    }
    Ok(())
}
