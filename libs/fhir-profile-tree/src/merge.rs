//! Overlaying a differential onto an ancestor's resolved field list

use crate::error::{Error, Result};
use crate::field::Field;
use crate::hierarchy::{find_field_in_current, replace_root_segment, AncestorChain};
use crate::slicing::index_slices;
use ferrum_models::{ElementDefinition, StructureDefinition};
use std::sync::Arc;

/// Leading resource elements placed first when they only appear in the differential
pub const RESERVED_LEADING_ELEMENTS: [&str; 6] =
    ["id", "meta", "implicitRules", "language", "text", "contained"];

/// Merge `differential` onto `base`
///
/// Each base field is replaced by the differential field that overrides it,
/// which takes the base field's position. When the differential field has no
/// base link yet, the replaced field becomes its base. Differential fields left
/// over are appended in order, except the reserved leading elements which go
/// in front. Base fields are renamed onto the differential's root type when the
/// two differ.
pub fn merge(differential: Vec<Field>, base: Vec<Field>) -> Vec<Field> {
    let target_root = differential
        .iter()
        .map(|f| f.path.split('.').next().unwrap_or(&f.path))
        .next()
        .map(str::to_string);

    let mut consumed = vec![false; differential.len()];
    let mut result = Vec::with_capacity(base.len() + differential.len());

    for mut base_field in base {
        if let Some(root) = &target_root {
            if base_field.path.split('.').next() != Some(root.as_str()) {
                base_field.path = replace_root_segment(&base_field.path, root);
            }
        }

        let available = find_field_in_current(&differential, &base_field.path)
            .filter(|&pos| !consumed[pos]);
        match available {
            Some(pos) => {
                consumed[pos] = true;
                let mut overriding = differential[pos].clone();
                if overriding.base.is_none() {
                    overriding.base = Some(Arc::clone(&base_field.element));
                }
                result.push(overriding);
            }
            None => result.push(base_field),
        }
    }

    let mut leading = Vec::new();
    for (field, used) in differential.into_iter().zip(consumed) {
        if used {
            continue;
        }
        if RESERVED_LEADING_ELEMENTS.contains(&field.last_path_segment()) {
            leading.push(field);
        } else {
            result.push(field);
        }
    }

    leading.extend(result);
    leading
}

/// Resolved field list of the immediate ancestor
///
/// The nearest ancestor with a snapshot supplies its snapshot; ancestors below
/// it are folded on one at a time from their differentials, with each override
/// materialised against the record it replaced. Every level is slice indexed
/// before it is merged. Empty for a root definition.
pub fn resolve_ancestor_fields(chain: &AncestorChain) -> Result<Vec<Field>> {
    let ancestors = chain.ancestors();
    let with_snapshot = ancestors.iter().position(|a| a.snapshot.is_some());

    let (start, mut fields) = match with_snapshot {
        Some(index) => (index, snapshot_fields(&ancestors[index])?),
        None => (ancestors.len(), Vec::new()),
    };

    for ancestor in ancestors[..start].iter().rev() {
        let differential = ancestor
            .differential
            .as_ref()
            .ok_or_else(|| Error::MissingBase(ancestor.url.clone()))?;

        tracing::debug!(url = %ancestor.url, "folding ancestor differential");
        let mut overrides: Vec<Field> = differential
            .element
            .iter()
            .map(Field::from_differential)
            .collect();
        index_slices(&mut overrides)?;
        fields = merge(overrides, fields)
            .into_iter()
            .map(materialise)
            .collect();
    }

    Ok(fields)
}

fn snapshot_fields(sd: &StructureDefinition) -> Result<Vec<Field>> {
    let mut fields: Vec<Field> = sd
        .snapshot
        .iter()
        .flat_map(|s| s.element.iter())
        .map(|e| Field::inherited(Arc::new(e.clone())))
        .collect();
    index_slices(&mut fields)?;
    Ok(fields)
}

/// Turn an ancestor-level override into a plain inherited field
fn materialise(field: Field) -> Field {
    if !field.changed_from_base {
        return field;
    }
    let mut element: ElementDefinition = (*field.element).clone();
    if let Some(base) = &field.base {
        element.inherit_from(base);
    }
    let mut inherited = Field::inherited(Arc::new(element));
    inherited.path = field.path;
    inherited.path_before_slice_indexing = field.path_before_slice_indexing;
    inherited
}
