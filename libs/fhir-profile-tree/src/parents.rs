//! Placeholder fields for missing intermediate paths
//!
//! A differential may constrain `Patient.contact.name` without listing
//! `Patient.contact`; tree assembly needs every parent to exist.

use crate::field::Field;
use std::collections::HashSet;

/// Insert a synthetic field before the first descendant of each missing prefix
///
/// Must run after slice indexing, so that `#n` paths name their own parents.
pub fn fill_missing_parents(fields: Vec<Field>) -> Vec<Field> {
    let existing: HashSet<String> = fields.iter().map(|f| f.path.clone()).collect();
    let mut created: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(fields.len());

    for field in fields {
        let prefixes = field
            .path
            .match_indices('.')
            .map(|(pos, _)| field.path[..pos].to_string())
            .collect::<Vec<_>>();

        for prefix in prefixes {
            if existing.contains(&prefix) || created.contains(&prefix) {
                continue;
            }
            tracing::trace!(path = %prefix, "adding placeholder parent");
            created.insert(prefix.clone());
            result.push(Field::synthetic(prefix));
        }
        result.push(field);
    }

    result
}
