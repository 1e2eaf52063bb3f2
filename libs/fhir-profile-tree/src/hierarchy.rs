//! Ancestor chain of a StructureDefinition and field lookups along it

use crate::error::{Error, Result};
use crate::field::Field;
use ferrum_context::FhirContext;
use ferrum_models::{is_root_sentinel, ElementDefinition, StructureDefinition, CHOICE_SUFFIX};
use std::collections::HashSet;
use std::sync::Arc;

/// Rewritten paths whose ancestor record is never used as a base
const UNLINKED_EXTENSION_PATHS: [&str; 2] = ["DomainResource.extension", "Element.extension"];

/// Ordered ancestors of a StructureDefinition, nearest first
#[derive(Debug, Clone, Default)]
pub struct AncestorChain {
    ancestors: Vec<Arc<StructureDefinition>>,
}

impl AncestorChain {
    /// Follow `baseDefinition` links until the root
    pub fn build(sd: &StructureDefinition, ctx: &dyn FhirContext) -> Result<Self> {
        let mut ancestors: Vec<Arc<StructureDefinition>> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(sd.url.clone());

        let mut current_url = sd.url.clone();
        let mut next_base = sd.base_definition.clone();

        while let Some(base_url) = next_base.take() {
            let base_url = base_url.trim().to_string();
            if base_url.is_empty() || is_root_sentinel(&base_url) {
                break;
            }
            if base_url == current_url {
                tracing::debug!(url = %base_url, "definition names itself as base");
                break;
            }
            if !seen.insert(base_url.clone()) {
                return Err(Error::MalformedInput(format!(
                    "baseDefinition cycle through {}",
                    base_url
                )));
            }

            let base = ctx
                .get_structure_definition(&base_url)?
                .ok_or_else(|| Error::ReferenceNotFound(base_url.clone()))?;

            next_base = base.base_definition.clone();
            current_url = base_url;
            ancestors.push(base);
        }

        tracing::debug!(url = %sd.url, depth = ancestors.len(), "ancestor chain resolved");
        Ok(Self { ancestors })
    }

    pub fn ancestors(&self) -> &[Arc<StructureDefinition>] {
        &self.ancestors
    }

    pub fn immediate_ancestor(&self) -> Option<&Arc<StructureDefinition>> {
        self.ancestors.first()
    }

    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Record in the nearest ancestor that `element` constrains
    pub fn find_ancestor_field(&self, element: &ElementDefinition) -> Option<Arc<ElementDefinition>> {
        for ancestor in &self.ancestors {
            let Some(elements) = ancestor.element_list() else {
                continue;
            };
            let Some(root) = ancestor.root_element() else {
                tracing::warn!(url = %ancestor.url, "ancestor has no root element, skipping");
                continue;
            };

            let path = replace_root_segment(&element.path, &root.path);
            if UNLINKED_EXTENSION_PATHS.contains(&path.as_str()) {
                return None;
            }

            if let Some(found) = elements.iter().find(|e| e.path == path) {
                return Some(Arc::new(found.clone()));
            }

            let choice_path = element
                .base_path()
                .map(|base| replace_root_segment(base, &root.path))
                .or_else(|| {
                    element
                        .reconstructed_base_path()
                        .map(|base| replace_root_segment(&base, &root.path))
                });
            if let Some(choice_path) = choice_path {
                if let Some(found) = elements
                    .iter()
                    .filter(|e| e.is_choice_type())
                    .find(|e| e.path == choice_path)
                {
                    return Some(Arc::new(found.clone()));
                }
            }
        }
        None
    }
}

/// Position of the differential field that overrides `path`
///
/// Exact path first, then (for `[x]` paths) a stored base path, then a
/// reconstructed base path on fields without a stored one.
pub fn find_field_in_current(fields: &[Field], path: &str) -> Option<usize> {
    if let Some(pos) = fields.iter().position(|f| f.path == path) {
        return Some(pos);
    }
    if !path.ends_with(CHOICE_SUFFIX) {
        return None;
    }
    if let Some(pos) = fields
        .iter()
        .position(|f| f.element.base_path() == Some(path))
    {
        return Some(pos);
    }
    fields.iter().position(|f| {
        f.element.base_path().is_none() && f.reconstructed_base_path().as_deref() == Some(path)
    })
}

/// Swap the first path segment for `root`
pub(crate) fn replace_root_segment(path: &str, root: &str) -> String {
    match path.split_once('.') {
        Some((_, rest)) => format!("{}.{}", root, rest),
        None => root.to_string(),
    }
}

/// The definition followed by all of its ancestors, nearest first
pub fn structure_definition_and_bases(
    sd: &StructureDefinition,
    ctx: &dyn FhirContext,
) -> Result<Vec<Arc<StructureDefinition>>> {
    let chain = AncestorChain::build(sd, ctx)?;
    let mut all = Vec::with_capacity(chain.len() + 1);
    all.push(Arc::new(sd.clone()));
    all.extend(chain.ancestors);
    Ok(all)
}
