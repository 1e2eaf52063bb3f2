//! Complex data type expansion
//!
//! A node typed with a single complex data type (`HumanName`, `Identifier`,
//! ...) gets the data type's child elements grafted underneath it. Elements
//! the profile already constrains keep their node; the rest are added from the
//! data type definition.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::tree::{NodeId, SnapshotTree};
use ferrum_context::FhirContext;
use ferrum_models::{ElementDefinition, StructureDefinition};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Root element of an extension profile, typed `Element`, is never expanded
const EXTENSION_ROOT_PATH: &str = "Extension";
const EXTENSION_ROOT_TYPE: &str = "Element";

/// Data type element still to be grafted below a node
#[derive(Debug, Clone)]
struct PendingExpansion {
    data_type: Arc<StructureDefinition>,
    element_path: String,
}

/// Per-node expansion state for one walk over a tree
pub struct ComplexTypeExpander<'a> {
    ctx: &'a dyn FhirContext,
    pending: HashMap<NodeId, PendingExpansion>,
    expanded: HashMap<NodeId, String>,
}

impl<'a> ComplexTypeExpander<'a> {
    pub fn new(ctx: &'a dyn FhirContext) -> Self {
        Self {
            ctx,
            pending: HashMap::new(),
            expanded: HashMap::new(),
        }
    }

    /// Expand `node` if it is a complex type or a queued nested data type element
    pub fn expand(&mut self, tree: &mut SnapshotTree, node: NodeId) -> Result<()> {
        let pending = match self.pending.remove(&node) {
            Some(pending) => pending,
            None => match self.start_expansion(tree, node)? {
                Some(pending) => pending,
                None => return Ok(()),
            },
        };

        tracing::trace!(
            path = %tree.field(node).path,
            data_type = %pending.data_type.url,
            "expanding complex type"
        );
        self.graft_children(tree, node, &pending);
        Ok(())
    }

    /// Resolve the data type of `node`, if it should be expanded at all
    fn start_expansion(
        &mut self,
        tree: &SnapshotTree,
        node: NodeId,
    ) -> Result<Option<PendingExpansion>> {
        let field = tree.field(node);
        let code = match field.types() {
            Some([only]) if only.is_complex_type() => only.code.clone(),
            _ => return Ok(None),
        };
        if field.path == EXTENSION_ROOT_PATH && code == EXTENSION_ROOT_TYPE {
            return Ok(None);
        }
        if self.expanding_in_ancestor(tree, node, &code) {
            tracing::debug!(path = %field.path, data_type = %code, "recursive data type, not expanding");
            return Ok(None);
        }

        let data_type = self
            .ctx
            .get_data_type(&code)?
            .ok_or_else(|| Error::TypeNotFound(code.clone()))?;
        let root = data_type
            .root_element()
            .ok_or_else(|| {
                Error::Structural(format!("data type {} has no root element", data_type.url))
            })?
            .path
            .clone();

        self.expanded.insert(node, code);
        Ok(Some(PendingExpansion {
            data_type,
            element_path: root,
        }))
    }

    fn expanding_in_ancestor(&self, tree: &SnapshotTree, node: NodeId, code: &str) -> bool {
        std::iter::successors(tree.parent_id(node), |&id| tree.parent_id(id))
            .any(|id| self.expanded.get(&id).is_some_and(|c| c == code))
    }

    fn graft_children(&mut self, tree: &mut SnapshotTree, node: NodeId, pending: &PendingExpansion) {
        let elements = pending.data_type.element_list().unwrap_or_default();
        let existing: Vec<NodeId> = tree.children_ids(node).to_vec();
        let mut placed: HashSet<NodeId> = HashSet::new();
        let mut children = Vec::with_capacity(existing.len());

        let type_children = elements
            .iter()
            .filter(|e| e.parent_path() == Some(pending.element_path.as_str()));

        for type_child in type_children {
            let segment = type_child.last_path_segment();
            let type_child_ref = Arc::new(type_child.clone());
            let matching: Vec<NodeId> = existing
                .iter()
                .copied()
                .filter(|&id| tree.field(id).last_segment_without_slice_index() == segment)
                .collect();

            let mut grafted = Vec::new();
            if matching.is_empty() {
                let path = format!("{}.{}", tree.field(node).path, segment);
                grafted.push(tree.add_node(Field::from_data_type(
                    Arc::clone(&type_child_ref),
                    path,
                )));
            }
            for id in matching {
                placed.insert(id);
                grafted.push(adopt(tree, id, &type_child_ref));
            }

            if has_children(elements, type_child) {
                for &id in &grafted {
                    self.pending.insert(
                        id,
                        PendingExpansion {
                            data_type: Arc::clone(&pending.data_type),
                            element_path: type_child.path.clone(),
                        },
                    );
                }
            }
            children.extend(grafted);
        }

        children.extend(existing.into_iter().filter(|id| !placed.contains(id)));
        tree.set_children(node, children);
    }
}

/// Reuse an existing child for a data type element
///
/// Placeholders are swapped for a node carrying the data type element,
/// which takes over the placeholder's children.
fn adopt(
    tree: &mut SnapshotTree,
    id: NodeId,
    type_child: &Arc<ElementDefinition>,
) -> NodeId {
    if !tree.field(id).synthetic {
        let field = tree.field_mut(id);
        if field.base.is_none() {
            field.base = Some(Arc::clone(type_child));
        }
        return id;
    }

    let path = tree.field(id).path.clone();
    let replacement = tree.add_node(Field::from_data_type(Arc::clone(type_child), path));
    for grandchild in tree.take_children(id) {
        tree.append_child(replacement, grandchild);
    }
    replacement
}

fn has_children(elements: &[ElementDefinition], parent: &ElementDefinition) -> bool {
    elements
        .iter()
        .any(|e| e.parent_path() == Some(parent.path.as_str()))
}
