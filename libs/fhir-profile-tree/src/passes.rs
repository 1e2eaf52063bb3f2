//! Tree post-processing passes
//!
//! Each function handles one node and is applied through a pre-order walk;
//! the builder runs them in a fixed order over the whole tree.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::tree::{NodeId, SnapshotTree};
use ferrum_context::FhirContext;
use ferrum_models::SlicingRules;

/// Suffix of the catch-all child of an open slicing
pub const OPEN_SLICE_SUFFIX: &str = "#n";

/// Move each slice under the slicing entry that shares its path
pub fn group_slices(tree: &mut SnapshotTree, node: NodeId) {
    let entries: Vec<NodeId> = tree
        .children_ids(node)
        .iter()
        .copied()
        .filter(|&id| {
            let field = tree.field(id);
            field.is_setup_slice() && !field.is_setup_slice_for_extension()
        })
        .collect();

    for entry in entries {
        let prefix = format!("{}#", tree.field(entry).path);
        let slices: Vec<NodeId> = tree
            .children_ids(node)
            .iter()
            .copied()
            .filter(|&id| tree.field(id).path.starts_with(&prefix))
            .collect();

        for slice in slices {
            tree.set_slice(slice, true);
            tree.append_child(entry, slice);
        }
    }
}

/// Detach a node with a zero upper cardinality on itself or an ancestor
pub fn remove_zero_max_cardinality(tree: &mut SnapshotTree, node: NodeId) {
    if tree.parent_id(node).is_some() && tree.node(node).is_removed() {
        tracing::trace!(path = %tree.field(node).path, "pruning removed element");
        tree.detach(node);
    }
}

/// Detach the slicing entry of `extension` and `modifierExtension` elements
pub fn remove_extension_setup_slices(tree: &mut SnapshotTree, node: NodeId) {
    if tree.parent_id(node).is_some() && tree.field(node).is_setup_slice_for_extension() {
        tree.detach(node);
    }
}

/// Attach the profile definition of an extension node
pub fn add_extension_definition(
    tree: &mut SnapshotTree,
    node: NodeId,
    ctx: &dyn FhirContext,
) -> Result<()> {
    if !tree.node(node).is_extension() {
        return Ok(());
    }
    let url = match tree.field(node).types() {
        Some([only]) => match only.single_profile() {
            Some(url) => url.to_string(),
            None => return Ok(()),
        },
        _ => return Ok(()),
    };

    let definition = ctx
        .get_structure_definition(&url)?
        .ok_or_else(|| Error::ReferenceNotFound(url.clone()))?;
    tracing::trace!(path = %tree.field(node).path, %url, "resolved extension definition");
    tree.set_extension_definition(node, definition);
    Ok(())
}

/// Gather the non-slice children of a slicing entry
///
/// Under open slicing they move into one `#n` child typed like the entry;
/// under closed slicing they are dropped.
pub fn group_open_slice_elements(tree: &mut SnapshotTree, node: NodeId) {
    let field = tree.field(node);
    if !field.is_setup_slice() || field.is_setup_slice_for_extension() {
        return;
    }
    let Some(rules) = field.slicing_rules() else {
        return;
    };

    let loose: Vec<NodeId> = tree
        .children_ids(node)
        .iter()
        .copied()
        .filter(|&id| !tree.node(id).is_slice())
        .collect();

    match rules {
        SlicingRules::Open | SlicingRules::OpenAtEnd => {
            let field = tree.field(node);
            let open = Field::open_slice(
                format!("{}{}", field.path, OPEN_SLICE_SUFFIX),
                field.types().map(<[_]>::to_vec),
            );
            let open = tree.add_node(open);
            for id in loose {
                tree.append_child(open, id);
            }
            tree.append_child(node, open);
        }
        SlicingRules::Closed => {
            for id in loose {
                tree.detach(id);
            }
        }
    }
}
