//! Arena-backed snapshot tree
//!
//! Nodes live in one `Vec`; children lists own the structure and parent links
//! are plain indices. Detached nodes stay in the arena but are unreachable
//! from the root.

use crate::error::{Error, Result};
use crate::field::{strip_slice_index, Field};
use crate::node_type::{classify, NodeFacts, NodeType};
use ferrum_models::{BindingStrength, ElementDefinitionType, StructureDefinition};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    field: Field,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    is_slice: bool,
    extension_definition: Option<Arc<StructureDefinition>>,
}

#[derive(Debug, Clone)]
pub struct SnapshotTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SnapshotTree {
    /// Build the tree from a parent-complete field list
    ///
    /// The one single-segment field becomes the root; every other field hangs
    /// under each field whose path is its parent path, in list order.
    pub fn assemble(fields: Vec<Field>) -> Result<Self> {
        let mut roots = fields.iter().enumerate().filter(|(_, f)| !f.path.contains('.'));
        let root_index = match (roots.next(), roots.next()) {
            (Some((index, _)), None) => index,
            (None, _) => return Err(Error::Structural("no root element".into())),
            (Some((_, first)), Some((_, second))) => {
                return Err(Error::Structural(format!(
                    "more than one root element: '{}' and '{}'",
                    first.path, second.path
                )))
            }
        };

        let mut by_parent: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, field) in fields.iter().enumerate() {
            if let Some(parent) = field.parent_path() {
                by_parent.entry(parent).or_default().push(index);
            }
        }

        let mut tree = SnapshotTree {
            nodes: Vec::with_capacity(fields.len()),
            root: NodeId(0),
        };
        tree.root = tree.add_node(fields[root_index].clone());

        let mut stack = vec![(tree.root, root_index)];
        while let Some((node, index)) = stack.pop() {
            let Some(children) = by_parent.get(fields[index].path.as_str()) else {
                continue;
            };
            for &child_index in children {
                let child = tree.add_node(fields[child_index].clone());
                tree.append_child(node, child);
                stack.push((child, child_index));
            }
        }

        Ok(tree)
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Reachable nodes in depth-first pre-order
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Number of reachable nodes
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// First reachable node with `path`, in pre-order
    pub fn find(&self, path: &str) -> Option<NodeRef<'_>> {
        self.iter().find(|n| n.path() == path)
    }

    /// Paths of reachable nodes in pre-order
    pub fn paths(&self) -> Vec<&str> {
        self.iter().map(|n| n.path()).collect()
    }

    pub(crate) fn field(&self, id: NodeId) -> &Field {
        &self.nodes[id.0].field
    }

    pub(crate) fn field_mut(&mut self, id: NodeId) -> &mut Field {
        &mut self.nodes[id.0].field
    }

    pub(crate) fn children_ids(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub(crate) fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub(crate) fn add_node(&mut self, field: Field) -> NodeId {
        self.nodes.push(Node {
            field,
            parent: None,
            children: Vec::new(),
            is_slice: false,
            extension_definition: None,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Move `child` to the end of `parent`'s children
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Unlink `id` from its parent
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Detach and return every child of `id`
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Replace the children of `parent` with `children`, in order
    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.take_children(parent);
        for child in children {
            self.append_child(parent, child);
        }
    }

    pub(crate) fn set_slice(&mut self, id: NodeId, is_slice: bool) {
        self.nodes[id.0].is_slice = is_slice;
    }

    pub(crate) fn set_extension_definition(&mut self, id: NodeId, sd: Arc<StructureDefinition>) {
        self.nodes[id.0].extension_definition = Some(sd);
    }
}

/// Apply `visit` to every reachable node in depth-first pre-order
///
/// Children are read after `visit` returns, so a visit that rearranges the
/// subtree below its node changes what is walked next.
pub(crate) fn walk<F>(tree: &mut SnapshotTree, mut visit: F) -> Result<()>
where
    F: FnMut(&mut SnapshotTree, NodeId) -> Result<()>,
{
    let mut stack = vec![tree.root];
    while let Some(id) = stack.pop() {
        visit(tree, id)?;
        stack.extend(tree.children_ids(id).iter().rev().copied());
    }
    Ok(())
}

/// Pre-order iterator over reachable nodes
pub struct PreOrder<'a> {
    tree: &'a SnapshotTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children_ids(id).iter().rev().copied());
        Some(self.tree.node(id))
    }
}

/// Read-only view of one node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SnapshotTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn field(&self) -> &'a Field {
        &self.node().field
    }

    pub fn path(&self) -> &'a str {
        &self.field().path
    }

    pub fn name(&self) -> Option<&'a str> {
        self.field().name()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node().children.iter().map(move |&id| tree.node(id))
    }

    pub fn has_children(&self) -> bool {
        !self.node().children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.id == self.tree.root
    }

    /// Last among its siblings; the root counts as last
    pub fn is_last_child(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.node().children.last() == Some(&self.id),
            None => true,
        }
    }

    /// Distance from the root
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |p| p.parent()).count()
    }

    /// `is_last_child` of each node from the root's child down to this one
    ///
    /// A renderer draws a vertical guide at each level whose flag is false.
    pub fn hierarchy_indents(&self) -> Vec<bool> {
        let mut flags: Vec<bool> = std::iter::successors(Some(*self), |n| n.parent())
            .filter(|n| !n.is_root())
            .map(|n| n.is_last_child())
            .collect();
        flags.reverse();
        flags
    }

    pub fn is_slice(&self) -> bool {
        self.node().is_slice
    }

    pub fn is_setup_slice(&self) -> bool {
        self.field().is_setup_slice()
    }

    pub fn is_setup_slice_for_extension(&self) -> bool {
        self.field().is_setup_slice_for_extension()
    }

    pub fn is_synthetic(&self) -> bool {
        self.field().synthetic
    }

    /// This node or an ancestor has a zero upper cardinality
    pub fn is_removed(&self) -> bool {
        std::iter::successors(Some(*self), |n| n.parent()).any(|n| n.field().has_zero_max())
    }

    pub fn changed_from_base(&self) -> bool {
        self.field().changed_from_base
    }

    pub fn this_or_children_changed(&self) -> bool {
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if node.changed_from_base() {
                return true;
            }
            stack.extend(node.children());
        }
        false
    }

    pub fn extension_definition(&self) -> Option<&'a Arc<StructureDefinition>> {
        self.node().extension_definition.as_ref()
    }

    pub fn types(&self) -> Option<&'a [ElementDefinitionType]> {
        self.field().types()
    }

    pub fn node_type(&self) -> NodeType {
        let field = self.field();
        classify(&NodeFacts {
            is_setup_slice: field.is_setup_slice(),
            types: field.types(),
            complex_extension: self
                .extension_definition()
                .is_some_and(|sd| sd.is_complex_extension()),
            path_before_slice_indexing: field.path_before_slice_indexing.as_deref(),
            has_alias: field.element.content_reference.is_some(),
        })
    }

    pub fn is_extension(&self) -> bool {
        self.node_type().is_extension()
    }

    /// Label for rendering
    ///
    /// Extensions show their name, or the last path segment when unnamed;
    /// other nodes show the last path segment, followed by `[name]` for named
    /// slices. The `#n` slice marker is never shown.
    pub fn display_name(&self) -> String {
        let field = self.field();
        let segment = field.last_segment_without_slice_index();
        if self.is_extension() {
            return field
                .name()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(segment)
                .to_string();
        }
        match field.name().filter(|n| !n.trim().is_empty()) {
            Some(name) => format!("{} [{}]", segment, name),
            None => segment.to_string(),
        }
    }

    pub fn cardinality_text(&self) -> Option<String> {
        self.field().cardinality_text()
    }

    pub fn short(&self) -> Option<&'a str> {
        self.field().short()
    }

    pub fn definition(&self) -> Option<&'a str> {
        self.field().definition()
    }

    pub fn value_set(&self) -> Option<&'a str> {
        self.field().value_set()
    }

    pub fn binding_strength(&self) -> Option<BindingStrength> {
        self.field().binding_strength()
    }

    pub fn fixed_value(&self) -> Option<(&'a str, &'a Value)> {
        self.field().fixed_value()
    }

    /// Human-readable text of each constraint
    pub fn invariants(&self) -> Vec<&'a str> {
        self.field()
            .constraints()
            .iter()
            .map(|c| c.human.as_str())
            .collect()
    }

    /// Canonical URL of the profiled extension this node uses
    pub fn extension_url(&self) -> Option<&'a str> {
        self.field().extension_url()
    }

    /// Path with slice markers removed from every segment
    pub fn unindexed_path(&self) -> String {
        self.path()
            .split('.')
            .map(strip_slice_index)
            .collect::<Vec<_>>()
            .join(".")
    }
}
