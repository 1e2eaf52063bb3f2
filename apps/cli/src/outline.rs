//! Rendering resolved trees as text or JSON

use ferrum_profile_tree::{NodeRef, NodeType, SnapshotTree};
use serde::Serialize;
use std::fmt::Write;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const GUIDE: &str = "│   ";
const SPACER: &str = "    ";

/// One rendered node
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    pub types: Vec<String>,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_url: Option<String>,
    pub removed: bool,
    pub slice: bool,
    pub changed: bool,
}

impl OutlineRow {
    fn from_node(node: &NodeRef<'_>) -> Self {
        Self {
            path: node.path().to_string(),
            name: node.display_name(),
            depth: node.depth(),
            cardinality: node.cardinality_text(),
            types: node
                .types()
                .map(|types| types.iter().map(|t| t.code.clone()).collect())
                .unwrap_or_default(),
            node_type: node.node_type(),
            short: node.short().map(str::to_string),
            value_set: node.value_set().map(str::to_string),
            extension_url: node.extension_url().map(str::to_string),
            removed: node.is_removed(),
            slice: node.is_slice(),
            changed: node.changed_from_base(),
        }
    }
}

pub fn rows(tree: &SnapshotTree) -> Vec<OutlineRow> {
    tree.iter().map(|node| OutlineRow::from_node(&node)).collect()
}

/// Tree-drawing prefix from the node's hierarchy indent flags
fn prefix(node: &NodeRef<'_>) -> String {
    let flags = node.hierarchy_indents();
    let Some((own, ancestors)) = flags.split_last() else {
        return String::new();
    };
    let mut prefix: String = ancestors
        .iter()
        .map(|&last| if last { SPACER } else { GUIDE })
        .collect();
    prefix.push_str(if *own { LAST_BRANCH } else { BRANCH });
    prefix
}

/// Indented outline, one node per line
pub fn render_text(tree: &SnapshotTree) -> String {
    let mut out = String::new();
    for node in tree.iter() {
        let row = OutlineRow::from_node(&node);
        let _ = write!(out, "{}{}", prefix(&node), row.name);
        if let Some(cardinality) = &row.cardinality {
            let _ = write!(out, "  {}", cardinality);
        }
        if !row.types.is_empty() {
            let _ = write!(out, "  {}", row.types.join(" | "));
        }
        if let Some(url) = &row.extension_url {
            let _ = write!(out, "  <{}>", url);
        }
        if let Some(short) = &row.short {
            let _ = write!(out, "  \"{}\"", short);
        }
        if row.removed {
            out.push_str("  (removed)");
        }
        out.push('\n');
    }
    out
}

pub fn render_json(tree: &SnapshotTree) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&rows(tree))
}
