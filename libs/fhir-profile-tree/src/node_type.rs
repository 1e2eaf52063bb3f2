//! Classification of resolved tree nodes

use ferrum_models::{ElementDefinitionType, TypeCategory};
use serde::Serialize;
use std::fmt;

/// What a node in a snapshot tree represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// Slicing entry that introduces a set of slices
    SetupSlice,
    Unknown,
    PrimitiveType,
    Reference,
    ComplexType,
    /// Inline structure owned by the resource
    BackboneElement,
    SimpleExtension,
    ComplexExtension,
    Resource,
    /// Several allowed types, none of them a reference
    Choice,
    /// Reuses the definition of another element
    AliasReference,
}

impl NodeType {
    pub fn is_extension(&self) -> bool {
        matches!(self, NodeType::SimpleExtension | NodeType::ComplexExtension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::SetupSlice => "setup-slice",
            NodeType::Unknown => "unknown",
            NodeType::PrimitiveType => "primitive-type",
            NodeType::Reference => "reference",
            NodeType::ComplexType => "complex-type",
            NodeType::BackboneElement => "backbone-element",
            NodeType::SimpleExtension => "simple-extension",
            NodeType::ComplexExtension => "complex-extension",
            NodeType::Resource => "resource",
            NodeType::Choice => "choice",
            NodeType::AliasReference => "alias-reference",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything classification looks at
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFacts<'a> {
    pub is_setup_slice: bool,
    /// Resolved type list (own, else base)
    pub types: Option<&'a [ElementDefinitionType]>,
    /// Attached extension definition is a complex extension
    pub complex_extension: bool,
    pub path_before_slice_indexing: Option<&'a str>,
    pub has_alias: bool,
}

pub fn classify(facts: &NodeFacts<'_>) -> NodeType {
    if facts.is_setup_slice {
        return NodeType::SetupSlice;
    }

    match facts.types {
        Some([]) => NodeType::Unknown,
        Some([only]) => match only.category() {
            TypeCategory::Backbone => NodeType::BackboneElement,
            TypeCategory::Primitive => NodeType::PrimitiveType,
            TypeCategory::Reference => NodeType::Reference,
            TypeCategory::Complex => NodeType::ComplexType,
            TypeCategory::Extension if facts.complex_extension => NodeType::ComplexExtension,
            TypeCategory::Extension => NodeType::SimpleExtension,
            TypeCategory::Resource => NodeType::Resource,
        },
        Some(many) if many.iter().any(|t| t.is_reference()) => NodeType::Reference,
        Some(_) => NodeType::Choice,
        None if facts
            .path_before_slice_indexing
            .is_some_and(|p| p.ends_with(".extension")) =>
        {
            NodeType::SimpleExtension
        }
        None if facts.has_alias => NodeType::AliasReference,
        None => NodeType::Unknown,
    }
}
