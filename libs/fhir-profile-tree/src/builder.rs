//! Resolution pipeline from a StructureDefinition to a snapshot tree

use crate::error::{Error, Result};
use crate::expansion::ComplexTypeExpander;
use crate::field::Field;
use crate::hierarchy::AncestorChain;
use crate::merge::{merge, resolve_ancestor_fields};
use crate::parents::fill_missing_parents;
use crate::passes;
use crate::slicing::index_slices;
use crate::tree::{walk, SnapshotTree};
use crate::validation::{validate_differential, validate_parent_completeness};
use ferrum_context::FhirContext;
use ferrum_models::StructureDefinition;
use serde::{Deserialize, Serialize};

/// Options for snapshot tree generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeOptions {
    /// Keep nodes with a zero upper cardinality (on themselves or an ancestor)
    pub include_removed: bool,
    /// Reject differentials that repeat a path
    pub enforce_unique_paths: bool,
    /// Graft complex data type children under typed nodes
    pub expand_complex_types: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            include_removed: true,
            enforce_unique_paths: false,
            expand_complex_types: true,
        }
    }
}

/// Resolves one StructureDefinition against its ancestors
///
/// The ancestor chain is resolved once, up front; each generation call then
/// works on fresh overlays of the differential.
pub struct SnapshotTreeBuilder<'a> {
    sd: &'a StructureDefinition,
    ctx: &'a dyn FhirContext,
    chain: AncestorChain,
    options: TreeOptions,
}

impl<'a> SnapshotTreeBuilder<'a> {
    pub fn new(sd: &'a StructureDefinition, ctx: &'a dyn FhirContext) -> Result<Self> {
        let chain = AncestorChain::build(sd, ctx)?;
        Ok(Self {
            sd,
            ctx,
            chain,
            options: TreeOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn chain(&self) -> &AncestorChain {
        &self.chain
    }

    /// Flat, parent-complete field list in snapshot order
    pub fn snapshot_fields(&self) -> Result<Vec<Field>> {
        let differential = self.sd.differential.as_ref().ok_or_else(|| {
            Error::MalformedInput(format!("StructureDefinition {} has no differential", self.sd.url))
        })?;
        validate_differential(&differential.element, self.options.enforce_unique_paths)?;

        let mut fields: Vec<Field> = differential
            .element
            .iter()
            .map(|element| {
                let mut field = Field::from_differential(element);
                field.base = self.chain.find_ancestor_field(element);
                field
            })
            .collect();

        index_slices(&mut fields)?;

        let base = resolve_ancestor_fields(&self.chain)?;
        tracing::debug!(
            url = %self.sd.url,
            differential = fields.len(),
            base = base.len(),
            "merging differential"
        );

        let fields = fill_missing_parents(merge(fields, base));
        validate_parent_completeness(&fields)?;
        Ok(fields)
    }

    /// Full snapshot tree after every post-processing pass
    pub fn snapshot_tree(&self) -> Result<SnapshotTree> {
        self.build_tree(self.options)
    }

    /// Only the nodes that this definition changes, and their ancestors
    ///
    /// Removed nodes are kept so that prohibitions stay visible.
    pub fn differential_tree(&self) -> Result<SnapshotTree> {
        let options = TreeOptions {
            include_removed: true,
            ..self.options
        };
        let mut tree = self.build_tree(options)?;
        walk(&mut tree, |tree, id| {
            let node = tree.node(id);
            let keep = node.is_root() || node.this_or_children_changed();
            if !keep {
                tree.detach(id);
            }
            Ok(())
        })?;
        Ok(tree)
    }

    fn build_tree(&self, options: TreeOptions) -> Result<SnapshotTree> {
        let mut tree = SnapshotTree::assemble(self.snapshot_fields()?)?;
        tracing::debug!(url = %self.sd.url, nodes = tree.node_count(), "tree assembled");

        if options.expand_complex_types {
            let mut expander = ComplexTypeExpander::new(self.ctx);
            walk(&mut tree, |tree, id| expander.expand(tree, id))?;
        }

        walk(&mut tree, |tree, id| {
            passes::group_slices(tree, id);
            Ok(())
        })?;

        if !options.include_removed {
            walk(&mut tree, |tree, id| {
                passes::remove_zero_max_cardinality(tree, id);
                Ok(())
            })?;
        }

        walk(&mut tree, |tree, id| {
            passes::remove_extension_setup_slices(tree, id);
            Ok(())
        })?;

        let ctx = self.ctx;
        walk(&mut tree, |tree, id| passes::add_extension_definition(tree, id, ctx))?;

        walk(&mut tree, |tree, id| {
            passes::group_open_slice_elements(tree, id);
            Ok(())
        })?;

        tracing::debug!(url = %self.sd.url, nodes = tree.node_count(), "snapshot tree resolved");
        Ok(tree)
    }
}

/// Resolve `sd` into its snapshot tree
pub fn generate_snapshot_tree(
    sd: &StructureDefinition,
    ctx: &dyn FhirContext,
    options: TreeOptions,
) -> Result<SnapshotTree> {
    SnapshotTreeBuilder::new(sd, ctx)?
        .with_options(options)
        .snapshot_tree()
}

/// Resolve `sd` into the tree of nodes it changes
pub fn generate_differential_tree(
    sd: &StructureDefinition,
    ctx: &dyn FhirContext,
) -> Result<SnapshotTree> {
    SnapshotTreeBuilder::new(sd, ctx)?.differential_tree()
}
