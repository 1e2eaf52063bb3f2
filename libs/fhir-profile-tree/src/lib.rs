//! FHIR profile snapshot trees
//!
//! Resolves a StructureDefinition profile (a differential over a base
//! definition) into the complete tree of elements it describes: the ancestor
//! chain is followed, the differential is merged onto the nearest resolved
//! ancestor, slices get unique `#n` paths, missing parents are filled in, and
//! a series of passes expands data types and groups slices.
//!
//! # Example
//!
//! ```rust,no_run
//! use ferrum_context::{loader::load_paths, BuiltinRegistry, FallbackFhirContext};
//! use ferrum_profile_tree::{SnapshotTreeBuilder, TreeOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profiles = load_paths(&["profiles/"])?;
//! let ctx = FallbackFhirContext::new(profiles, BuiltinRegistry);
//! let profile = ctx
//!     .primary()
//!     .definitions()
//!     .next()
//!     .cloned()
//!     .expect("at least one profile");
//!
//! let tree = SnapshotTreeBuilder::new(&profile, &ctx)?
//!     .with_options(TreeOptions::default())
//!     .snapshot_tree()?;
//! for node in tree.iter() {
//!     println!("{}{}", "  ".repeat(node.depth()), node.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod expansion;
pub mod field;
pub mod hierarchy;
pub mod merge;
pub mod node_type;
pub mod parents;
pub mod passes;
pub mod slicing;
pub mod tree;
pub mod validation;

pub use builder::{
    generate_differential_tree, generate_snapshot_tree, SnapshotTreeBuilder, TreeOptions,
};
pub use error::{Error, Result};
pub use field::Field;
pub use hierarchy::{find_field_in_current, structure_definition_and_bases, AncestorChain};
pub use merge::merge;
pub use node_type::NodeType;
pub use parents::fill_missing_parents;
pub use slicing::index_slices;
pub use tree::{NodeId, NodeRef, SnapshotTree};
pub use ferrum_models::{ElementDefinition, ElementDefinitionType, StructureDefinition};
