//! FHIR Context for StructureDefinition access
//!
//! Provides the lookup capability the profile resolver depends on: a
//! trait-based interface over caller-supplied definitions, the process-wide
//! built-in registry, and a loader for JSON definition files.

pub mod builtin;
pub mod context;
pub mod error;
pub mod loader;

pub use builtin::{builtins, install_builtins, BuiltinRegistry};
pub use context::{DefaultFhirContext, FallbackFhirContext, FhirContext};
pub use error::{Error, Result};
