//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for the conformance
//! resources a profile resolver needs: StructureDefinition and ElementDefinition.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic models that work across FHIR DSTU2, STU3, R4 and R5
//!
//! # Design Philosophy
//!
//! - **Version-agnostic core**: Common fields present across all FHIR versions,
//!   with older spellings accepted as serde aliases
//! - **Extensible**: `extensions` field captures version-specific or custom properties
//! - **Strongly-typed**: Type safety for common operations
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::common::{StructureDefinition, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "id": "Patient",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "name": "Patient",
//!     "kind": "resource",
//!     "abstract": false,
//!     "type": "Patient"
//! });
//!
//! let sd: StructureDefinition = serde_json::from_value(sd_json).unwrap();
//! assert_eq!(sd.name, "Patient");
//! assert_eq!(sd.kind, Some(StructureDefinitionKind::Resource));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
