//! Version-agnostic FHIR models
//!
//! Types that work across FHIR DSTU2, STU3, R4 and R5

pub mod element_definition;
pub mod error;
pub mod structure_definition;
pub mod type_category;

// Re-export commonly used types
pub use element_definition::*;
pub use error::{Error, Result};
pub use structure_definition::*;
pub use type_category::*;
