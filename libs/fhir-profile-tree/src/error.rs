//! Error types for profile tree resolution

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A base definition or extension profile URL did not resolve
    #[error("StructureDefinition not found: {0}")]
    ReferenceNotFound(String),

    /// A complex data type has no definition in the context
    #[error("Data type not found: {0}")]
    TypeNotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An ancestor has neither a snapshot nor a differential to inherit from
    #[error("Ancestor has no element list: {0}")]
    MissingBase(String),

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("FHIR context error: {0}")]
    Context(#[from] ferrum_context::Error),
}
