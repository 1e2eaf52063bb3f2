//! Error types for FHIR context

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("StructureDefinition not found: {0}")]
    StructureDefinitionNotFound(String),

    #[error("Invalid StructureDefinition: {0}")]
    InvalidStructureDefinition(String),

    #[error("Duplicate StructureDefinition url: {0}")]
    DuplicateStructureDefinition(String),

    #[error("Built-in registry already installed")]
    RegistryAlreadyInstalled,

    #[error("Model error: {0}")]
    Model(#[from] ferrum_models::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
