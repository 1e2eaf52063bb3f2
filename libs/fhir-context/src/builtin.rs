//! Process-wide registry of built-in base definitions and data types
//!
//! Installed once at startup and read-only afterwards, so independent
//! resolutions can share it without locking.

use crate::context::{DefaultFhirContext, FhirContext};
use crate::error::{Error, Result};
use ferrum_models::StructureDefinition;
use std::sync::{Arc, OnceLock};

static BUILTINS: OnceLock<Arc<DefaultFhirContext>> = OnceLock::new();

/// Install the built-in definitions; fails if a registry is already installed
pub fn install_builtins(registry: DefaultFhirContext) -> Result<()> {
    BUILTINS
        .set(Arc::new(registry))
        .map_err(|_| Error::RegistryAlreadyInstalled)?;
    tracing::debug!(
        definitions = BUILTINS.get().map(|r| r.len()).unwrap_or(0),
        "installed built-in registry"
    );
    Ok(())
}

/// The installed built-in definitions, if any
pub fn builtins() -> Option<&'static Arc<DefaultFhirContext>> {
    BUILTINS.get()
}

/// [`FhirContext`] view over the process-wide registry
///
/// Resolves nothing until [`install_builtins`] has been called.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinRegistry;

impl FhirContext for BuiltinRegistry {
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>> {
        match builtins() {
            Some(registry) => registry.get_structure_definition(canonical_url),
            None => Ok(None),
        }
    }
}
