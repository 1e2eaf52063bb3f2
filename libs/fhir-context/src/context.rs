//! Lookup of StructureDefinitions by canonical URL
//!
//! [`FhirContext`] is the capability the profile resolver consumes. Lookups
//! return `Ok(None)` for unknown URLs; callers decide whether that is fatal.

use crate::error::{Error, Result};
use ferrum_models::{StructureDefinition, CORE_STRUCTURE_DEFINITION_BASE};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only access to conformance resources
pub trait FhirContext: Send + Sync {
    /// Look up a StructureDefinition by canonical URL
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>>;

    /// Look up the definition of a data type by its type code
    ///
    /// The default resolves the core canonical URL for `type_name`.
    fn get_data_type(&self, type_name: &str) -> Result<Option<Arc<StructureDefinition>>> {
        if type_name.contains("://") {
            return self.get_structure_definition(type_name);
        }
        self.get_structure_definition(&format!("{}{}", CORE_STRUCTURE_DEFINITION_BASE, type_name))
    }
}

impl<C: FhirContext + ?Sized> FhirContext for Arc<C> {
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>> {
        (**self).get_structure_definition(canonical_url)
    }

    fn get_data_type(&self, type_name: &str) -> Result<Option<Arc<StructureDefinition>>> {
        (**self).get_data_type(type_name)
    }
}

impl<C: FhirContext + ?Sized> FhirContext for &C {
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>> {
        (**self).get_structure_definition(canonical_url)
    }

    fn get_data_type(&self, type_name: &str) -> Result<Option<Arc<StructureDefinition>>> {
        (**self).get_data_type(type_name)
    }
}

/// In-memory set of StructureDefinitions keyed by canonical URL
#[derive(Debug, Default, Clone)]
pub struct DefaultFhirContext {
    by_url: HashMap<String, Arc<StructureDefinition>>,
    order: Vec<String>,
}

impl DefaultFhirContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from definitions, rejecting duplicate URLs
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = StructureDefinition>,
    ) -> Result<Self> {
        let mut ctx = Self::new();
        for sd in definitions {
            ctx.insert(sd)?;
        }
        Ok(ctx)
    }

    /// Add one definition
    pub fn insert(&mut self, sd: StructureDefinition) -> Result<Arc<StructureDefinition>> {
        if sd.url.trim().is_empty() {
            return Err(Error::InvalidStructureDefinition(format!(
                "StructureDefinition '{}' has no url",
                sd.name
            )));
        }
        if self.by_url.contains_key(&sd.url) {
            return Err(Error::DuplicateStructureDefinition(sd.url));
        }

        let url = sd.url.clone();
        let sd = Arc::new(sd);
        self.order.push(url.clone());
        self.by_url.insert(url, Arc::clone(&sd));
        Ok(sd)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in insertion order
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<StructureDefinition>> {
        self.order.iter().filter_map(|url| self.by_url.get(url))
    }

    /// Definitions that are not extensions, in insertion order
    pub fn definitions_without_extensions(
        &self,
    ) -> impl Iterator<Item = &Arc<StructureDefinition>> {
        self.definitions().filter(|sd| !sd.is_extension())
    }

    /// Extension definitions, in insertion order
    pub fn extension_definitions(&self) -> impl Iterator<Item = &Arc<StructureDefinition>> {
        self.definitions().filter(|sd| sd.is_extension())
    }
}

impl FhirContext for DefaultFhirContext {
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>> {
        Ok(self.by_url.get(canonical_url).cloned())
    }
}

/// Tries `primary` first and falls back to `fallback` for unknown URLs
///
/// The usual pairing is the caller's own definitions over the built-in registry.
pub struct FallbackFhirContext<P, F> {
    primary: P,
    fallback: F,
}

impl<P: FhirContext, F: FhirContext> FallbackFhirContext<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: FhirContext, F: FhirContext> FhirContext for FallbackFhirContext<P, F> {
    fn get_structure_definition(
        &self,
        canonical_url: &str,
    ) -> Result<Option<Arc<StructureDefinition>>> {
        match self.primary.get_structure_definition(canonical_url)? {
            Some(sd) => Ok(Some(sd)),
            None => self.fallback.get_structure_definition(canonical_url),
        }
    }

    fn get_data_type(&self, type_name: &str) -> Result<Option<Arc<StructureDefinition>>> {
        match self.primary.get_data_type(type_name)? {
            Some(sd) => Ok(Some(sd)),
            None => self.fallback.get_data_type(type_name),
        }
    }
}
