//! FHIR StructureDefinition model
//!
//! Only the parts needed to resolve profiles into element trees are modelled
//! as typed fields; everything else lands in `extensions`.

use super::error::{Error, Result};
use super::element_definition::{
    max_is_zero, root_element, Differential, ElementDefinition, ElementDefinitionType, Snapshot,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Canonical URL prefix of the core FHIR definitions
pub const CORE_STRUCTURE_DEFINITION_BASE: &str = "http://hl7.org/fhir/StructureDefinition/";

/// Path of the value element in an extension definition
const EXTENSION_VALUE_PATH: &str = "Extension.value[x]";

/// Path of nested extensions in an extension definition
const EXTENSION_EXTENSION_PATH: &str = "Extension.extension";

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// FHIR StructureDefinition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Human friendly name (DSTU2 `display`)
    #[serde(alias = "display", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StructureDefinitionKind>,

    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// Type defined or constrained (DSTU2 `constrainedType`)
    #[serde(rename = "type", alias = "constrainedType", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Definition this one is based on (DSTU2 `base`)
    #[serde(alias = "base", skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Kind of structure being defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    /// DSTU2 lumps primitive and complex types together
    Datatype,
    Resource,
    Logical,
}

/// How a definition relates to its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    Specialization,
    Constraint,
}

impl StructureDefinition {
    /// Parse from JSON Value, rejecting other resource types
    pub fn from_value(value: &Value) -> Result<Self> {
        let sd: StructureDefinition = serde_json::from_value(value.clone())?;
        if sd.resource_type != "StructureDefinition" {
            return Err(Error::InvalidResource(format!(
                "expected StructureDefinition, got {}",
                sd.resource_type
            )));
        }
        Ok(sd)
    }

    /// Differential elements, or an empty slice
    pub fn differential_elements(&self) -> &[ElementDefinition] {
        self.differential
            .as_ref()
            .map(|d| d.element.as_slice())
            .unwrap_or_default()
    }

    /// The most complete element list available: snapshot, else differential
    pub fn element_list(&self) -> Option<&[ElementDefinition]> {
        self.snapshot
            .as_ref()
            .map(|s| s.element.as_slice())
            .or_else(|| self.differential.as_ref().map(|d| d.element.as_slice()))
    }

    /// Root element of the most complete element list
    pub fn root_element(&self) -> Option<&ElementDefinition> {
        self.element_list().and_then(root_element)
    }

    /// Path of the root element (e.g. `Patient`)
    pub fn root_path(&self) -> Option<&str> {
        self.root_element().map(|e| e.path.as_str())
    }

    /// Name to show for this definition
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn is_extension(&self) -> bool {
        self.type_
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("extension"))
    }

    /// Value types of a simple extension
    ///
    /// `None` when the definition is not an extension, declares no
    /// `Extension.value[x]`, or prohibits it with `max = 0`.
    pub fn simple_extension_types(&self) -> Option<&[ElementDefinitionType]> {
        if !self.is_extension() {
            return None;
        }
        let elements = self.element_list()?;

        let value = elements
            .iter()
            .find(|e| e.path == EXTENSION_VALUE_PATH)
            .or_else(|| {
                elements
                    .iter()
                    .find(|e| e.base_path() == Some(EXTENSION_VALUE_PATH))
            })
            .or_else(|| {
                elements.iter().find(|e| {
                    e.reconstructed_base_path().as_deref() == Some(EXTENSION_VALUE_PATH)
                })
            })?;

        if max_is_zero(value.max.as_deref()) {
            return None;
        }
        value.types.as_deref()
    }

    /// Whether this extension nests other extensions instead of carrying a value
    pub fn is_complex_extension(&self) -> bool {
        if !self.is_extension() || self.simple_extension_types().is_some() {
            return false;
        }
        self.element_list()
            .map(|elements| {
                elements
                    .iter()
                    .filter(|e| e.path == EXTENSION_EXTENSION_PATH)
                    .count()
                    > 1
            })
            .unwrap_or(false)
    }
}

/// Whether `url` is one of the spellings of the generic StructureDefinition root
pub fn is_root_sentinel(url: &str) -> bool {
    url == CORE_STRUCTURE_DEFINITION_BASE || url == CORE_STRUCTURE_DEFINITION_BASE.trim_end_matches('/')
}
