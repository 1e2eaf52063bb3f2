//! FHIR ElementDefinition model
//!
//! Version-agnostic model for ElementDefinition (the records that make up a
//! StructureDefinition differential or snapshot). DSTU2 spellings are accepted
//! as serde aliases so older profiles load without conversion.

use super::error::{Error, Result};
use super::type_category::TypeCategory;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Suffix marking a choice-type element (`value[x]`)
pub const CHOICE_SUFFIX: &str = "[x]";

/// FHIR ElementDefinition - defines an element in a resource or data type structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Name for this particular element (DSTU2 `name`, R3+ `sliceName`)
    #[serde(alias = "sliceName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Full formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Comments about the use of this element
    #[serde(alias = "comments", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Minimum cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Base definition information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ElementDefinitionBase>,

    /// Reference to another element whose definition is reused here
    #[serde(alias = "nameReference", skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// Condition that must evaluate to true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Vec<ElementDefinitionConstraint>>,

    /// If this modifies the meaning of other elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,

    /// Include when in summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_summary: Option<bool>,

    /// ValueSet details if this is coded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// This element is sliced - slices follow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slicing: Option<ElementDefinitionSlicing>,

    /// If this element must be supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,

    /// Additional content beyond core fields (fixed[x], pattern[x], mappings, ...)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Base definition information for an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionBase {
    /// Path that identifies the base element
    pub path: String,

    /// Min cardinality of the base element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// Max cardinality of the base element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// Data type for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    pub code: String,

    /// Profile (StructureDefinition canonical URLs) that apply.
    ///
    /// DSTU2 carries a list, STU3 a single string; both are accepted.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<Vec<String>>,

    /// Profile (StructureDefinition) for Reference/canonical target types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,

    /// Explicit structural category; inferred from `code` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TypeCategory>,
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(v)) => Some(v),
        None => None,
    })
}

impl ElementDefinitionType {
    /// Create a type reference from a bare code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
            target_profile: None,
            category: None,
        }
    }

    /// Attach a single profile URL
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(vec![profile.into()]);
        self
    }

    /// Structural category of this type
    pub fn category(&self) -> TypeCategory {
        self.category
            .unwrap_or_else(|| TypeCategory::from_code(&self.code))
    }

    pub fn is_reference(&self) -> bool {
        self.category() == TypeCategory::Reference
    }

    pub fn is_complex_type(&self) -> bool {
        self.category() == TypeCategory::Complex
    }

    pub fn is_extension(&self) -> bool {
        self.category() == TypeCategory::Extension
    }

    /// The single profile URL, if exactly one is declared
    pub fn single_profile(&self) -> Option<&str> {
        match self.profile.as_deref() {
            Some([only]) => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Constraint on an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionConstraint {
    /// Target of 'condition' reference
    pub key: String,

    /// Severity (error | warning)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<ConstraintSeverity>,

    /// Human description of constraint
    pub human: String,

    /// FHIRPath expression of constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// Severity of a constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintSeverity {
    Error,
    Warning,
}

/// ValueSet binding for a coded element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    /// Binding strength (required | extensible | preferred | example)
    pub strength: BindingStrength,

    /// Human explanation of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source of value set
    #[serde(alias = "valueSetUri", skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// DSTU2 `valueSetReference`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set_reference: Option<BindingReference>,
}

/// DSTU2 reference wrapper used by `binding.valueSetReference`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindingReference {
    pub reference: String,
}

impl ElementDefinitionBinding {
    /// Canonical URL of the bound value set, whichever spelling was used
    pub fn value_set_url(&self) -> Option<&str> {
        self.value_set
            .as_deref()
            .or_else(|| self.value_set_reference.as_ref().map(|r| r.reference.as_str()))
    }
}

/// Binding strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

impl BindingStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingStrength::Required => "required",
            BindingStrength::Extensible => "extensible",
            BindingStrength::Preferred => "preferred",
            BindingStrength::Example => "example",
        }
    }
}

/// Slicing information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionSlicing {
    /// Element values that are used to distinguish slices.
    ///
    /// Kept as raw JSON: DSTU2 uses bare path strings, R3+ uses objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<Value>>,

    /// Text description of how slicing works
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// If elements must be in same order as slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,

    /// Slicing rules (closed | open | openAtEnd)
    pub rules: SlicingRules,
}

/// Slicing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlicingRules {
    Closed,
    Open,
    OpenAtEnd,
}

/// Snapshot - a set of elements that define the structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

/// Differential - a set of elements that define changes from the base
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}

impl Snapshot {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Get an element by path
    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|e| e.path == path)
    }
}

impl Differential {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Get an element by path
    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|e| e.path == path)
    }
}

/// Children of `parent` within `elements`, in list order
pub fn children_of<'a>(
    elements: &'a [ElementDefinition],
    parent: &'a ElementDefinition,
) -> impl Iterator<Item = &'a ElementDefinition> + 'a {
    elements
        .iter()
        .filter(move |e| e.parent_path() == Some(parent.path.as_str()))
}

/// The unique single-segment element, if there is exactly one
pub fn root_element(elements: &[ElementDefinition]) -> Option<&ElementDefinition> {
    let mut roots = elements.iter().filter(|e| !e.path.contains('.'));
    match (roots.next(), roots.next()) {
        (Some(root), None) => Some(root),
        _ => None,
    }
}

impl ElementDefinition {
    /// Create a bare element with only a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Get the parent path (everything before the last '.')
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('.').map(|pos| &self.path[..pos])
    }

    /// Last dotted segment of the path
    pub fn last_path_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Check if this element is a descendant of the given path
    pub fn is_descendant_of(&self, parent_path: &str) -> bool {
        self.path.starts_with(parent_path)
            && self.path.len() > parent_path.len()
            && self.path.as_bytes().get(parent_path.len()) == Some(&b'.')
    }

    /// Check if this is a choice type element (ends with [x])
    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with(CHOICE_SUFFIX)
    }

    /// Get type codes for this element
    pub fn type_codes(&self) -> Vec<String> {
        self.types
            .as_ref()
            .map(|types| types.iter().map(|t| t.code.clone()).collect())
            .unwrap_or_default()
    }

    /// True when the upper cardinality is the literal `0`
    pub fn is_removed(&self) -> bool {
        max_is_zero(self.max.as_deref())
    }

    /// Stored `base.path`, when non-blank
    pub fn base_path(&self) -> Option<&str> {
        self.base
            .as_ref()
            .map(|b| b.path.as_str())
            .filter(|p| !p.trim().is_empty())
    }

    /// Rebuild the choice path a type-renamed element came from
    ///
    /// `Observation.valueQuantity` typed `Quantity` gives `Observation.value[x]`.
    pub fn reconstructed_base_path(&self) -> Option<String> {
        reconstruct_base_path(&self.path, self.types.as_deref())
    }

    /// First `fixed[x]` value carried by this element
    pub fn fixed_value(&self) -> Option<(&str, &Value)> {
        self.extensions
            .iter()
            .filter(|(k, v)| k.starts_with("fixed") && !v.is_null())
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical URL of the extension this element uses, if it is a profiled extension
    pub fn extension_canonical_url(&self) -> Option<&str> {
        match self.types.as_deref() {
            Some([only]) if only.code.eq_ignore_ascii_case("extension") => only.single_profile(),
            _ => None,
        }
    }

    /// Copy every attribute this element leaves unset from `base`
    pub fn inherit_from(&mut self, base: &ElementDefinition) {
        macro_rules! inherit {
            ($($field:ident),*) => {
                $(
                    if self.$field.is_none() {
                        self.$field = base.$field.clone();
                    }
                )*
            };
        }
        inherit!(
            short,
            definition,
            comment,
            min,
            max,
            content_reference,
            types,
            constraint,
            is_modifier,
            is_summary,
            binding,
            slicing,
            must_support
        );
        for (key, value) in &base.extensions {
            self.extensions
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Get the cardinality as a string (e.g., "0..1", "1..*")
    pub fn cardinality_string(&self) -> String {
        let min = self.min.unwrap_or(0);
        let max = self.max.as_deref().unwrap_or("*");
        format!("{}..{}", min, max)
    }
}

/// Rebuild a choice path from a type-renamed `path` with exactly one type
pub fn reconstruct_base_path(path: &str, types: Option<&[ElementDefinitionType]>) -> Option<String> {
    let [only] = types? else {
        return None;
    };
    if only.code.is_empty() || path.len() < only.code.len() {
        return None;
    }

    let split = path.len() - only.code.len();
    if !path.is_char_boundary(split) || !path[split..].eq_ignore_ascii_case(&only.code) {
        return None;
    }

    let stem = &path[..split];
    if stem.is_empty() || stem.ends_with('.') {
        return None;
    }
    Some(format!("{}{}", stem, CHOICE_SUFFIX))
}

/// True when `max` parses as the integer zero
pub fn max_is_zero(max: Option<&str>) -> bool {
    max.and_then(|m| m.trim().parse::<i64>().ok()) == Some(0)
}
