//! Structural category of an element type code

use serde::{Deserialize, Serialize};

/// General-purpose complex data types across DSTU2, STU3, R4 and R5.
///
/// `Element` is listed because profiles of `Extension` type their root as `Element`.
pub const FHIR_COMPLEX_TYPES: &[&str] = &[
    "Address",
    "Age",
    "Annotation",
    "Attachment",
    "Availability",
    "CodeableConcept",
    "CodeableReference",
    "Coding",
    "ContactDetail",
    "ContactPoint",
    "Contributor",
    "Count",
    "DataRequirement",
    "Distance",
    "Dosage",
    "Duration",
    "Element",
    "ElementDefinition",
    "Expression",
    "ExtendedContactDetail",
    "HumanName",
    "Identifier",
    "MarketingStatus",
    "Meta",
    "Money",
    "MoneyQuantity",
    "Narrative",
    "ParameterDefinition",
    "Period",
    "ProductShelfLife",
    "Quantity",
    "Range",
    "Ratio",
    "RatioRange",
    "RelatedArtifact",
    "SampledData",
    "Signature",
    "SimpleQuantity",
    "Timing",
    "TriggerDefinition",
    "UsageContext",
    "VirtualServiceDetail",
];

/// What kind of thing an element type code names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCategory {
    /// string, boolean, code, uri, ...
    Primitive,
    /// HumanName, Identifier, Period, ...
    Complex,
    /// Inline structure declared by the owning resource
    Backbone,
    Reference,
    Extension,
    Resource,
}

impl TypeCategory {
    /// Infer the category from a type code
    pub fn from_code(code: &str) -> Self {
        match code {
            "Reference" => TypeCategory::Reference,
            "Extension" => TypeCategory::Extension,
            "BackboneElement" => TypeCategory::Backbone,
            "Resource" | "DomainResource" => TypeCategory::Resource,
            "xhtml" => TypeCategory::Primitive,
            c if FHIR_COMPLEX_TYPES.contains(&c) => TypeCategory::Complex,
            c if c.starts_with(|ch: char| ch.is_ascii_lowercase()) => TypeCategory::Primitive,
            // FHIRPath system types used by R4+ for id/extension.url etc.
            c if c.starts_with("http://hl7.org/fhirpath/") => TypeCategory::Primitive,
            _ => TypeCategory::Resource,
        }
    }
}
