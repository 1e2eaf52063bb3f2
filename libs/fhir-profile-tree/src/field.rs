//! Per-resolution overlay on an element record
//!
//! A [`Field`] carries the attributes resolution needs (effective path, base
//! link, change flag) next to a shared copy of the source record, so the
//! caller's StructureDefinition is never mutated.

use ferrum_models::{
    max_is_zero, reconstruct_base_path, BindingStrength, ElementDefinition,
    ElementDefinitionConstraint, ElementDefinitionType, SlicingRules,
};
use serde_json::Value;
use std::sync::Arc;

/// Extension paths whose slicing entry only sets up slicing by url
const EXTENSION_SETUP_SUFFIXES: [&str; 2] = [".extension", ".modifierExtension"];

#[derive(Debug, Clone)]
pub struct Field {
    /// The record this field was built from
    pub element: Arc<ElementDefinition>,
    /// Effective path; slices carry a `#n` suffix on the sliced segment
    pub path: String,
    /// Path as it was before slice indexing rewrote it
    pub path_before_slice_indexing: Option<String>,
    /// Matching record in an ancestor or data type
    pub base: Option<Arc<ElementDefinition>>,
    /// Whether the record comes from the differential being resolved
    pub changed_from_base: bool,
    /// Placeholder created for a missing intermediate path
    pub synthetic: bool,
}

impl Field {
    /// Field for a record of the differential being resolved
    pub fn from_differential(element: &ElementDefinition) -> Self {
        Self {
            path: element.path.clone(),
            element: Arc::new(element.clone()),
            path_before_slice_indexing: None,
            base: None,
            changed_from_base: true,
            synthetic: false,
        }
    }

    /// Field copied from an ancestor's resolved list
    pub fn inherited(element: Arc<ElementDefinition>) -> Self {
        Self {
            path: element.path.clone(),
            element,
            path_before_slice_indexing: None,
            base: None,
            changed_from_base: false,
            synthetic: false,
        }
    }

    /// Field grafted from a data type definition at `path`
    pub fn from_data_type(element: Arc<ElementDefinition>, path: String) -> Self {
        Self {
            path,
            base: Some(Arc::clone(&element)),
            element,
            path_before_slice_indexing: None,
            changed_from_base: false,
            synthetic: false,
        }
    }

    /// Empty placeholder for a missing intermediate path
    pub fn synthetic(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            element: Arc::new(ElementDefinition::new(path.clone())),
            path,
            path_before_slice_indexing: None,
            base: None,
            changed_from_base: false,
            synthetic: true,
        }
    }

    /// Catch-all child for unnamed entries of an open slicing
    pub fn open_slice(path: impl Into<String>, types: Option<Vec<ElementDefinitionType>>) -> Self {
        let path = path.into();
        let mut element = ElementDefinition::new(path.clone());
        element.types = types;
        Self {
            element: Arc::new(element),
            path,
            path_before_slice_indexing: None,
            base: None,
            changed_from_base: false,
            synthetic: true,
        }
    }

    /// Own value, else the base link's
    fn effective<'a, T: ?Sized>(
        &'a self,
        get: impl Fn(&'a ElementDefinition) -> Option<&'a T>,
    ) -> Option<&'a T> {
        get(&self.element).or_else(|| self.base.as_deref().and_then(|b| get(b)))
    }

    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('.').map(|pos| &self.path[..pos])
    }

    pub fn last_path_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Last segment with any `#n` slice marker removed
    pub fn last_segment_without_slice_index(&self) -> &str {
        strip_slice_index(self.last_path_segment())
    }

    /// Choice path this field's current path was renamed from
    pub fn reconstructed_base_path(&self) -> Option<String> {
        reconstruct_base_path(&self.path, self.element.types.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        self.element.name.as_deref()
    }

    pub fn types(&self) -> Option<&[ElementDefinitionType]> {
        self.effective(|e| e.types.as_deref())
    }

    pub fn min(&self) -> Option<u32> {
        self.element
            .min
            .or_else(|| self.base.as_ref().and_then(|b| b.min))
    }

    pub fn max(&self) -> Option<&str> {
        self.effective(|e| e.max.as_deref())
    }

    pub fn short(&self) -> Option<&str> {
        self.effective(|e| e.short.as_deref())
    }

    pub fn definition(&self) -> Option<&str> {
        self.effective(|e| e.definition.as_deref())
    }

    pub fn value_set(&self) -> Option<&str> {
        self.effective(|e| e.binding.as_ref().and_then(|b| b.value_set_url()))
    }

    pub fn binding_strength(&self) -> Option<BindingStrength> {
        self.effective(|e| e.binding.as_ref())
            .map(|binding| binding.strength)
    }

    pub fn constraints(&self) -> &[ElementDefinitionConstraint] {
        self.effective(|e| e.constraint.as_deref())
            .unwrap_or_default()
    }

    pub fn fixed_value(&self) -> Option<(&str, &Value)> {
        self.element
            .fixed_value()
            .or_else(|| self.base.as_deref().and_then(|b| b.fixed_value()))
    }

    /// Upper cardinality is zero, on the record or its base
    pub fn has_zero_max(&self) -> bool {
        max_is_zero(self.max())
    }

    /// `min..max`, when both bounds resolve
    pub fn cardinality_text(&self) -> Option<String> {
        Some(format!("{}..{}", self.min()?, self.max()?))
    }

    /// Record declares slicing (on itself, not inherited)
    pub fn is_setup_slice(&self) -> bool {
        self.element.slicing.is_some()
    }

    pub fn slicing_rules(&self) -> Option<SlicingRules> {
        self.element.slicing.as_ref().map(|s| s.rules)
    }

    /// Slicing entry of an `extension` or `modifierExtension` element
    pub fn is_setup_slice_for_extension(&self) -> bool {
        self.is_setup_slice()
            && EXTENSION_SETUP_SUFFIXES
                .iter()
                .any(|suffix| self.path.ends_with(suffix))
    }

    /// Profile URL of a profiled extension element
    pub fn extension_url(&self) -> Option<&str> {
        match self.types() {
            Some([only]) if only.is_extension() => only.single_profile(),
            _ => None,
        }
    }
}

/// `identifier#2` becomes `identifier`
pub fn strip_slice_index(segment: &str) -> &str {
    segment.split('#').next().unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(path: &str) -> ElementDefinition {
        ElementDefinition::new(path)
    }

    #[test]
    fn falls_back_to_base_attributes() {
        let mut base = element("Patient.name");
        base.short = Some("A name".into());
        base.min = Some(0);
        base.max = Some("*".into());

        let mut own = element("Patient.name");
        own.min = Some(1);
        let mut field = Field::from_differential(&own);
        field.base = Some(Arc::new(base));

        assert_eq!(field.short(), Some("A name"));
        assert_eq!(field.cardinality_text().as_deref(), Some("1..*"));
        assert!(field.changed_from_base);
    }

    #[test]
    fn cardinality_without_bounds() {
        let field = Field::synthetic("Patient.contact");
        assert_eq!(field.cardinality_text(), None);
        assert!(field.synthetic);
    }

    #[test]
    fn zero_max_comes_from_either_side() {
        let mut base = element("Patient.photo");
        base.max = Some("0".into());
        let mut field = Field::from_differential(&element("Patient.photo"));
        assert!(!field.has_zero_max());
        field.base = Some(Arc::new(base));
        assert!(field.has_zero_max());
    }

    #[test]
    fn strips_slice_markers() {
        let mut field = Field::synthetic("Patient.identifier#2");
        assert_eq!(field.last_segment_without_slice_index(), "identifier");
        field.path = "Patient.identifier#2.system".into();
        assert_eq!(field.last_segment_without_slice_index(), "system");
        assert_eq!(field.parent_path(), Some("Patient.identifier#2"));
    }

    #[test]
    fn extension_setup_slices() {
        let mut el = element("Patient.extension");
        el.slicing = Some(ferrum_models::ElementDefinitionSlicing {
            discriminator: None,
            description: None,
            ordered: None,
            rules: SlicingRules::Open,
        });
        let field = Field::from_differential(&el);
        assert!(field.is_setup_slice());
        assert!(field.is_setup_slice_for_extension());
    }
}
