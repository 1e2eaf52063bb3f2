#![allow(dead_code)]

use ferrum_context::DefaultFhirContext;
use ferrum_models::StructureDefinition;
use ferrum_profile_tree::SnapshotTree;
use serde_json::{json, Value};

pub const CORE: &str = "http://hl7.org/fhir/StructureDefinition/";
pub const BIRTH_PLACE: &str = "http://example.org/fhir/StructureDefinition/birth-place";
pub const NATIONALITY: &str = "http://example.org/fhir/StructureDefinition/nationality";

pub fn core_url(name: &str) -> String {
    format!("{}{}", CORE, name)
}

fn el(path: &str, types: &[&str], min: u32, max: &str) -> Value {
    let mut element = json!({ "path": path, "min": min, "max": max });
    if !types.is_empty() {
        let types: Vec<Value> = types.iter().map(|t| json!({ "code": t })).collect();
        element["type"] = Value::Array(types);
    }
    element
}

fn data_type(name: &str, elements: Vec<Value>) -> Value {
    let mut all = vec![json!({ "path": name, "min": 0, "max": "*" })];
    all.extend(elements);
    json!({
        "resourceType": "StructureDefinition",
        "url": core_url(name),
        "name": name,
        "kind": "complex-type",
        "type": name,
        "baseDefinition": core_url("Element"),
        "snapshot": { "element": all }
    })
}

fn resource(name: &str, elements: Vec<Value>) -> Value {
    let mut all = vec![json!({ "path": name, "min": 0, "max": "*" })];
    all.extend(elements);
    json!({
        "resourceType": "StructureDefinition",
        "url": core_url(name),
        "name": name,
        "kind": "resource",
        "type": name,
        "baseDefinition": core_url("DomainResource"),
        "snapshot": { "element": all }
    })
}

/// Built-in definitions the fixtures need, DSTU2 shaped where it matters
pub fn builtin_definitions() -> Vec<Value> {
    vec![
        json!({
            "resourceType": "StructureDefinition",
            "url": core_url("Element"),
            "name": "Element",
            "kind": "complex-type",
            "snapshot": { "element": [
                { "path": "Element", "min": 0, "max": "*" },
                { "path": "Element.id", "min": 0, "max": "1", "type": [{ "code": "id" }] },
                { "path": "Element.extension", "min": 0, "max": "*", "type": [{ "code": "Extension" }] }
            ]}
        }),
        json!({
            "resourceType": "StructureDefinition",
            "url": core_url("DomainResource"),
            "name": "DomainResource",
            "kind": "resource",
            "snapshot": { "element": [
                { "path": "DomainResource", "min": 0, "max": "*" },
                { "path": "DomainResource.id", "min": 0, "max": "1", "type": [{ "code": "id" }] },
                { "path": "DomainResource.extension", "min": 0, "max": "*", "type": [{ "code": "Extension" }] }
            ]}
        }),
        data_type(
            "HumanName",
            vec![
                el("HumanName.use", &["code"], 0, "1"),
                el("HumanName.family", &["string"], 0, "*"),
                el("HumanName.given", &["string"], 0, "*"),
                el("HumanName.period", &["Period"], 0, "1"),
            ],
        ),
        data_type(
            "Period",
            vec![
                el("Period.start", &["dateTime"], 0, "1"),
                el("Period.end", &["dateTime"], 0, "1"),
            ],
        ),
        data_type(
            "Identifier",
            vec![
                el("Identifier.use", &["code"], 0, "1"),
                el("Identifier.system", &["uri"], 0, "1"),
                el("Identifier.value", &["string"], 0, "1"),
            ],
        ),
        data_type(
            "Quantity",
            vec![
                el("Quantity.value", &["decimal"], 0, "1"),
                el("Quantity.unit", &["string"], 0, "1"),
            ],
        ),
        data_type(
            "CodeableConcept",
            vec![
                el("CodeableConcept.coding", &["Coding"], 0, "*"),
                el("CodeableConcept.text", &["string"], 0, "1"),
            ],
        ),
        data_type(
            "Coding",
            vec![
                el("Coding.system", &["uri"], 0, "1"),
                el("Coding.code", &["code"], 0, "1"),
                el("Coding.display", &["string"], 0, "1"),
            ],
        ),
        data_type(
            "Timing",
            vec![
                el("Timing.event", &["dateTime"], 0, "*"),
                el("Timing.repeat", &["Element"], 0, "1"),
                el("Timing.repeat.frequency", &["integer"], 0, "1"),
                el("Timing.repeat.period", &["decimal"], 0, "1"),
                el("Timing.code", &["CodeableConcept"], 0, "1"),
            ],
        ),
        json!({
            "resourceType": "StructureDefinition",
            "url": core_url("Extension"),
            "name": "Extension",
            "kind": "complex-type",
            "type": "Extension",
            "baseDefinition": core_url("Element"),
            "snapshot": { "element": [
                { "path": "Extension", "min": 0, "max": "*" },
                { "path": "Extension.extension", "min": 0, "max": "*", "type": [{ "code": "Extension" }] },
                { "path": "Extension.url", "min": 1, "max": "1", "type": [{ "code": "uri" }] },
                { "path": "Extension.value[x]", "min": 0, "max": "1",
                  "type": [{ "code": "string" }, { "code": "code" }, { "code": "Period" }] }
            ]}
        }),
        resource(
            "Patient",
            vec![
                el("Patient.id", &["id"], 0, "1"),
                el("Patient.extension", &["Extension"], 0, "*"),
                el("Patient.identifier", &["Identifier"], 0, "*"),
                el("Patient.active", &["boolean"], 0, "1"),
                json!({
                    "path": "Patient.name", "min": 0, "max": "*",
                    "short": "A name associated with the patient",
                    "type": [{ "code": "HumanName" }]
                }),
                json!({
                    "path": "Patient.gender", "min": 0, "max": "1",
                    "type": [{ "code": "code" }],
                    "binding": {
                        "strength": "required",
                        "valueSetReference": { "reference": "http://hl7.org/fhir/ValueSet/administrative-gender" }
                    }
                }),
                el("Patient.contact", &["BackboneElement"], 0, "*"),
                el("Patient.contact.name", &["HumanName"], 0, "1"),
                el("Patient.contact.gender", &["code"], 0, "1"),
            ],
        ),
        resource(
            "Observation",
            vec![
                el("Observation.status", &["code"], 1, "1"),
                el("Observation.code", &["CodeableConcept"], 1, "1"),
                el("Observation.effective[x]", &["dateTime", "Timing"], 0, "1"),
                el("Observation.value[x]", &["Quantity", "string"], 0, "1"),
                el("Observation.component", &["BackboneElement"], 0, "*"),
                el("Observation.component.code", &["CodeableConcept"], 1, "1"),
                el("Observation.component.value[x]", &["Quantity", "string"], 0, "1"),
            ],
        ),
        json!({
            "resourceType": "StructureDefinition",
            "url": BIRTH_PLACE,
            "name": "BirthPlace",
            "constrainedType": "Extension",
            "base": core_url("Extension"),
            "differential": { "element": [
                { "path": "Extension", "min": 0, "max": "1" },
                { "path": "Extension.url", "min": 1, "max": "1", "type": [{ "code": "uri" }] },
                { "path": "Extension.valueString", "min": 1, "max": "1", "type": [{ "code": "string" }] }
            ]}
        }),
        json!({
            "resourceType": "StructureDefinition",
            "url": NATIONALITY,
            "name": "Nationality",
            "constrainedType": "Extension",
            "base": core_url("Extension"),
            "differential": { "element": [
                { "path": "Extension", "min": 0, "max": "*" },
                { "path": "Extension.extension", "slicing": { "rules": "open" } },
                { "path": "Extension.extension", "name": "code", "type": [{ "code": "Extension" }] },
                { "path": "Extension.extension", "name": "period", "type": [{ "code": "Extension" }] },
                { "path": "Extension.value[x]", "min": 0, "max": "0" }
            ]}
        }),
    ]
}

pub fn registry() -> DefaultFhirContext {
    DefaultFhirContext::from_definitions(
        builtin_definitions()
            .into_iter()
            .map(|v| StructureDefinition::from_value(&v).expect("fixture definition")),
    )
    .expect("fixture registry")
}

/// Profile on core `base` with the given differential elements
pub fn profile(base: &str, elements: Value) -> StructureDefinition {
    StructureDefinition::from_value(&json!({
        "resourceType": "StructureDefinition",
        "url": format!("http://example.org/fhir/StructureDefinition/{}-profile", base.to_lowercase()),
        "name": format!("{}Profile", base),
        "constrainedType": base,
        "base": core_url(base),
        "differential": { "element": elements }
    }))
    .expect("fixture profile")
}

/// Definition with no base at all
pub fn root_definition(name: &str, elements: Value) -> StructureDefinition {
    StructureDefinition::from_value(&json!({
        "resourceType": "StructureDefinition",
        "url": format!("http://example.org/fhir/StructureDefinition/{}", name),
        "name": name,
        "differential": { "element": elements }
    }))
    .expect("fixture definition")
}

pub fn child_paths<'a>(tree: &'a SnapshotTree, path: &str) -> Vec<&'a str> {
    tree.find(path)
        .unwrap_or_else(|| panic!("no node at {}", path))
        .children()
        .map(|c| c.path())
        .collect()
}
