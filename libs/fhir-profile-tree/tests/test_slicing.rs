//! Slices and extensions in resolved trees

mod test_support;

use ferrum_profile_tree::{Error, NodeType, SnapshotTreeBuilder, TreeOptions};
use serde_json::json;
use test_support::*;

fn blood_pressure() -> ferrum_models::StructureDefinition {
    profile(
        "Observation",
        json!([
            {
                "path": "Observation.component",
                "slicing": { "discriminator": ["code"], "rules": "open" }
            },
            { "path": "Observation.component", "name": "systolic", "min": 0, "max": "1" },
            { "path": "Observation.component.code", "short": "Systolic" },
            { "path": "Observation.component", "name": "diastolic" },
            { "path": "Observation.component.valueQuantity", "type": [{ "code": "Quantity" }] }
        ]),
    )
}

#[test]
fn repeated_paths_are_indexed_per_slice() {
    let ctx = registry();
    let sd = blood_pressure();
    let fields = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_fields()
        .unwrap();
    let paths: Vec<_> = fields.iter().map(|f| f.path.as_str()).collect();

    assert_eq!(
        paths,
        vec![
            "Observation",
            "Observation.status",
            "Observation.code",
            "Observation.effective[x]",
            "Observation.value[x]",
            "Observation.component",
            "Observation.component.code",
            "Observation.component.value[x]",
            "Observation.component#1",
            "Observation.component#1.code",
            "Observation.component#2",
            "Observation.component#2.valueQuantity",
        ]
    );
    let code = &fields[9];
    assert_eq!(
        code.path_before_slice_indexing.as_deref(),
        Some("Observation.component.code")
    );
    assert_eq!(
        code.base.as_ref().map(|b| b.path.as_str()),
        Some("Observation.component.code")
    );
}

#[test]
fn open_slicing_groups_slices_and_remainder() {
    let ctx = registry();
    let sd = blood_pressure();
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .with_options(TreeOptions {
            expand_complex_types: false,
            ..TreeOptions::default()
        })
        .snapshot_tree()
        .unwrap();

    let component = tree.find("Observation.component").unwrap();
    assert_eq!(component.node_type(), NodeType::SetupSlice);
    assert_eq!(
        child_paths(&tree, "Observation.component"),
        vec![
            "Observation.component#1",
            "Observation.component#2",
            "Observation.component#n",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Observation.component#n"),
        vec!["Observation.component.code", "Observation.component.value[x]"]
    );

    let systolic = tree.find("Observation.component#1").unwrap();
    assert!(systolic.is_slice());
    assert_eq!(systolic.display_name(), "component [systolic]");
    assert_eq!(systolic.cardinality_text().as_deref(), Some("0..1"));
    assert_eq!(
        tree.find("Observation.component#1.code").unwrap().short(),
        Some("Systolic")
    );

    let open = tree.find("Observation.component#n").unwrap();
    assert_eq!(open.display_name(), "component");
    assert_eq!(open.node_type(), NodeType::BackboneElement);
    assert!(!open.is_slice());
}

#[test]
fn slices_of_a_differential_only_base_profile_are_indexed() {
    let mut ctx = registry();
    let sliced = profile(
        "Patient",
        json!([
            {
                "path": "Patient.identifier",
                "slicing": { "discriminator": ["system"], "rules": "open" }
            },
            { "path": "Patient.identifier", "name": "mrn", "max": "1" },
            { "path": "Patient.identifier.system", "fixedUri": "urn:mrn" },
            { "path": "Patient.identifier", "name": "ssn", "max": "1" },
            { "path": "Patient.identifier.system", "fixedUri": "urn:ssn" }
        ]),
    );
    let sliced_url = sliced.url.clone();
    ctx.insert(sliced).unwrap();

    let derived = ferrum_models::StructureDefinition::from_value(&json!({
        "resourceType": "StructureDefinition",
        "url": "http://example.org/fhir/StructureDefinition/active-patient",
        "name": "ActivePatient",
        "constrainedType": "Patient",
        "base": sliced_url,
        "differential": { "element": [{ "path": "Patient.active", "min": 1 }] }
    }))
    .unwrap();

    let tree = SnapshotTreeBuilder::new(&derived, &ctx)
        .unwrap()
        .with_options(TreeOptions {
            expand_complex_types: false,
            ..TreeOptions::default()
        })
        .snapshot_tree()
        .unwrap();

    let identifiers = tree
        .root()
        .children()
        .filter(|c| c.path().starts_with("Patient.identifier"))
        .count();
    assert_eq!(identifiers, 1);
    assert_eq!(
        child_paths(&tree, "Patient.identifier"),
        vec![
            "Patient.identifier#1",
            "Patient.identifier#2",
            "Patient.identifier#n",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Patient.identifier#1"),
        vec!["Patient.identifier#1.system"]
    );
    assert_eq!(
        child_paths(&tree, "Patient.identifier#2"),
        vec!["Patient.identifier#2.system"]
    );
    assert_eq!(
        tree.find("Patient.identifier#2").unwrap().display_name(),
        "identifier [ssn]"
    );
    assert_eq!(
        tree.find("Patient.active").unwrap().cardinality_text().as_deref(),
        Some("1..1")
    );
}

#[test]
fn closed_slicing_drops_unsliced_children() {
    let ctx = registry();
    let sd = profile(
        "Patient",
        json!([
            { "path": "Patient.identifier", "slicing": { "rules": "closed" } },
            { "path": "Patient.identifier", "name": "nhs" },
            { "path": "Patient.identifier.system", "fixedUri": "https://fhir.nhs.uk/Id/nhs-number" }
        ]),
    );
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();

    assert_eq!(
        child_paths(&tree, "Patient.identifier"),
        vec!["Patient.identifier#1"]
    );
    assert_eq!(
        child_paths(&tree, "Patient.identifier#1"),
        vec![
            "Patient.identifier#1.use",
            "Patient.identifier#1.system",
            "Patient.identifier#1.value",
        ]
    );
    let nhs = tree.find("Patient.identifier#1").unwrap();
    assert_eq!(nhs.display_name(), "identifier [nhs]");
    assert_eq!(nhs.unindexed_path(), "Patient.identifier");

    let system = tree.find("Patient.identifier#1.system").unwrap();
    assert_eq!(
        system.fixed_value(),
        Some(("fixedUri", &json!("https://fhir.nhs.uk/Id/nhs-number")))
    );
}

#[test]
fn slices_are_pruned_with_a_removed_entry() {
    let ctx = registry();
    let sd = profile(
        "Observation",
        json!([
            { "path": "Observation.component", "max": "0", "slicing": { "rules": "open" } },
            { "path": "Observation.component", "name": "systolic" }
        ]),
    );
    let builder = SnapshotTreeBuilder::new(&sd, &ctx).unwrap();

    let full = builder.snapshot_tree().unwrap();
    assert!(full.find("Observation.component#1").unwrap().is_removed());

    let pruned = builder
        .with_options(TreeOptions {
            include_removed: false,
            ..TreeOptions::default()
        })
        .snapshot_tree()
        .unwrap();
    assert!(pruned.find("Observation.component").is_none());
    assert!(pruned.find("Observation.component#1").is_none());
}

#[test]
fn extension_slices_resolve_their_definitions() {
    let ctx = registry();
    let sd = profile(
        "Patient",
        json!([
            { "path": "Patient.extension", "slicing": { "discriminator": ["url"], "rules": "open" } },
            {
                "path": "Patient.extension", "name": "birthPlace",
                "type": [{ "code": "Extension", "profile": [BIRTH_PLACE] }]
            },
            {
                "path": "Patient.extension", "name": "nationality",
                "type": [{ "code": "Extension", "profile": [NATIONALITY] }]
            }
        ]),
    );
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();

    assert!(tree.find("Patient.extension").is_none());
    assert_eq!(
        child_paths(&tree, "Patient"),
        vec![
            "Patient.id",
            "Patient.identifier",
            "Patient.active",
            "Patient.name",
            "Patient.gender",
            "Patient.contact",
            "Patient.extension#1",
            "Patient.extension#2",
        ]
    );

    let birth_place = tree.find("Patient.extension#1").unwrap();
    assert_eq!(birth_place.node_type(), NodeType::SimpleExtension);
    assert_eq!(birth_place.display_name(), "birthPlace");
    assert_eq!(birth_place.extension_url(), Some(BIRTH_PLACE));
    assert_eq!(
        birth_place.extension_definition().map(|d| d.url.as_str()),
        Some(BIRTH_PLACE)
    );

    let nationality = tree.find("Patient.extension#2").unwrap();
    assert_eq!(nationality.node_type(), NodeType::ComplexExtension);
    assert_eq!(nationality.display_name(), "nationality");
}

#[test]
fn missing_extension_profile_fails_with_its_url() {
    let ctx = registry();
    let missing = "http://example.org/fhir/StructureDefinition/missing";
    let sd = profile(
        "Patient",
        json!([{
            "path": "Patient.extension", "name": "missing",
            "type": [{ "code": "Extension", "profile": missing }]
        }]),
    );
    match SnapshotTreeBuilder::new(&sd, &ctx).unwrap().snapshot_tree() {
        Err(Error::ReferenceNotFound(url)) => assert_eq!(url, missing),
        other => panic!("unexpected {:?}", other.map(|t| t.paths().len())),
    }
}

#[test]
fn complex_extension_definition_tree() {
    let ctx = registry();
    let nationality = ferrum_context::FhirContext::get_structure_definition(&ctx, NATIONALITY)
        .unwrap()
        .unwrap();
    let builder = SnapshotTreeBuilder::new(&nationality, &ctx).unwrap();

    let tree = builder.snapshot_tree().unwrap();
    assert_eq!(
        child_paths(&tree, "Extension"),
        vec![
            "Extension.url",
            "Extension.value[x]",
            "Extension.extension#1",
            "Extension.extension#2",
        ]
    );
    let code = tree.find("Extension.extension#1").unwrap();
    assert_eq!(code.node_type(), NodeType::SimpleExtension);
    assert_eq!(code.display_name(), "code");
    assert!(tree.find("Extension.value[x]").unwrap().is_removed());

    let pruned = builder
        .with_options(TreeOptions {
            include_removed: false,
            ..TreeOptions::default()
        })
        .snapshot_tree()
        .unwrap();
    assert_eq!(
        child_paths(&pruned, "Extension"),
        vec![
            "Extension.url",
            "Extension.extension#1",
            "Extension.extension#2",
        ]
    );
}

#[test]
fn simple_extension_definition_tree() {
    let ctx = registry();
    let birth_place = ferrum_context::FhirContext::get_structure_definition(&ctx, BIRTH_PLACE)
        .unwrap()
        .unwrap();
    let tree = SnapshotTreeBuilder::new(&birth_place, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();

    assert_eq!(
        tree.paths(),
        vec![
            "Extension",
            "Extension.extension",
            "Extension.url",
            "Extension.valueString",
        ]
    );
    let value = tree.find("Extension.valueString").unwrap();
    assert!(value.changed_from_base());
    assert_eq!(
        value.field().base.as_ref().map(|b| b.path.as_str()),
        Some("Extension.value[x]")
    );
}
