//! Complex data type expansion inside resolved trees

mod test_support;

use ferrum_models::StructureDefinition;
use ferrum_profile_tree::{Error, NodeType, SnapshotTreeBuilder, TreeOptions};
use serde_json::json;
use test_support::*;

#[test]
fn data_type_children_surround_constrained_ones() {
    let ctx = registry();
    let sd = profile("Patient", json!([{ "path": "Patient.name.family", "min": 1 }]));
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();

    assert_eq!(
        child_paths(&tree, "Patient.name"),
        vec![
            "Patient.name.use",
            "Patient.name.family",
            "Patient.name.given",
            "Patient.name.period",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Patient.name.period"),
        vec!["Patient.name.period.start", "Patient.name.period.end"]
    );

    let family = tree.find("Patient.name.family").unwrap();
    assert!(family.changed_from_base());
    assert_eq!(family.cardinality_text().as_deref(), Some("1..*"));
    assert_eq!(family.node_type(), NodeType::PrimitiveType);

    let given = tree.find("Patient.name.given").unwrap();
    assert!(!given.changed_from_base());
    assert_eq!(given.cardinality_text().as_deref(), Some("0..*"));
}

#[test]
fn placeholders_are_replaced_by_data_type_elements() {
    let ctx = registry();
    let sd = profile(
        "Patient",
        json!([{ "path": "Patient.name.period.start", "min": 1 }]),
    );
    let builder = SnapshotTreeBuilder::new(&sd, &ctx).unwrap();

    let fields = builder.snapshot_fields().unwrap();
    let period = fields
        .iter()
        .find(|f| f.path == "Patient.name.period")
        .unwrap();
    assert!(period.synthetic);

    let tree = builder.snapshot_tree().unwrap();
    let period = tree.find("Patient.name.period").unwrap();
    assert!(!period.is_synthetic());
    assert_eq!(period.node_type(), NodeType::ComplexType);
    assert_eq!(
        child_paths(&tree, "Patient.name.period"),
        vec!["Patient.name.period.start", "Patient.name.period.end"]
    );
    assert!(tree
        .find("Patient.name.period.start")
        .unwrap()
        .changed_from_base());
}

#[test]
fn renamed_choice_expands_nested_elements() {
    let ctx = registry();
    let sd = profile(
        "Observation",
        json!([{ "path": "Observation.effectiveTiming", "type": [{ "code": "Timing" }] }]),
    );
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();

    assert_eq!(
        child_paths(&tree, "Observation"),
        vec![
            "Observation.status",
            "Observation.code",
            "Observation.effectiveTiming",
            "Observation.value[x]",
            "Observation.component",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Observation.effectiveTiming"),
        vec![
            "Observation.effectiveTiming.event",
            "Observation.effectiveTiming.repeat",
            "Observation.effectiveTiming.code",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Observation.effectiveTiming.repeat"),
        vec![
            "Observation.effectiveTiming.repeat.frequency",
            "Observation.effectiveTiming.repeat.period",
        ]
    );
    assert_eq!(
        child_paths(&tree, "Observation.effectiveTiming.code.coding"),
        vec![
            "Observation.effectiveTiming.code.coding.system",
            "Observation.effectiveTiming.code.coding.code",
            "Observation.effectiveTiming.code.coding.display",
        ]
    );

    let value = tree.find("Observation.value[x]").unwrap();
    assert_eq!(value.node_type(), NodeType::Choice);
    assert!(!value.has_children());
}

#[test]
fn expansion_can_be_disabled() {
    let ctx = registry();
    let sd = profile("Patient", json!([{ "path": "Patient.name", "max": "1" }]));
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .with_options(TreeOptions {
            expand_complex_types: false,
            ..TreeOptions::default()
        })
        .snapshot_tree()
        .unwrap();
    assert!(!tree.find("Patient.name").unwrap().has_children());
    assert!(!tree.find("Patient.identifier").unwrap().has_children());
}

#[test]
fn missing_data_type_is_reported() {
    let ctx = registry();
    let sd = root_definition(
        "Invoice",
        json!([
            { "path": "Invoice" },
            { "path": "Invoice.total", "type": [{ "code": "Money" }] }
        ]),
    );
    match SnapshotTreeBuilder::new(&sd, &ctx).unwrap().snapshot_tree() {
        Err(Error::TypeNotFound(name)) => assert_eq!(name, "Money"),
        other => panic!("unexpected {:?}", other.map(|t| t.paths().len())),
    }
}

#[test]
fn recursive_data_types_expand_once() {
    let mut ctx = registry();
    let recursive = StructureDefinition::from_value(&json!({
        "resourceType": "StructureDefinition",
        "url": core_url("Recursive"),
        "name": "Recursive",
        "type": "Recursive",
        "snapshot": { "element": [
            { "path": "Recursive" },
            { "path": "Recursive.child", "type": [{ "code": "Recursive", "category": "complex" }] },
            { "path": "Recursive.label", "type": [{ "code": "string" }] }
        ]}
    }))
    .unwrap();
    ctx.insert(recursive).unwrap();

    let sd = root_definition(
        "Thing",
        json!([
            { "path": "Thing" },
            { "path": "Thing.tree", "type": [{ "code": "Recursive", "category": "complex" }] }
        ]),
    );
    let tree = SnapshotTreeBuilder::new(&sd, &ctx)
        .unwrap()
        .snapshot_tree()
        .unwrap();
    assert_eq!(
        tree.paths(),
        vec!["Thing", "Thing.tree", "Thing.tree.child", "Thing.tree.label"]
    );
}
