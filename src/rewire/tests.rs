// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use serde_json::json;

use super::{reconfigure_params, ParamDefinition, RewireError, RESERVED_OUTPUT};
use crate::doc::fixtures::demo_document;
use crate::doc::Document;
use crate::extract::Diagnostics;
use crate::model::{InstanceId, ParamAccess, TypeHint};

fn iid(value: &str) -> InstanceId {
    InstanceId::new(value).expect("instance id")
}

fn input_def(name: &str) -> ParamDefinition {
    ParamDefinition {
        kind: "input".to_owned(),
        name: name.to_owned(),
        ..ParamDefinition::default()
    }
}

fn output_def(name: &str) -> ParamDefinition {
    ParamDefinition {
        kind: "output".to_owned(),
        name: name.to_owned(),
        ..ParamDefinition::default()
    }
}

#[fixture]
fn doc() -> Document {
    demo_document()
}

#[rstest]
fn installs_typed_parameters_from_definitions(mut doc: Document) {
    let defs = vec![
        ParamDefinition {
            kind: "input".to_owned(),
            name: "radius".to_owned(),
            typehint: Some("float".to_owned()),
            access: Some("item".to_owned()),
            description: "Circle radius".to_owned(),
            optional: Some(false),
            ..ParamDefinition::default()
        },
        output_def("area"),
    ];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");
    // The two definitions plus the synthesized reserved output.
    assert_eq!(report.params_updated, 3);

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    assert_eq!(body.inputs().len(), 1);
    let input = &body.inputs()[0];
    assert_eq!(input.name(), "radius");
    assert_eq!(input.type_hint(), Some(TypeHint::Float));
    assert_eq!(input.access(), ParamAccess::Item);
    assert!(!input.optional());
    assert_eq!(body.outputs()[0].name(), "area");
}

#[rstest]
fn same_named_parameters_keep_their_wires(mut doc: Document) {
    let defs = vec![input_def("x"), output_def("output")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    let new_in = body.inputs()[0].instance_id().clone();
    let new_out = body.outputs()[0].instance_id().clone();
    // Fresh slots, same wiring.
    assert_ne!(new_in, iid("script-circle-in-x"));
    assert!(body.inputs()[0].sources().contains(&iid("slider-radius")));

    let (slider, _) = doc.find_param(&iid("slider-radius")).expect("slider");
    assert!(slider.recipients().contains(&new_in));
    assert!(!slider.recipients().contains(&iid("script-circle-in-x")));

    let (downstream, _) = doc.find_param(&iid("comp-area-in-a")).expect("input");
    assert!(downstream.sources().contains(&new_out));

    assert!(report
        .connection_log
        .iter()
        .any(|line| line.contains("restored input connection")));
    assert!(report
        .connection_log
        .iter()
        .any(|line| line.contains("restored output connection")));
}

#[rstest]
fn renamed_parameters_drop_their_wires(mut doc: Document) {
    let defs = vec![input_def("radius"), output_def("area")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    assert!(body.inputs()[0].sources().is_empty());

    let (slider, _) = doc.find_param(&iid("slider-radius")).expect("slider");
    assert!(slider.recipients().is_empty());

    assert!(report
        .connection_log
        .iter()
        .any(|line| line.contains("dropped") && line.contains("'x'")));
}

#[rstest]
fn reserved_output_is_synthesized_when_none_declared(mut doc: Document) {
    let defs = vec![input_def("a"), input_def("b")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");
    assert_eq!(report.params_updated, 3);

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    assert_eq!(body.outputs().len(), 1);
    assert_eq!(body.outputs()[0].name(), RESERVED_OUTPUT);
}

#[rstest]
fn reserved_output_is_added_alongside_named_outputs(mut doc: Document) {
    let defs = vec![input_def("x"), output_def("area")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");
    assert_eq!(report.params_updated, 3);

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    let names: Vec<&str> = body.outputs().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["area", RESERVED_OUTPUT]);
}

#[rstest]
fn restoration_keys_are_case_sensitive(mut doc: Document) {
    let defs = vec![input_def("X"), output_def("output")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    // "X" is not "x"; the recorded wire does not come back.
    assert!(body.inputs()[0].sources().is_empty());
    let (slider, _) = doc.find_param(&iid("slider-radius")).expect("slider");
    assert!(slider.recipients().is_empty());
    assert!(report
        .connection_log
        .iter()
        .any(|line| line.contains("dropped") && line.contains("'x'")));
}

#[rstest]
fn nameless_definition_aborts_and_cleans_placeholders(mut doc: Document) {
    let defs = vec![input_def("ok"), ParamDefinition::default()];
    let mut diag = Diagnostics::new();
    let err = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect_err("must fail");
    let RewireError::InstallFailed { index, .. } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(index, 1);

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    let names: Vec<&str> = body
        .inputs()
        .iter()
        .chain(body.outputs())
        .map(|p| p.name())
        .collect();
    assert!(
        names.iter().all(|name| !name.contains("placeholder")),
        "placeholders must not leak: {names:?}"
    );
    // The old set is already cleared; only the partial install remains.
    assert_eq!(names, vec!["ok"]);
}

#[rstest]
fn target_must_be_a_component(mut doc: Document) {
    let mut diag = Diagnostics::new();
    let err = reconfigure_params(&mut doc, &iid("slider-radius"), &[], false, &mut diag)
        .expect_err("must fail");
    assert_eq!(err, RewireError::NotAComponent(iid("slider-radius")));

    let err = reconfigure_params(&mut doc, &iid("ghost"), &[], false, &mut diag)
        .expect_err("must fail");
    assert_eq!(err, RewireError::ComponentNotFound(iid("ghost")));
}

#[rstest]
fn preserved_code_parameter_survives_with_wires(mut doc: Document) {
    {
        let node = doc.find_node_mut(&iid("script-circle")).expect("node");
        let body = node.as_component_mut().expect("component");
        let code = body
            .construct_code_input(iid("script-circle-in-code"))
            .expect("factory");
        body.register_input(code);
    }
    assert!(doc.connect(&iid("slider-radius"), &iid("script-circle-in-code")));

    let defs = vec![input_def("x"), input_def("code"), output_def("output")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, true, &mut diag)
        .expect("reconfigure");
    // The code definition is skipped, not installed twice.
    assert_eq!(report.params_updated, 2);

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    let code = body
        .inputs()
        .iter()
        .find(|p| p.name() == "code")
        .expect("code kept");
    assert_eq!(code.instance_id(), &iid("script-circle-in-code"));
    assert!(code.sources().contains(&iid("slider-radius")));
}

#[rstest]
fn stale_peers_are_skipped_and_reported(mut doc: Document) {
    doc.find_param_mut(&iid("script-circle-in-x"))
        .expect("param")
        .sources_mut()
        .push(iid("long-gone"));

    let defs = vec![input_def("x"), output_def("output")];
    let mut diag = Diagnostics::new();
    let report = reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");

    assert!(report
        .connection_log
        .iter()
        .any(|line| line.contains("stale peer long-gone")));
    assert!(!diag.is_empty());
    // The live wire from the slider still came back.
    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    assert!(body.inputs()[0].sources().contains(&iid("slider-radius")));
}

#[rstest]
fn finalize_clears_data_and_marks_the_component(mut doc: Document) {
    doc.find_param_mut(&iid("script-circle-in-x"))
        .expect("param")
        .set_sole_volatile(json!(4.0));
    let rev_before = doc
        .find_node(&iid("script-circle"))
        .expect("node")
        .as_component()
        .expect("component")
        .params_rev();

    let defs = vec![input_def("x"), output_def("output")];
    let mut diag = Diagnostics::new();
    reconfigure_params(&mut doc, &iid("script-circle"), &defs, false, &mut diag)
        .expect("reconfigure");

    let node = doc.find_node(&iid("script-circle")).expect("node");
    let body = node.as_component().expect("component");
    assert!(body.inputs()[0].volatile().is_empty());
    assert!(body.params_rev() > rev_before);
    assert!(node.layout().expect("layout").expired);
}

#[test]
fn definitions_deserialize_from_wire_names() {
    let def: ParamDefinition = serde_json::from_value(json!({
        "type": "output",
        "name": "area",
        "nickName": "A",
        "typehint": "float",
        "access": "item",
        "description": "Circle area",
        "optional": false
    }))
    .expect("deserialize");
    assert_eq!(def.role(), crate::model::ParamRole::Output);
    assert_eq!(def.nick_name, "A");
    assert_eq!(def.typehint.as_deref(), Some("float"));
    assert_eq!(def.optional, Some(false));
}
