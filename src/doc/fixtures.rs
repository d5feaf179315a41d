// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::json;

use super::{
    ComponentBody, Document, Layout, LiveNode, LiveParam, NodeBody, ParameterBody, ScriptState,
    SliderState,
};
use crate::model::{InstanceId, ParamAccess, TypeHint};

fn iid(value: &str) -> InstanceId {
    InstanceId::new(value).expect("instance id")
}

/// Seed document for demo mode and tests: a slider feeding a script
/// component, whose output runs through a plain component into a panel.
///
/// ```text
/// slider-radius ──> script-circle ──> comp-area ──> panel-out
/// ```
pub fn demo_document() -> Document {
    let mut doc = Document::new();

    let mut slider_param = LiveParam::new(iid("slider-radius"), "Number Slider");
    slider_param.set_nickname("radius");
    slider_param.set_sole_volatile(json!(5.0));
    let mut slider_body = ParameterBody::new(slider_param);
    slider_body.set_slider(Some(SliderState {
        min: 0.0,
        max: 10.0,
        value: 5.0,
        decimals: 2,
    }));
    let mut slider = LiveNode::new(
        iid("slider-radius"),
        "Number Slider",
        NodeBody::Parameter(slider_body),
    );
    slider.set_nickname("radius");
    slider.set_category(Some("Params"));
    slider.set_sub_category(Some("Input"));
    slider.set_layout(Some(Layout::new(40.0, 120.0, 160.0, 20.0)));
    doc.add_node(slider);

    let mut script_in = LiveParam::new(iid("script-circle-in-x"), "x");
    script_in.set_description("Circle radius");
    script_in.set_type_hint(Some(TypeHint::Float));
    script_in.set_access(ParamAccess::Item);
    let mut script_out = LiveParam::new(iid("script-circle-out-output"), "output");
    script_out.set_description("Script output");
    let mut script_body = ComponentBody::default();
    script_body.register_input(script_in);
    script_body.register_output(script_out);
    script_body.set_script(Some(ScriptState::new(
        "import math\noutput = math.pi * x * x\n",
    )));
    script_body.set_computation_time_ms(1.25);
    let mut script = LiveNode::new(
        iid("script-circle"),
        "Script",
        NodeBody::Component(script_body),
    );
    script.set_nickname("circle");
    script.set_description("Area of a circle from its radius");
    script.set_category(Some("Maths"));
    script.set_sub_category(Some("Script"));
    script.set_layout(Some(Layout::new(260.0, 100.0, 120.0, 60.0)));
    doc.add_node(script);

    let comp_in = LiveParam::new(iid("comp-area-in-a"), "A");
    let comp_out = LiveParam::new(iid("comp-area-out-r"), "Result");
    let mut comp_body = ComponentBody::default();
    comp_body.register_input(comp_in);
    comp_body.register_output(comp_out);
    comp_body.set_computation_time_ms(0.4);
    let mut comp = LiveNode::new(iid("comp-area"), "Round", NodeBody::Component(comp_body));
    comp.set_nickname("round");
    comp.set_category(Some("Maths"));
    comp.set_sub_category(Some("Util"));
    comp.set_layout(Some(Layout::new(440.0, 100.0, 90.0, 50.0)));
    doc.add_node(comp);

    let mut panel_param = LiveParam::new(iid("panel-out"), "Panel");
    panel_param.set_nickname("area");
    let mut panel_body = ParameterBody::new(panel_param);
    panel_body.set_panel_text(Some("78.54"));
    let mut panel = LiveNode::new(iid("panel-out"), "Panel", NodeBody::Parameter(panel_body));
    panel.set_nickname("area");
    panel.set_category(Some("Params"));
    panel.set_sub_category(Some("Input"));
    panel.set_layout(Some(Layout::new(600.0, 110.0, 100.0, 40.0)));
    doc.add_node(panel);

    assert!(doc.connect(&iid("slider-radius"), &iid("script-circle-in-x")));
    assert!(doc.connect(&iid("script-circle-out-output"), &iid("comp-area-in-a")));
    assert!(doc.connect(&iid("comp-area-out-r"), &iid("panel-out")));

    doc
}
