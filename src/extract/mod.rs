// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Descriptor extraction: turning live nodes into wire-facing snapshot
//! entries.
//!
//! Extraction normalizes the canvas axis (host y-down to descriptor y-up),
//! synthesizes parent cross-links on child parameters, and resolves
//! component-level edges to owning top-level node ids so consumers can walk
//! the graph without knowing about child parameter slots.

use tracing::warn;

use crate::doc::{ComponentBody, Document, LiveNode, LiveParam, NodeBody, ParameterBody};
use crate::model::{
    Bounds, ComponentDescriptor, InstanceId, NodeDescriptor, NodeKind, ParamDescriptor, ParamRole,
    Pivot, ScriptInfo, SliderInfo,
};


/// Per-request warning collector. Warnings are emitted to the log as they
/// happen and kept for the response; nothing is carried over between
/// requests.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// Extract a full descriptor for one top-level node.
pub fn extract_node(doc: &Document, node: &LiveNode, diag: &mut Diagnostics) -> NodeDescriptor {
    match node.body() {
        NodeBody::Component(body) => {
            NodeDescriptor::Component(extract_component(doc, node, body, diag))
        }
        NodeBody::Parameter(body) => NodeDescriptor::Parameter(extract_standalone(doc, node, body)),
    }
}

/// Child parameter slot of a component. The parent id is cross-linked into
/// the edge lists: data enters the component through its inputs and leaves
/// through its outputs, so an input targets its parent and an output is
/// sourced from it.
fn extract_child_param(param: &LiveParam, role: ParamRole, parent: &InstanceId) -> ParamDescriptor {
    let mut sources: Vec<InstanceId> = param.sources().to_vec();
    let mut targets: Vec<InstanceId> = param.recipients().to_vec();
    match role {
        ParamRole::Input => targets.push(parent.clone()),
        ParamRole::Output => sources.push(parent.clone()),
    }

    ParamDescriptor {
        instance_guid: param.instance_id().clone(),
        parent_instance_guid: Some(parent.clone()),
        name: param.name().to_owned(),
        nick_name: param.nickname().to_owned(),
        description: param.description().to_owned(),
        category: None,
        sub_category: None,
        kind: NodeKind::Parameter,
        bounds: None,
        pivot: None,
        is_selected: false,
        is_input: role == ParamRole::Input,
        access: param.access(),
        optional: param.optional(),
        data_type_hint: param.type_hint().map(|hint| hint.label().to_owned()),
        sources,
        targets,
        slider: None,
        panel_content: None,
    }
}

/// Standalone parameter node. Its edges are resolved to top-level owner ids
/// like component edges, so the snapshot graph is walkable end to end.
fn extract_standalone(doc: &Document, node: &LiveNode, body: &ParameterBody) -> ParamDescriptor {
    let param = body.param();
    let own_id = node.instance_id();
    ParamDescriptor {
        instance_guid: node.instance_id().clone(),
        parent_instance_guid: None,
        name: node.name().to_owned(),
        nick_name: node.nickname().to_owned(),
        description: node.description().to_owned(),
        category: node.category().map(str::to_owned),
        sub_category: node.sub_category().map(str::to_owned),
        kind: body.kind(),
        bounds: node
            .layout()
            .map(|l| Bounds::from_native(l.x, l.y, l.width, l.height)),
        pivot: node.layout().map(|l| Pivot::from_native(l.pivot_x, l.pivot_y)),
        // Selection marking belongs to the snapshot builder: a descriptor is
        // selected when its node was requested, not when the canvas says so.
        is_selected: false,
        is_input: false,
        access: param.access(),
        optional: param.optional(),
        data_type_hint: param.type_hint().map(|hint| hint.label().to_owned()),
        sources: resolve_peers(doc, own_id, param.sources().iter()),
        targets: resolve_peers(doc, own_id, param.recipients().iter()),
        slider: body.slider().map(|s| SliderInfo {
            min: s.min,
            max: s.max,
            value: s.value,
            decimals: s.decimals,
        }),
        panel_content: body.panel_text().map(str::to_owned),
    }
}

fn extract_component(
    doc: &Document,
    node: &LiveNode,
    body: &ComponentBody,
    diag: &mut Diagnostics,
) -> ComponentDescriptor {
    let own_id = node.instance_id();
    let inputs: Vec<ParamDescriptor> = body
        .inputs()
        .iter()
        .map(|p| extract_child_param(p, ParamRole::Input, own_id))
        .collect();
    let outputs: Vec<ParamDescriptor> = body
        .outputs()
        .iter()
        .map(|p| extract_child_param(p, ParamRole::Output, own_id))
        .collect();

    let sources = resolve_peers(
        doc,
        own_id,
        body.inputs().iter().flat_map(|p| p.sources().iter()),
    );
    let targets = resolve_peers(
        doc,
        own_id,
        body.outputs().iter().flat_map(|p| p.recipients().iter()),
    );

    ComponentDescriptor {
        instance_guid: own_id.clone(),
        name: node.name().to_owned(),
        nick_name: node.nickname().to_owned(),
        description: node.description().to_owned(),
        category: node.category().map(str::to_owned),
        sub_category: node.sub_category().map(str::to_owned),
        kind: NodeKind::Component,
        bounds: node
            .layout()
            .map(|l| Bounds::from_native(l.x, l.y, l.width, l.height)),
        pivot: node.layout().map(|l| Pivot::from_native(l.pivot_x, l.pivot_y)),
        is_selected: false,
        computation_time: body.computation_time_ms(),
        runtime_messages: node.runtime_messages().to_vec(),
        inputs,
        outputs,
        sources,
        targets,
        script: extract_script(node, body, diag),
    }
}

/// Resolve raw wire endpoints (child parameter or standalone node ids) to
/// their owning top-level node ids, deduplicated and with self-edges and
/// dangling ids dropped.
fn resolve_peers<'a>(
    doc: &Document,
    own_id: &InstanceId,
    endpoints: impl Iterator<Item = &'a InstanceId>,
) -> Vec<InstanceId> {
    let mut resolved: Vec<InstanceId> = Vec::new();
    for endpoint in endpoints {
        let Some(owner) = doc.top_level_owner(endpoint) else {
            continue;
        };
        if owner != own_id && !resolved.contains(owner) {
            resolved.push(owner.clone());
        }
    }
    resolved
}

fn extract_script(
    node: &LiveNode,
    body: &ComponentBody,
    diag: &mut Diagnostics,
) -> Option<ScriptInfo> {
    let script = body.script()?;
    let from_file = script.input_is_path();
    let path = if from_file {
        let path = body
            .inputs()
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case("code"))
            .and_then(|p| p.first_volatile())
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        if path.is_none() {
            diag.warn(format!(
                "component {} references a source file but carries no path",
                node.instance_id()
            ));
        }
        path
    } else {
        None
    };
    Some(ScriptInfo {
        is_script_component: true,
        code: script.code().to_owned(),
        code_reference_from_file: from_file,
        code_reference_path: path,
    })
}
