// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Live document model.
//!
//! This is the in-process stand-in for the host application's object model:
//! an insertion-ordered collection of top-level nodes (components and
//! standalone parameters), per-parameter source/recipient wire lists,
//! volatile data, solution expiry, and the canvas refresh flag. A binding
//! against a real host would replace this module; everything above it only
//! sees the surface defined here.
//!
//! The document is not internally synchronized. All access must happen on
//! the thread that owns it (see [`crate::uithread`]).

use serde_json::Value;
use smallvec::SmallVec;

use crate::model::{InstanceId, NodeKind, ParamAccess, ParamRole, TypeHint};

pub mod fixtures;


/// Wire endpoints per parameter; two covers the common fan-in.
pub type WireList = SmallVec<[InstanceId; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub decimals: u32,
}

/// A live parameter: a typed input/output slot on a component, or the data
/// core of a standalone parameter node (in which case its instance id equals
/// the node's).
#[derive(Debug, Clone, PartialEq)]
pub struct LiveParam {
    instance_id: InstanceId,
    name: String,
    nickname: String,
    description: String,
    access: ParamAccess,
    optional: bool,
    type_hint: Option<TypeHint>,
    sources: WireList,
    recipients: WireList,
    volatile: Vec<Value>,
}

impl LiveParam {
    pub fn new(instance_id: InstanceId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            instance_id,
            nickname: name.clone(),
            name,
            description: String::new(),
            access: ParamAccess::List,
            optional: true,
            type_hint: None,
            sources: WireList::new(),
            recipients: WireList::new(),
            volatile: Vec::new(),
        }
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    /// Display key: nickname, falling back to name.
    pub fn display_key(&self) -> &str {
        if self.nickname.is_empty() {
            &self.name
        } else {
            &self.nickname
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn access(&self) -> ParamAccess {
        self.access
    }

    pub fn set_access(&mut self, access: ParamAccess) {
        self.access = access;
    }

    pub fn optional(&self) -> bool {
        self.optional
    }

    pub fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    pub fn type_hint(&self) -> Option<TypeHint> {
        self.type_hint
    }

    pub fn set_type_hint(&mut self, hint: Option<TypeHint>) {
        self.type_hint = hint;
    }

    pub fn sources(&self) -> &[InstanceId] {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut WireList {
        &mut self.sources
    }

    pub fn recipients(&self) -> &[InstanceId] {
        &self.recipients
    }

    pub fn recipients_mut(&mut self) -> &mut WireList {
        &mut self.recipients
    }

    pub fn volatile(&self) -> &[Value] {
        &self.volatile
    }

    pub fn first_volatile(&self) -> Option<&Value> {
        self.volatile.first()
    }

    pub fn clear_data(&mut self) {
        self.volatile.clear();
    }

    /// Replace all volatile data with a single item.
    pub fn set_sole_volatile(&mut self, value: Value) {
        self.volatile.clear();
        self.volatile.push(value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptState {
    code: String,
    input_is_path: bool,
}

impl ScriptState {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            input_is_path: false,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn input_is_path(&self) -> bool {
        self.input_is_path
    }

    pub fn set_input_is_path(&mut self, input_is_path: bool) {
        self.input_is_path = input_is_path;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentBody {
    inputs: Vec<LiveParam>,
    outputs: Vec<LiveParam>,
    script: Option<ScriptState>,
    computation_time_ms: f64,
    params_rev: u64,
}

impl ComponentBody {
    pub fn inputs(&self) -> &[LiveParam] {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut Vec<LiveParam> {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &[LiveParam] {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut Vec<LiveParam> {
        &mut self.outputs
    }

    pub fn register_input(&mut self, param: LiveParam) {
        self.inputs.push(param);
    }

    pub fn register_output(&mut self, param: LiveParam) {
        self.outputs.push(param);
    }

    pub fn script(&self) -> Option<&ScriptState> {
        self.script.as_ref()
    }

    pub fn script_mut(&mut self) -> Option<&mut ScriptState> {
        self.script.as_mut()
    }

    pub fn set_script(&mut self, script: Option<ScriptState>) {
        self.script = script;
    }

    pub fn computation_time_ms(&self) -> f64 {
        self.computation_time_ms
    }

    pub fn set_computation_time_ms(&mut self, millis: f64) {
        self.computation_time_ms = millis;
    }

    pub fn params_rev(&self) -> u64 {
        self.params_rev
    }

    /// Parameters-changed notification; the host uses this to rebuild
    /// derived parameter state.
    pub fn on_parameters_changed(&mut self) {
        self.params_rev += 1;
    }

    /// Host factory for the reserved `code` reference input. Only
    /// script-capable components can construct one.
    pub fn construct_code_input(&self, instance_id: InstanceId) -> Option<LiveParam> {
        self.script.as_ref()?;
        let mut param = LiveParam::new(instance_id, "code");
        param.set_nickname("code");
        param.set_description("Path to referenced source file");
        param.set_type_hint(Some(TypeHint::Str));
        param.set_access(ParamAccess::Item);
        Some(param)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBody {
    param: LiveParam,
    slider: Option<SliderState>,
    panel_text: Option<String>,
}

impl ParameterBody {
    pub fn new(param: LiveParam) -> Self {
        Self {
            param,
            slider: None,
            panel_text: None,
        }
    }

    pub fn param(&self) -> &LiveParam {
        &self.param
    }

    pub fn param_mut(&mut self) -> &mut LiveParam {
        &mut self.param
    }

    pub fn slider(&self) -> Option<&SliderState> {
        self.slider.as_ref()
    }

    pub fn set_slider(&mut self, slider: Option<SliderState>) {
        self.slider = slider;
    }

    pub fn panel_text(&self) -> Option<&str> {
        self.panel_text.as_deref()
    }

    pub fn set_panel_text<T: Into<String>>(&mut self, text: Option<T>) {
        self.panel_text = text.map(Into::into);
    }

    pub fn kind(&self) -> NodeKind {
        if self.slider.is_some() {
            NodeKind::Slider
        } else if self.panel_text.is_some() {
            NodeKind::Panel
        } else {
            NodeKind::Parameter
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Component(ComponentBody),
    Parameter(ParameterBody),
}

/// Native canvas layout. Coordinates here are host-native (y-down); the
/// extractor normalizes on the way out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub pivot_x: f64,
    pub pivot_y: f64,
    pub expired: bool,
}

impl Layout {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            pivot_x: x + width / 2.0,
            pivot_y: y + height / 2.0,
            expired: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveNode {
    instance_id: InstanceId,
    name: String,
    nickname: String,
    description: String,
    category: Option<String>,
    sub_category: Option<String>,
    layout: Option<Layout>,
    selected: bool,
    runtime_messages: Vec<String>,
    recompute_count: u64,
    body: NodeBody,
}

impl LiveNode {
    pub fn new(instance_id: InstanceId, name: impl Into<String>, body: NodeBody) -> Self {
        let name = name.into();
        Self {
            instance_id,
            nickname: name.clone(),
            name,
            description: String::new(),
            category: None,
            sub_category: None,
            layout: None,
            selected: false,
            runtime_messages: Vec::new(),
            recompute_count: 0,
            body,
        }
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category<T: Into<String>>(&mut self, category: Option<T>) {
        self.category = category.map(Into::into);
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }

    pub fn set_sub_category<T: Into<String>>(&mut self, sub_category: Option<T>) {
        self.sub_category = sub_category.map(Into::into);
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn set_layout(&mut self, layout: Option<Layout>) {
        self.layout = layout;
    }

    pub fn expire_layout(&mut self) {
        if let Some(layout) = self.layout.as_mut() {
            layout.expired = true;
        }
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn runtime_messages(&self) -> &[String] {
        &self.runtime_messages
    }

    pub fn add_runtime_message(&mut self, message: impl Into<String>) {
        self.runtime_messages.push(message.into());
    }

    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut NodeBody {
        &mut self.body
    }

    pub fn as_component(&self) -> Option<&ComponentBody> {
        match &self.body {
            NodeBody::Component(body) => Some(body),
            NodeBody::Parameter(_) => None,
        }
    }

    pub fn as_component_mut(&mut self) -> Option<&mut ComponentBody> {
        match &mut self.body {
            NodeBody::Component(body) => Some(body),
            NodeBody::Parameter(_) => None,
        }
    }

    /// Script-capable means the body carries inline source state.
    pub fn is_script_capable(&self) -> bool {
        matches!(&self.body, NodeBody::Component(body) if body.script().is_some())
    }

    fn bump_recompute(&mut self) {
        self.recompute_count += 1;
    }
}

/// Role of a parameter relative to its owning component, resolved during
/// document-wide lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSlot {
    Standalone,
    Child { role: ParamRole },
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    objects: Vec<LiveNode>,
    refresh_enabled: bool,
    next_serial: u64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            refresh_enabled: true,
            next_serial: 0,
        }
    }

    /// Top-level nodes in canvas insertion order.
    pub fn objects(&self) -> &[LiveNode] {
        &self.objects
    }

    pub fn add_node(&mut self, node: LiveNode) {
        self.objects.push(node);
    }

    /// Fresh instance id. Ids are never reused within a session.
    pub fn allocate_id(&mut self, prefix: &str) -> InstanceId {
        self.next_serial += 1;
        InstanceId::new(format!("{prefix}-{:04}", self.next_serial)).expect("generated id segment")
    }

    pub fn find_node(&self, id: &InstanceId) -> Option<&LiveNode> {
        self.objects.iter().find(|node| node.instance_id() == id)
    }

    pub fn find_node_mut(&mut self, id: &InstanceId) -> Option<&mut LiveNode> {
        self.objects.iter_mut().find(|node| node.instance_id() == id)
    }

    /// Locate a parameter anywhere in the document: a standalone parameter
    /// node, or a child slot of some component.
    pub fn find_param(&self, id: &InstanceId) -> Option<(&LiveParam, ParamSlot)> {
        for node in &self.objects {
            match node.body() {
                NodeBody::Parameter(body) if body.param().instance_id() == id => {
                    return Some((body.param(), ParamSlot::Standalone));
                }
                NodeBody::Parameter(_) => {}
                NodeBody::Component(body) => {
                    if let Some(param) = body.inputs().iter().find(|p| p.instance_id() == id) {
                        return Some((
                            param,
                            ParamSlot::Child {
                                role: ParamRole::Input,
                            },
                        ));
                    }
                    if let Some(param) = body.outputs().iter().find(|p| p.instance_id() == id) {
                        return Some((
                            param,
                            ParamSlot::Child {
                                role: ParamRole::Output,
                            },
                        ));
                    }
                }
            }
        }
        None
    }

    pub fn find_param_mut(&mut self, id: &InstanceId) -> Option<&mut LiveParam> {
        for node in &mut self.objects {
            match node.body_mut() {
                NodeBody::Parameter(body) => {
                    if body.param().instance_id() == id {
                        return Some(body.param_mut());
                    }
                }
                NodeBody::Component(body) => {
                    if body.inputs().iter().any(|p| p.instance_id() == id) {
                        return body.inputs_mut().iter_mut().find(|p| p.instance_id() == id);
                    }
                    if body.outputs().iter().any(|p| p.instance_id() == id) {
                        return body
                            .outputs_mut()
                            .iter_mut()
                            .find(|p| p.instance_id() == id);
                    }
                }
            }
        }
        None
    }

    /// Owning component id for a child parameter.
    pub fn owner_of(&self, param_id: &InstanceId) -> Option<&InstanceId> {
        for node in &self.objects {
            if let NodeBody::Component(body) = node.body() {
                let owns = body.inputs().iter().any(|p| p.instance_id() == param_id)
                    || body.outputs().iter().any(|p| p.instance_id() == param_id);
                if owns {
                    return Some(node.instance_id());
                }
            }
        }
        None
    }

    /// Resolve any id to the top-level node it belongs to: itself when it
    /// names a top-level node, its owning component when it names a child
    /// parameter, `None` when it resolves to nothing.
    pub fn top_level_owner(&self, id: &InstanceId) -> Option<&InstanceId> {
        if let Some(node) = self.find_node(id) {
            return Some(node.instance_id());
        }
        self.owner_of(id)
    }

    /// Wire two parameters: `to` gains `from` as a source, `from` gains `to`
    /// as a recipient. Duplicate wires are not added twice.
    pub fn connect(&mut self, from: &InstanceId, to: &InstanceId) -> bool {
        if self.find_param(from).is_none() || self.find_param(to).is_none() {
            return false;
        }
        if let Some(param) = self.find_param_mut(to) {
            if !param.sources().contains(from) {
                param.sources_mut().push(from.clone());
            }
        }
        if let Some(param) = self.find_param_mut(from) {
            if !param.recipients().contains(to) {
                param.recipients_mut().push(to.clone());
            }
        }
        true
    }

    /// Remove every wire referencing `param_id` from the rest of the
    /// document. Called when a parameter is unregistered.
    pub fn detach_param(&mut self, param_id: &InstanceId) {
        for node in &mut self.objects {
            match node.body_mut() {
                NodeBody::Parameter(body) => {
                    let param = body.param_mut();
                    param.sources_mut().retain(|id| id != param_id);
                    param.recipients_mut().retain(|id| id != param_id);
                }
                NodeBody::Component(body) => {
                    for param in body.inputs_mut() {
                        param.sources_mut().retain(|id| id != param_id);
                        param.recipients_mut().retain(|id| id != param_id);
                    }
                    for param in body.outputs_mut() {
                        param.sources_mut().retain(|id| id != param_id);
                        param.recipients_mut().retain(|id| id != param_id);
                    }
                }
            }
        }
    }

    /// Canvas refresh flag. Multi-step mutations disable it so the host
    /// never recomputes against a half-modified parameter set; it is
    /// advisory, not a lock (serialization comes from the owning thread).
    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    pub fn set_refresh_enabled(&mut self, enabled: bool) {
        self.refresh_enabled = enabled;
    }

    pub fn selected_ids(&self) -> Vec<InstanceId> {
        self.objects
            .iter()
            .filter(|node| node.selected())
            .map(|node| node.instance_id().clone())
            .collect()
    }

    /// Expire a node's solved state; with `downstream`, everything reachable
    /// through its outgoing wires is expired too (the host recomputes the
    /// expired set on the next solution pass).
    pub fn expire_solution(&mut self, id: &InstanceId, downstream: bool) -> bool {
        if self.find_node(id).is_none() {
            return false;
        }
        let mut frontier = vec![id.clone()];
        let mut visited: Vec<InstanceId> = Vec::new();
        while let Some(current) = frontier.pop() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current.clone());
            if let Some(node) = self.find_node_mut(&current) {
                node.bump_recompute();
            }
            if !downstream {
                break;
            }
            for next in self.downstream_of(&current) {
                if !visited.contains(&next) {
                    frontier.push(next);
                }
            }
        }
        true
    }

    /// Top-level node ids immediately downstream of `id`.
    fn downstream_of(&self, id: &InstanceId) -> Vec<InstanceId> {
        let Some(node) = self.find_node(id) else {
            return Vec::new();
        };
        let recipient_ids: Vec<InstanceId> = match node.body() {
            NodeBody::Component(body) => body
                .outputs()
                .iter()
                .flat_map(|p| p.recipients().iter().cloned())
                .collect(),
            NodeBody::Parameter(body) => body.param().recipients().to_vec(),
        };
        let mut owners = Vec::new();
        for recipient in recipient_ids {
            if let Some(owner) = self.top_level_owner(&recipient) {
                if owner != id && !owners.contains(owner) {
                    owners.push(owner.clone());
                }
            }
        }
        owners
    }
}
