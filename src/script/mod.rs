// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Script component updates: inline source replacement and file-referenced
//! source, both with optional parameter reconfiguration.
//!
//! Canvas refresh is suspended for the duration of an update and re-enabled
//! unconditionally, including on the error paths.

use std::fmt;

use serde_json::json;

use crate::doc::{Document, LiveParam};
use crate::extract::Diagnostics;
use crate::model::InstanceId;
use crate::rewire::{reconfigure_params, ParamDefinition, RewireError, RESERVED_OUTPUT};


/// Inline script update request.
#[derive(Debug, Clone, Default)]
pub struct ScriptUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub message_to_user: Option<String>,
    pub param_definitions: Option<Vec<ParamDefinition>>,
}

/// File-referenced script update request. Unlike the inline variant this one
/// can rename the component; it carries no user message.
#[derive(Debug, Clone, Default)]
pub struct ReferenceUpdate {
    pub file_path: Option<String>,
    pub force_code_reference: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub param_definitions: Option<Vec<ParamDefinition>>,
}

/// What an update actually touched, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptReport {
    pub code_updated: bool,
    pub name_updated: bool,
    pub description_updated: bool,
    pub message_set: bool,
    pub reference_mode_set: bool,
    pub file_path_set: bool,
    pub params_updated: usize,
    pub connection_log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    NodeNotFound(InstanceId),
    NotScriptCapable(InstanceId),
    Params(RewireError),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "component {id} not found"),
            Self::NotScriptCapable(id) => {
                write!(f, "component {id} does not hold script source")
            }
            Self::Params(inner) => write!(f, "parameter update failed: {inner}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Params(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<RewireError> for ScriptError {
    fn from(inner: RewireError) -> Self {
        Self::Params(inner)
    }
}

/// Replace a script component's inline source and, optionally, its
/// parameter set, description, and user-facing message.
pub fn update_script(
    doc: &mut Document,
    id: &InstanceId,
    update: &ScriptUpdate,
    diag: &mut Diagnostics,
) -> Result<ScriptReport, ScriptError> {
    ensure_script_capable(doc, id)?;
    doc.set_refresh_enabled(false);
    let result = apply_inline(doc, id, update, diag);
    doc.set_refresh_enabled(true);
    result
}

fn apply_inline(
    doc: &mut Document,
    id: &InstanceId,
    update: &ScriptUpdate,
    diag: &mut Diagnostics,
) -> Result<ScriptReport, ScriptError> {
    let mut report = ScriptReport::default();
    if let Some(defs) = &update.param_definitions {
        let outcome = reconfigure_params(doc, id, defs, false, diag)?;
        report.params_updated = outcome.params_updated;
        report.connection_log = outcome.connection_log;
    }

    {
        let node = doc.find_node_mut(id).expect("validated above");
        if let Some(description) = &update.description {
            node.set_description(description.clone());
            report.description_updated = true;
        }
        if let Some(code) = &update.code {
            let body = node.as_component_mut().expect("validated above");
            let script = body.script_mut().expect("validated above");
            // The source is applied verbatim; no normalization, no parsing.
            script.set_code(code.clone());
            report.code_updated = true;
        }
    }

    if let Some(message) = &update.message_to_user {
        write_user_message(doc, id, message);
        report.message_set = true;
    }

    doc.expire_solution(id, true);
    Ok(report)
}

/// Switch a script component to file-referenced source, or update the path
/// of one that already references a file.
///
/// The reserved `code` input survives any parameter reconfiguration, and the
/// path lands in its data as the final mutation, after every structural
/// change has settled.
pub fn update_script_with_reference(
    doc: &mut Document,
    id: &InstanceId,
    update: &ReferenceUpdate,
    diag: &mut Diagnostics,
) -> Result<ScriptReport, ScriptError> {
    ensure_script_capable(doc, id)?;
    doc.set_refresh_enabled(false);
    let result = apply_reference(doc, id, update, diag);
    doc.set_refresh_enabled(true);
    result
}

fn apply_reference(
    doc: &mut Document,
    id: &InstanceId,
    update: &ReferenceUpdate,
    diag: &mut Diagnostics,
) -> Result<ScriptReport, ScriptError> {
    let mut report = ScriptReport::default();
    let enable_reference = update.force_code_reference || update.file_path.is_some();
    if enable_reference {
        report.reference_mode_set = ensure_code_input(doc, id);
        // Re-solve once with the mode flipped, before anything else moves.
        doc.expire_solution(id, false);
    }
    if let Some(defs) = &update.param_definitions {
        let outcome = reconfigure_params(doc, id, defs, true, diag)?;
        report.params_updated = outcome.params_updated;
        report.connection_log = outcome.connection_log;
    }

    {
        let node = doc.find_node_mut(id).expect("validated above");
        if let Some(name) = &update.name {
            node.set_nickname(name.clone());
            report.name_updated = true;
        }
        if let Some(description) = &update.description {
            node.set_description(description.clone());
            report.description_updated = true;
        }
    }

    if let Some(path) = &update.file_path {
        let code_id = find_code_input(doc, id).expect("code input ensured above");
        doc.find_param_mut(&code_id)
            .expect("code input exists")
            .set_sole_volatile(json!(path));
        report.file_path_set = true;
    }

    doc.expire_solution(id, true);
    Ok(report)
}

fn ensure_script_capable(doc: &Document, id: &InstanceId) -> Result<(), ScriptError> {
    let node = doc
        .find_node(id)
        .ok_or_else(|| ScriptError::NodeNotFound(id.clone()))?;
    if !node.is_script_capable() {
        return Err(ScriptError::NotScriptCapable(id.clone()));
    }
    Ok(())
}

fn find_code_input(doc: &Document, id: &InstanceId) -> Option<InstanceId> {
    let body = doc.find_node(id)?.as_component()?;
    body.inputs()
        .iter()
        .find(|p| p.name().eq_ignore_ascii_case("code"))
        .map(|p| p.instance_id().clone())
}

/// Flip the component to file-referenced mode and make sure the reserved
/// `code` input exists. Returns whether the mode actually changed.
fn ensure_code_input(doc: &mut Document, id: &InstanceId) -> bool {
    let needs_input = find_code_input(doc, id).is_none();
    let code_id = needs_input.then(|| doc.allocate_id("param"));
    let node = doc.find_node_mut(id).expect("validated above");
    let body = node.as_component_mut().expect("validated above");
    if let Some(code_id) = code_id {
        let param = body
            .construct_code_input(code_id)
            .expect("script capability validated above");
        body.register_input(param);
        body.on_parameters_changed();
    }
    let script = body.script_mut().expect("validated above");
    let changed = !script.input_is_path();
    script.set_input_is_path(true);
    changed
}

/// Put a message where the user can see it: the data of the reserved
/// `output` parameter, created on demand.
fn write_user_message(doc: &mut Document, id: &InstanceId, message: &str) {
    let existing = doc
        .find_node(id)
        .and_then(|node| node.as_component())
        .and_then(|body| {
            body.outputs()
                .iter()
                .find(|p| p.name().eq_ignore_ascii_case(RESERVED_OUTPUT))
                .map(|p| p.instance_id().clone())
        });
    let target = match existing {
        Some(target) => target,
        None => {
            let target = doc.allocate_id("param");
            let node = doc.find_node_mut(id).expect("validated above");
            let body = node.as_component_mut().expect("validated above");
            let mut param = LiveParam::new(target.clone(), RESERVED_OUTPUT);
            param.set_description("Component messages");
            body.register_output(param);
            body.on_parameters_changed();
            target
        }
    };
    doc.find_param_mut(&target)
        .expect("message output exists")
        .set_sole_volatile(json!(message));
}
