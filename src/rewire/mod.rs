// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parameter reconfiguration.
//!
//! Replacing a component's parameter set is done in stages so the document
//! never passes through a state the host cannot solve:
//!
//! 1. record existing wires keyed by parameter display name
//! 2. stabilize with placeholder slots so the component never has zero params
//! 3. clear the old parameters and their wires
//! 4. install the new parameter set
//! 5. drop the placeholders
//! 6. restore recorded wires onto same-named new parameters
//! 7. clear data, raise the parameters-changed notification, expire layout
//!
//! Restoration is best effort: wires whose peer disappeared, or whose
//! parameter has no same-named successor, are skipped and logged instead of
//! failing the whole operation. A failure during install cleans up the
//! placeholders but does not resurrect the cleared parameters.

use std::fmt;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::doc::{ComponentBody, Document, LiveParam};
use crate::extract::Diagnostics;
use crate::model::{InstanceId, ParamAccess, ParamRole, TypeHint};

#[cfg(test)]
mod tests;

const PLACEHOLDER_IN: &str = "__placeholder_in__";
const PLACEHOLDER_OUT: &str = "__placeholder_out__";

/// Reserved output name synthesized when a definition set declares no
/// outputs; script messages land there.
pub const RESERVED_OUTPUT: &str = "output";

/// Caller-facing parameter definition, as sent in command payloads.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamDefinition {
    /// `"input"` or `"output"`; anything else counts as input.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub nick_name: String,
    pub typehint: Option<String>,
    pub access: Option<String>,
    pub description: String,
    pub optional: Option<bool>,
}

impl ParamDefinition {
    pub fn role(&self) -> ParamRole {
        if self.kind.eq_ignore_ascii_case("output") {
            ParamRole::Output
        } else {
            ParamRole::Input
        }
    }

    fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.nick_name.trim()
        } else {
            self.name.trim()
        }
    }

    fn is_code(&self) -> bool {
        self.display_name().eq_ignore_ascii_case("code")
    }

    fn build(&self, instance_id: InstanceId) -> LiveParam {
        let name = self.display_name().to_owned();
        let mut param = LiveParam::new(instance_id, name);
        if !self.nick_name.trim().is_empty() {
            param.set_nickname(self.nick_name.trim());
        }
        param.set_description(self.description.clone());
        param.set_access(ParamAccess::parse_lenient(self.access.as_deref()));
        param.set_type_hint(Some(TypeHint::parse_lenient(self.typehint.as_deref())));
        param.set_optional(self.optional.unwrap_or(true));
        param
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewireReport {
    pub params_updated: usize,
    pub connection_log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewireError {
    ComponentNotFound(InstanceId),
    NotAComponent(InstanceId),
    InstallFailed {
        index: usize,
        reason: String,
        connection_log: Vec<String>,
    },
}

impl fmt::Display for RewireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComponentNotFound(id) => write!(f, "component {id} not found"),
            Self::NotAComponent(id) => write!(f, "object {id} is not a component"),
            Self::InstallFailed { index, reason, .. } => {
                write!(f, "parameter definition {index} rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for RewireError {}

struct ConnectionRecord {
    role: ParamRole,
    key: String,
    peers: Vec<InstanceId>,
}

/// Replace the parameter set of `component_id` with `definitions`.
///
/// With `preserve_code_param`, an input named `code` (case-insensitive)
/// survives the swap with its wires and data intact; matching definitions
/// are skipped rather than installed twice.
pub fn reconfigure_params(
    doc: &mut Document,
    component_id: &InstanceId,
    definitions: &[ParamDefinition],
    preserve_code_param: bool,
    diag: &mut Diagnostics,
) -> Result<RewireReport, RewireError> {
    let node = doc
        .find_node(component_id)
        .ok_or_else(|| RewireError::ComponentNotFound(component_id.clone()))?;
    let body = node
        .as_component()
        .ok_or_else(|| RewireError::NotAComponent(component_id.clone()))?;

    let records = record_connections(body, preserve_code_param);

    let ph_in_id = doc.allocate_id("param");
    let ph_out_id = doc.allocate_id("param");
    {
        let body = body_mut(doc, component_id);
        body.register_input(LiveParam::new(ph_in_id.clone(), PLACEHOLDER_IN));
        body.register_output(LiveParam::new(ph_out_id.clone(), PLACEHOLDER_OUT));
    }

    let cleared = clear_params(doc, component_id, &ph_in_id, &ph_out_id, preserve_code_param);
    let mut log: Vec<String> = vec![format!("cleared {cleared} parameter(s)")];

    let mut installed = 0usize;
    for (index, definition) in definitions.iter().enumerate() {
        if definition.display_name().is_empty() {
            remove_placeholders(doc, component_id, &ph_in_id, &ph_out_id);
            return Err(RewireError::InstallFailed {
                index,
                reason: "definition has neither name nor nickName".to_owned(),
                connection_log: log,
            });
        }
        if preserve_code_param && definition.role() == ParamRole::Input && definition.is_code() {
            log.push("kept existing code parameter".to_owned());
            continue;
        }
        let id = doc.allocate_id("param");
        let param = definition.build(id);
        let body = body_mut(doc, component_id);
        match definition.role() {
            ParamRole::Input => body.register_input(param),
            ParamRole::Output => body.register_output(param),
        }
        installed += 1;
    }

    // Script messages land on the output named `output`; synthesize it
    // whenever no installed output carries that name.
    let has_reserved = body_mut(doc, component_id)
        .outputs()
        .iter()
        .any(|p| p.display_key() == RESERVED_OUTPUT);
    if !has_reserved {
        let id = doc.allocate_id("param");
        let mut param = LiveParam::new(id, RESERVED_OUTPUT);
        param.set_description("Component messages");
        body_mut(doc, component_id).register_output(param);
        log.push(format!("added reserved '{RESERVED_OUTPUT}' output"));
        installed += 1;
    }

    remove_placeholders(doc, component_id, &ph_in_id, &ph_out_id);

    restore_connections(doc, component_id, &records, &mut log, diag);

    finalize(doc, component_id);

    Ok(RewireReport {
        params_updated: installed,
        connection_log: log,
    })
}

fn body_mut<'a>(doc: &'a mut Document, id: &InstanceId) -> &'a mut ComponentBody {
    doc.find_node_mut(id)
        .and_then(|node| node.as_component_mut())
        .expect("component validated before mutation")
}

fn record_connections(body: &ComponentBody, preserve_code_param: bool) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();
    for param in body.inputs() {
        if param.display_key().is_empty() {
            continue;
        }
        if preserve_code_param && param.name().eq_ignore_ascii_case("code") {
            continue;
        }
        records.push(ConnectionRecord {
            role: ParamRole::Input,
            key: param.display_key().to_owned(),
            peers: param.sources().to_vec(),
        });
    }
    for param in body.outputs() {
        if param.display_key().is_empty() {
            continue;
        }
        records.push(ConnectionRecord {
            role: ParamRole::Output,
            key: param.display_key().to_owned(),
            peers: param.recipients().to_vec(),
        });
    }
    records
}

fn clear_params(
    doc: &mut Document,
    component_id: &InstanceId,
    ph_in_id: &InstanceId,
    ph_out_id: &InstanceId,
    preserve_code_param: bool,
) -> usize {
    let removed: Vec<InstanceId> = {
        let body = body_mut(doc, component_id);
        let mut removed = Vec::new();
        body.inputs_mut().retain(|p| {
            let keep = p.instance_id() == ph_in_id
                || (preserve_code_param && p.name().eq_ignore_ascii_case("code"));
            if !keep {
                removed.push(p.instance_id().clone());
            }
            keep
        });
        body.outputs_mut().retain(|p| {
            let keep = p.instance_id() == ph_out_id;
            if !keep {
                removed.push(p.instance_id().clone());
            }
            keep
        });
        removed
    };
    for id in &removed {
        doc.detach_param(id);
    }
    removed.len()
}

fn remove_placeholders(
    doc: &mut Document,
    component_id: &InstanceId,
    ph_in_id: &InstanceId,
    ph_out_id: &InstanceId,
) {
    let body = body_mut(doc, component_id);
    body.inputs_mut().retain(|p| p.instance_id() != ph_in_id);
    body.outputs_mut().retain(|p| p.instance_id() != ph_out_id);
}

fn restore_connections(
    doc: &mut Document,
    component_id: &InstanceId,
    records: &[ConnectionRecord],
    log: &mut Vec<String>,
    diag: &mut Diagnostics,
) {
    for record in records {
        if record.peers.is_empty() {
            continue;
        }
        let successor: Option<InstanceId> = {
            let body = body_mut(doc, component_id);
            let params = match record.role {
                ParamRole::Input => body.inputs(),
                ParamRole::Output => body.outputs(),
            };
            params
                .iter()
                .find(|p| p.display_key() == record.key)
                .map(|p| p.instance_id().clone())
        };
        let Some(successor) = successor else {
            log.push(format!(
                "dropped {} connection(s): no parameter named '{}' remains",
                record.peers.len(),
                record.key
            ));
            continue;
        };
        for peer in &record.peers {
            let connected = match record.role {
                ParamRole::Input => doc.connect(peer, &successor),
                ParamRole::Output => doc.connect(&successor, peer),
            };
            if connected {
                match record.role {
                    ParamRole::Input => {
                        log.push(format!("restored input connection {peer} -> {}", record.key));
                    }
                    ParamRole::Output => {
                        log.push(format!("restored output connection {} -> {peer}", record.key));
                    }
                }
            } else {
                diag.warn(format!(
                    "skipped stale connection on '{}': peer {peer} no longer exists",
                    record.key
                ));
                log.push(format!("skipped stale peer {peer} on '{}'", record.key));
            }
        }
    }
}

fn finalize(doc: &mut Document, component_id: &InstanceId) {
    let body = body_mut(doc, component_id);
    for param in body.inputs_mut().iter_mut() {
        param.clear_data();
    }
    for param in body.outputs_mut().iter_mut() {
        param.clear_data();
    }
    body.on_parameters_changed();
    if let Some(node) = doc.find_node_mut(component_id) {
        node.expire_layout();
    }
}
