// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command parsing and dispatch.
//!
//! Every request body is a JSON object with a `type` field; every response
//! is an envelope `{"status": "success" | "error", "result": ...}` plus a
//! `warnings` array when a handler reported non-fatal problems. Message
//! wording and result shapes are part of the wire contract.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::doc::Document;
use crate::extract::{extract_node, Diagnostics};
use crate::graph::{full_snapshot, snapshot_with_context, MAX_CONTEXT_DEPTH};
use crate::model::InstanceId;
use crate::rewire::ParamDefinition;
use crate::script::{
    update_script, update_script_with_reference, ReferenceUpdate, ScriptReport, ScriptUpdate,
};


/// Coarse response class; the HTTP layer maps it to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    BadRequest,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub envelope: Value,
    pub class: ResponseClass,
    /// Set by the stop command; the transport shuts down after responding.
    pub stop: bool,
}

impl Outcome {
    pub(crate) fn success(result: Value) -> Self {
        Self {
            envelope: json!({ "status": "success", "result": result }),
            class: ResponseClass::Success,
            stop: false,
        }
    }

    pub(crate) fn error(class: ResponseClass, message: impl Into<String>) -> Self {
        Self {
            envelope: json!({ "status": "error", "result": message.into() }),
            class,
            stop: false,
        }
    }

    fn with_warnings(mut self, diag: Diagnostics) -> Self {
        if !diag.is_empty() {
            if let Value::Object(map) = &mut self.envelope {
                map.insert("warnings".to_owned(), json!(diag.into_warnings()));
            }
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Command {
    TestCommand {},
    GetContext {},
    GetObject {
        instance_guid: Option<String>,
        context_depth: Option<Value>,
    },
    GetObjects {
        instance_guids: Option<Vec<String>>,
        context_depth: Option<Value>,
    },
    GetSelected {
        context_depth: Option<Value>,
    },
    ExpireComponent {
        instance_guid: Option<String>,
    },
    UpdateScript {
        instance_guid: Option<String>,
        code: Option<String>,
        description: Option<String>,
        message_to_user: Option<String>,
        param_definitions: Option<Vec<ParamDefinition>>,
    },
    UpdateScriptWithCodeReference {
        instance_guid: Option<String>,
        file_path: Option<String>,
        param_definitions: Option<Vec<ParamDefinition>>,
        description: Option<String>,
        name: Option<String>,
        force_code_reference: Option<bool>,
    },
    ExecuteCode {
        code: Option<Value>,
    },
    Stop {},
}

/// Parse and execute one command against the document.
pub fn process(doc: &mut Document, body: &str) -> Outcome {
    let raw = match parse_body(body) {
        Ok(raw) => raw,
        Err(message) => return Outcome::error(ResponseClass::BadRequest, message),
    };
    let command_type = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let command: Command = match serde_json::from_value(raw.clone()) {
        Ok(command) => command,
        Err(err) => {
            let message = err.to_string();
            if message.contains("unknown variant") {
                return Outcome::error(
                    ResponseClass::Internal,
                    format!("Unknown command type received: {command_type}"),
                );
            }
            return Outcome::error(
                ResponseClass::BadRequest,
                format!("Invalid command format (not valid JSON or missing 'type'): {message}"),
            );
        }
    };
    debug!(command = %command_type, "dispatching");
    dispatch(doc, command, raw)
}

fn parse_body(body: &str) -> Result<Value, String> {
    if body.trim().is_empty() {
        return Err(
            "Invalid command format (not valid JSON or missing 'type'): received empty request body."
                .to_owned(),
        );
    }
    let value: Value = serde_json::from_str(body).map_err(|err| {
        format!("Invalid command format (not valid JSON or missing 'type'): {err}")
    })?;
    if !value.is_object() || value.get("type").is_none() {
        return Err(
            "Invalid command format (not valid JSON or missing 'type'): parsed JSON is not a command object with a 'type' key."
                .to_owned(),
        );
    }
    Ok(value)
}

fn dispatch(doc: &mut Document, command: Command, raw: Value) -> Outcome {
    match command {
        Command::TestCommand {} => Outcome::success(json!({
            "message": "Test command executed successfully",
            "received_command": raw,
        })),
        Command::GetContext {} => {
            let mut diag = Diagnostics::new();
            let snapshot = full_snapshot(doc, &mut diag);
            Outcome::success(json!(snapshot)).with_warnings(diag)
        }
        Command::GetObject {
            instance_guid,
            context_depth,
        } => {
            let guids = instance_guid.into_iter().collect::<Vec<_>>();
            objects_with_context(doc, &guids, context_depth)
        }
        Command::GetObjects {
            instance_guids,
            context_depth,
        } => objects_with_context(doc, &instance_guids.unwrap_or_default(), context_depth),
        Command::GetSelected { context_depth } => {
            let selected = doc.selected_ids();
            if selected.is_empty() {
                return Outcome::success(json!({}));
            }
            let depth = coerce_depth(context_depth.as_ref());
            let mut diag = Diagnostics::new();
            let snapshot = snapshot_with_context(doc, &selected, depth, &mut diag);
            Outcome::success(json!(snapshot)).with_warnings(diag)
        }
        Command::ExpireComponent { instance_guid } => {
            let Some(guid) = non_empty(instance_guid) else {
                return Outcome::error(
                    ResponseClass::BadRequest,
                    "Missing 'instance_guid' for expire_component.",
                );
            };
            expire_component(doc, &guid)
        }
        Command::UpdateScript {
            instance_guid,
            code,
            description,
            message_to_user,
            param_definitions,
        } => {
            let Some(guid) = non_empty(instance_guid) else {
                return Outcome::error(
                    ResponseClass::BadRequest,
                    "Missing 'instance_guid' for update_script.",
                );
            };
            let id = match parse_id(&guid) {
                Ok(id) => id,
                Err(outcome) => return outcome,
            };
            let update = ScriptUpdate {
                code,
                description,
                message_to_user,
                param_definitions,
            };
            let mut diag = Diagnostics::new();
            match update_script(doc, &id, &update, &mut diag) {
                Ok(report) => {
                    info!(id = %id, "script updated");
                    Outcome::success(inline_report(&report)).with_warnings(diag)
                }
                Err(err) => Outcome::error(
                    ResponseClass::Internal,
                    format!("Error during component update: {err}"),
                )
                .with_warnings(diag),
            }
        }
        Command::UpdateScriptWithCodeReference {
            instance_guid,
            file_path,
            param_definitions,
            description,
            name,
            force_code_reference,
        } => {
            let Some(guid) = non_empty(instance_guid) else {
                return Outcome::error(
                    ResponseClass::BadRequest,
                    "Missing 'instance_guid' for code reference update.",
                );
            };
            let id = match parse_id(&guid) {
                Ok(id) => id,
                Err(outcome) => return outcome,
            };
            let update = ReferenceUpdate {
                file_path,
                force_code_reference: force_code_reference.unwrap_or(false),
                name,
                description,
                param_definitions,
            };
            let mut diag = Diagnostics::new();
            match update_script_with_reference(doc, &id, &update, &mut diag) {
                Ok(report) => {
                    info!(id = %id, "script reference updated");
                    Outcome::success(reference_report(&report)).with_warnings(diag)
                }
                Err(err) => Outcome::error(
                    ResponseClass::Internal,
                    format!("Error during code reference update: {err}"),
                )
                .with_warnings(diag),
            }
        }
        Command::ExecuteCode { code } => {
            let has_code = code.as_ref().and_then(Value::as_str).is_some_and(|c| !c.is_empty());
            if !has_code {
                return Outcome::error(
                    ResponseClass::BadRequest,
                    "Missing or invalid 'code' parameter.",
                );
            }
            Outcome::error(
                ResponseClass::Internal,
                "Code execution is not available on this host.",
            )
        }
        Command::Stop {} => {
            info!("stop command received");
            let mut outcome =
                Outcome::success(json!("Stop signal received. Server shutting down."));
            outcome.stop = true;
            outcome
        }
    }
}

fn objects_with_context(doc: &mut Document, guids: &[String], depth: Option<Value>) -> Outcome {
    let ids: Vec<InstanceId> = guids
        .iter()
        .filter(|g| !g.trim().is_empty())
        .filter_map(|g| InstanceId::new(g.clone()).ok())
        .collect();
    if guids.iter().all(|g| g.trim().is_empty()) && ids.is_empty() {
        return Outcome::error(ResponseClass::BadRequest, "No instance GUID(s) provided.");
    }
    let depth = coerce_depth(depth.as_ref());
    let mut diag = Diagnostics::new();
    let snapshot = snapshot_with_context(doc, &ids, depth, &mut diag);
    if snapshot.is_empty() {
        return Outcome::error(
            ResponseClass::BadRequest,
            "Target object(s) not found or not top-level components/params.",
        );
    }
    Outcome::success(json!(snapshot)).with_warnings(diag)
}

fn expire_component(doc: &mut Document, guid: &str) -> Outcome {
    let id = match parse_id(guid) {
        Ok(id) => id,
        Err(outcome) => return outcome,
    };
    if !doc.expire_solution(&id, true) {
        return Outcome::error(
            ResponseClass::BadRequest,
            format!("Object not found with GUID: {guid}"),
        );
    }
    let mut diag = Diagnostics::new();
    let node = doc.find_node(&id).expect("expired node exists");
    let descriptor = extract_node(doc, node, &mut diag);
    Outcome::success(json!(descriptor)).with_warnings(diag)
}

/// Lenient depth coercion: integers and numeric strings are accepted and
/// clamped, anything else means no expansion.
fn coerce_depth(value: Option<&Value>) -> u32 {
    let depth = match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    depth.clamp(0, i64::from(MAX_CONTEXT_DEPTH)) as u32
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_id(guid: &str) -> Result<InstanceId, Outcome> {
    InstanceId::new(guid.to_owned()).map_err(|err| {
        Outcome::error(
            ResponseClass::Internal,
            format!("Invalid instance GUID format: {err}."),
        )
    })
}

fn inline_report(report: &ScriptReport) -> Value {
    json!({
        "code_updated": report.code_updated,
        "params_updated": report.params_updated > 0,
        "description_updated": report.description_updated,
        "message_set": report.message_set,
        "connection_log": report.connection_log,
    })
}

fn reference_report(report: &ScriptReport) -> Value {
    json!({
        "code_reference_mode_set": report.reference_mode_set,
        "file_path_set": report.file_path_set,
        "params_updated": report.params_updated > 0,
        "description_updated": report.description_updated,
        "name_updated": report.name_updated,
        "connection_log": report.connection_log,
    })
}
