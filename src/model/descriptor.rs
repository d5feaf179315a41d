// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire-facing descriptors for live nodes and their parameters.
//!
//! Field names follow the command surface the original host payloads used
//! (`instanceGuid`, `nickName`, `Inputs`, ...), so existing agent clients can
//! consume snapshots unchanged.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::InstanceId;

/// Screen-space rectangle. The host canvas is y-down; descriptors are
/// normalized to y-up at extraction time, so `from_native` inverts the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn from_native(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y: -y - height,
            width,
            height,
        }
    }
}

/// 2D anchor point, same axis inversion as [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Pivot {
    pub x: f64,
    pub y: f64,
}

impl Pivot {
    pub fn from_native(x: f64, y: f64) -> Self {
        Self { x, y: -y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Component,
    Parameter,
    Slider,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamAccess {
    Item,
    #[default]
    List,
    Tree,
}

impl ParamAccess {
    /// Lenient parse: unknown or absent access strings fall back to `List`,
    /// matching the host's default.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("item") => Self::Item,
            Some("tree") => Self::Tree,
            _ => Self::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::List => "list",
            Self::Tree => "tree",
        }
    }
}

/// Declared parameter type. Unrecognized hints map to `Generic`, which the
/// host treats as an untyped slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    Str,
    Int,
    Float,
    Bool,
    Guid,
    Point,
    Vector,
    Curve,
    Surface,
    Brep,
    Mesh,
    #[default]
    Generic,
}

impl TypeHint {
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("str") => Self::Str,
            Some("int") => Self::Int,
            Some("float") => Self::Float,
            Some("bool") => Self::Bool,
            Some("guid") => Self::Guid,
            Some("point") => Self::Point,
            Some("vector") => Self::Vector,
            Some("curve") => Self::Curve,
            Some("surface") => Self::Surface,
            Some("brep") => Self::Brep,
            Some("mesh") => Self::Mesh,
            _ => Self::Generic,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Guid => "guid",
            Self::Point => "point",
            Self::Vector => "vector",
            Self::Curve => "curve",
            Self::Surface => "surface",
            Self::Brep => "brep",
            Self::Mesh => "mesh",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamRole {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SliderInfo {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub decimals: u32,
}

/// Descriptor for a parameter: either a child slot embedded in a component
/// descriptor, or a standalone top-level node (slider, panel, bare param).
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParamDescriptor {
    pub instance_guid: InstanceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_instance_guid: Option<InstanceId>,
    pub name: String,
    pub nick_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Pivot>,
    pub is_selected: bool,
    pub is_input: bool,
    pub access: ParamAccess,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type_hint: Option<String>,
    pub sources: Vec<InstanceId>,
    pub targets: Vec<InstanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slider: Option<SliderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_content: Option<String>,
}

/// Script extension fields, present only on script-capable components.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ScriptInfo {
    #[serde(rename = "isScriptComponent")]
    pub is_script_component: bool,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "codeReferenceFromFile")]
    pub code_reference_from_file: bool,
    #[serde(rename = "codeReferencePath", skip_serializing_if = "Option::is_none")]
    pub code_reference_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub instance_guid: InstanceId,
    pub name: String,
    pub nick_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Pivot>,
    pub is_selected: bool,
    pub computation_time: f64,
    pub runtime_messages: Vec<String>,
    #[serde(rename = "Inputs")]
    pub inputs: Vec<ParamDescriptor>,
    #[serde(rename = "Outputs")]
    pub outputs: Vec<ParamDescriptor>,
    /// Aggregated component-level edges: peer parameter ids resolved to
    /// their owning top-level node ids, own id and child slots excluded.
    pub sources: Vec<InstanceId>,
    pub targets: Vec<InstanceId>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptInfo>,
}

/// A top-level snapshot entry: a component, or a standalone parameter.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum NodeDescriptor {
    Component(ComponentDescriptor),
    Parameter(ParamDescriptor),
}

impl NodeDescriptor {
    pub fn instance_guid(&self) -> &InstanceId {
        match self {
            Self::Component(c) => &c.instance_guid,
            Self::Parameter(p) => &p.instance_guid,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Component(c) => c.kind,
            Self::Parameter(p) => p.kind,
        }
    }

    pub fn sources(&self) -> &[InstanceId] {
        match self {
            Self::Component(c) => &c.sources,
            Self::Parameter(p) => &p.sources,
        }
    }

    pub fn targets(&self) -> &[InstanceId] {
        match self {
            Self::Component(c) => &c.targets,
            Self::Parameter(p) => &p.targets,
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Self::Component(c) => c.is_selected,
            Self::Parameter(p) => p.is_selected,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Self::Component(c) => c.is_selected = selected,
            Self::Parameter(p) => p.is_selected = selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, ParamAccess, Pivot, TypeHint};

    #[test]
    fn bounds_invert_native_y() {
        let bounds = Bounds::from_native(10.0, 20.0, 100.0, 40.0);
        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.y, -60.0);
        assert_eq!(bounds.width, 100.0);
        assert_eq!(bounds.height, 40.0);
    }

    #[test]
    fn pivot_inverts_native_y() {
        let pivot = Pivot::from_native(5.0, 7.5);
        assert_eq!(pivot.x, 5.0);
        assert_eq!(pivot.y, -7.5);
    }

    #[test]
    fn access_parse_defaults_to_list() {
        assert_eq!(ParamAccess::parse_lenient(Some("item")), ParamAccess::Item);
        assert_eq!(ParamAccess::parse_lenient(Some("tree")), ParamAccess::Tree);
        assert_eq!(ParamAccess::parse_lenient(Some("TREE")), ParamAccess::Tree);
        assert_eq!(ParamAccess::parse_lenient(Some("nope")), ParamAccess::List);
        assert_eq!(ParamAccess::parse_lenient(None), ParamAccess::List);
    }

    #[test]
    fn type_hint_parse_defaults_to_generic() {
        assert_eq!(TypeHint::parse_lenient(Some("float")), TypeHint::Float);
        assert_eq!(TypeHint::parse_lenient(Some("Mesh")), TypeHint::Mesh);
        assert_eq!(TypeHint::parse_lenient(Some("widget")), TypeHint::Generic);
        assert_eq!(TypeHint::parse_lenient(None), TypeHint::Generic);
    }
}
