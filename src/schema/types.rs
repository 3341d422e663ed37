// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Schema document types

use crate::expr::Value;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A field that is either a literal or a formula string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprSource {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ExprSource {
    pub fn formula(text: impl Into<String>) -> Self {
        ExprSource::Text(text.into())
    }
}

impl Default for ExprSource {
    fn default() -> Self {
        ExprSource::Number(0.0)
    }
}

impl From<f64> for ExprSource {
    fn from(n: f64) -> Self {
        ExprSource::Number(n)
    }
}

impl From<&str> for ExprSource {
    fn from(s: &str) -> Self {
        ExprSource::Text(s.to_string())
    }
}

/// Root schema document
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, alias = "templates")]
    pub children: Vec<ParametricTemplate>,
    #[serde(default)]
    pub materials: IndexMap<String, MaterialDefinition>,
    #[serde(default)]
    pub ui_controls: Option<serde_json::Value>,
}

impl Schema {
    /// Find a top-level template by id
    pub fn template(&self, id: &str) -> Option<&ParametricTemplate> {
        self.children.iter().find(|t| t.id == id)
    }
}

/// Independently regenerable subtree with its own parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ParametricTemplate {
    pub id: String,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(flatten)]
    pub transform: TransformSpec,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub expressions: IndexMap<String, ExprSource>,
    #[serde(default)]
    pub constraints: IndexMap<String, IndexMap<String, ConstraintRule>>,
    #[serde(default)]
    pub template: Vec<BuildNode>,
}

/// Position, rotation (radians) and scale, each component a literal or formula
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformSpec {
    #[serde(default)]
    pub position: Option<Vec<ExprSource>>,
    #[serde(default)]
    pub rotation: Option<Vec<ExprSource>>,
    #[serde(default)]
    pub scale: Option<Vec<ExprSource>>,
}

/// A parameter is either a full definition or a bare literal/formula
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    Defined(ParameterDefinition),
    Bare(ExprSource),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDefinition {
    pub value: Value,
    #[serde(rename = "type", default)]
    pub kind: ParameterKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum ParameterKind {
    #[default]
    Number,
    Integer,
    Enum,
    Boolean,
    Other,
}

impl From<String> for ParameterKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "number" | "float" => ParameterKind::Number,
            "integer" | "int" => ParameterKind::Integer,
            "enum" => ParameterKind::Enum,
            "boolean" | "bool" => ParameterKind::Boolean,
            _ => ParameterKind::Other,
        }
    }
}

/// Named boolean rule over a template's parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintRule {
    pub expression: ExprSource,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "notice" => Severity::Info,
            "error" | "critical" | "fatal" => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// One element of a template's expansion tree
#[derive(Debug, Clone)]
pub enum BuildNode {
    Geometry(GeometryNode),
    Group(GroupNode),
    Repeat(RepeatNode),
    Template(Box<ParametricTemplate>),
}

impl<'de> Deserialize<'de> for BuildNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();

        let node = match tag.as_str() {
            "group" => GroupNode::deserialize(value).map(BuildNode::Group),
            "repeat" => RepeatNode::deserialize(value).map(BuildNode::Repeat),
            "parametric_template" => ParametricTemplate::deserialize(value)
                .map(|t| BuildNode::Template(Box::new(t))),
            _ => GeometryNode::deserialize(value).map(BuildNode::Geometry),
        };
        node.map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeometryNode {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<ExprSource>,
    #[serde(flatten)]
    pub transform: TransformSpec,
    #[serde(default)]
    pub material: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub transform: TransformSpec,
    #[serde(default)]
    pub children: Vec<BuildNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepeatNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub count: ExprSource,
    #[serde(default)]
    pub distribution: Option<Distribution>,
    #[serde(default)]
    pub instance_parameters: IndexMap<String, ExprSource>,
    #[serde(default, alias = "children")]
    pub template: Vec<BuildNode>,
}

/// Geometry kinds the factory understands; other tags are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeometryKind {
    Box,
    Cylinder,
    Sphere,
    Plane,
    Torus,
    Cone,
    Unknown(String),
}

impl GeometryKind {
    pub fn as_str(&self) -> &str {
        match self {
            GeometryKind::Box => "box",
            GeometryKind::Cylinder => "cylinder",
            GeometryKind::Sphere => "sphere",
            GeometryKind::Plane => "plane",
            GeometryKind::Torus => "torus",
            GeometryKind::Cone => "cone",
            GeometryKind::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, GeometryKind::Unknown(_))
    }
}

impl From<String> for GeometryKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "box" => GeometryKind::Box,
            "cylinder" => GeometryKind::Cylinder,
            "sphere" => GeometryKind::Sphere,
            "plane" => GeometryKind::Plane,
            "torus" => GeometryKind::Torus,
            "cone" => GeometryKind::Cone,
            _ => GeometryKind::Unknown(tag),
        }
    }
}

impl From<GeometryKind> for String {
    fn from(kind: GeometryKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Placement strategy for repeated instances
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Distribution {
    Linear(LinearDistribution),
    Grid(GridDistribution),
    Radial(RadialDistribution),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinearDistribution {
    #[serde(default)]
    pub axis: Option<AxisSpec>,
    #[serde(default)]
    pub start: Option<ExprSource>,
    #[serde(default)]
    pub step: Option<ExprSource>,
}

/// Axis by name (`"x"`), index (`0..=2`) or one-hot vector (`[0, 1, 0]`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Index(usize),
    Name(String),
    Vector(Vec<f64>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridDistribution {
    #[serde(default)]
    pub positions: Vec<Vec<ExprSource>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadialDistribution {
    #[serde(default)]
    pub radius: Option<ExprSource>,
    #[serde(default, rename = "startAngle", alias = "start_angle")]
    pub start_angle: Option<ExprSource>,
    #[serde(default)]
    pub y: Option<ExprSource>,
}

/// Material definition as written in the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metalness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// `"#rrggbb"`, `"rrggbb"`, `"#rgb"` or a packed `0xRRGGBB` number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Packed(u32),
    Text(String),
}
