// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Expanded node definitions

use crate::expr::Context;
use crate::schema::{GeometryKind, ParametricTemplate, Vec3};
use serde::Serialize;

/// Build node with every formula replaced by its value
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpandedNode {
    Group(ExpandedGroup),
    Geometry(ExpandedGeometry),
    #[serde(rename = "parametric_template")]
    Template(ExpandedTemplate),
}

impl ExpandedNode {
    pub fn id(&self) -> Option<&str> {
        match self {
            ExpandedNode::Group(g) => g.id.as_deref(),
            ExpandedNode::Geometry(g) => g.id.as_deref(),
            ExpandedNode::Template(t) => Some(&t.id),
        }
    }

    /// Child nodes for tree walks
    pub fn children(&self) -> &[ExpandedNode] {
        match self {
            ExpandedNode::Group(g) => &g.children,
            _ => &[],
        }
    }

    /// Number of geometry leaves in this subtree, excluding nested templates
    pub fn geometry_count(&self) -> usize {
        match self {
            ExpandedNode::Geometry(_) => 1,
            ExpandedNode::Group(g) => g.children.iter().map(ExpandedNode::geometry_count).sum(),
            ExpandedNode::Template(_) => 0,
        }
    }
}

/// Evaluated transform components; `None` keeps the object's default
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpandedTransform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
}

impl ExpandedTransform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandedGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub transform: ExpandedTransform,
    pub children: Vec<ExpandedNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandedGeometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub geometry: GeometryKind,
    pub dimensions: Vec<f64>,
    #[serde(flatten)]
    pub transform: ExpandedTransform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

/// Nested template carried through expansion with the context it inherits
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedTemplate {
    pub id: String,
    pub context: Context,
    #[serde(skip)]
    pub template: ParametricTemplate,
}
