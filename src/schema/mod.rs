// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Schema data model
//!
//! Plain serde types for the JSON schema document (version `3.1`).

mod parameter;
mod types;

pub use types::{
    AxisSpec, BuildNode, ColorSpec, ConstraintRule, Distribution, ExprSource, GeometryKind,
    GeometryNode, GridDistribution, GroupNode, LinearDistribution, MaterialDefinition, Parameter,
    ParameterDefinition, ParameterKind, ParametricTemplate, RadialDistribution, RepeatNode,
    Schema, Severity, TransformSpec,
};

/// 3D vector type alias
pub type Vec3 = nalgebra::Vector3<f64>;

/// Schema version this crate is written against
pub const SCHEMA_VERSION: &str = "3.1";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_node_variants() {
        let nodes: Vec<BuildNode> = serde_json::from_value(json!([
            {"type": "box", "id": "seat", "dimensions": ["$w", 0.05, 1], "material": "wood"},
            {"type": "group", "id": "g", "position": [0, "$h", 0], "children": []},
            {"type": "repeat", "id": "legs", "count": 4,
             "distribution": {"type": "radial", "radius": 1},
             "children": [{"type": "cylinder", "id": "leg"}]},
            {"type": "parametric_template", "id": "inner", "template": []},
            {"type": "teapot", "id": "t"}
        ]))
        .unwrap();

        assert!(matches!(nodes[0], BuildNode::Geometry(ref g) if g.kind == GeometryKind::Box));
        assert!(matches!(nodes[1], BuildNode::Group(ref g) if g.transform.position.is_some()));
        match &nodes[2] {
            BuildNode::Repeat(r) => {
                assert_eq!(r.template.len(), 1);
                assert!(matches!(r.distribution, Some(Distribution::Radial(_))));
            }
            other => panic!("expected repeat, got {:?}", other),
        }
        assert!(matches!(nodes[3], BuildNode::Template(_)));
        assert!(matches!(
            nodes[4],
            BuildNode::Geometry(ref g) if g.kind == GeometryKind::Unknown("teapot".into())
        ));
    }

    #[test]
    fn test_unknown_distribution_kind() {
        let d: Distribution = serde_json::from_value(json!({"type": "spiral", "turns": 3})).unwrap();
        assert!(matches!(d, Distribution::Unknown));
    }

    #[test]
    fn test_parameters_keep_declaration_order() {
        let t: ParametricTemplate = serde_json::from_value(json!({
            "id": "t",
            "parameters": {
                "zeta": {"value": 1, "type": "number"},
                "alpha": {"value": "a", "type": "enum", "options": ["a"]},
                "mid": 3
            }
        }))
        .unwrap();
        let names: Vec<&str> = t.parameters.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(matches!(t.parameters["mid"], Parameter::Bare(ExprSource::Number(n)) if n == 3.0));
    }

    #[test]
    fn test_severity_parsing() {
        let rule: ConstraintRule =
            serde_json::from_value(json!({"expression": "$a > 0", "severity": "ERROR"})).unwrap();
        assert_eq!(rule.severity, Some(Severity::Error));
    }
}
