// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Template processor
//!
//! Resolves a template's parameter context and expands its build nodes.

use super::{distribution, evaluate_transform, is_formula_text};
use super::{ExpandedGeometry, ExpandedGroup, ExpandedNode, ExpandedTemplate, ExpandedTransform};
use crate::expr::{Context, ExpressionEvaluator};
use crate::schema::{
    BuildNode, ExprSource, GeometryNode, GroupNode, Parameter, ParametricTemplate, RepeatNode,
    Vec3,
};
use indexmap::IndexMap;

/// Default cap on the instances a single repeat node may produce
pub const DEFAULT_MAX_REPEAT_COUNT: usize = 10_000;

pub struct TemplateProcessor<'a> {
    evaluator: &'a ExpressionEvaluator,
    max_repeat_count: usize,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new(evaluator: &'a ExpressionEvaluator) -> Self {
        Self {
            evaluator,
            max_repeat_count: DEFAULT_MAX_REPEAT_COUNT,
        }
    }

    pub fn with_max_repeat_count(mut self, max: usize) -> Self {
        self.max_repeat_count = max;
        self
    }

    /// Expand `nodes` in the context built from `parameters` and
    /// `expressions` layered over `parent`.
    pub fn process(
        &self,
        nodes: &[BuildNode],
        parameters: &IndexMap<String, Parameter>,
        expressions: &IndexMap<String, ExprSource>,
        parent: &Context,
    ) -> Vec<ExpandedNode> {
        let ctx = self.resolve_context(parameters, expressions, parent);
        self.expand_all(nodes, &ctx)
    }

    /// Expand a whole template
    pub fn process_template(
        &self,
        template: &ParametricTemplate,
        parent: &Context,
    ) -> Vec<ExpandedNode> {
        self.process(
            &template.template,
            &template.parameters,
            &template.expressions,
            parent,
        )
    }

    /// Parent bindings, then parameters, then expressions in declaration order.
    ///
    /// Defined parameters contribute their stored value; bare ones and all
    /// expressions are evaluated against the context built so far.
    pub fn resolve_context(
        &self,
        parameters: &IndexMap<String, Parameter>,
        expressions: &IndexMap<String, ExprSource>,
        parent: &Context,
    ) -> Context {
        let mut ctx = parent.clone();

        for (name, param) in parameters {
            let value = match param {
                Parameter::Defined(def) => def.value.clone(),
                Parameter::Bare(source) => self.evaluator.evaluate(source, &ctx),
            };
            ctx.insert(name.clone(), value);
        }

        for (name, source) in expressions {
            let value = self.evaluator.evaluate(source, &ctx);
            ctx.insert(name.clone(), value);
        }

        ctx
    }

    fn expand_all(&self, nodes: &[BuildNode], ctx: &Context) -> Vec<ExpandedNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                BuildNode::Repeat(repeat) => out.extend(self.repeat(repeat, ctx)),
                BuildNode::Group(group) => out.push(ExpandedNode::Group(self.group(group, ctx))),
                BuildNode::Geometry(geometry) => {
                    out.push(ExpandedNode::Geometry(self.geometry(geometry, ctx)))
                }
                BuildNode::Template(template) => {
                    out.push(ExpandedNode::Template(ExpandedTemplate {
                        id: template.id.clone(),
                        context: ctx.clone(),
                        template: (**template).clone(),
                    }))
                }
            }
        }
        out
    }

    fn group(&self, group: &GroupNode, ctx: &Context) -> ExpandedGroup {
        ExpandedGroup {
            id: self.label(group.id.as_deref(), ctx),
            name: self.label(group.name.as_deref(), ctx),
            transform: evaluate_transform(self.evaluator, &group.transform, ctx),
            children: self.expand_all(&group.children, ctx),
        }
    }

    fn geometry(&self, node: &GeometryNode, ctx: &Context) -> ExpandedGeometry {
        ExpandedGeometry {
            id: self.label(node.id.as_deref(), ctx),
            name: self.label(node.name.as_deref(), ctx),
            geometry: node.kind.clone(),
            dimensions: node
                .dimensions
                .iter()
                .map(|d| self.evaluator.evaluate_number(d, ctx))
                .collect(),
            transform: evaluate_transform(self.evaluator, &node.transform, ctx),
            material: self.label(node.material.as_deref(), ctx),
        }
    }

    /// Unroll a repeat into one group per instance, placed by its distribution
    fn repeat(&self, repeat: &RepeatNode, ctx: &Context) -> Vec<ExpandedNode> {
        let count = self.instance_count(repeat, ctx);
        let positions = self.positions(repeat, count, ctx);
        let base_id = repeat.id.as_deref().unwrap_or("repeat");

        positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let mut instance = ctx.clone().with("index", i as f64);
                for (name, source) in &repeat.instance_parameters {
                    let value = self.evaluator.evaluate(source, &instance);
                    instance.insert(name.clone(), value);
                }

                ExpandedNode::Group(ExpandedGroup {
                    id: Some(format!("{}_{}", base_id, i)),
                    name: None,
                    transform: ExpandedTransform::at(position),
                    children: self.expand_all(&repeat.template, &instance),
                })
            })
            .collect()
    }

    fn instance_count(&self, repeat: &RepeatNode, ctx: &Context) -> usize {
        let raw = self.evaluator.evaluate_number(&repeat.count, ctx);
        if raw <= 0.0 {
            return 0;
        }
        let count = raw.trunc() as usize;
        if count > self.max_repeat_count {
            log::warn!(
                "repeat '{}' count {} exceeds limit {}, truncating",
                repeat.id.as_deref().unwrap_or("repeat"),
                count,
                self.max_repeat_count
            );
            return self.max_repeat_count;
        }
        count
    }

    /// Exactly `count` positions: generated ones, padded with the origin
    fn positions(&self, repeat: &RepeatNode, count: usize, ctx: &Context) -> Vec<Vec3> {
        let mut positions = match &repeat.distribution {
            Some(d) => distribution::generate(d, count, ctx, self.evaluator).unwrap_or_else(|| {
                log::warn!(
                    "repeat '{}' has an unknown distribution kind, placing instances at origin",
                    repeat.id.as_deref().unwrap_or("repeat")
                );
                Vec::new()
            }),
            None => Vec::new(),
        };
        positions.truncate(count);
        positions.resize(count, Vec3::zeros());
        positions
    }

    /// Plain names pass through; formula strings are evaluated and stringified
    fn label(&self, text: Option<&str>, ctx: &Context) -> Option<String> {
        let text = text?;
        if is_formula_text(text) {
            Some(self.evaluator.evaluate_str(text, ctx).to_string())
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Value;
    use serde_json::json;

    fn template(value: serde_json::Value) -> ParametricTemplate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_context_layering() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "parameters": {
                "w": {"value": 2, "type": "number"},
                "half": "$w / 2"
            },
            "expressions": {"quarter": "$half / 2", "outer": "$base + $w"}
        }));
        let parent = Context::new().with("base", 10.0).with("w", 99.0);
        let ctx = TemplateProcessor::new(&ev).resolve_context(&t.parameters, &t.expressions, &parent);

        assert_eq!(ctx.get("w"), Some(&Value::Number(2.0)));
        assert_eq!(ctx.get("half"), Some(&Value::Number(1.0)));
        assert_eq!(ctx.get("quarter"), Some(&Value::Number(0.5)));
        assert_eq!(ctx.get("outer"), Some(&Value::Number(12.0)));
    }

    #[test]
    fn test_grid_repeat_expansion() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "parameters": {"w": {"value": 2, "type": "number"}},
            "template": [{
                "type": "repeat",
                "id": "legs",
                "count": 3,
                "distribution": {"type": "grid", "positions": [
                    [0, 0, 0], ["$w", 0, 0], [0, 0, "$w"]
                ]},
                "children": [{
                    "type": "box", "id": "leg",
                    "dimensions": ["index + 1", 1, 1]
                }]
            }]
        }));
        let nodes = TemplateProcessor::new(&ev).process_template(&t, &Context::new());

        assert_eq!(nodes.len(), 3);
        for (i, node) in nodes.iter().enumerate() {
            let ExpandedNode::Group(group) = node else {
                panic!("expected group, got {:?}", node);
            };
            assert_eq!(group.id.as_deref(), Some(format!("legs_{}", i).as_str()));
            let ExpandedNode::Geometry(leg) = &group.children[0] else {
                panic!("expected geometry");
            };
            assert_eq!(leg.dimensions[0], i as f64 + 1.0);
        }
        let ExpandedNode::Group(second) = &nodes[1] else { unreachable!() };
        assert_eq!(second.transform.position, Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_instance_parameters_see_index() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "template": [{
                "type": "repeat", "id": "shelf", "count": 2,
                "distribution": {"type": "linear", "axis": "y", "step": 0.5},
                "instance_parameters": {"h": "index * 10", "h2": "$h + 1"},
                "children": [{"type": "box", "id": "board", "dimensions": ["$h2", 1, 1]}]
            }]
        }));
        let nodes = TemplateProcessor::new(&ev).process_template(&t, &Context::new());
        let ExpandedNode::Group(last) = &nodes[1] else { unreachable!() };
        let ExpandedNode::Geometry(board) = &last.children[0] else { unreachable!() };
        assert_eq!(board.dimensions[0], 11.0);
        assert_eq!(last.transform.position, Some(Vec3::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn test_short_grid_is_padded_with_origin() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "template": [{
                "type": "repeat", "id": "r", "count": 3,
                "distribution": {"type": "grid", "positions": [[1, 1, 1]]},
                "children": []
            }]
        }));
        let nodes = TemplateProcessor::new(&ev).process_template(&t, &Context::new());
        assert_eq!(nodes.len(), 3);
        let ExpandedNode::Group(last) = &nodes[2] else { unreachable!() };
        assert_eq!(last.transform.position, Some(Vec3::zeros()));
    }

    #[test]
    fn test_repeat_count_edges() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "parameters": {"n": {"value": 2.9, "type": "number"}},
            "template": [
                {"type": "repeat", "id": "a", "count": "$n", "children": []},
                {"type": "repeat", "id": "b", "count": -4, "children": []},
                {"type": "repeat", "id": "c", "count": "1 / 0", "children": []},
                {"type": "repeat", "id": "d", "count": 50,
                 "distribution": {"type": "spiral"}, "children": []}
            ]
        }));
        let nodes = TemplateProcessor::new(&ev)
            .with_max_repeat_count(5)
            .process_template(&t, &Context::new());
        let ids: Vec<_> = nodes.iter().filter_map(|n| n.id()).collect();
        assert_eq!(ids, ["a_0", "a_1", "d_0", "d_1", "d_2", "d_3", "d_4"]);
    }

    #[test]
    fn test_material_formula_is_evaluated() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "t",
            "parameters": {"style": {"value": "industrial", "type": "enum"}},
            "template": [
                {"type": "box", "id": "a",
                 "material": "if($style == 'industrial', 'metal', 'wood')"},
                {"type": "box", "id": "b", "material": "glass"},
                {"type": "box", "id": "$style"}
            ]
        }));
        let nodes = TemplateProcessor::new(&ev).process_template(&t, &Context::new());
        let materials: Vec<_> = nodes
            .iter()
            .map(|n| match n {
                ExpandedNode::Geometry(g) => g.material.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(materials, [Some("metal".into()), Some("glass".into()), None]);
        assert_eq!(nodes[2].id(), Some("industrial"));
    }

    #[test]
    fn test_nested_template_keeps_context() {
        let ev = ExpressionEvaluator::new();
        let t = template(json!({
            "id": "outer",
            "parameters": {"w": {"value": 3, "type": "number"}},
            "template": [{"type": "parametric_template", "id": "inner", "template": []}]
        }));
        let nodes = TemplateProcessor::new(&ev).process_template(&t, &Context::new());
        let ExpandedNode::Template(inner) = &nodes[0] else {
            panic!("expected nested template");
        };
        assert_eq!(inner.id, "inner");
        assert_eq!(inner.context.get("w"), Some(&Value::Number(3.0)));
    }
}
