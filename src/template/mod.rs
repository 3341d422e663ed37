// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Template expansion
//!
//! Turns a template's build nodes into [`ExpandedNode`]s: every formula
//! evaluated, every repeat unrolled into positioned groups.

pub mod distribution;
mod node;
mod processor;

pub use node::{ExpandedGeometry, ExpandedGroup, ExpandedNode, ExpandedTemplate, ExpandedTransform};
pub use processor::TemplateProcessor;

use crate::expr::{Context, ExpressionEvaluator};
use crate::schema::{ExprSource, TransformSpec, Vec3};

/// Evaluate up to three components into a vector, filling missing ones
pub fn evaluate_vector(
    evaluator: &ExpressionEvaluator,
    components: &[ExprSource],
    ctx: &Context,
    fill: f64,
) -> Vec3 {
    let mut v = Vec3::repeat(fill);
    for (i, c) in components.iter().take(3).enumerate() {
        v[i] = evaluator.evaluate_number(c, ctx);
    }
    v
}

/// Evaluate a transform spec; absent components stay `None`
pub fn evaluate_transform(
    evaluator: &ExpressionEvaluator,
    spec: &TransformSpec,
    ctx: &Context,
) -> ExpandedTransform {
    ExpandedTransform {
        position: spec
            .position
            .as_deref()
            .map(|p| evaluate_vector(evaluator, p, ctx, 0.0)),
        rotation: spec
            .rotation
            .as_deref()
            .map(|r| evaluate_vector(evaluator, r, ctx, 0.0)),
        scale: spec
            .scale
            .as_deref()
            .map(|s| evaluate_vector(evaluator, s, ctx, 1.0)),
    }
}

/// Whether a string field holds a formula rather than a plain name.
///
/// Formulas start with `$` or have call form such as `if(...)`.
pub fn is_formula_text(text: &str) -> bool {
    let text = text.trim();
    if text.starts_with('$') {
        return true;
    }
    match text.find('(') {
        Some(open) if open > 0 && text.ends_with(')') => text[..open]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_detection() {
        assert!(is_formula_text("$material"));
        assert!(is_formula_text("if($style == 'a', 'oak', 'steel')"));
        assert!(is_formula_text("alternating(index, 'a', 'b')"));
        assert!(!is_formula_text("wood_textured"));
        assert!(!is_formula_text("glass (frosted)"));
        assert!(!is_formula_text("(x)"));
    }

    #[test]
    fn test_short_vectors_are_filled() {
        let ev = ExpressionEvaluator::new();
        let ctx = Context::new().with("h", 2.0);
        let v = evaluate_vector(&ev, &["$h".into()], &ctx, 1.0);
        assert_eq!(v, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_transform_keeps_absent_parts() {
        let ev = ExpressionEvaluator::new();
        let spec = TransformSpec {
            position: Some(vec![1.0.into(), "$h / 2".into(), 0.0.into()]),
            rotation: None,
            scale: None,
        };
        let t = evaluate_transform(&ev, &spec, &Context::new().with("h", 4.0));
        assert_eq!(t.position, Some(Vec3::new(1.0, 2.0, 0.0)));
        assert!(t.rotation.is_none());
        assert!(t.scale.is_none());
    }
}
