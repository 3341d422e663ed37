// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Position generators for repeat nodes

use super::evaluate_vector;
use crate::expr::{Context, ExpressionEvaluator};
use crate::schema::{
    AxisSpec, Distribution, ExprSource, GridDistribution, LinearDistribution, RadialDistribution,
    Vec3,
};
use std::f64::consts::TAU;

/// Generate positions for `count` instances.
///
/// Returns `None` for distribution kinds without a generator; the caller
/// decides the fallback placement.
pub fn generate(
    distribution: &Distribution,
    count: usize,
    ctx: &Context,
    evaluator: &ExpressionEvaluator,
) -> Option<Vec<Vec3>> {
    match distribution {
        Distribution::Linear(def) => Some(linear(def, count, ctx, evaluator)),
        Distribution::Grid(def) => Some(grid(def, count, ctx, evaluator)),
        Distribution::Radial(def) => Some(radial(def, count, ctx, evaluator)),
        Distribution::Unknown => None,
    }
}

/// Evenly spaced along one axis: `start + i * step`
pub fn linear(
    def: &LinearDistribution,
    count: usize,
    ctx: &Context,
    evaluator: &ExpressionEvaluator,
) -> Vec<Vec3> {
    let start = number_or(evaluator, def.start.as_ref(), ctx, 0.0);
    let step = number_or(evaluator, def.step.as_ref(), ctx, 1.0);
    let axis = axis_index(def.axis.as_ref());

    (0..count)
        .map(|i| {
            let mut p = Vec3::zeros();
            p[axis] = start + i as f64 * step;
            p
        })
        .collect()
}

/// Explicit positions, one per instance; extras beyond `count` are ignored
pub fn grid(
    def: &GridDistribution,
    count: usize,
    ctx: &Context,
    evaluator: &ExpressionEvaluator,
) -> Vec<Vec3> {
    def.positions
        .iter()
        .take(count)
        .map(|coords| evaluate_vector(evaluator, coords, ctx, 0.0))
        .collect()
}

/// Around a circle in the XZ plane at a fixed height
pub fn radial(
    def: &RadialDistribution,
    count: usize,
    ctx: &Context,
    evaluator: &ExpressionEvaluator,
) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }

    let radius = number_or(evaluator, def.radius.as_ref(), ctx, 0.0);
    let start = number_or(evaluator, def.start_angle.as_ref(), ctx, 0.0);
    let y = number_or(evaluator, def.y.as_ref(), ctx, 0.0);
    let step = TAU / count as f64;

    (0..count)
        .map(|i| {
            let angle = start + i as f64 * step;
            Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
        })
        .collect()
}

fn number_or(
    evaluator: &ExpressionEvaluator,
    source: Option<&ExprSource>,
    ctx: &Context,
    default: f64,
) -> f64 {
    source
        .map(|s| evaluator.evaluate_number(s, ctx))
        .unwrap_or(default)
}

/// Axis index in `0..3`; anything unrecognised falls back to Y
fn axis_index(axis: Option<&AxisSpec>) -> usize {
    match axis {
        None => 1,
        Some(AxisSpec::Index(i)) if *i < 3 => *i,
        Some(AxisSpec::Name(name)) => match name.to_ascii_lowercase().as_str() {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            other => {
                log::warn!("unknown linear axis '{}', using y", other);
                1
            }
        },
        Some(AxisSpec::Vector(v)) => v
            .iter()
            .take(3)
            .enumerate()
            .filter(|(_, c)| **c != 0.0)
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or(1),
        Some(other) => {
            log::warn!("invalid linear axis {:?}, using y", other);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_along_y() {
        let ev = ExpressionEvaluator::new();
        let def = LinearDistribution {
            axis: Some(AxisSpec::Name("y".into())),
            start: Some(1.0.into()),
            step: Some(2.0.into()),
        };
        let points = linear(&def, 3, &Context::new(), &ev);
        assert_eq!(
            points,
            vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 5.0, 0.0)]
        );
    }

    #[test]
    fn test_linear_axis_forms() {
        assert_eq!(axis_index(Some(&AxisSpec::Index(2))), 2);
        assert_eq!(axis_index(Some(&AxisSpec::Vector(vec![1.0, 0.0, 0.0]))), 0);
        assert_eq!(axis_index(Some(&AxisSpec::Name("Z".into()))), 2);
        assert_eq!(axis_index(Some(&AxisSpec::Index(7))), 1);
        assert_eq!(axis_index(None), 1);
    }

    #[test]
    fn test_linear_step_from_context() {
        let ev = ExpressionEvaluator::new();
        let ctx = Context::new().with("gap", 0.5);
        let def = LinearDistribution {
            axis: Some(AxisSpec::Name("x".into())),
            start: None,
            step: Some("$gap * 2".into()),
        };
        let points = linear(&def, 2, &ctx, &ev);
        assert_eq!(points[1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_radial_circle() {
        let ev = ExpressionEvaluator::new();
        let def = RadialDistribution {
            radius: Some(2.0.into()),
            start_angle: Some(0.0.into()),
            y: None,
        };
        let points = radial(&def, 4, &Context::new(), &ev);
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[0], Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(points[1], Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
        for p in &points {
            assert_relative_eq!(p.norm(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_radial_zero_count() {
        let ev = ExpressionEvaluator::new();
        assert!(radial(&RadialDistribution::default(), 0, &Context::new(), &ev).is_empty());
    }

    #[test]
    fn test_grid_truncates_to_count() {
        let ev = ExpressionEvaluator::new();
        let ctx = Context::new().with("w", 2.0);
        let def = GridDistribution {
            positions: vec![
                vec!["-$w/2".into(), 0.0.into(), 0.0.into()],
                vec!["$w/2".into(), 0.0.into(), 0.0.into()],
                vec![9.0.into(), 9.0.into(), 9.0.into()],
            ],
        };
        let points = grid(&def, 2, &ctx, &ev);
        assert_eq!(points, vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_unknown_kind_has_no_generator() {
        let ev = ExpressionEvaluator::new();
        assert!(generate(&Distribution::Unknown, 3, &Context::new(), &ev).is_none());
    }
}
