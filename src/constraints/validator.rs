// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Constraint rule evaluation

use crate::expr::{Context, ExpressionEvaluator};
use crate::schema::{ExprSource, Parameter, ParametricTemplate, Severity};
use serde::Serialize;
use std::fmt;

/// A rule that evaluated falsy or could not be evaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub rule: String,
    pub category: String,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}.{}: {}",
            self.severity.as_str(),
            self.category,
            self.rule,
            self.message
        )
    }
}

/// Checks a template's constraint rules against its own parameter values.
///
/// Rules see only the template's direct parameters: no parent bindings and no
/// derived expressions.
pub struct ConstraintValidator<'a> {
    evaluator: &'a ExpressionEvaluator,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(evaluator: &'a ExpressionEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn validate_constraints(&self, template: &ParametricTemplate) -> Vec<Violation> {
        if template.constraints.is_empty() {
            return Vec::new();
        }

        let ctx = self.parameter_context(template);
        let mut violations = Vec::new();

        for (category, rules) in &template.constraints {
            for (name, rule) in rules {
                let outcome = match &rule.expression {
                    ExprSource::Text(text) => self.evaluator.try_evaluate(text, &ctx),
                    literal => Ok(self.evaluator.evaluate(literal, &ctx)),
                };

                let violation = match outcome {
                    Ok(value) if value.is_truthy() => continue,
                    Ok(_) => Violation {
                        rule: name.clone(),
                        category: category.clone(),
                        message: rule.message.clone().unwrap_or_else(|| name.clone()),
                        severity: rule.severity.unwrap_or(Severity::Warning),
                    },
                    Err(err) => Violation {
                        rule: name.clone(),
                        category: category.clone(),
                        message: err.to_string(),
                        severity: Severity::Error,
                    },
                };

                log::debug!("[constraint] {} '{}': {}", template.id, name, violation.message);
                violations.push(violation);
            }
        }

        violations
    }

    fn parameter_context(&self, template: &ParametricTemplate) -> Context {
        let mut ctx = Context::new();
        for (name, param) in &template.parameters {
            let value = match param {
                Parameter::Defined(def) => def.value.clone(),
                Parameter::Bare(source) => self.evaluator.evaluate(source, &ctx),
            };
            ctx.insert(name.clone(), value);
        }
        ctx
    }
}

/// Highest severity in a violation list
pub fn worst_severity(violations: &[Violation]) -> Option<Severity> {
    violations.iter().map(|v| v.severity).max()
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
