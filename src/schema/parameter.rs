// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parameter value access and edits

use super::{ExprSource, Parameter, ParameterDefinition, ParameterKind};
use crate::error::SchemaError;
use crate::expr::Value;

impl Parameter {
    /// Literal current value, if the parameter is not a formula
    pub fn literal(&self) -> Option<Value> {
        match self {
            Parameter::Defined(def) => Some(def.value.clone()),
            Parameter::Bare(ExprSource::Number(n)) => Some(Value::Number(*n)),
            Parameter::Bare(ExprSource::Bool(b)) => Some(Value::Bool(*b)),
            Parameter::Bare(ExprSource::Text(_)) => None,
        }
    }

    pub fn definition(&self) -> Option<&ParameterDefinition> {
        match self {
            Parameter::Defined(def) => Some(def),
            Parameter::Bare(_) => None,
        }
    }

    /// Replace the current value after checking it against the definition.
    ///
    /// Numbers are clamped to `[min, max]` and integers rounded; enum values
    /// must be one of the declared options. Returns the value actually stored.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<Value, SchemaError> {
        if matches!(self, Parameter::Bare(_)) {
            *self = Parameter::Bare(match &value {
                Value::Number(n) => ExprSource::Number(*n),
                Value::Bool(b) => ExprSource::Bool(*b),
                other => ExprSource::Text(format!("{:?}", other.to_string())),
            });
            return Ok(value);
        }
        let Parameter::Defined(def) = self else {
            return Ok(value);
        };

        let invalid = |reason: String| SchemaError::InvalidParameterValue {
            name: name.to_string(),
            reason,
        };

        let stored = match def.kind {
            ParameterKind::Number | ParameterKind::Integer => {
                let Value::Number(mut n) = value else {
                    return Err(invalid(format!("expected a number, got {}", value.type_name())));
                };
                if !n.is_finite() {
                    return Err(invalid("value is not finite".into()));
                }
                if def.kind == ParameterKind::Integer {
                    n = n.round();
                }
                if let Some(min) = def.min {
                    n = n.max(min);
                }
                if let Some(max) = def.max {
                    n = n.min(max);
                }
                Value::Number(n)
            }
            ParameterKind::Enum => {
                let Value::Str(ref option) = value else {
                    return Err(invalid(format!("expected an option name, got {}", value.type_name())));
                };
                if !def.options.is_empty() && !def.options.contains(option) {
                    return Err(invalid(format!(
                        "'{}' is not one of [{}]",
                        option,
                        def.options.join(", ")
                    )));
                }
                value
            }
            ParameterKind::Boolean => match value {
                Value::Bool(_) => value,
                other => {
                    return Err(invalid(format!("expected a boolean, got {}", other.type_name())))
                }
            },
            ParameterKind::Other => value,
        };

        def.value = stored.clone();
        Ok(stored)
    }
}
