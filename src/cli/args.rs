// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parsing of `name=value` command line assignments

use crate::expr::Value;
use anyhow::{bail, Result};

/// A `template.param=value` edit
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub template: String,
    pub parameter: String,
    pub value: Value,
}

/// Parse `chair.seat_width=0.6`; the template path may itself contain dots
pub fn parse_assignment(text: &str) -> Result<Assignment> {
    let (target, value) = split_binding(text)?;
    let Some((template, parameter)) = target.rsplit_once('.') else {
        bail!("expected TEMPLATE.PARAM=VALUE, got '{}'", text);
    };
    if template.is_empty() || parameter.is_empty() {
        bail!("expected TEMPLATE.PARAM=VALUE, got '{}'", text);
    }
    Ok(Assignment {
        template: template.to_string(),
        parameter: parameter.to_string(),
        value,
    })
}

/// Parse `name=value` into a context binding
pub fn parse_binding(text: &str) -> Result<(String, Value)> {
    let (name, value) = split_binding(text)?;
    Ok((name.to_string(), value))
}

fn split_binding(text: &str) -> Result<(&str, Value)> {
    let Some((name, raw)) = text.split_once('=') else {
        bail!("expected NAME=VALUE, got '{}'", text);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("missing name in '{}'", text);
    }
    Ok((name, parse_literal(raw.trim())))
}

/// Numbers and booleans are typed; anything else stays a string
pub fn parse_literal(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_template_assignment() {
        let a = parse_assignment("room.table.width=1.5").unwrap();
        assert_eq!(a.template, "room.table");
        assert_eq!(a.parameter, "width");
        assert_eq!(a.value, Value::Number(1.5));
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(parse_literal("true"), Value::Bool(true));
        assert_eq!(parse_literal("-2e3"), Value::Number(-2000.0));
        assert_eq!(parse_literal("oak"), Value::from("oak"));
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse_assignment("width=1").is_err());
        assert!(parse_assignment("table.width").is_err());
        assert!(parse_binding("=3").is_err());
    }
}
