// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use thiserror::Error;

/// Errors raised while parsing or evaluating a formula.
///
/// These never escape [`ExpressionEvaluator::evaluate`](crate::expr::ExpressionEvaluator::evaluate),
/// which logs them and falls back to `0`. They are surfaced through
/// `try_evaluate` for callers that report them, such as the constraint validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unsafe characters in expression: {0:?}")]
    UnsafeCharacters(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("type error: {0}")]
    Type(String),
}

/// Errors raised while loading a schema or editing a built scene.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version '{found}' (expected '{expected}')")]
    UnsupportedVersion { found: String, expected: String },

    #[error("no parametric template registered at '{0}'")]
    UnknownTemplate(String),

    #[error("template '{template}' has no parameter '{name}'")]
    UnknownParameter { template: String, name: String },

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParameterValue { name: String, reason: String },
}
