// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Expression language
//!
//! Formulas are short strings such as `"clamp($width * 0.05, 0.02, 0.1)"` or
//! `"if($style == \"industrial\", 0.08, 0.05)"`. They are parsed once into an
//! AST and evaluated against a [`Context`] of resolved bindings.

mod ast;
mod context;
mod evaluator;
pub mod functions;
mod parser;
mod value;

pub use ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
pub use context::Context;
pub use evaluator::{CacheStats, ExpressionEvaluator};
pub use functions::FunctionRegistry;
pub use parser::{parse_formula, MAX_CONDITIONAL_REWRITES};
pub use value::Value;
