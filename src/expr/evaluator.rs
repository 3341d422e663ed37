// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Expression evaluator with parse and result caching

use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::functions::{self, FunctionRegistry};
use super::parser::{check_characters, parse_formula};
use super::{Context, Value};
use crate::error::EvalError;
use crate::schema::ExprSource;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Evaluates formulas against a [`Context`].
///
/// Two caches are kept:
/// - parsed ASTs keyed by formula text, kept for the evaluator's lifetime;
/// - results keyed by (formula text, context fingerprint), dropped in bulk by
///   [`clear_cache`](Self::clear_cache).
pub struct ExpressionEvaluator {
    functions: FunctionRegistry,
    parsed: DashMap<String, Result<Arc<Expr>, EvalError>>,
    results: DashMap<(String, String), Result<Value, EvalError>>,
    memoize: bool,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::builtin())
    }

    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self {
            functions,
            parsed: DashMap::new(),
            results: DashMap::new(),
            memoize: true,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Enable or disable result memoization
    pub fn set_memoize(&mut self, memoize: bool) {
        self.memoize = memoize;
        if !memoize {
            self.results.clear();
        }
    }

    /// Register an extra function callable from formulas
    pub fn register_function<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.register(name, f);
        self.results.clear();
    }

    /// Evaluate a literal or formula. Never fails: errors are logged and
    /// yield `0`.
    pub fn evaluate(&self, source: &ExprSource, ctx: &Context) -> Value {
        match source {
            ExprSource::Number(n) => Value::Number(*n),
            ExprSource::Bool(b) => Value::Bool(*b),
            ExprSource::Text(text) => self.evaluate_str(text, ctx),
        }
    }

    /// Evaluate to a number, mapping non-finite results to zero
    pub fn evaluate_number(&self, source: &ExprSource, ctx: &Context) -> f64 {
        self.evaluate(source, ctx).as_finite()
    }

    pub fn evaluate_str(&self, expression: &str, ctx: &Context) -> Value {
        match self.try_evaluate(expression, ctx) {
            Ok(value) => {
                log::debug!("[eval] '{}' -> {}", expression, value);
                value
            }
            Err(err) => {
                log::warn!("[eval] \"{}\" failed: {}", expression, err);
                Value::zero()
            }
        }
    }

    /// Evaluate a formula, returning the error instead of the zero fallback
    pub fn try_evaluate(&self, expression: &str, ctx: &Context) -> Result<Value, EvalError> {
        if !self.memoize {
            return self.compute(expression, ctx);
        }

        let key = (expression.to_string(), ctx.fingerprint());
        if let Some(cached) = self.results.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = self.compute(expression, ctx);
        self.results.insert(key, result.clone());
        result
    }

    /// Drop every memoized result. Parsed formulas are kept.
    pub fn clear_cache(&self) {
        self.results.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cached_results: self.results.len(),
            parsed_formulas: self.parsed.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn compute(&self, expression: &str, ctx: &Context) -> Result<Value, EvalError> {
        let ast = self.compile(expression)?;
        self.eval(&ast, ctx)
    }

    fn compile(&self, expression: &str) -> Result<Arc<Expr>, EvalError> {
        if let Some(parsed) = self.parsed.get(expression) {
            return parsed.clone();
        }

        let parsed = check_characters(expression)
            .and_then(|_| parse_formula(expression))
            .map(Arc::new);
        self.parsed.insert(expression.to_string(), parsed.clone());
        parsed
    }

    fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Variable(name) => Ok(ctx.get(name).cloned().unwrap_or_else(Value::zero)),

            Expr::Identifier(name) => {
                if let Some(c) = functions::constant(name) {
                    return Ok(Value::Number(c));
                }
                match ctx.get(name) {
                    Some(Value::Number(n)) => Ok(Value::Number(*n)),
                    _ => Err(EvalError::UnknownIdentifier(name.clone())),
                }
            }

            Expr::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.eval(item, ctx))
                    .collect::<Result<Vec<_>, _>>()?,
            )),

            Expr::Unary(op, inner) => {
                let value = self.eval(inner, ctx)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-value.as_number()),
                    UnaryOp::Plus => Value::Number(value.as_number()),
                })
            }

            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs, ctx)?;
                let rhs = self.eval(rhs, ctx)?;
                binary(*op, &lhs, &rhs)
            }

            Expr::Logical(op, lhs, rhs) => {
                let lhs = self.eval(lhs, ctx)?;
                match (op, lhs.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(lhs),
                    _ => self.eval(rhs, ctx),
                }
            }

            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition, ctx)?.is_truthy() {
                    self.eval(then, ctx)
                } else {
                    self.eval(otherwise, ctx)
                }
            }

            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                self.functions.call(name, &args)
            }
        }
    }
}

impl Default for ExpressionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let (a, b) = (lhs.as_number(), rhs.as_number());

    Ok(match op {
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{}{}", lhs, rhs)),
            _ => Value::Number(a + b),
        },
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Rem => Value::Number(a % b),
        BinaryOp::Eq => Value::Bool(loose_eq(lhs, rhs)),
        BinaryOp::Ne => Value::Bool(!loose_eq(lhs, rhs)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::Str(x), Value::Str(y)) => x.partial_cmp(y),
                (Value::List(_), _) | (_, Value::List(_)) => {
                    return Err(EvalError::Type("cannot order lists".into()))
                }
                _ => a.partial_cmp(&b),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    })
}

/// Strings compare as text, numbers and booleans numerically, anything else
/// is unequal.
fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => a == b,
        (a, b) if a.is_numeric() && b.is_numeric() => a.as_number() == b.as_number(),
        _ => false,
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cached_results: usize,
    pub parsed_formulas: usize,
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f32 / total as f32) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str, ctx: &Context) -> Value {
        ExpressionEvaluator::new().evaluate_str(expr, ctx)
    }

    #[test]
    fn test_literals_pass_through() {
        let ev = ExpressionEvaluator::new();
        let ctx = Context::new().with("x", 9.0);
        assert_eq!(ev.evaluate(&ExprSource::Number(4.5), &ctx), Value::Number(4.5));
        assert_eq!(ev.evaluate(&ExprSource::Bool(true), &ctx), Value::Bool(true));
    }

    #[test]
    fn test_missing_variable_is_zero() {
        assert_eq!(eval("$missing", &Context::new()), Value::Number(0.0));
        assert_eq!(eval("$missing + 2", &Context::new()), Value::Number(2.0));
    }

    #[test]
    fn test_arithmetic_precedence() {
        let ctx = Context::new().with("w", 4.0).with("h", 2.0);
        assert_eq!(eval("$w + $h * 3", &ctx), Value::Number(10.0));
        assert_eq!(eval("($w + $h) * 3", &ctx), Value::Number(18.0));
        assert_eq!(eval("-$w/2", &ctx), Value::Number(-2.0));
        assert_eq!(eval("7 % 4", &ctx), Value::Number(3.0));
    }

    #[test]
    fn test_comparison_and_logic() {
        let ctx = Context::new().with("w", 5.0).with("h", 1.0);
        assert_eq!(eval("$w / $h <= 3", &ctx), Value::Bool(false));
        assert_eq!(eval("$w > 1 && $h > 0", &ctx), Value::Bool(true));
        assert_eq!(eval("!($w > 1) || $h == 1", &ctx), Value::Bool(true));
    }

    #[test]
    fn test_string_equality() {
        let ctx = Context::new().with("style", "industrial");
        assert_eq!(eval("$style == \"industrial\"", &ctx), Value::Bool(true));
        assert_eq!(eval("$style != 'modern'", &ctx), Value::Bool(true));
        assert_eq!(
            eval("if($style == \"industrial\", 0.08, 0.05)", &ctx),
            Value::Number(0.08)
        );
    }

    #[test]
    fn test_bare_identifiers() {
        let ctx = Context::new().with("index", 3.0).with("label", "x");
        assert_eq!(eval("index * 2", &ctx), Value::Number(6.0));
        assert_eq!(eval("pi", &ctx), Value::Number(std::f64::consts::PI));
        // only numeric bindings resolve without `$`
        assert_eq!(eval("label", &ctx), Value::Number(0.0));
    }

    #[test]
    fn test_failures_fall_back_to_zero() {
        let ctx = Context::new();
        assert_eq!(eval("1 +", &ctx), Value::Number(0.0));
        assert_eq!(eval("unknown_fn(2)", &ctx), Value::Number(0.0));
        assert_eq!(eval("1; 2", &ctx), Value::Number(0.0));
    }

    #[test]
    fn test_try_evaluate_reports_errors() {
        let ev = ExpressionEvaluator::new();
        let err = ev.try_evaluate("2 @ 3", &Context::new()).unwrap_err();
        assert!(matches!(err, EvalError::UnsafeCharacters(_)));
    }

    #[test]
    fn test_string_concatenation() {
        let ctx = Context::new().with("kind", "oak");
        assert_eq!(eval("'wood_' + $kind", &ctx), Value::from("wood_oak"));
    }

    #[test]
    fn test_ternary_syntax() {
        let ctx = Context::new().with("a", 2.0);
        assert_eq!(eval("$a > 1 ? 'big' : 'small'", &ctx), Value::from("big"));
    }

    #[test]
    fn test_results_are_memoized() {
        let ev = ExpressionEvaluator::new();
        let ctx = Context::new().with("x", 2.0);
        ev.evaluate_str("$x * 2", &ctx);
        ev.evaluate_str("$x * 2", &ctx);
        let stats = ev.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.cached_results, 1);

        ev.clear_cache();
        assert_eq!(ev.cache_stats().cached_results, 0);
        assert_eq!(ev.cache_stats().parsed_formulas, 1);
    }

    #[test]
    fn test_context_change_misses_cache() {
        let ev = ExpressionEvaluator::new();
        let a = ev.evaluate_str("$x * 2", &Context::new().with("x", 2.0));
        let b = ev.evaluate_str("$x * 2", &Context::new().with("x", 3.0));
        assert_eq!(a, Value::Number(4.0));
        assert_eq!(b, Value::Number(6.0));
    }
}
