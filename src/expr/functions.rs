// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Built-in function set and named constants

use super::Value;
use crate::error::EvalError;
use crate::utils::math;
use ahash::AHashMap;
use std::sync::Arc;

/// Signature of a formula function. Arguments arrive fully evaluated.
pub type NativeFunction = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Named numeric constants, resolved before context bindings
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

/// Registry of callable functions
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, NativeFunction>,
}

impl FunctionRegistry {
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Registry holding the standard function set
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.unary("sin", f64::sin);
        registry.unary("cos", f64::cos);
        registry.unary("tan", f64::tan);
        registry.unary("asin", f64::asin);
        registry.unary("acos", f64::acos);
        registry.unary("atan", f64::atan);
        registry.unary("abs", f64::abs);
        registry.unary("sqrt", f64::sqrt);
        registry.unary("floor", f64::floor);
        registry.unary("ceil", f64::ceil);
        registry.unary("round", math::round_half_up);

        registry.binary("pow", f64::powf);
        registry.binary("atan2", f64::atan2);
        registry.binary("mod", math::positive_mod);

        registry.register("min", |args| {
            Ok(Value::Number(
                args.iter().map(Value::as_number).fold(f64::INFINITY, f64::min),
            ))
        });
        registry.register("max", |args| {
            Ok(Value::Number(
                args.iter().map(Value::as_number).fold(f64::NEG_INFINITY, f64::max),
            ))
        });
        registry.register("clamp", |args| {
            let [v, lo, hi] = numbers::<3>("clamp", args)?;
            Ok(Value::Number(math::clamp(v, lo, hi)))
        });
        registry.register("lerp", |args| {
            let [a, b, t] = numbers::<3>("lerp", args)?;
            Ok(Value::Number(math::lerp(a, b, t)))
        });
        registry.register("hsv_to_hex", |args| {
            let [h, s, v] = numbers::<3>("hsv_to_hex", args)?;
            Ok(Value::Str(math::hsv_to_hex(h, s, v)))
        });
        registry.register("alternating", |args| {
            let (index, values) = args.split_first().ok_or_else(|| arity("alternating", "at least 2", 0))?;
            if values.is_empty() {
                return Err(arity("alternating", "at least 2", args.len()));
            }
            Ok(values[math::wrap_index(index.as_number(), values.len())].clone())
        });
        registry.register("nth", |args| {
            if args.len() != 2 {
                return Err(arity("nth", "2", args.len()));
            }
            match &args[0] {
                Value::List(items) if items.is_empty() => Ok(Value::zero()),
                Value::List(items) => Ok(items[math::wrap_index(args[1].as_number(), items.len())].clone()),
                other => Ok(other.clone()),
            }
        });

        registry
    }

    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let function = self
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        function(args)
    }

    fn unary(&mut self, name: &'static str, f: fn(f64) -> f64) {
        self.register(name, move |args| {
            let [x] = numbers::<1>(name, args)?;
            Ok(Value::Number(f(x)))
        });
    }

    fn binary(&mut self, name: &'static str, f: fn(f64, f64) -> f64) {
        self.register(name, move |args| {
            let [a, b] = numbers::<2>(name, args)?;
            Ok(Value::Number(f(a, b)))
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn numbers<const N: usize>(name: &str, args: &[Value]) -> Result<[f64; N], EvalError> {
    if args.len() != N {
        return Err(arity(name, &N.to_string(), args.len()));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.as_number();
    }
    Ok(out)
}

fn arity(name: &str, expected: &str, got: usize) -> EvalError {
    EvalError::Arity {
        name: name.to_string(),
        expected: expected.to_string(),
        got,
    }
}
