// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation context: ordered name -> value bindings

use super::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Bindings visible to a formula at one point of an expansion.
///
/// Later bindings shadow earlier ones with the same name while keeping the
/// original declaration slot, so layering a child scope on a parent scope is
/// just a clone followed by inserts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    bindings: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings.iter()
    }

    /// Canonical serialization used as the memo-cache key.
    ///
    /// Entries are sorted by name and every value carries a type tag, so two
    /// contexts map to the same key exactly when they bind the same values.
    pub fn fingerprint(&self) -> String {
        let mut entries: Vec<(&String, &Value)> = self.bindings.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut key = String::with_capacity(entries.len() * 12);
        for (name, value) in entries {
            key.push_str(name);
            key.push('=');
            write_tagged(&mut key, value);
            key.push(';');
        }
        key
    }
}

fn write_tagged(out: &mut String, value: &Value) {
    match value {
        Value::Number(n) => {
            let _ = write!(out, "n{:?}", n);
        }
        Value::Bool(b) => {
            let _ = write!(out, "b{}", b);
        }
        Value::Str(s) => {
            let _ = write!(out, "s{:?}", s);
        }
        Value::List(items) => {
            out.push('[');
            for item in items {
                write_tagged(out, item);
                out.push(',');
            }
            out.push(']');
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = Context::new().with("w", 1.0).with("h", 2.0);
        let b = Context::new().with("h", 2.0).with("w", 1.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_types() {
        let number = Context::new().with("x", 1.0);
        let text = Context::new().with("x", "1");
        let flag = Context::new().with("x", true);
        assert_ne!(number.fingerprint(), text.fingerprint());
        assert_ne!(number.fingerprint(), flag.fingerprint());
    }

    #[test]
    fn test_shadowing_keeps_latest_value() {
        let ctx = Context::new().with("x", 1.0).with("x", 5.0);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("x"), Some(&Value::Number(5.0)));
    }
}
