// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Session configuration

use crate::expr::ExpressionEvaluator;
use crate::schema::{ColorSpec, MaterialDefinition, SCHEMA_VERSION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "paramscene.toml";

/// Settings for a scene session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Memoize formula results between regenerations
    pub memoize: bool,
    /// Upper bound on instances produced by a single repeat node
    pub max_repeat_count: usize,
    /// Schema version accepted without a warning
    pub expected_version: String,
    /// Reject schemas whose version differs instead of warning
    pub strict_version: bool,
    /// Material used when a geometry references an undefined material
    pub default_material: MaterialDefinition,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            max_repeat_count: 10_000,
            expected_version: SCHEMA_VERSION.to_string(),
            strict_version: false,
            default_material: MaterialDefinition {
                kind: Some("standard".into()),
                color: Some(ColorSpec::Text("#ffffff".into())),
                roughness: Some(0.5),
                metalness: Some(0.0),
                opacity: None,
            },
        }
    }
}

impl SessionConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SessionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `PARAMSCENE_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(max) = std::env::var("PARAMSCENE_MAX_REPEAT") {
            if let Ok(max) = max.parse() {
                self.max_repeat_count = max;
            }
        }

        if let Ok(strict) = std::env::var("PARAMSCENE_STRICT_VERSION") {
            self.strict_version = strict.parse().unwrap_or(self.strict_version);
        }

        if let Ok(memoize) = std::env::var("PARAMSCENE_MEMOIZE") {
            self.memoize = memoize.parse().unwrap_or(self.memoize);
        }

        self
    }

    /// A fresh evaluator honouring this session's memoization setting
    pub fn evaluator(&self) -> ExpressionEvaluator {
        let mut evaluator = ExpressionEvaluator::new();
        evaluator.set_memoize(self.memoize);
        evaluator
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
