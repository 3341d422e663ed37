// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Schema file importer

use crate::config::SessionConfig;
use crate::schema::Schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a schema file and parse it
pub fn import_schema_file(path: impl AsRef<Path>, config: &SessionConfig) -> Result<Schema> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

    super::parse_schema_with(&source, config)
        .with_context(|| format!("Failed to parse schema file: {}", path.display()))
}
