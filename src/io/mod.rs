// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - schema loading

mod importer;
mod loader;

pub use importer::import_schema_file;
pub use loader::{parse_schema, parse_schema_with};
