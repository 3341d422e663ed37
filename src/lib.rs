// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Paramscene
//!
//! Declarative parametric scene interpreter. A JSON schema describes objects
//! as parameterised templates whose dimensions and placements are formulas;
//! the interpreter expands them into a positioned scene graph and rebuilds
//! single templates when one of their parameters changes.

pub mod cli;
pub mod config;
pub mod constraints;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod io;
pub mod scene;
pub mod schema;
pub mod template;
pub mod utils;

pub use config::SessionConfig;
pub use constraints::{ConstraintValidator, Violation};
pub use error::{EvalError, SchemaError};
pub use expr::{Context, ExpressionEvaluator, Value};
pub use geometry::{GeometryFactory, MaterialCache, MaterialLibrary, Mesh, MeshFactory};
pub use io::{import_schema_file, parse_schema};
pub use scene::{Scene, SceneBuilder};
pub use schema::{Schema, SCHEMA_VERSION};
pub use template::{ExpandedNode, TemplateProcessor};

use anyhow::Result;
use std::path::Path;

/// Parse a schema document and build it with the default factories
pub fn build_scene(json: &str) -> Result<Scene> {
    let schema = parse_schema(json)?;
    Ok(Scene::build(&schema))
}

/// Load a schema file and build it with `config`
pub fn build_scene_file(path: impl AsRef<Path>, config: &SessionConfig) -> Result<Scene> {
    let schema = import_schema_file(path, config)?;
    Ok(SceneBuilder::new().config(config.clone()).build(&schema))
}
