// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene session builder

use super::graph::SceneGraph;
use super::Scene;
use crate::config::SessionConfig;
use crate::expr::ExpressionEvaluator;
use crate::geometry::{GeometryFactory, MaterialCache, MaterialLibrary, MeshFactory};
use crate::schema::Schema;
use indexmap::IndexMap;

/// Assembles a [`Scene`] with swappable factories
///
/// ```ignore
/// let scene = SceneBuilder::new()
///     .config(SessionConfig::load()?)
///     .geometry_factory(MeshFactory::new())
///     .build(&schema);
/// ```
pub struct SceneBuilder<G = MeshFactory, M = MaterialLibrary> {
    config: SessionConfig,
    evaluator: Option<ExpressionEvaluator>,
    geometry: G,
    materials: M,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            evaluator: None,
            geometry: MeshFactory::new(),
            materials: MaterialLibrary::new(),
        }
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GeometryFactory, M: MaterialCache> SceneBuilder<G, M> {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a preconfigured evaluator, e.g. one with extra functions
    pub fn evaluator(mut self, evaluator: ExpressionEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn geometry_factory<G2: GeometryFactory>(self, geometry: G2) -> SceneBuilder<G2, M> {
        SceneBuilder {
            config: self.config,
            evaluator: self.evaluator,
            geometry,
            materials: self.materials,
        }
    }

    pub fn material_cache<M2: MaterialCache>(self, materials: M2) -> SceneBuilder<G, M2> {
        SceneBuilder {
            config: self.config,
            evaluator: self.evaluator,
            geometry: self.geometry,
            materials,
        }
    }

    /// Build every top-level template of `schema`
    pub fn build(self, schema: &Schema) -> Scene<G, M> {
        let mut evaluator = self.evaluator.unwrap_or_else(|| self.config.evaluator());
        evaluator.set_memoize(self.config.memoize);

        let mut scene = Scene {
            evaluator,
            geometry: self.geometry,
            materials: self.materials,
            material_defs: schema.materials.clone(),
            config: self.config,
            graph: SceneGraph::new(),
            templates: IndexMap::new(),
            leaves: IndexMap::new(),
            violations: IndexMap::new(),
            overrides: IndexMap::new(),
        };
        scene.populate(schema);
        scene
    }
}
