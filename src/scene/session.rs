// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene session: build and incremental regeneration

use super::graph::{Leaf, ObjectId, ObjectKind, SceneGraph, SceneObject, Transform};
use crate::config::SessionConfig;
use crate::constraints::{ConstraintValidator, Violation};
use crate::error::SchemaError;
use crate::expr::{Context, ExpressionEvaluator, Value};
use crate::geometry::{BoundingBox, GeometryFactory, MaterialCache, MeshFactory, MaterialLibrary};
use crate::schema::{MaterialDefinition, ParametricTemplate, Schema};
use crate::template::{evaluate_transform, ExpandedGeometry, ExpandedNode, TemplateProcessor};
use ahash::AHashSet;
use indexmap::IndexMap;
use nalgebra::Matrix4;

/// Key of the material used for unresolved references
pub const DEFAULT_MATERIAL: &str = "default";

/// A registered unit of regeneration
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub container: ObjectId,
    pub template: ParametricTemplate,
    /// Context inherited from the enclosing template; empty at top level
    pub parent_context: Context,
}

/// A built scene plus everything needed to regenerate parts of it.
///
/// Templates and leaves are registered under dot-joined id paths such as
/// `chair.legs_0.leg`.
pub struct Scene<G: GeometryFactory = MeshFactory, M: MaterialCache = MaterialLibrary> {
    pub(super) evaluator: ExpressionEvaluator,
    pub(super) geometry: G,
    pub(super) materials: M,
    pub(super) material_defs: IndexMap<String, MaterialDefinition>,
    pub(super) config: SessionConfig,
    pub(super) graph: SceneGraph,
    pub(super) templates: IndexMap<String, TemplateEntry>,
    pub(super) leaves: IndexMap<String, ObjectId>,
    pub(super) violations: IndexMap<String, Vec<Violation>>,
    /// Edited parameter values by template path, re-applied whenever the
    /// template is rebuilt from its enclosing definition
    pub(super) overrides: IndexMap<String, IndexMap<String, Value>>,
}

impl Scene {
    /// Build with the default factories and configuration
    pub fn build(schema: &Schema) -> Scene {
        super::SceneBuilder::new().build(schema)
    }
}

impl<G: GeometryFactory, M: MaterialCache> Scene<G, M> {
    pub(super) fn populate(&mut self, schema: &Schema) {
        let root = self.graph.root();
        let empty = Context::new();
        for template in &schema.children {
            self.build_template(template, root, "", &empty);
        }
        log::info!(
            "built scene: {} template(s), {} leaf object(s)",
            self.templates.len(),
            self.leaves.len()
        );
    }

    /// Rebuild the template registered at `path`.
    ///
    /// Returns `false`, doing nothing, when no template is registered there.
    /// The container keeps its transform and registry key; everything under
    /// it is released and built again from the template's current parameters.
    pub fn regenerate(&mut self, path: &str) -> bool {
        let Some(entry) = self.templates.get(path) else {
            log::debug!("regenerate: no template at '{}'", path);
            return false;
        };
        let container = entry.container;

        self.evaluator.clear_cache();
        self.release_children(container);
        self.expand_template(path);

        log::debug!(
            "regenerated '{}': {} leaf object(s) in scene",
            path,
            self.leaves.len()
        );
        true
    }

    /// Validate and store a new parameter value, then regenerate its template.
    ///
    /// Returns the template's constraint violations after regeneration.
    pub fn set_parameter(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&[Violation], SchemaError> {
        let entry = self
            .templates
            .get_mut(path)
            .ok_or_else(|| SchemaError::UnknownTemplate(path.to_string()))?;
        let parameter = entry.template.parameters.get_mut(name).ok_or_else(|| {
            SchemaError::UnknownParameter {
                template: path.to_string(),
                name: name.to_string(),
            }
        })?;

        let stored = parameter.set_value(name, value.into())?;
        log::debug!("set {}.{} = {}", path, name, stored);
        self.overrides
            .entry(path.to_string())
            .or_default()
            .insert(name.to_string(), stored);

        self.regenerate(path);
        Ok(self.violations(path))
    }

    /// Current literal value of a template parameter
    pub fn parameter(&self, path: &str, name: &str) -> Option<Value> {
        self.templates
            .get(path)?
            .template
            .parameters
            .get(name)?
            .literal()
    }

    pub fn violations(&self, path: &str) -> &[Violation] {
        self.violations.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Violations of every template, keyed by path
    pub fn all_violations(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.violations
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(path, v)| (path.as_str(), v.as_slice()))
    }

    pub fn template(&self, path: &str) -> Option<&TemplateEntry> {
        self.templates.get(path)
    }

    pub fn template_paths(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn leaf(&self, path: &str) -> Option<&SceneObject> {
        self.graph.get(*self.leaves.get(path)?)
    }

    pub fn leaf_paths(&self) -> impl Iterator<Item = &str> {
        self.leaves.keys().map(String::as_str)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Objects in the graph, excluding the root
    pub fn object_count(&self) -> usize {
        self.graph.len() - 1
    }

    /// World transform of the leaf or template container at `path`
    pub fn world_transform(&self, path: &str) -> Option<Matrix4<f64>> {
        let id = self
            .leaves
            .get(path)
            .copied()
            .or_else(|| self.templates.get(path).map(|e| e.container))?;
        self.graph.world_matrix(id)
    }

    /// World-space bounds of every leaf the geometry factory can measure
    pub fn bounding_box(&self) -> BoundingBox {
        self.leaves
            .values()
            .filter_map(|&id| {
                let leaf = self.graph.get(id)?.leaf()?;
                let local = self.geometry.local_bounds(leaf.geometry_handle)?;
                Some(local.transformed(&self.graph.world_matrix(id)?))
            })
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn evaluator(&self) -> &ExpressionEvaluator {
        &self.evaluator
    }

    pub fn geometry_factory(&self) -> &G {
        &self.geometry
    }

    pub fn material_cache(&self) -> &M {
        &self.materials
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn build_template(
        &mut self,
        template: &ParametricTemplate,
        parent: ObjectId,
        prefix: &str,
        parent_context: &Context,
    ) {
        let path = join_path(prefix, &template.id);
        let transform = evaluate_transform(&self.evaluator, &template.transform, parent_context);

        let mut template = template.clone();
        if let Some(edits) = self.overrides.get(&path) {
            for (name, value) in edits {
                let applied = template
                    .parameters
                    .get_mut(name)
                    .map(|p| p.set_value(name, value.clone()));
                if let Some(Err(err)) = applied {
                    log::warn!("dropping edit of {}.{}: {}", path, name, err);
                }
            }
        }

        let container = self.graph.insert(
            parent,
            path.clone(),
            Transform::from(&transform),
            ObjectKind::Container,
        );

        self.templates.insert(
            path.clone(),
            TemplateEntry {
                container,
                template,
                parent_context: parent_context.clone(),
            },
        );
        self.expand_template(&path);
    }

    /// Validate, expand and build the registered template at `path` under
    /// its container
    fn expand_template(&mut self, path: &str) {
        let Some(entry) = self.templates.get(path) else {
            return;
        };
        let container = entry.container;

        let violations = ConstraintValidator::new(&self.evaluator).validate_constraints(&entry.template);
        for v in &violations {
            log::debug!("{}: {}", path, v);
        }
        let nodes = TemplateProcessor::new(&self.evaluator)
            .with_max_repeat_count(self.config.max_repeat_count)
            .process_template(&entry.template, &entry.parent_context);

        self.violations.insert(path.to_string(), violations);
        for node in &nodes {
            self.build_node(node, container, path);
        }
    }

    fn build_node(&mut self, node: &ExpandedNode, parent: ObjectId, prefix: &str) {
        match node {
            ExpandedNode::Group(group) => {
                let id = group.id.as_deref().or(group.name.as_deref()).unwrap_or("group");
                let path = join_path(prefix, id);
                let object = self.graph.insert(
                    parent,
                    path.clone(),
                    Transform::from(&group.transform),
                    ObjectKind::Group,
                );
                for child in &group.children {
                    self.build_node(child, object, &path);
                }
            }
            ExpandedNode::Template(nested) => {
                self.build_template(&nested.template, parent, prefix, &nested.context);
            }
            ExpandedNode::Geometry(geometry) => self.build_leaf(geometry, parent, prefix),
        }
    }

    fn build_leaf(&mut self, node: &ExpandedGeometry, parent: ObjectId, prefix: &str) {
        let id = node
            .id
            .as_deref()
            .or(node.name.as_deref())
            .unwrap_or(node.geometry.as_str());
        let path = join_path(prefix, id);

        if !node.geometry.is_known() {
            log::warn!("no geometry for kind '{}' at '{}', skipping", node.geometry.as_str(), path);
            return;
        }
        let Some(geometry_handle) = self.geometry.create(&node.geometry, &node.dimensions) else {
            log::warn!("geometry factory rejected '{}' at '{}'", node.geometry.as_str(), path);
            return;
        };

        let (material, definition) = self.resolve_material(node.material.as_deref(), &path);
        let material_handle = self.materials.get_or_create(&material, &definition);

        let object = self.graph.insert(
            parent,
            path.clone(),
            Transform::from(&node.transform),
            ObjectKind::Leaf(Leaf {
                geometry: node.geometry.clone(),
                dimensions: node.dimensions.clone(),
                geometry_handle,
                material,
                material_handle,
            }),
        );
        self.leaves.insert(path, object);
    }

    /// Material name and definition for a reference; unknown or missing
    /// references resolve to the default material
    fn resolve_material(&self, name: Option<&str>, path: &str) -> (String, MaterialDefinition) {
        if let Some(name) = name {
            if let Some(def) = self.material_defs.get(name) {
                return (name.to_string(), def.clone());
            }
            log::warn!("material '{}' used by '{}' is not defined, using default", name, path);
        }

        let def = self
            .material_defs
            .get(DEFAULT_MATERIAL)
            .cloned()
            .unwrap_or_else(|| self.config.default_material.clone());
        (DEFAULT_MATERIAL.to_string(), def)
    }

    /// Release everything below `container` and drop stale registry entries
    fn release_children(&mut self, container: ObjectId) {
        let removed = self.graph.clear_children(container);
        let mut ids = AHashSet::with_capacity(removed.len());

        for (id, object) in removed {
            if let ObjectKind::Leaf(leaf) = object.kind {
                self.geometry.release(leaf.geometry_handle);
                self.materials.release(leaf.material_handle);
            }
            ids.insert(id);
        }

        self.leaves.retain(|_, id| !ids.contains(id));
        self.templates.retain(|_, entry| !ids.contains(&entry.container));
        let templates = &self.templates;
        self.violations.retain(|path, _| templates.contains_key(path));
    }
}

fn join_path(prefix: &str, id: &str) -> String {
    if prefix.is_empty() {
        id.to_string()
    } else {
        format!("{}.{}", prefix, id)
    }
}
