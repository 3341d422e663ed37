// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena-backed scene graph
//!
//! Objects live in a slot vector and refer to each other by [`ObjectId`].
//! Removing a subtree frees its slots for reuse.

use crate::geometry::{GeometryHandle, MaterialHandle};
use crate::schema::{GeometryKind, Vec3};
use crate::template::ExpandedTransform;
use nalgebra::{Matrix4, Rotation3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Local transform. Rotation is Euler XYZ in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
        }
    }
}

impl From<&ExpandedTransform> for Transform {
    fn from(t: &ExpandedTransform) -> Self {
        let defaults = Transform::default();
        Self {
            position: t.position.unwrap_or(defaults.position),
            rotation: t.rotation.unwrap_or(defaults.rotation),
            scale: t.scale.unwrap_or(defaults.scale),
        }
    }
}

impl Transform {
    /// `T * Rx * Ry * Rz * S`
    pub fn matrix(&self) -> Matrix4<f64> {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z);

        Matrix4::new_translation(&self.position)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Root,
    /// Transform container of a parametric template
    Container,
    Group,
    Leaf(Leaf),
}

/// Renderable object: geometry plus material
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub geometry: GeometryKind,
    pub dimensions: Vec<f64>,
    pub geometry_handle: GeometryHandle,
    pub material: String,
    pub material_handle: MaterialHandle,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Dot-joined path from the root
    pub name: String,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            ObjectKind::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Option<SceneObject>>,
    free: Vec<usize>,
    root: ObjectId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = SceneObject {
            name: String::new(),
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
            kind: ObjectKind::Root,
        };
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: ObjectId(0),
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Live objects, root included
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.get(id).map(|o| o.children.as_slice()).unwrap_or(&[])
    }

    /// Attach a new object under `parent`
    pub fn insert(
        &mut self,
        parent: ObjectId,
        name: String,
        transform: Transform,
        kind: ObjectKind,
    ) -> ObjectId {
        let object = SceneObject {
            name,
            transform,
            parent: Some(parent),
            children: Vec::new(),
            kind,
        };

        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(object);
                ObjectId(slot)
            }
            None => {
                self.slots.push(Some(object));
                ObjectId(self.slots.len() - 1)
            }
        };

        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Detach and return every descendant of `id`, depth-first.
    /// `id` itself stays in place with no children.
    pub fn clear_children(&mut self, id: ObjectId) -> Vec<(ObjectId, SceneObject)> {
        let children = match self.get_mut(id) {
            Some(object) => std::mem::take(&mut object.children),
            None => return Vec::new(),
        };

        let mut removed = Vec::new();
        let mut stack: Vec<ObjectId> = children.into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            let Some(object) = self.slots.get_mut(next.0).and_then(Option::take) else {
                continue;
            };
            self.free.push(next.0);
            stack.extend(object.children.iter().rev().copied());
            removed.push((next, object));
        }
        removed
    }

    /// Product of local transforms from the root down to `id`
    pub fn world_matrix(&self, id: ObjectId) -> Option<Matrix4<f64>> {
        let mut object = self.get(id)?;
        let mut matrix = object.transform.matrix();
        while let Some(parent) = object.parent {
            object = self.get(parent)?;
            matrix = object.transform.matrix() * matrix;
        }
        Some(matrix)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
