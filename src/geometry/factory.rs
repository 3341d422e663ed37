// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry factory seam used by the scene builder

use super::{BoundingBox, Mesh, Primitive};
use crate::schema::GeometryKind;
use ahash::AHashMap;

/// Opaque handle to a geometry owned by a factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Creates and releases renderable geometry for leaf objects
pub trait GeometryFactory {
    /// Create geometry for `kind`; `None` when the kind is unsupported
    fn create(&mut self, kind: &GeometryKind, dimensions: &[f64]) -> Option<GeometryHandle>;

    fn release(&mut self, handle: GeometryHandle);

    /// Local-space bounds, when the factory can provide them
    fn local_bounds(&self, _handle: GeometryHandle) -> Option<BoundingBox> {
        None
    }
}

/// In-process factory producing triangle meshes
#[derive(Debug, Default)]
pub struct MeshFactory {
    meshes: AHashMap<GeometryHandle, Mesh>,
    next_id: u64,
    created: usize,
}

impl MeshFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: GeometryHandle) -> Option<&Mesh> {
        self.meshes.get(&handle)
    }

    /// Geometries created and not yet released
    pub fn live_geometries(&self) -> usize {
        self.meshes.len()
    }

    /// Geometries created over the factory's lifetime
    pub fn total_created(&self) -> usize {
        self.created
    }

    pub fn total_triangles(&self) -> usize {
        self.meshes.values().map(Mesh::triangle_count).sum()
    }
}

impl GeometryFactory for MeshFactory {
    fn create(&mut self, kind: &GeometryKind, dimensions: &[f64]) -> Option<GeometryHandle> {
        let primitive = Primitive::from_dimensions(kind, dimensions)?;
        let handle = GeometryHandle(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.meshes.insert(handle, primitive.to_mesh());
        Some(handle)
    }

    fn release(&mut self, handle: GeometryHandle) {
        if self.meshes.remove(&handle).is_none() {
            log::debug!("release of unknown geometry {:?}", handle);
        }
    }

    fn local_bounds(&self, handle: GeometryHandle) -> Option<BoundingBox> {
        self.meshes.get(&handle).map(Mesh::bounding_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release() {
        let mut factory = MeshFactory::new();
        let a = factory.create(&GeometryKind::Box, &[1.0, 2.0, 3.0]).unwrap();
        let b = factory.create(&GeometryKind::Sphere, &[1.0]).unwrap();
        assert_ne!(a, b);
        assert_eq!(factory.live_geometries(), 2);

        factory.release(a);
        assert_eq!(factory.live_geometries(), 1);
        assert!(factory.mesh(a).is_none());
        assert!(factory.local_bounds(b).is_some());
        assert_eq!(factory.total_created(), 2);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut factory = MeshFactory::new();
        assert!(factory
            .create(&GeometryKind::Unknown("teapot".into()), &[])
            .is_none());
        assert_eq!(factory.total_created(), 0);
    }

    #[test]
    fn test_formula_sized_torus_stays_bounded() {
        let mut factory = MeshFactory::new();
        let handle = factory
            .create(&GeometryKind::Torus, &[1.0, 0.4, 1e12, 1e12])
            .unwrap();
        assert_eq!(factory.mesh(handle).unwrap().triangle_count(), 512 * 512 * 2);
    }
}
