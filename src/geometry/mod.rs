// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, primitives and the factory seams used by the
//! scene builder

mod bbox;
mod factory;
mod material;
mod mesh;
mod primitives;

pub use bbox::BoundingBox;
pub use factory::{GeometryFactory, GeometryHandle, MeshFactory};
pub use material::{
    parse_color, Material, MaterialCache, MaterialHandle, MaterialLibrary, DEFAULT_COLOR,
    DEFAULT_METALNESS, DEFAULT_ROUGHNESS,
};
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::Primitive;
