// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Primitive mesh generators
//!
//! All primitives are centered on the origin with +Y up. Planes lie in XY
//! facing +Z; tori lie in XY around the Z axis.

use super::{BoundingBox, Mesh, Triangle, Vertex};
use crate::schema::GeometryKind;
use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};

/// Segment counts used when a dimension list leaves them out
pub const CYLINDER_SEGMENTS: u32 = 16;
pub const SPHERE_WIDTH_SEGMENTS: u32 = 16;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 12;
pub const TORUS_RADIAL_SEGMENTS: u32 = 8;
pub const TORUS_TUBULAR_SEGMENTS: u32 = 24;
pub const CONE_SEGMENTS: u32 = 8;

/// Upper bound on any segment count, however it was computed
pub const MAX_SEGMENTS: u32 = 512;

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        segments: u32,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f64,
        height: f64,
    },
    Torus {
        radius: f64,
        tube: f64,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Cone {
        radius: f64,
        height: f64,
        segments: u32,
    },
}

impl Primitive {
    /// Interpret a dimension list for `kind`.
    ///
    /// Missing dimensions take the renderer defaults (unit sizes, torus tube
    /// 0.4). Returns `None` for unknown kinds.
    pub fn from_dimensions(kind: &GeometryKind, dims: &[f64]) -> Option<Self> {
        let dim = |i: usize, default: f64| dims.get(i).copied().unwrap_or(default);
        let segments = |i: usize, default: u32, min: u32| {
            let Some(&raw) = dims.get(i) else {
                return default;
            };
            let rounded = if raw.is_finite() { raw.round().max(0.0) } else { 0.0 };
            if rounded > f64::from(MAX_SEGMENTS) {
                log::warn!(
                    "{} segment count {} exceeds {}, clamping",
                    kind.as_str(),
                    raw,
                    MAX_SEGMENTS
                );
                return MAX_SEGMENTS;
            }
            (rounded as u32).max(min)
        };

        Some(match kind {
            GeometryKind::Box => Primitive::Box {
                width: dim(0, 1.0),
                height: dim(1, 1.0),
                depth: dim(2, 1.0),
            },
            GeometryKind::Cylinder => Primitive::Cylinder {
                radius_top: dim(0, 1.0),
                radius_bottom: dim(1, 1.0),
                height: dim(2, 1.0),
                segments: CYLINDER_SEGMENTS,
            },
            GeometryKind::Sphere => Primitive::Sphere {
                radius: dim(0, 1.0),
                width_segments: SPHERE_WIDTH_SEGMENTS,
                height_segments: SPHERE_HEIGHT_SEGMENTS,
            },
            GeometryKind::Plane => Primitive::Plane {
                width: dim(0, 1.0),
                height: dim(1, 1.0),
            },
            GeometryKind::Torus => Primitive::Torus {
                radius: dim(0, 1.0),
                tube: dim(1, 0.4),
                radial_segments: segments(2, TORUS_RADIAL_SEGMENTS, 2),
                tubular_segments: segments(3, TORUS_TUBULAR_SEGMENTS, 3),
            },
            GeometryKind::Cone => Primitive::Cone {
                radius: dim(0, 1.0),
                height: dim(1, 1.0),
                segments: segments(2, CONE_SEGMENTS, 3),
            },
            GeometryKind::Unknown(_) => return None,
        })
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Primitive::Box {
                width,
                height,
                depth,
            } => box_mesh(Vector3::new(width, height, depth)),
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => cylinder_mesh(radius_top, radius_bottom, height, segments),
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_mesh(radius, width_segments, height_segments),
            Primitive::Plane { width, height } => plane_mesh(width, height),
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus_mesh(radius, tube, radial_segments, tubular_segments),
            Primitive::Cone {
                radius,
                height,
                segments,
            } => cylinder_mesh(0.0, radius, height, segments),
        }
    }

    /// Analytic bounds, independent of tessellation
    pub fn bounds(&self) -> BoundingBox {
        match *self {
            Primitive::Box {
                width,
                height,
                depth,
            } => BoundingBox::centered(Vector3::new(width, height, depth)),
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                ..
            } => {
                let r = radius_top.abs().max(radius_bottom.abs());
                BoundingBox::centered(Vector3::new(2.0 * r, height, 2.0 * r))
            }
            Primitive::Sphere { radius, .. } => {
                BoundingBox::centered(Vector3::repeat(2.0 * radius.abs()))
            }
            Primitive::Plane { width, height } => {
                BoundingBox::centered(Vector3::new(width, height, 0.0))
            }
            Primitive::Torus { radius, tube, .. } => {
                let outer = 2.0 * (radius.abs() + tube.abs());
                BoundingBox::centered(Vector3::new(outer, outer, 2.0 * tube.abs()))
            }
            Primitive::Cone { radius, height, .. } => {
                BoundingBox::centered(Vector3::new(2.0 * radius.abs(), height, 2.0 * radius.abs()))
            }
        }
    }
}

fn box_mesh(size: Vector3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(24, 12);
    let h = size / 2.0;

    // (normal, u axis, v axis) per face; u x v == normal
    let faces = [
        (Vector3::x(), -Vector3::z(), Vector3::y()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::x(), -Vector3::z()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), -Vector3::x(), Vector3::y()),
    ];

    for (normal, u, v) in faces {
        let center = normal.component_mul(&h);
        let u = u.component_mul(&h);
        let v = v.component_mul(&h);
        let corners = [center - u - v, center + u - v, center + u + v, center - u + v];
        let base = mesh.vertex_count();
        for c in corners {
            mesh.add_vertex(Vertex::new(Point3::from(c), normal));
        }
        mesh.add_quad(base, base + 1, base + 2, base + 3);
    }

    mesh
}

fn plane_mesh(width: f64, height: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity(4, 2);
    let (hw, hh) = (width / 2.0, height / 2.0);
    for (x, y) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)] {
        mesh.add_vertex(Vertex::new(Point3::new(x, y, 0.0), Vector3::z()));
    }
    mesh.add_quad(0, 1, 2, 3);
    mesh
}

fn sphere_mesh(radius: f64, width_segments: u32, height_segments: u32) -> Mesh {
    let width_segments = width_segments.clamp(3, MAX_SEGMENTS) as usize;
    let height_segments = height_segments.clamp(2, MAX_SEGMENTS) as usize;
    let mut mesh = Mesh::with_capacity(
        (width_segments + 1) * (height_segments + 1),
        width_segments * height_segments * 2,
    );

    for iy in 0..=height_segments {
        let phi = PI * iy as f64 / height_segments as f64;
        for ix in 0..=width_segments {
            let theta = TAU * ix as f64 / width_segments as f64;
            let normal = Vector3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            mesh.add_vertex(Vertex::new(Point3::from(normal * radius), normal));
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // pole rows collapse to a single triangle
            if iy != 0 {
                mesh.add_triangle(Triangle::new([a, b, d]));
            }
            if iy != height_segments - 1 {
                mesh.add_triangle(Triangle::new([b, c, d]));
            }
        }
    }

    mesh
}

fn cylinder_mesh(radius_top: f64, radius_bottom: f64, height: f64, segments: u32) -> Mesh {
    let segments = segments.clamp(3, MAX_SEGMENTS) as usize;
    let half = height / 2.0;
    let mut mesh = Mesh::with_capacity(segments * 4 + 2, segments * 4);

    // side normals lean with the slope
    let slope = if height != 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };

    let ring = |mesh: &mut Mesh, radius: f64, y: f64| -> Vec<usize> {
        (0..=segments)
            .map(|i| {
                let theta = TAU * i as f64 / segments as f64;
                let (sin, cos) = theta.sin_cos();
                let normal = Vector3::new(sin, slope, cos).normalize();
                mesh.add_vertex(Vertex::new(Point3::new(radius * sin, y, radius * cos), normal))
            })
            .collect()
    };

    let top = ring(&mut mesh, radius_top, half);
    let bottom = ring(&mut mesh, radius_bottom, -half);
    for i in 0..segments {
        mesh.add_quad(bottom[i], bottom[i + 1], top[i + 1], top[i]);
    }

    if radius_top > 0.0 {
        cap(&mut mesh, radius_top, half, segments, true);
    }
    if radius_bottom > 0.0 {
        cap(&mut mesh, radius_bottom, -half, segments, false);
    }

    mesh
}

fn cap(mesh: &mut Mesh, radius: f64, y: f64, segments: usize, top: bool) {
    let normal = if top { Vector3::y() } else { -Vector3::y() };
    let center = mesh.add_vertex(Vertex::new(Point3::new(0.0, y, 0.0), normal));
    let rim: Vec<usize> = (0..=segments)
        .map(|i| {
            let theta = TAU * i as f64 / segments as f64;
            let (sin, cos) = theta.sin_cos();
            mesh.add_vertex(Vertex::new(Point3::new(radius * sin, y, radius * cos), normal))
        })
        .collect();

    for i in 0..segments {
        let tri = if top {
            [center, rim[i], rim[i + 1]]
        } else {
            [center, rim[i + 1], rim[i]]
        };
        mesh.add_triangle(Triangle::new(tri));
    }
}

fn torus_mesh(radius: f64, tube: f64, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let radial = radial_segments.clamp(2, MAX_SEGMENTS) as usize;
    let tubular = tubular_segments.clamp(3, MAX_SEGMENTS) as usize;
    let mut mesh = Mesh::with_capacity((radial + 1) * (tubular + 1), radial * tubular * 2);

    for j in 0..=radial {
        let v = TAU * j as f64 / radial as f64;
        for i in 0..=tubular {
            let u = TAU * i as f64 / tubular as f64;
            let ring_center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let offset = position - ring_center;
            let normal = offset.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
            mesh.add_vertex(Vertex::new(Point3::from(position), normal));
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.add_triangle(Triangle::new([a, b, d]));
            mesh.add_triangle(Triangle::new([b, c, d]));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesh_for(kind: GeometryKind, dims: &[f64]) -> Mesh {
        Primitive::from_dimensions(&kind, dims).unwrap().to_mesh()
    }

    #[test]
    fn test_box_is_centered() {
        let mesh = mesh_for(GeometryKind::Box, &[2.0, 4.0, 6.0]);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0), epsilon = 1e-12);
        assert_relative_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(mesh.surface_area(), 2.0 * (8.0 + 12.0 + 24.0), epsilon = 1e-9);
    }

    #[test]
    fn test_box_winding_faces_outward() {
        let mesh = mesh_for(GeometryKind::Box, &[1.0, 1.0, 1.0]);
        for t in &mesh.triangles {
            let [a, b, c] = t.indices.map(|i| mesh.vertices[i]);
            let face = (b.position - a.position).cross(&(c.position - a.position));
            assert!(face.dot(&a.normal) > 0.0);
        }
    }

    #[test]
    fn test_cylinder_spans_height() {
        let mesh = mesh_for(GeometryKind::Cylinder, &[0.5, 0.5, 2.0]);
        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min.y, -1.0);
        assert_relative_eq!(bbox.max.y, 1.0);
        assert_relative_eq!(bbox.max.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cone_has_single_cap() {
        let cone = mesh_for(GeometryKind::Cone, &[1.0, 2.0]);
        // side quads plus one bottom fan
        assert_eq!(cone.triangle_count(), CONE_SEGMENTS as usize * 3);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = mesh_for(GeometryKind::Sphere, &[1.5]);
        for v in &mesh.vertices {
            assert_relative_eq!(v.position.coords.norm(), 1.5, epsilon = 1e-12);
        }
        assert_eq!(
            mesh.triangle_count(),
            (SPHERE_WIDTH_SEGMENTS * (SPHERE_HEIGHT_SEGMENTS - 1) * 2) as usize
        );
    }

    #[test]
    fn test_torus_segments_from_dimensions() {
        let p = Primitive::from_dimensions(&GeometryKind::Torus, &[1.0, 0.25, 6.0, 12.0]).unwrap();
        assert_eq!(
            p,
            Primitive::Torus {
                radius: 1.0,
                tube: 0.25,
                radial_segments: 6,
                tubular_segments: 12
            }
        );
        assert_eq!(p.to_mesh().triangle_count(), 6 * 12 * 2);
        let (analytic, meshed) = (p.bounds(), p.to_mesh().bounding_box());
        assert_relative_eq!(analytic.min, meshed.min, epsilon = 0.05);
        assert_relative_eq!(analytic.max, meshed.max, epsilon = 0.05);
    }

    #[test]
    fn test_huge_segment_counts_are_clamped() {
        let p = Primitive::from_dimensions(&GeometryKind::Torus, &[1.0, 0.4, 1e12, 1e12]).unwrap();
        assert!(matches!(
            p,
            Primitive::Torus { radial_segments: MAX_SEGMENTS, tubular_segments: MAX_SEGMENTS, .. }
        ));
        let cone = Primitive::from_dimensions(&GeometryKind::Cone, &[1.0, 1.0, f64::INFINITY]).unwrap();
        assert!(matches!(cone, Primitive::Cone { segments: 3, .. }));

        let sphere = Primitive::Sphere {
            radius: 1.0,
            width_segments: u32::MAX,
            height_segments: u32::MAX,
        };
        let n = MAX_SEGMENTS as usize;
        assert_eq!(sphere.to_mesh().vertex_count(), (n + 1) * (n + 1));
    }

    #[test]
    fn test_missing_dimensions_use_defaults() {
        let p = Primitive::from_dimensions(&GeometryKind::Plane, &[]).unwrap();
        assert_eq!(p, Primitive::Plane { width: 1.0, height: 1.0 });
        assert!(Primitive::from_dimensions(&GeometryKind::Unknown("teapot".into()), &[]).is_none());
    }
}
