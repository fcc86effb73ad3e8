//! CPU-side primitive generators.
//!
//! Every primitive is built as [`RawGeometry`] first and only then uploaded by the
//! rendering backend, which keeps the generators testable without a GPU.
//!
//! | Primitive  | Extent                                   | Notes                   |
//! |------------|------------------------------------------|-------------------------|
//! | cube       | `[-0.5, 0.5]³`                           | 24 vertices, flat faces |
//! | sphere     | radius 0.5                               | latitude/longitude grid |
//! | torus      | ring radius 0.35, tube radius 0.15       | lies in the XZ plane    |
//! | pyramid    | base side 1 at y = -0.5, apex at y = 0.5 | flat faces              |
//! | cylinder   | radius 0.5, height 1                     | capped                  |
//!
//! All primitives are centered at the origin and use counter-clockwise front faces.

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::mesh::Vertex3d;

pub const TORUS_RING_RADIUS: f32 = 0.35;
pub const TORUS_TUBE_RADIUS: f32 = 0.15;

/// Geometry before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    /// Triangle list.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Unique undirected triangle edges as a line-list index buffer.
    ///
    /// Edges appear in first-seen order; degenerate edges are dropped.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if a == b {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }

        lines
    }

    /// Unit cube centered at the origin.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // +Z
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
            // -Z
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
            // +Y
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
            // -Y
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
            // +X
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
            // -X
            Vertex3d::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
        ];

        let indices = (0..6u32)
            .flat_map(|face| {
                let base = face * 4;
                [base, base + 1, base + 2, base + 2, base + 3, base]
            })
            .collect();

        Self::new(vertices, indices)
    }

    /// UV sphere of radius 0.5. Ring 0 is the +Y pole.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            for seg in 0..=segments {
                let theta = TAU * seg as f32 / segments as f32;
                let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(Vertex3d::new(
                    (n * 0.5).to_array(),
                    n.to_array(),
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        let indices = grid_indices(segments, rings, |a, b, c, d| {
            // Increasing `seg` runs towards +Z at theta = 0, increasing `ring` runs down.
            [a, b, c, b, d, c]
        });

        Self::new(vertices, indices)
    }

    /// Torus lying in the XZ plane.
    pub fn torus(major_segments: u32, minor_segments: u32) -> Self {
        let major = major_segments.max(3);
        let minor = minor_segments.max(3);
        let mut vertices = Vec::with_capacity(((major + 1) * (minor + 1)) as usize);

        for i in 0..=major {
            let theta = TAU * i as f32 / major as f32;
            for j in 0..=minor {
                let phi = TAU * j as f32 / minor as f32;
                let n = Vec3::new(phi.cos() * theta.cos(), phi.sin(), phi.cos() * theta.sin());
                let ring = TORUS_RING_RADIUS + TORUS_TUBE_RADIUS * phi.cos();
                let p = Vec3::new(
                    ring * theta.cos(),
                    TORUS_TUBE_RADIUS * phi.sin(),
                    ring * theta.sin(),
                );
                vertices.push(Vertex3d::new(
                    p.to_array(),
                    n.to_array(),
                    [i as f32 / major as f32, j as f32 / minor as f32],
                ));
            }
        }

        // Rows run around the tube here, so the grid is transposed relative to the sphere.
        let indices = grid_indices(minor, major, |a, b, c, d| [a, b, c, b, d, c]);

        Self::new(vertices, indices)
    }

    /// Square pyramid with flat faces.
    pub fn pyramid() -> Self {
        let apex = Vec3::new(0.0, 0.5, 0.0);
        let corners = [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(-0.5, -0.5, -0.5),
        ];

        let mut vertices = Vec::with_capacity(16);
        let mut indices = Vec::with_capacity(18);

        for k in 0..4 {
            let a = corners[k];
            let b = corners[(k + 1) % 4];
            let normal = (b - a).cross(apex - a).normalize();
            let base = vertices.len() as u32;
            vertices.push(Vertex3d::new(a.to_array(), normal.to_array(), [0.0, 0.0]));
            vertices.push(Vertex3d::new(b.to_array(), normal.to_array(), [1.0, 0.0]));
            vertices.push(Vertex3d::new(apex.to_array(), normal.to_array(), [0.5, 1.0]));
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        let down = [0.0, -1.0, 0.0];
        let base = vertices.len() as u32;
        for (corner, uv) in [
            (corners[3], [0.0, 0.0]),
            (corners[2], [1.0, 0.0]),
            (corners[1], [1.0, 1.0]),
            (corners[0], [0.0, 1.0]),
        ] {
            vertices.push(Vertex3d::new(corner.to_array(), down, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        Self::new(vertices, indices)
    }

    /// Capped cylinder along Y.
    pub fn cylinder(segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::new();

        // Side: two rows (bottom, top) sharing the seam vertex twice.
        for row in 0..=1u32 {
            let y = row as f32 - 0.5;
            for seg in 0..=segments {
                let theta = TAU * seg as f32 / segments as f32;
                let n = Vec3::new(theta.cos(), 0.0, theta.sin());
                vertices.push(Vertex3d::new(
                    [n.x * 0.5, y, n.z * 0.5],
                    n.to_array(),
                    [seg as f32 / segments as f32, row as f32],
                ));
            }
        }
        let mut indices = grid_indices(segments, 1, |a, b, c, d| [a, c, b, c, d, b]);

        for (y, normal) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex3d::new([0.0, y, 0.0], [0.0, normal, 0.0], [0.5, 0.5]));
            for seg in 0..segments {
                let theta = TAU * seg as f32 / segments as f32;
                let (s, c) = theta.sin_cos();
                vertices.push(Vertex3d::new(
                    [c * 0.5, y, s * 0.5],
                    [0.0, normal, 0.0],
                    [0.5 + c * 0.5, 0.5 + s * 0.5],
                ));
            }
            for seg in 0..segments {
                let current = center + 1 + seg;
                let next = center + 1 + (seg + 1) % segments;
                if normal > 0.0 {
                    indices.extend_from_slice(&[center, next, current]);
                } else {
                    indices.extend_from_slice(&[center, current, next]);
                }
            }
        }

        Self::new(vertices, indices)
    }
}

/// Quad indices over a `(columns + 1) × (rows + 1)` vertex grid laid out row-major.
///
/// `quad(a, b, c, d)` receives the corners `a = (row, col)`, `b = (row, col + 1)`,
/// `c = (row + 1, col)`, `d = (row + 1, col + 1)` and returns the two triangles.
fn grid_indices(columns: u32, rows: u32, quad: impl Fn(u32, u32, u32, u32) -> [u32; 6]) -> Vec<u32> {
    let stride = columns + 1;
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let a = row * stride + col;
            let c = a + stride;
            indices.extend_from_slice(&quad(a, a + 1, c, c + 1));
        }
    }
    indices
}
