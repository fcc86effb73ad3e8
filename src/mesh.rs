//! Vertex format, GPU meshes and the shape → mesh table.
//!
//! # Vertex Layout
//!
//! [`Vertex3d`] occupies 32 bytes:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use std::collections::HashMap;

use crate::backend::{BackendError, MeshId, RenderBackend};
use crate::geometry::RawGeometry;
use crate::scene::{RasterMode, Shape};

/// A vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Model-space position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Vertex buffer layout matching the table in the module docs.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// GPU-resident geometry.
///
/// Holds one vertex buffer and two index buffers over it: the triangle list used for
/// [`RasterMode::Filled`] and the unique-edge line list used for
/// [`RasterMode::Wireframe`].
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) triangle_buffer: wgpu::Buffer,
    pub(crate) triangle_count: u32,
    pub(crate) edge_buffer: wgpu::Buffer,
    pub(crate) edge_count: u32,
}

impl Mesh {
    /// Uploads `geometry`. Fails on geometry without triangles.
    pub fn new(device: &wgpu::Device, geometry: &RawGeometry) -> Result<Self, BackendError> {
        use wgpu::util::DeviceExt;

        if geometry.indices.len() < 3 || geometry.vertices.is_empty() {
            return Err(BackendError::EmptyGeometry);
        }

        let edges = geometry.edges();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Triangle Index Buffer"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Edge Index Buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            triangle_buffer,
            triangle_count: geometry.indices.len() as u32,
            edge_buffer,
            edge_count: edges.len() as u32,
        })
    }

    /// Index buffer and index count for the given raster mode.
    pub(crate) fn indices(&self, mode: RasterMode) -> (&wgpu::Buffer, u32) {
        match mode {
            RasterMode::Filled => (&self.triangle_buffer, self.triangle_count),
            RasterMode::Wireframe => (&self.edge_buffer, self.edge_count),
        }
    }
}

/// Tessellation used for the selectable solids.
const SEGMENTS: u32 = 48;
const RINGS: u32 = 24;

/// Generated geometry for one selectable shape.
pub fn shape_geometry(shape: Shape) -> RawGeometry {
    match shape {
        Shape::Cube => RawGeometry::cube(),
        Shape::Sphere => RawGeometry::sphere(SEGMENTS, RINGS),
        Shape::Torus => RawGeometry::torus(SEGMENTS, RINGS),
        Shape::Pyramid => RawGeometry::pyramid(),
        Shape::Cylinder => RawGeometry::cylinder(SEGMENTS),
    }
}

/// Meshes uploaded once per session: every selectable shape, the floor slab and the
/// light marker.
#[derive(Clone, Debug)]
pub struct SceneMeshes {
    shapes: HashMap<Shape, MeshId>,
    pub floor: MeshId,
    pub marker: MeshId,
}

impl SceneMeshes {
    /// A table with no shapes registered yet.
    pub fn new(floor: MeshId, marker: MeshId) -> Self {
        Self {
            shapes: HashMap::new(),
            floor,
            marker,
        }
    }

    /// Generates and uploads all meshes through `backend`.
    pub fn build<B: RenderBackend + ?Sized>(backend: &mut B) -> Result<Self, BackendError> {
        let floor = backend.create_mesh(&RawGeometry::cube())?;
        let marker = backend.create_mesh(&RawGeometry::sphere(12, 6))?;
        let mut meshes = Self::new(floor, marker);

        for shape in Shape::ALL {
            let id = backend.create_mesh(&shape_geometry(shape))?;
            meshes.insert(shape, id);
        }

        log::debug!("uploaded {} scene meshes", meshes.shapes.len() + 2);
        Ok(meshes)
    }

    pub fn insert(&mut self, shape: Shape, mesh: MeshId) {
        self.shapes.insert(shape, mesh);
    }

    pub fn get(&self, shape: Shape) -> Option<MeshId> {
        self.shapes.get(&shape).copied()
    }
}
