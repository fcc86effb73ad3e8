//! The boundary between the frame driver and the GPU.
//!
//! The frame driver only talks to a [`RenderBackend`]: it compiles programs, uploads meshes,
//! and then per draw hands over the current model-view matrix and surface material before
//! issuing the draw. [`ScenePass`](crate::scene_pass::ScenePass) implements it on wgpu.

use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;

use crate::geometry::RawGeometry;
use crate::scene::{LightRecord, Material, RasterMode};

/// Handle to a mesh uploaded with [`RenderBackend::create_mesh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Handle to a program compiled with [`RenderBackend::compile_program`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("no mesh with id {0:?}")]
    UnknownMesh(MeshId),
    #[error("no program with id {0:?}")]
    UnknownProgram(ProgramId),
    #[error("geometry has no triangles")]
    EmptyGeometry,
}

/// WGSL source for one program.
///
/// Programs read the shared frame uniforms at `@group(0)` and the per-draw uniforms at
/// `@group(1)`, and expose `vs` / `fs` entry points.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramSource {
    pub label: String,
    pub wgsl: String,
}

impl ProgramSource {
    pub const PHONG: &'static str = include_str!("shaders/phong.wgsl");
    pub const FLAT: &'static str = include_str!("shaders/flat.wgsl");

    pub fn new(label: impl Into<String>, wgsl: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            wgsl: wgsl.into(),
        }
    }

    /// The built-in Blinn-Phong program.
    pub fn phong() -> Self {
        Self::new("phong", Self::PHONG)
    }

    /// The built-in unlit program.
    pub fn flat() -> Self {
        Self::new("flat", Self::FLAT)
    }
}

/// Fixed-function state for the whole frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterState {
    pub depth_test: bool,
    pub backface_culling: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            depth_test: true,
            backface_culling: true,
        }
    }
}

/// A light as uploaded: position already in view space.
///
/// `position.w` is 1 for point lights and 0 for directional lights, in which case `xyz`
/// is the view-space direction towards the light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLight {
    pub position: Vec4,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub active: bool,
}

impl ViewLight {
    /// Moves a world-space light into the space described by `view`.
    pub fn from_record(record: &LightRecord, view: Mat4) -> Self {
        let w = if record.directional { 0.0 } else { 1.0 };
        Self {
            position: view * record.position.extend(w),
            ambient: record.ambient,
            diffuse: record.diffuse,
            specular: record.specular,
            active: record.active,
        }
    }

    pub fn is_directional(&self) -> bool {
        self.position.w == 0.0
    }
}

/// Everything the backend needs before the first draw of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSetup {
    pub clear_color: Vec3,
    pub raster: RasterState,
    pub projection: Mat4,
    /// Insertion order of the light collection; index = shader slot.
    pub lights: Vec<ViewLight>,
}

/// Material constants for the next draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Surface {
    /// Plain white, used for the floor.
    pub const WHITE: Surface = Surface {
        ambient: Vec3::ONE,
        diffuse: Vec3::ONE,
        specular: Vec3::ONE,
        shininess: 50.0,
    };

    /// A single color for the unlit program, which reads `diffuse`.
    pub fn flat(color: Vec3) -> Self {
        Self {
            ambient: color,
            diffuse: color,
            specular: Vec3::ZERO,
            shininess: 1.0,
        }
    }
}

impl From<&Material> for Surface {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            shininess: material.shininess,
        }
    }
}

/// Immediate-mode drawing interface used by the frame driver.
///
/// Calls within a frame are ordered: [`begin_frame`](Self::begin_frame) first, then any
/// number of `set_model_view` / `set_surface` / `draw_mesh` sequences. A draw captures the
/// model-view matrix and surface that were current when it was issued.
pub trait RenderBackend {
    fn compile_program(&mut self, source: &ProgramSource) -> Result<ProgramId, BackendError>;

    /// Replaces the program behind `id`. On failure the previous program stays in use.
    fn recompile_program(
        &mut self,
        id: ProgramId,
        source: &ProgramSource,
    ) -> Result<(), BackendError>;

    fn create_mesh(&mut self, geometry: &RawGeometry) -> Result<MeshId, BackendError>;

    fn begin_frame(&mut self, setup: &FrameSetup);

    /// Sets the model-view matrix for following draws. The normal matrix is derived from it.
    fn set_model_view(&mut self, model_view: Mat4);

    fn set_surface(&mut self, surface: &Surface);

    fn draw_mesh(
        &mut self,
        mesh: MeshId,
        program: ProgramId,
        mode: RasterMode,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn point_light_moves_with_the_view() {
        let record = LightRecord {
            position: Vec3::new(0.0, 1.0, 0.0),
            ..Default::default()
        };
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        let light = ViewLight::from_record(&record, view);

        assert!(!light.is_directional());
        assert_abs_diff_eq!(light.position.y, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(light.position.z, -5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(light.position.w, 1.0);
    }

    #[test]
    fn directional_light_ignores_translation() {
        let record = LightRecord {
            position: Vec3::new(0.0, 1.0, 0.0),
            directional: true,
            ..Default::default()
        };
        let view = Mat4::from_translation(Vec3::new(4.0, -2.0, 7.0));

        let light = ViewLight::from_record(&record, view);

        assert!(light.is_directional());
        assert!(light.position.abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn surface_copies_material() {
        let material = Material::default();
        let surface = Surface::from(&material);
        assert_eq!(surface.diffuse, material.diffuse);
        assert_eq!(surface.shininess, material.shininess);
    }
}
