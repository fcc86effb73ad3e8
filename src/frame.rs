//! The per-frame draw sequence.
//!
//! [`FrameDriver::render`] seeds the transform stack with the view matrix and then issues,
//! in order, the floor slab, the selected solid and (optionally) one marker per light.
//! Every draw runs inside its own [`StackScope`](crate::StackScope), so none of them sees
//! the transforms of another.

use std::collections::HashSet;
use std::fmt;

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::backend::{
    BackendError, FrameSetup, ProgramId, ProgramSource, RasterState, RenderBackend, Surface,
    ViewLight,
};
use crate::mesh::SceneMeshes;
use crate::scene::{LightRecord, Lights, RenderState, Shape};
use crate::transform_stack::{StackError, TransformStack};

/// Floor slab placement: a 3 × 0.5 × 3 box whose top face sits at y = 0.
const FLOOR_OFFSET: Vec3 = Vec3::new(0.0, -0.25, 0.0);
const FLOOR_SCALE: Vec3 = Vec3::new(3.0, 0.5, 3.0);
/// The solid rests on the floor.
const SOLID_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);
const MARKER_SCALE: f32 = 0.1;
/// Distance from the origin at which a directional light's marker is drawn.
const DIRECTIONAL_MARKER_DISTANCE: f32 = 2.5;
/// Brightness of markers for switched-off lights.
const INACTIVE_MARKER_DIM: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Where a light's marker sits. A directional light has no position, so its marker is
/// placed along the direction towards the light.
fn marker_offset(light: &LightRecord) -> Vec3 {
    if light.directional {
        light.position.normalize_or_zero() * DIRECTIONAL_MARKER_DISTANCE
    } else {
        light.position
    }
}

/// The two programs every frame needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Programs {
    /// Blinn-Phong lighting.
    pub lit: ProgramId,
    /// Unlit single color.
    pub flat: ProgramId,
}

impl Programs {
    /// Compiles the built-in programs.
    pub fn compile<B: RenderBackend + ?Sized>(backend: &mut B) -> Result<Self, BackendError> {
        Ok(Self {
            lit: backend.compile_program(&ProgramSource::phong())?,
            flat: backend.compile_program(&ProgramSource::flat())?,
        })
    }
}

/// Why the solid was not drawn. Each distinct cause is logged once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SkippedSolid {
    NoShape,
    NoMesh(Shape),
}

impl fmt::Display for SkippedSolid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedSolid::NoShape => f.write_str("no shape selected; skipping the solid"),
            SkippedSolid::NoMesh(shape) => write!(f, "no mesh for {shape}; skipping the solid"),
        }
    }
}

/// Light uniforms for the frame, in insertion order, moved into view space.
pub fn light_uniforms(view: Mat4, lights: &Lights) -> Vec<ViewLight> {
    lights
        .iter()
        .map(|record| ViewLight::from_record(record, view))
        .collect()
}

/// Owns the transform stack and replays the scene into a [`RenderBackend`] each frame.
#[derive(Debug)]
pub struct FrameDriver {
    stack: TransformStack,
    meshes: SceneMeshes,
    programs: Programs,
    reported: HashSet<SkippedSolid>,
}

impl FrameDriver {
    pub fn new(stack: TransformStack, meshes: SceneMeshes, programs: Programs) -> Self {
        Self {
            stack,
            meshes,
            programs,
            reported: HashSet::new(),
        }
    }

    pub fn stack(&self) -> &TransformStack {
        &self.stack
    }

    pub fn programs(&self) -> Programs {
        self.programs
    }

    /// Draws one frame of `state`.
    ///
    /// `aspect` is the target's width / height.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        state: &RenderState,
        aspect: f32,
    ) -> Result<(), FrameError> {
        let view = state.camera.view_matrix();

        backend.begin_frame(&FrameSetup {
            clear_color: state.clear_color,
            raster: RasterState {
                depth_test: state.options.depth_test,
                backface_culling: state.options.backface_culling,
            },
            projection: state.projection_matrix(aspect),
            lights: light_uniforms(view, &state.lights),
        });

        let Self {
            stack,
            meshes,
            programs,
            reported,
        } = self;
        let mode = state.raster;

        stack.load_matrix(view);

        {
            let mut floor = stack.push_scope()?;
            floor.mult_translation(FLOOR_OFFSET);
            floor.mult_scale(FLOOR_SCALE);
            backend.set_model_view(floor.current_matrix());
            backend.set_surface(&Surface::WHITE);
            backend.draw_mesh(meshes.floor, programs.lit, mode)?;
        }

        let solid = match state.material.shape {
            None => Err(SkippedSolid::NoShape),
            Some(shape) => meshes.get(shape).ok_or(SkippedSolid::NoMesh(shape)),
        };
        match solid {
            Ok(mesh) => {
                let mut scope = stack.push_scope()?;
                scope.mult_translation(SOLID_OFFSET);
                backend.set_model_view(scope.current_matrix());
                backend.set_surface(&Surface::from(&state.material));
                backend.draw_mesh(mesh, programs.lit, mode)?;
            }
            Err(skipped) => {
                if reported.insert(skipped) {
                    log::warn!("{skipped}");
                }
            }
        }

        if state.options.show_lights {
            for light in state.lights.iter() {
                let mut marker = stack.push_scope()?;
                marker.mult_translation(marker_offset(light));
                marker.mult_scale(Vec3::splat(MARKER_SCALE));

                let color = if light.active {
                    light.diffuse
                } else {
                    light.diffuse * INACTIVE_MARKER_DIM
                };
                backend.set_model_view(marker.current_matrix());
                backend.set_surface(&Surface::flat(color));
                backend.draw_mesh(meshes.marker, programs.flat, mode)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MeshId;
    use crate::geometry::RawGeometry;
    use crate::scene::{ProjectionMode, RasterMode};
    use approx::assert_abs_diff_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Draw {
        mesh: MeshId,
        program: ProgramId,
        mode: RasterMode,
        model_view: Mat4,
        surface: Surface,
    }

    /// Records every call instead of touching a GPU.
    #[derive(Default)]
    struct Recorder {
        programs: Vec<String>,
        meshes: Vec<usize>,
        setups: Vec<FrameSetup>,
        model_view: Mat4,
        surface: Option<Surface>,
        draws: Vec<Draw>,
    }

    impl RenderBackend for Recorder {
        fn compile_program(&mut self, source: &ProgramSource) -> Result<ProgramId, BackendError> {
            self.programs.push(source.label.clone());
            Ok(ProgramId(self.programs.len() - 1))
        }

        fn recompile_program(
            &mut self,
            id: ProgramId,
            source: &ProgramSource,
        ) -> Result<(), BackendError> {
            let slot = self
                .programs
                .get_mut(id.0)
                .ok_or(BackendError::UnknownProgram(id))?;
            *slot = source.label.clone();
            Ok(())
        }

        fn create_mesh(&mut self, geometry: &RawGeometry) -> Result<MeshId, BackendError> {
            self.meshes.push(geometry.triangle_count());
            Ok(MeshId(self.meshes.len() - 1))
        }

        fn begin_frame(&mut self, setup: &FrameSetup) {
            self.setups.push(setup.clone());
            self.draws.clear();
        }

        fn set_model_view(&mut self, model_view: Mat4) {
            self.model_view = model_view;
        }

        fn set_surface(&mut self, surface: &Surface) {
            self.surface = Some(*surface);
        }

        fn draw_mesh(
            &mut self,
            mesh: MeshId,
            program: ProgramId,
            mode: RasterMode,
        ) -> Result<(), BackendError> {
            if mesh.0 >= self.meshes.len() {
                return Err(BackendError::UnknownMesh(mesh));
            }
            if program.0 >= self.programs.len() {
                return Err(BackendError::UnknownProgram(program));
            }
            self.draws.push(Draw {
                mesh,
                program,
                mode,
                model_view: self.model_view,
                surface: self.surface.unwrap_or(Surface::WHITE),
            });
            Ok(())
        }
    }

    fn driver(backend: &mut Recorder) -> FrameDriver {
        let programs = Programs::compile(backend).unwrap();
        let meshes = SceneMeshes::build(backend).unwrap();
        FrameDriver::new(TransformStack::new(), meshes, programs)
    }

    #[test]
    fn floor_then_solid() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let state = RenderState::default();
        let view = state.camera.view_matrix();

        driver.render(&mut backend, &state, 1.5).unwrap();

        assert_eq!(backend.draws.len(), 2);
        let floor = &backend.draws[0];
        let solid = &backend.draws[1];

        assert_eq!(floor.mesh, driver.meshes.floor);
        assert_eq!(floor.program, driver.programs.lit);
        assert_eq!(floor.surface, Surface::WHITE);
        let expected_floor =
            view * Mat4::from_translation(FLOOR_OFFSET) * Mat4::from_scale(FLOOR_SCALE);
        assert!(floor.model_view.abs_diff_eq(expected_floor, 1e-6));

        assert_eq!(Some(solid.mesh), driver.meshes.get(Shape::Torus));
        assert_eq!(solid.surface, Surface::from(&state.material));
        // The floor's scale must not leak into the solid.
        let expected_solid = view * Mat4::from_translation(SOLID_OFFSET);
        assert!(solid.model_view.abs_diff_eq(expected_solid, 1e-6));
    }

    #[test]
    fn stack_is_back_at_its_base_after_a_frame() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let mut state = RenderState::default();
        state.options.show_lights = true;

        driver.render(&mut backend, &state, 1.0).unwrap();

        assert_eq!(driver.stack().depth(), 1);
        assert_eq!(driver.stack().current_matrix(), state.camera.view_matrix());
    }

    #[test]
    fn markers_follow_lights_in_insertion_order() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let mut state = RenderState::default();
        state.options.show_lights = true;
        state
            .lights
            .add(LightRecord {
                position: Vec3::new(2.0, 1.0, 0.0),
                diffuse: Vec3::new(1.0, 0.0, 0.0),
                active: false,
                ..Default::default()
            })
            .unwrap();
        let view = state.camera.view_matrix();

        driver.render(&mut backend, &state, 1.0).unwrap();

        assert_eq!(backend.draws.len(), 4);
        let markers = &backend.draws[2..];
        for (draw, light) in markers.iter().zip(state.lights.iter()) {
            assert_eq!(draw.mesh, driver.meshes.marker);
            assert_eq!(draw.program, driver.programs.flat);
            let expected = view
                * Mat4::from_translation(light.position)
                * Mat4::from_scale(Vec3::splat(MARKER_SCALE));
            assert!(draw.model_view.abs_diff_eq(expected, 1e-6));
        }
        assert_eq!(markers[0].surface.diffuse, state.lights.get(0).unwrap().diffuse);
        assert_abs_diff_eq!(markers[1].surface.diffuse.x, INACTIVE_MARKER_DIM);
    }

    #[test]
    fn directional_marker_sits_along_its_direction() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let mut state = RenderState::default();
        state.options.show_lights = true;
        state
            .lights
            .add(LightRecord {
                position: Vec3::new(0.0, 0.0, 0.2),
                directional: true,
                ..Default::default()
            })
            .unwrap();
        let view = state.camera.view_matrix();

        driver.render(&mut backend, &state, 1.0).unwrap();

        let marker = &backend.draws[3];
        let center = view.inverse() * marker.model_view.col(3);
        assert_abs_diff_eq!(center.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(center.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(center.z, DIRECTIONAL_MARKER_DISTANCE, epsilon = 1e-4);
    }

    #[test]
    fn missing_shape_skips_only_the_solid() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let mut state = RenderState::default();
        state.material.shape = None;

        driver.render(&mut backend, &state, 1.0).unwrap();
        driver.render(&mut backend, &state, 1.0).unwrap();

        assert_eq!(backend.draws.len(), 1);
        assert_eq!(backend.draws[0].mesh, driver.meshes.floor);
        assert_eq!(driver.reported.len(), 1);
    }

    #[test]
    fn shape_without_mesh_is_reported_once_per_shape() {
        let mut backend = Recorder::default();
        let programs = Programs::compile(&mut backend).unwrap();
        let floor = backend.create_mesh(&RawGeometry::cube()).unwrap();
        let marker = backend.create_mesh(&RawGeometry::sphere(8, 4)).unwrap();
        let mut driver =
            FrameDriver::new(TransformStack::new(), SceneMeshes::new(floor, marker), programs);
        let mut state = RenderState::default();

        for shape in [Shape::Cube, Shape::Cube, Shape::Sphere] {
            state.material.shape = Some(shape);
            driver.render(&mut backend, &state, 1.0).unwrap();
            assert_eq!(backend.draws.len(), 1);
        }

        assert_eq!(driver.reported.len(), 2);
    }

    #[test]
    fn backend_errors_propagate() {
        let mut backend = Recorder::default();
        let programs = Programs::compile(&mut backend).unwrap();
        let meshes = SceneMeshes::new(MeshId(7), MeshId(8));
        let mut driver = FrameDriver::new(TransformStack::new(), meshes, programs);

        let err = driver
            .render(&mut backend, &RenderState::default(), 1.0)
            .unwrap_err();

        assert_eq!(
            err,
            FrameError::Backend(BackendError::UnknownMesh(MeshId(7)))
        );
        assert_eq!(driver.stack().depth(), 1);
    }

    #[test]
    fn depth_limit_surfaces_as_stack_error() {
        let mut backend = Recorder::default();
        let programs = Programs::compile(&mut backend).unwrap();
        let meshes = SceneMeshes::build(&mut backend).unwrap();
        let mut driver = FrameDriver::new(TransformStack::with_depth_limit(1), meshes, programs);

        let err = driver
            .render(&mut backend, &RenderState::default(), 1.0)
            .unwrap_err();

        assert_eq!(err, FrameError::Stack(StackError::StackOverflow { limit: 1 }));
    }

    #[test]
    fn raster_mode_and_setup_reach_the_backend() {
        let mut backend = Recorder::default();
        let mut driver = driver(&mut backend);
        let mut state = RenderState::default();
        state.raster = RasterMode::Wireframe;
        state.projection = ProjectionMode::Orthographic;
        state.options.depth_test = false;

        driver.render(&mut backend, &state, 2.0).unwrap();

        assert!(backend.draws.iter().all(|d| d.mode == RasterMode::Wireframe));
        let setup = backend.setups.last().unwrap();
        assert!(!setup.raster.depth_test);
        assert!(setup.raster.backface_culling);
        assert_eq!(setup.projection, state.projection_matrix(2.0));
        assert_eq!(setup.clear_color, state.clear_color);
    }

    #[test]
    fn light_uniforms_are_view_space_in_insertion_order() {
        let mut lights = Lights::new(8);
        lights
            .add(LightRecord {
                position: Vec3::new(0.0, 1.0, 0.0),
                ..Default::default()
            })
            .unwrap();
        lights
            .add(LightRecord {
                position: Vec3::new(1.0, 0.0, 0.0),
                directional: true,
                active: false,
                ..Default::default()
            })
            .unwrap();
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        let uniforms = light_uniforms(view, &lights);

        assert_eq!(uniforms.len(), 2);
        assert_abs_diff_eq!(uniforms[0].position.z, -5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(uniforms[0].position.w, 1.0);
        assert!(uniforms[1].is_directional());
        assert!(!uniforms[1].active);
        assert_abs_diff_eq!(uniforms[1].position.x, 1.0, epsilon = 1e-5);
    }
}
