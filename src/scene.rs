//! Per-session render state.
//!
//! Everything the operator can edit lives in one [`RenderState`] owned by the running
//! viewer. The parameter panel and the keyboard controls take `&mut RenderState`; the
//! frame driver reads it once per frame.

use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::camera::Camera;
use crate::config::ViewerConfig;

/// Number of light slots in the lighting shader.
pub const MAX_LIGHTS: usize = 8;

/// Orthographic viewport distance limits.
pub const MIN_VP_DISTANCE: f32 = 3.0;
pub const MAX_VP_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A shape name did not match any known primitive.
    #[error("unknown shape selection '{0}'")]
    UnknownShapeSelection(String),
    /// The light collection is full.
    #[error("light limit of {max} reached")]
    LightLimitReached { max: usize },
}

/// The primitive solid drawn above the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Cube,
    Sphere,
    Torus,
    Pyramid,
    Cylinder,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Cube,
        Shape::Sphere,
        Shape::Torus,
        Shape::Pyramid,
        Shape::Cylinder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Cube => "Cube",
            Shape::Sphere => "Sphere",
            Shape::Torus => "Torus",
            Shape::Pyramid => "Pyramid",
            Shape::Cylinder => "Cylinder",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// The next shape in panel order, wrapping around.
    pub fn next(self) -> Shape {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The previous shape in panel order, wrapping around.
    pub fn prev(self) -> Shape {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SceneError::UnknownShapeSelection(s.to_string()))
    }
}

/// Phong material of the selected solid. Colors are linear RGB in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// `None` when the configured selection named no known primitive; nothing is drawn.
    pub shape: Option<Shape>,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shape: Some(Shape::Torus),
            ambient: Vec3::new(0.0, 25.0, 0.0) / 255.0,
            diffuse: Vec3::new(0.0, 100.0, 0.0) / 255.0,
            specular: Vec3::ONE,
            shininess: 50.0,
        }
    }
}

/// Rasterization toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub backface_culling: bool,
    pub depth_test: bool,
    pub show_lights: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            backface_culling: true,
            depth_test: true,
            show_lights: false,
        }
    }
}

/// Whether meshes are drawn as filled triangles or as their edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RasterMode {
    #[default]
    Filled,
    Wireframe,
}

impl RasterMode {
    pub fn name(self) -> &'static str {
        match self {
            RasterMode::Filled => "filled",
            RasterMode::Wireframe => "wireframe",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RasterMode::Filled => RasterMode::Wireframe,
            RasterMode::Wireframe => RasterMode::Filled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn name(self) -> &'static str {
        match self {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "orthographic",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        }
    }
}

/// One light as edited in the panel. Position is world-space.
///
/// For a directional light the position is read as the direction pointing towards the
/// light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightRecord {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub directional: bool,
    pub active: bool,
}

impl Default for LightRecord {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
            ambient: Vec3::splat(75.0 / 255.0),
            diffuse: Vec3::splat(175.0 / 255.0),
            specular: Vec3::ONE,
            directional: false,
            active: true,
        }
    }
}

/// Append-only, capped list of lights. Insertion order is the shader slot order.
#[derive(Clone, Debug)]
pub struct Lights {
    records: Vec<LightRecord>,
    max: usize,
}

impl Lights {
    /// Creates an empty collection. `max` is capped at [`MAX_LIGHTS`].
    pub fn new(max: usize) -> Self {
        let max = max.min(MAX_LIGHTS);
        Self {
            records: Vec::with_capacity(max),
            max,
        }
    }

    /// Appends a light and returns its index.
    pub fn add(&mut self, light: LightRecord) -> Result<usize, SceneError> {
        if self.records.len() >= self.max {
            return Err(SceneError::LightLimitReached { max: self.max });
        }
        self.records.push(light);
        Ok(self.records.len() - 1)
    }

    pub fn add_default(&mut self) -> Result<usize, SceneError> {
        self.add(LightRecord::default())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn get(&self, index: usize) -> Option<&LightRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LightRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LightRecord> {
        self.records.iter()
    }
}

impl Default for Lights {
    fn default() -> Self {
        Self::new(MAX_LIGHTS)
    }
}

/// All live-editable parameters of one viewer session.
#[derive(Clone, Debug)]
pub struct RenderState {
    pub camera: Camera,
    pub projection: ProjectionMode,
    /// Half-height of the orthographic viewport.
    pub vp_distance: f32,
    pub material: Material,
    pub options: Options,
    pub raster: RasterMode,
    pub lights: Lights,
    pub clear_color: Vec3,
}

impl Default for RenderState {
    fn default() -> Self {
        let mut lights = Lights::default();
        // One light to start with; the collection is empty so this cannot fail.
        let _ = lights.add_default();
        Self {
            camera: Camera::default(),
            projection: ProjectionMode::default(),
            vp_distance: 5.0,
            material: Material::default(),
            options: Options::default(),
            raster: RasterMode::default(),
            lights,
            clear_color: Vec3::new(0.5, 0.5, 0.6),
        }
    }
}

impl RenderState {
    /// Builds the initial state from configuration.
    ///
    /// An unknown shape name is reported once here and leaves no shape selected.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut state = Self::default();

        state.material.shape = match config.scene.shape.parse::<Shape>() {
            Ok(shape) => Some(shape),
            Err(e) => {
                log::warn!("{e}; the solid will not be drawn until a shape is chosen");
                None
            }
        };

        let mut lights = Lights::new(config.scene.max_lights);
        if lights.max() > 0 {
            let _ = lights.add_default();
        }
        state.lights = lights;
        state.clear_color = Vec3::from(config.scene.clear_color);
        state
    }

    /// The projection matrix for the current mode.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match self.projection {
            ProjectionMode::Perspective => self.camera.perspective_matrix(aspect),
            ProjectionMode::Orthographic => {
                let d = self.vp_distance;
                Mat4::orthographic_rh(-d * aspect, d * aspect, -d, d, -3.0 * d, 3.0 * d)
            }
        }
    }

    pub fn zoom_in(&mut self) {
        self.vp_distance = (self.vp_distance - 1.0).max(MIN_VP_DISTANCE);
    }

    pub fn zoom_out(&mut self) {
        self.vp_distance = (self.vp_distance + 1.0).min(MAX_VP_DISTANCE);
    }

    /// Appends a default light, logging the outcome.
    pub fn add_light(&mut self) -> Result<usize, SceneError> {
        match self.lights.add_default() {
            Ok(index) => {
                log::info!("added light {} of {}", index + 1, self.lights.max());
                Ok(index)
            }
            Err(e) => {
                log::warn!("{e}");
                Err(e)
            }
        }
    }
}
