//! # solidview
//!
//! **An interactive viewer for lit primitive solids.**
//!
//! A cube, sphere, torus, pyramid or cylinder sits on a floor slab and is shaded with
//! Blinn-Phong lighting from up to eight lights. Camera, material, lights and raster
//! options are edited live from an on-screen parameter panel and the keyboard.
//!
//! Every draw is positioned through a [`TransformStack`]: the view matrix is loaded each
//! frame, and each object composes its model transform inside a scope that restores the
//! stack when it ends.
//!
//! ```no_run
//! fn main() -> Result<(), solidview::AppError> {
//!     let config = solidview::ViewerConfig::from_toml_str(
//!         r#"
//!         [scene]
//!         shape = "Cylinder"
//!         "#,
//!     )
//!     .unwrap_or_default();
//!     solidview::run(config)
//! }
//! ```
//!
//! ## Keys
//!
//! - `+` / `-` zoom the orthographic view, `P` toggles the projection
//! - `W` / `S` switch between wireframe and filled rendering
//! - `1`-`5` jump to the front, top, profile, axonometric and back views
//! - `L` adds a light, `H` hides the panel
//! - arrows move through the panel and adjust values (Shift for bigger steps), Enter toggles

mod app;
mod assets;
mod backend;
mod camera;
mod config;
mod controls;
mod frame;
mod geometry;
mod gpu;
mod hot_shader;
mod input;
mod mesh;
mod overlay;
mod panel;
mod scene;
mod scene_pass;
mod transform_stack;

pub use app::{AppError, run};
pub use assets::{FontAtlas, FontError, find_font};
pub use backend::{
    BackendError, FrameSetup, MeshId, ProgramId, ProgramSource, RasterState, RenderBackend,
    Surface, ViewLight,
};
pub use camera::{Camera, ViewPreset};
pub use config::{
    ConfigError, PanelConfig, SceneConfig, ShaderConfig, StackConfig, ViewerConfig, WindowConfig,
};
pub use controls::{Command, command_for_char};
pub use frame::{FrameDriver, FrameError, Programs, light_uniforms};
pub use geometry::RawGeometry;
pub use gpu::{GpuContext, GpuError};
pub use hot_shader::{HotShader, ShaderOverrides};
pub use input::Input;
pub use mesh::{Mesh, SceneMeshes, Vertex3d};
pub use overlay::{Color, Overlay};
pub use panel::{ColorSlot, Field, Folder, Panel, Row};
pub use scene::{
    LightRecord, Lights, MAX_LIGHTS, Material, Options, ProjectionMode, RasterMode, RenderState,
    SceneError, Shape,
};
pub use scene_pass::ScenePass;
pub use transform_stack::{StackError, StackScope, TransformStack};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
