//! Viewer configuration.
//!
//! Configuration is read from an optional TOML file. Every section and field has a
//! default, so an empty file (or no file at all) yields the stock viewer:
//!
//! ```toml
//! [window]
//! title = "solidview"
//! width = 1280
//! height = 720
//!
//! [scene]
//! shape = "Torus"
//! max_lights = 8
//! clear_color = [0.5, 0.5, 0.6]
//!
//! [stack]
//! max_depth = 32
//!
//! [panel]
//! visible = true
//! font_size = 15.0
//! font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"
//!
//! [shaders]
//! dir = "shaders"
//! hot_reload = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::scene::MAX_LIGHTS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(
        "[stack] max_depth = {0} is too small; a frame needs at least {min}",
        min = MIN_STACK_DEPTH
    )]
    StackTooShallow(usize),
}

/// Stack entries a frame needs: the view matrix plus one scoped draw.
pub const MIN_STACK_DEPTH: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub stack: StackConfig,
    pub panel: PanelConfig,
    pub shaders: ShaderConfig,
}

impl ViewerConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.stack.max_depth {
            Some(depth) if depth < MIN_STACK_DEPTH => Err(ConfigError::StackTooShallow(depth)),
            _ => Ok(()),
        }
    }
}

/// Window title and initial size.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "solidview".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial solid, matched case-insensitively against the known primitives.
    pub shape: String,
    pub max_lights: usize,
    pub clear_color: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shape: "Torus".to_string(),
            max_lights: MAX_LIGHTS,
            clear_color: [0.5, 0.5, 0.6],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Maximum transform stack depth; unbounded when absent.
    pub max_depth: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub visible: bool,
    pub font_size: f32,
    /// TTF/OTF used for panel text. Common system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            visible: true,
            font_size: 15.0,
            font_path: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory holding `phong.wgsl` / `flat.wgsl` overrides.
    pub dir: Option<PathBuf>,
    pub hot_reload: bool,
}
