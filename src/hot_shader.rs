//! WGSL programs loaded from disk.
//!
//! [`HotShader`] tracks one file's modification time. [`ShaderOverrides`] uses it to replace
//! the built-in programs with `phong.wgsl` and `flat.wgsl` from the configured directory,
//! falling back to the built-ins when an override fails to compile and keeping the running
//! program when a reload fails.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::backend::{BackendError, ProgramId, ProgramSource, RenderBackend};
use crate::config::ShaderConfig;
use crate::frame::Programs;

/// A shader source that can be hot-reloaded from disk.
pub struct HotShader {
    path: PathBuf,
    last_modified: SystemTime,
    source: String,
}

impl HotShader {
    /// Load a shader from the given file path.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = fs::read_to_string(&path)?;
        let last_modified = fs::metadata(&path)?.modified()?;

        Ok(Self {
            path,
            last_modified,
            source,
        })
    }

    /// Check if the shader file has been modified and reload if so.
    /// Returns `true` if the shader was reloaded.
    pub fn check_reload(&mut self) -> bool {
        let Ok(modified) = fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return false;
        };

        if modified > self.last_modified {
            match fs::read_to_string(&self.path) {
                Ok(source) => {
                    self.source = source;
                    self.last_modified = modified;
                    return true;
                }
                Err(e) => log::warn!("failed to re-read {}: {e}", self.path.display()),
            }
        }

        false
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn program_source(&self, label: &str) -> ProgramSource {
        ProgramSource::new(label, self.source.as_str())
    }
}

/// User-supplied replacements for the built-in lit and flat programs.
///
/// `phong.wgsl` and `flat.wgsl` are looked up in the configured directory; a missing file
/// keeps the built-in program for that slot.
pub struct ShaderOverrides {
    lit: Option<HotShader>,
    flat: Option<HotShader>,
    hot_reload: bool,
}

impl ShaderOverrides {
    pub const LIT_FILE: &'static str = "phong.wgsl";
    pub const FLAT_FILE: &'static str = "flat.wgsl";

    /// No overrides; the built-in programs are used.
    pub fn none() -> Self {
        Self {
            lit: None,
            flat: None,
            hot_reload: false,
        }
    }

    pub fn load(config: &ShaderConfig) -> Self {
        let Some(dir) = &config.dir else {
            return Self::none();
        };
        Self {
            lit: Self::open(&dir.join(Self::LIT_FILE)),
            flat: Self::open(&dir.join(Self::FLAT_FILE)),
            hot_reload: config.hot_reload,
        }
    }

    fn open(path: &Path) -> Option<HotShader> {
        if !path.is_file() {
            return None;
        }
        match HotShader::new(path) {
            Ok(shader) => {
                log::info!("using shader override {}", path.display());
                Some(shader)
            }
            Err(e) => {
                log::warn!("failed to read shader override {}: {e}", path.display());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lit.is_none() && self.flat.is_none()
    }

    /// Compiles both programs, falling back to the built-in source when an override fails.
    pub fn compile_programs<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Programs, BackendError> {
        Ok(Programs {
            lit: Self::compile_slot(backend, self.lit.as_ref(), ProgramSource::phong())?,
            flat: Self::compile_slot(backend, self.flat.as_ref(), ProgramSource::flat())?,
        })
    }

    fn compile_slot<B: RenderBackend + ?Sized>(
        backend: &mut B,
        shader: Option<&HotShader>,
        builtin: ProgramSource,
    ) -> Result<ProgramId, BackendError> {
        if let Some(shader) = shader {
            match backend.compile_program(&shader.program_source(&builtin.label)) {
                Ok(id) => return Ok(id),
                Err(e) => log::warn!("{e}; using the built-in {} program", builtin.label),
            }
        }
        backend.compile_program(&builtin)
    }

    /// Recompiles overrides whose files changed since the last check.
    ///
    /// Returns the number of programs replaced. Does nothing unless hot reload is enabled.
    pub fn check_reload<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        programs: Programs,
    ) -> usize {
        if !self.hot_reload {
            return 0;
        }
        let mut replaced = 0;
        for (shader, id, label) in [
            (self.lit.as_mut(), programs.lit, "phong"),
            (self.flat.as_mut(), programs.flat, "flat"),
        ] {
            let Some(shader) = shader else {
                continue;
            };
            if !shader.check_reload() {
                continue;
            }
            match backend.recompile_program(id, &shader.program_source(label)) {
                Ok(()) => {
                    log::info!("reloaded {}", shader.path().display());
                    replaced += 1;
                }
                Err(e) => log::warn!("{e}; keeping the previous {label} program"),
            }
        }
        replaced
    }
}
