//! The winit event loop: window creation, input dispatch and the per-frame redraw.

use std::sync::Arc;

use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::{FontAtlas, find_font};
use crate::backend::BackendError;
use crate::config::{PanelConfig, ViewerConfig};
use crate::controls;
use crate::frame::{FrameDriver, FrameError};
use crate::gpu::{GpuContext, GpuError};
use crate::hot_shader::ShaderOverrides;
use crate::input::Input;
use crate::mesh::SceneMeshes;
use crate::overlay::Overlay;
use crate::panel::Panel;
use crate::scene::{MAX_LIGHTS, RenderState};
use crate::scene_pass::ScenePass;
use crate::transform_stack::TransformStack;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("the GPU ran out of memory")]
    OutOfMemory,
}

/// Opens the viewer window and runs until it is closed.
pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ViewerApp::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

enum ViewerApp {
    /// Waiting for the event loop to resume so a window can be created.
    Pending { config: ViewerConfig },
    Running(Box<Viewer>),
    Failed(AppError),
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ViewerApp::Pending { config } = self else {
            return;
        };
        match Viewer::new(event_loop, config) {
            Ok(viewer) => *self = ViewerApp::Running(Box::new(viewer)),
            Err(e) => {
                log::error!("failed to start viewer: {e}");
                *self = ViewerApp::Failed(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ViewerApp::Running(viewer) = self else {
            return;
        };
        match viewer.handle_event(event_loop, event) {
            Ok(()) => {}
            Err(e) => {
                log::error!("{e}");
                *self = ViewerApp::Failed(e);
                event_loop.exit();
            }
        }
    }
}

/// Everything owned by a running viewer window.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    scene_pass: ScenePass,
    driver: FrameDriver,
    state: RenderState,
    panel: Panel,
    overlay: Overlay,
    font: Option<FontAtlas>,
    input: Input,
    shaders: ShaderOverrides,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, AppError> {
        let attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let mut scene_pass = ScenePass::new(&gpu);
        let shaders = ShaderOverrides::load(&config.shaders);
        let programs = shaders.compile_programs(&mut scene_pass)?;
        let meshes = SceneMeshes::build(&mut scene_pass)?;

        let stack = match config.stack.max_depth {
            Some(limit) => TransformStack::with_depth_limit(limit),
            None => TransformStack::new(),
        };
        let driver = FrameDriver::new(stack, meshes, programs);

        let mut overlay = Overlay::new(&gpu);
        let font = load_font(&gpu, &config.panel);
        if let Some(font) = &font {
            overlay.set_font(&gpu, font);
        }

        log::info!(
            "viewer ready: {}x{}, up to {} lights",
            gpu.width(),
            gpu.height(),
            config.scene.max_lights.min(MAX_LIGHTS)
        );

        Ok(Self {
            window,
            gpu,
            scene_pass,
            driver,
            state: RenderState::from_config(config),
            panel: Panel::new(config.panel.visible),
            overlay,
            font,
            input: Input::new(),
            shaders,
        })
    }

    fn handle_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> Result<(), AppError> {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.gpu.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                self.redraw()?;
                self.input.begin_frame();
                self.window.request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        for command in controls::commands(&self.input, self.panel.visible) {
            controls::apply(command, &mut self.state, &mut self.panel);
        }
        self.shaders
            .check_reload(&mut self.scene_pass, self.driver.programs());

        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        self.driver
            .render(&mut self.scene_pass, &self.state, self.gpu.aspect())?;

        self.overlay.clear();
        self.panel.render(
            &mut self.overlay,
            self.font.as_ref(),
            &self.state,
            self.gpu.height() as f32,
        );

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(AppError::OutOfMemory),
            Err(e) => {
                log::warn!("failed to acquire surface texture: {e}");
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.scene_pass.finish(&self.gpu, &mut encoder, &view);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.overlay.render(&self.gpu, &mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Loads the panel font. Without one the panel shows value bars only.
fn load_font(gpu: &GpuContext, config: &PanelConfig) -> Option<FontAtlas> {
    let result = find_font(config.font_path.as_deref())
        .and_then(|path| FontAtlas::load(gpu, &path, config.font_size));
    match result {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("panel text disabled: {e}");
            None
        }
    }
}
