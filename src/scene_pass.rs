//! wgpu implementation of [`RenderBackend`].
//!
//! # Architecture
//!
//! Every program shares one pipeline layout with two bind groups:
//! - **Group 0**: frame uniforms (projection matrix, light slots, light count)
//! - **Group 1**: draw uniforms (model-view, normal matrix, material), bound with a
//!   dynamic offset so each queued draw keeps its own slot in one buffer
//!
//! Draws are queued by [`RenderBackend::draw_mesh`] and recorded into a render pass by
//! [`ScenePass::finish`]. Pipelines are created on first use for each
//! `(program, raster mode, depth test, culling)` combination.
//!
//! # Depth Buffer
//!
//! The pass owns a `Depth32Float` buffer that follows the surface size.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::backend::{
    BackendError, FrameSetup, MeshId, ProgramId, ProgramSource, RasterState, RenderBackend,
    Surface, ViewLight,
};
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::scene::{MAX_LIGHTS, RasterMode};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Draw slots allocated up front; the buffer doubles when a frame needs more.
const INITIAL_DRAW_SLOTS: u64 = 16;

/// One light slot. `ambient.w` is 1 for an active light, 0 otherwise.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl From<&ViewLight> for LightUniform {
    fn from(light: &ViewLight) -> Self {
        let active = if light.active { 1.0 } else { 0.0 };
        Self {
            position: light.position.to_array(),
            ambient: light.ambient.extend(active).to_array(),
            diffuse: light.diffuse.extend(0.0).to_array(),
            specular: light.specular.extend(0.0).to_array(),
        }
    }
}

/// Group 0. Matches `Frame` in the WGSL programs.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub projection: [[f32; 4]; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
    pub light_count: u32,
    pub _pad: [u32; 3],
}

impl FrameUniforms {
    /// Packs the frame's lights; anything beyond [`MAX_LIGHTS`] is dropped.
    pub fn new(projection: Mat4, lights: &[ViewLight]) -> Self {
        let mut slots = [LightUniform::default(); MAX_LIGHTS];
        for (slot, light) in slots.iter_mut().zip(lights) {
            *slot = LightUniform::from(light);
        }
        Self {
            projection: projection.to_cols_array_2d(),
            lights: slots,
            light_count: lights.len().min(MAX_LIGHTS) as u32,
            _pad: [0; 3],
        }
    }
}

/// Group 1. Matches `Draw` in the WGSL programs; `specular.w` carries the shininess.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model_view: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl DrawUniforms {
    pub fn new(model_view: Mat4, surface: &Surface) -> Self {
        // Inverse transpose keeps normals perpendicular under non-uniform scale.
        let normal_matrix = model_view.inverse().transpose();
        Self {
            model_view: model_view.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            ambient: surface.ambient.extend(1.0).to_array(),
            diffuse: surface.diffuse.extend(1.0).to_array(),
            specular: surface.specular.extend(surface.shininess).to_array(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramId,
    mode: RasterMode,
    raster: RasterState,
}

struct Program {
    label: String,
    module: wgpu::ShaderModule,
}

struct QueuedDraw {
    mesh: MeshId,
    pipeline: PipelineKey,
    uniforms: DrawUniforms,
}

/// Renders the queued scene draws with depth testing and Blinn-Phong lighting.
pub struct ScenePass {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_slots: u64,
    slot_stride: u64,

    pipeline_layout: wgpu::PipelineLayout,
    programs: Vec<Program>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    meshes: Vec<Mesh>,

    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),

    clear_color: Vec3,
    raster: RasterState,
    model_view: Mat4,
    surface: Surface,
    queued: Vec<QueuedDraw>,
}

impl ScenePass {
    pub fn new(gpu: &GpuContext) -> Self {
        Self::with_device(
            &gpu.device,
            &gpu.queue,
            gpu.config.format,
            gpu.width(),
            gpu.height(),
        )
    }

    /// Builds the pass on an existing device, rendering into `color_format` targets.
    pub fn with_device(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let slot_stride = wgpu::util::align_to(std::mem::size_of::<DrawUniforms>() as u64, alignment);
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &draw_layout, INITIAL_DRAW_SLOTS * slot_stride);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let depth_view = Self::create_depth_view(device, width, height);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            color_format,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_slots: INITIAL_DRAW_SLOTS,
            slot_stride,
            pipeline_layout,
            programs: Vec::new(),
            pipelines: HashMap::new(),
            meshes: Vec::new(),
            depth_view,
            depth_size: (width, height),
            clear_color: Vec3::ZERO,
            raster: RasterState::default(),
            model_view: Mat4::IDENTITY,
            surface: Surface::WHITE,
            queued: Vec::new(),
        }
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        size: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn ensure_depth_size(&mut self, width: u32, height: u32) {
        if self.depth_size != (width, height) {
            self.depth_view = Self::create_depth_view(&self.device, width, height);
            self.depth_size = (width, height);
        }
    }

    fn ensure_draw_slots(&mut self, needed: u64) {
        if needed <= self.draw_slots {
            return;
        }
        let mut slots = self.draw_slots.max(1);
        while slots < needed {
            slots *= 2;
        }
        log::debug!("growing draw uniform buffer to {slots} slots");
        let (buffer, bind_group) =
            Self::create_draw_buffer(&self.device, &self.draw_layout, slots * self.slot_stride);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_slots = slots;
    }

    /// Compiles `source` and links it into a filled pipeline, so a module that parses but
    /// lacks the `vs`/`fs` entry points or mismatches the shared layout fails here instead
    /// of at the first draw.
    fn compile(
        &self,
        source: &ProgramSource,
    ) -> Result<(Program, wgpu::RenderPipeline), BackendError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.as_str().into()),
        });
        let pipeline = self.create_pipeline(
            &source.label,
            &module,
            RasterMode::Filled,
            RasterState::default(),
        );
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BackendError::ShaderCompile {
                label: source.label.clone(),
                message: error.to_string(),
            });
        }
        let program = Program {
            label: source.label.clone(),
            module,
        };
        Ok((program, pipeline))
    }

    /// Cache key of the pipeline built alongside a freshly compiled program.
    fn linked_key(program: ProgramId) -> PipelineKey {
        PipelineKey {
            program,
            mode: RasterMode::Filled,
            raster: RasterState::default(),
        }
    }

    fn create_pipeline(
        &self,
        label: &str,
        module: &wgpu::ShaderModule,
        mode: RasterMode,
        raster: RasterState,
    ) -> wgpu::RenderPipeline {
        let (topology, cull_mode) = match mode {
            RasterMode::Filled => (
                wgpu::PrimitiveTopology::TriangleList,
                raster.backface_culling.then_some(wgpu::Face::Back),
            ),
            RasterMode::Wireframe => (wgpu::PrimitiveTopology::LineList, None),
        };
        let (depth_write_enabled, depth_compare) = if raster.depth_test {
            (true, wgpu::CompareFunction::Less)
        } else {
            (false, wgpu::CompareFunction::Always)
        };

        log::debug!(
            "creating pipeline for '{label}' ({}, depth {}, culling {})",
            mode.name(),
            raster.depth_test,
            raster.backface_culling
        );

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode,
                    front_face: wgpu::FrontFace::Ccw,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    fn pipeline_for(&mut self, key: PipelineKey) -> Result<(), BackendError> {
        if self.pipelines.contains_key(&key) {
            return Ok(());
        }
        let program = self
            .programs
            .get(key.program.0)
            .ok_or(BackendError::UnknownProgram(key.program))?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.create_pipeline(&program.label, &program.module, key.mode, key.raster);
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BackendError::ShaderCompile {
                label: program.label.clone(),
                message: error.to_string(),
            });
        }

        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    /// Records the queued draws into a render pass over `target`, clearing it first.
    pub fn finish(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        self.ensure_depth_size(gpu.width(), gpu.height());
        self.ensure_draw_slots(self.queued.len() as u64);

        if !self.queued.is_empty() {
            let mut bytes = vec![0u8; self.queued.len() * self.slot_stride as usize];
            for (i, draw) in self.queued.iter().enumerate() {
                let start = i * self.slot_stride as usize;
                let uniforms = bytemuck::bytes_of(&draw.uniforms);
                bytes[start..start + uniforms.len()].copy_from_slice(uniforms);
            }
            self.queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }

        let clear = self.clear_color;
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.x as f64,
                        g: clear.y as f64,
                        b: clear.z as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, draw) in self.queued.iter().enumerate() {
            let (Some(pipeline), Some(mesh)) =
                (self.pipelines.get(&draw.pipeline), self.meshes.get(draw.mesh.0))
            else {
                continue;
            };
            let (index_buffer, index_count) = mesh.indices(draw.pipeline.mode);
            let offset = (i as u64 * self.slot_stride) as u32;

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..index_count, 0, 0..1);
        }

        drop(render_pass);
        self.queued.clear();
    }
}

impl RenderBackend for ScenePass {
    fn compile_program(&mut self, source: &ProgramSource) -> Result<ProgramId, BackendError> {
        let (program, pipeline) = self.compile(source)?;
        self.programs.push(program);
        let id = ProgramId(self.programs.len() - 1);
        self.pipelines.insert(Self::linked_key(id), pipeline);
        Ok(id)
    }

    fn recompile_program(
        &mut self,
        id: ProgramId,
        source: &ProgramSource,
    ) -> Result<(), BackendError> {
        if id.0 >= self.programs.len() {
            return Err(BackendError::UnknownProgram(id));
        }
        let (program, pipeline) = self.compile(source)?;
        self.programs[id.0] = program;
        // Cached pipelines still reference the old module.
        self.pipelines.retain(|key, _| key.program != id);
        self.pipelines.insert(Self::linked_key(id), pipeline);
        Ok(())
    }

    fn create_mesh(&mut self, geometry: &RawGeometry) -> Result<MeshId, BackendError> {
        let mesh = Mesh::new(&self.device, geometry)?;
        self.meshes.push(mesh);
        Ok(MeshId(self.meshes.len() - 1))
    }

    fn begin_frame(&mut self, setup: &FrameSetup) {
        self.clear_color = setup.clear_color;
        self.raster = setup.raster;
        self.model_view = Mat4::IDENTITY;
        self.surface = Surface::WHITE;
        self.queued.clear();

        let uniforms = FrameUniforms::new(setup.projection, &setup.lights);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn set_model_view(&mut self, model_view: Mat4) {
        self.model_view = model_view;
    }

    fn set_surface(&mut self, surface: &Surface) {
        self.surface = *surface;
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
        let key = PipelineKey {
            program,
            mode,
            raster: self.raster,
        };
        self.pipeline_for(key)?;

        self.queued.push(QueuedDraw {
            mesh,
            pipeline: key,
            uniforms: DrawUniforms::new(self.model_view, &self.surface),
        });
        Ok(())
    }
}
