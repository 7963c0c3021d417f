//! GPU pipelines and per-emitter streaming buffers.
//!
//! The renderer owns what is shared between emitters: the two render
//! pipelines (expanded quads and compact records), their wireframe debug
//! variants when the device supports line rasterization, and the bind group
//! layouts. Each emitter then gets its own [`EmitterBuffers`]: a vertex or
//! instance buffer sized to the pool capacity, a uniform buffer and the
//! bind groups.
//!
//! Per frame, [`ParticleRenderer::prepare`] streams the live particles into
//! the emitter's buffer with write-discard semantics (every live record is
//! rewritten, nothing is read back) and [`ParticleRenderer::draw`] records
//! exactly one draw call sized to the live count. Because uploads compact
//! the pool's two slices into emission order, a wrapped pool costs one
//! extra `write_buffer`, never an extra draw.

use wgpu::util::DeviceExt;

use glam::Vec3;

use crate::camera::Camera;
use crate::config::EmitterConfig;
use crate::emitter::Emitter;
use crate::gpu::{GpuContext, DEPTH_FORMAT};
use crate::particle::Particle;
use crate::stream::{self, QuadVertex};
use crate::texture::SpriteTexture;

/// How an emitter's particles travel to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// CPU expands each particle to four vertices; GPU only rasterizes.
    ExpandedQuads,
    /// Raw records upload as instances; the vertex shader expands them.
    CompactRecords,
}

/// Per-draw constants. Must match `FrameUniforms` in both WGSL files.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    /// xyz: acceleration, w: lifetime.
    accel_lifetime: [f32; 4],
    start_color: [f32; 4],
    end_color: [f32; 4],
    /// x: start size, y: end size.
    size_params: [f32; 4],
    /// x: columns, y: rows, z: frame count, w: speed scale.
    sheet: [f32; 4],
}

impl FrameUniforms {
    fn build(config: &EmitterConfig, camera: &Camera, aspect: f32, right: Vec3, up: Vec3) -> Self {
        let sheet = config.sprite_sheet.unwrap_or_default();
        let accel = config.acceleration;
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            camera_right: [right.x, right.y, right.z, 0.0],
            camera_up: [up.x, up.y, up.z, 0.0],
            accel_lifetime: [accel.x, accel.y, accel.z, config.lifetime()],
            start_color: config.start_color.to_array(),
            end_color: config.end_color.to_array(),
            size_params: [config.start_size, config.end_size, 0.0, 0.0],
            sheet: [
                sheet.grid_columns() as f32,
                sheet.grid_rows() as f32,
                sheet.frame_count() as f32,
                sheet.speed_scale,
            ],
        }
    }
}

/// Mode-specific GPU storage for one emitter.
enum Geometry {
    Quads {
        vertex_buffer: wgpu::Buffer,
        index_buffer: wgpu::Buffer,
        /// Reused CPU staging for the expanded vertices.
        scratch: Vec<QuadVertex>,
    },
    Records {
        instance_buffer: wgpu::Buffer,
    },
}

/// GPU-side state for one emitter: streaming buffer, uniforms, bindings.
///
/// Created by [`ParticleRenderer::create_buffers`] and resized automatically
/// when the emitter's pool capacity changes.
pub struct EmitterBuffers {
    geometry: Geometry,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl EmitterBuffers {
    pub fn mode(&self) -> StreamMode {
        match self.geometry {
            Geometry::Quads { .. } => StreamMode::ExpandedQuads,
            Geometry::Records { .. } => StreamMode::CompactRecords,
        }
    }
}

/// Shared pipelines and layouts for drawing emitters.
pub struct ParticleRenderer {
    quad_pipeline: wgpu::RenderPipeline,
    record_pipeline: wgpu::RenderPipeline,
    quad_wireframe: Option<wgpu::RenderPipeline>,
    record_wireframe: Option<wgpu::RenderPipeline>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
}

impl ParticleRenderer {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let billboard_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Billboard Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("billboard.wgsl").into()),
        });
        let record_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Record Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("record.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let quad_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            &billboard_shader,
            &[QuadVertex::layout()],
            gpu.config.format,
            wgpu::PolygonMode::Fill,
            "Quad Pipeline",
        );
        let record_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            &record_shader,
            &[Particle::instance_layout()],
            gpu.config.format,
            wgpu::PolygonMode::Fill,
            "Record Pipeline",
        );

        let (quad_wireframe, record_wireframe) = if gpu.supports_wireframe() {
            (
                Some(build_pipeline(
                    device,
                    &pipeline_layout,
                    &billboard_shader,
                    &[QuadVertex::layout()],
                    gpu.config.format,
                    wgpu::PolygonMode::Line,
                    "Quad Wireframe Pipeline",
                )),
                Some(build_pipeline(
                    device,
                    &pipeline_layout,
                    &record_shader,
                    &[Particle::instance_layout()],
                    gpu.config.format,
                    wgpu::PolygonMode::Line,
                    "Record Wireframe Pipeline",
                )),
            )
        } else {
            (None, None)
        };

        Self {
            quad_pipeline,
            record_pipeline,
            quad_wireframe,
            record_wireframe,
            uniform_layout,
            texture_layout,
        }
    }

    /// Allocates GPU storage for one emitter at its current pool capacity.
    pub fn create_buffers(
        &self,
        gpu: &GpuContext,
        emitter: &Emitter,
        sprite: &SpriteTexture,
        mode: StreamMode,
    ) -> EmitterBuffers {
        let device = &gpu.device;
        let geometry = create_geometry(device, mode, emitter.capacity());

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sprite.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sprite.sampler),
                },
            ],
        });

        EmitterBuffers {
            geometry,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            capacity: emitter.capacity(),
        }
    }

    /// Streams this frame's state for one emitter: per-draw uniforms plus
    /// the live particles, compacted into emission order.
    ///
    /// Runs even for paused or hidden emitters (uniforms stay current so
    /// unhiding needs no special case), but skips the particle upload when
    /// nothing will be drawn.
    pub fn prepare(
        &self,
        gpu: &GpuContext,
        buffers: &mut EmitterBuffers,
        emitter: &Emitter,
        camera: &Camera,
    ) {
        if emitter.capacity() != buffers.capacity {
            log::debug!("resizing emitter buffers to {} particles", emitter.capacity());
            buffers.geometry = create_geometry(&gpu.device, buffers.mode(), emitter.capacity());
            buffers.capacity = emitter.capacity();
        }

        let config = emitter.config();
        let (right, up) = camera.billboard_axes(config.constrain_y);
        let uniforms = FrameUniforms::build(config, camera, gpu.aspect(), right, up);
        gpu.queue
            .write_buffer(&buffers.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if !emitter.is_visible() || emitter.live_count() == 0 {
            return;
        }

        match &mut buffers.geometry {
            Geometry::Quads {
                vertex_buffer,
                scratch,
                ..
            } => {
                stream::expand_pool(emitter.pool(), config, right, up, scratch);
                gpu.queue
                    .write_buffer(vertex_buffer, 0, bytemuck::cast_slice(scratch));
            }
            Geometry::Records { instance_buffer } => {
                // At most two copies: the pool's live run is contiguous in
                // ring order, and a wrapped run lands head then tail so the
                // buffer front holds `live_count` records oldest-first.
                let (head, tail) = emitter.pool().alive_slices();
                gpu.queue
                    .write_buffer(instance_buffer, 0, bytemuck::cast_slice(head));
                if !tail.is_empty() {
                    let offset = std::mem::size_of_val(head) as wgpu::BufferAddress;
                    gpu.queue
                        .write_buffer(instance_buffer, offset, bytemuck::cast_slice(tail));
                }
            }
        }
    }

    /// Records one draw call covering the emitter's live particles.
    /// Invisible or empty emitters record nothing.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        buffers: &EmitterBuffers,
        emitter: &Emitter,
        wireframe: bool,
    ) {
        let live = emitter.live_count();
        if live == 0 || !emitter.is_visible() {
            return;
        }

        pass.set_pipeline(self.select_pipeline(buffers.mode(), wireframe));
        pass.set_bind_group(0, &buffers.uniform_bind_group, &[]);
        pass.set_bind_group(1, &buffers.texture_bind_group, &[]);

        match &buffers.geometry {
            Geometry::Quads {
                vertex_buffer,
                index_buffer,
                ..
            } => {
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..(live * stream::INDICES_PER_PARTICLE) as u32, 0, 0..1);
            }
            Geometry::Records { instance_buffer } => {
                pass.set_vertex_buffer(0, instance_buffer.slice(..));
                pass.draw(0..6, 0..live as u32);
            }
        }
    }

    /// Wireframe falls back to the fill pipeline on devices without line
    /// rasterization.
    fn select_pipeline(&self, mode: StreamMode, wireframe: bool) -> &wgpu::RenderPipeline {
        match (mode, wireframe) {
            (StreamMode::ExpandedQuads, true) => {
                self.quad_wireframe.as_ref().unwrap_or(&self.quad_pipeline)
            }
            (StreamMode::ExpandedQuads, false) => &self.quad_pipeline,
            (StreamMode::CompactRecords, true) => self
                .record_wireframe
                .as_ref()
                .unwrap_or(&self.record_pipeline),
            (StreamMode::CompactRecords, false) => &self.record_pipeline,
        }
    }
}

fn create_geometry(device: &wgpu::Device, mode: StreamMode, capacity: usize) -> Geometry {
    match mode {
        StreamMode::ExpandedQuads => {
            let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Quad Buffer"),
                size: (capacity
                    * stream::VERTICES_PER_PARTICLE
                    * std::mem::size_of::<QuadVertex>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            // Index pattern depends only on capacity; built once here.
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Index Buffer"),
                contents: bytemuck::cast_slice(&stream::quad_indices(capacity)),
                usage: wgpu::BufferUsages::INDEX,
            });
            Geometry::Quads {
                vertex_buffer,
                index_buffer,
                scratch: Vec::new(),
            }
        }
        StreamMode::CompactRecords => {
            let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Record Buffer"),
                size: (capacity * std::mem::size_of::<Particle>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            Geometry::Records { instance_buffer }
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            // Translucent quads: test against the scene, never write.
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

// ===== TESTS =====
