//! wgpu renderer: device bring-up, passes, command execution
//!
//! The renderer owns the surface, the device and all GPU resource tables,
//! plus the frame-global uniform buffers and the two pipelines (main color
//! pass and shadow depth pass). One frame is 24 shadow passes (4 lights by
//! 6 cube faces) followed by one main pass that presents.
//!
//! Each pass records the scene into [`FrameCommands`] and then executes the
//! command list: uniform writes through the queue, draws through one render
//! pass encoder. Device and surface failures are fatal and propagate as
//! [`GfxError`] to the event loop.

use log::warn;

use crate::gfx::error::GfxError;
use crate::gfx::rendering::frame::{
    self, Command, FrameCommands, PassKind, RenderScene, MAX_LIGHTS, OBJECT_UNIFORM_STRIDE,
};
use crate::gfx::rendering::vertex::Vertex3D;
use crate::gfx::resources::gpu::{GpuResources, TextureBundle, DEPTH_FORMAT};
use crate::gfx::resources::handles::Handle;
use crate::gfx::texture::TextureData;

const MAIN_SHADER: &str = include_str!("shaders/main.wgsl");
const SHADOW_SHADER: &str = include_str!("shaders/shadow.wgsl");

/// Side length of each shadow cube face in texels
const SHADOW_MAP_SIZE: u32 = 1024;

/// Number of per-object uniform slots in the object buffer
const OBJECT_CAPACITY: u64 = 256;

/// Background color of the main pass
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.09,
    g: 0.76,
    b: 0.76,
    a: 1.0,
};

/// Where a pass renders to
#[derive(Debug, Clone, Copy)]
pub enum PassTarget {
    /// Color + depth to the presentation surface; presents when done
    Main,
    /// Depth only, into one face of one light's shadow cube
    ShadowFace { light_slot: u32, face: u32 },
}

impl PassTarget {
    fn kind(&self) -> PassKind {
        match self {
            PassTarget::Main => PassKind::Main,
            PassTarget::ShadowFace { .. } => PassKind::ShadowMap,
        }
    }
}

/// Handles of the frame-global uniform buffers, for scene construction
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffers {
    pub camera: Handle<wgpu::Buffer>,
    pub object: Handle<wgpu::Buffer>,
    pub light: Handle<wgpu::Buffer>,
    pub other: Handle<wgpu::Buffer>,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    resources: GpuResources,

    camera_buffer: Handle<wgpu::Buffer>,
    object_buffer: Handle<wgpu::Buffer>,
    light_buffer: Handle<wgpu::Buffer>,
    other_buffer: Handle<wgpu::Buffer>,

    depth_texture: Handle<TextureBundle>,
    shadow_texture: Handle<TextureBundle>,

    main_pipeline: Handle<wgpu::RenderPipeline>,
    shadow_pipeline: Handle<wgpu::RenderPipeline>,

    frame_bind_group: Handle<wgpu::BindGroup>,
    shadow_frame_bind_group: Handle<wgpu::BindGroup>,
    object_bind_group: Handle<wgpu::BindGroup>,
    shadow_sample_bind_group: Handle<wgpu::BindGroup>,
    default_texture_bind_group: Handle<wgpu::BindGroup>,

    texture_layout: Handle<wgpu::BindGroupLayout>,
    color_sampler: Handle<wgpu::Sampler>,
}

impl Renderer {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Renderer, GfxError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("shadowbox device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut resources = GpuResources::new();

        let camera_buffer = resources.create_uniform_buffer(
            &device,
            "camera uniforms",
            std::mem::size_of::<frame::CameraUniform>() as u64,
        );
        let object_buffer = resources.create_uniform_buffer(
            &device,
            "object uniforms",
            OBJECT_CAPACITY * OBJECT_UNIFORM_STRIDE,
        );
        let light_buffer = resources.create_uniform_buffer(
            &device,
            "light uniforms",
            (MAX_LIGHTS * std::mem::size_of::<frame::LightUniform>()) as u64,
        );
        let other_buffer = resources.create_uniform_buffer(
            &device,
            "other uniforms",
            std::mem::size_of::<frame::OtherUniform>() as u64,
        );

        let depth_texture = resources.create_depth_texture(&device, config.width, config.height);
        let shadow_texture =
            resources.create_shadow_cube_array(&device, SHADOW_MAP_SIZE, MAX_LIGHTS as u32);

        let color_sampler = resources.create_color_sampler(&device);
        let shadow_sampler = resources.create_shadow_sampler(&device);

        let main_shader = resources.create_shader_module(&device, "main shader", MAIN_SHADER);
        let shadow_shader = resources.create_shader_module(&device, "shadow shader", SHADOW_SHADER);

        // Bind group layouts: frame-global (group 0), per-object dynamic
        // slot (group 1), base color texture (group 2), shadow cubes
        // (group 3). The shadow pass uses a camera-only group 0.
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame layout"),
            entries: &[
                uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false),
                uniform_layout_entry(1, wgpu::ShaderStages::FRAGMENT, false),
                uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let shadow_frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow frame layout"),
                entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX, false)],
            });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX, true)],
        });
        let texture_layout_raw =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        let shadow_sample_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow sample layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::CubeArray,
                            sample_type: wgpu::TextureSampleType::Depth,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let frame_bind_group = {
            let camera = resources
                .buffer(camera_buffer)
                .ok_or(GfxError::MissingFrameBuffer("camera"))?;
            let light = resources
                .buffer(light_buffer)
                .ok_or(GfxError::MissingFrameBuffer("light"))?;
            let other = resources
                .buffer(other_buffer)
                .ok_or(GfxError::MissingFrameBuffer("other"))?;
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frame bindings"),
                layout: &frame_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: camera.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: light.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: other.as_entire_binding(),
                    },
                ],
            })
        };

        let shadow_frame_bind_group = {
            let camera = resources
                .buffer(camera_buffer)
                .ok_or(GfxError::MissingFrameBuffer("camera"))?;
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("shadow frame bindings"),
                layout: &shadow_frame_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                }],
            })
        };

        let object_bind_group = {
            let object = resources
                .buffer(object_buffer)
                .ok_or(GfxError::MissingFrameBuffer("object"))?;
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("object bindings"),
                layout: &object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: object,
                        offset: 0,
                        size: wgpu::BufferSize::new(
                            std::mem::size_of::<frame::ObjectUniform>() as u64
                        ),
                    }),
                }],
            })
        };

        let shadow_sample_bind_group = {
            let cubes = resources
                .texture(shadow_texture)
                .ok_or(GfxError::MissingFrameBuffer("shadow cube"))?;
            let sampler = resources
                .sampler(shadow_sampler)
                .ok_or(GfxError::MissingFrameBuffer("shadow sampler"))?;
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("shadow sample bindings"),
                layout: &shadow_sample_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&cubes.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };

        // 1x1 white fallback for draw entries without a texture.
        let white = resources.create_texture_from_data(
            &device,
            &queue,
            "default white",
            &TextureData {
                width: 1,
                height: 1,
                depth: 1,
                channels: 4,
                data: vec![0xff, 0xff, 0xff, 0xff],
            },
        );
        let default_texture_bind_group = {
            let texture = resources
                .texture(white)
                .ok_or(GfxError::MissingFrameBuffer("default texture"))?;
            let sampler = resources
                .sampler(color_sampler)
                .ok_or(GfxError::MissingFrameBuffer("color sampler"))?;
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("default texture bindings"),
                layout: &texture_layout_raw,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };

        let main_pipeline_raw = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("main pipeline layout"),
                bind_group_layouts: &[
                    &frame_layout,
                    &object_layout,
                    &texture_layout_raw,
                    &shadow_sample_layout,
                ],
                push_constant_ranges: &[],
            });
            let shader = resources
                .shader(main_shader)
                .ok_or(GfxError::MissingFrameBuffer("main shader"))?;
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("main pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let shadow_pipeline_raw = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow pipeline layout"),
                bind_group_layouts: &[&shadow_frame_layout, &object_layout],
                push_constant_ranges: &[],
            });
            let shader = resources
                .shader(shadow_shader)
                .ok_or(GfxError::MissingFrameBuffer("shadow shader"))?;
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("shadow pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    // Constant + slope bias against shadow acne.
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let main_pipeline = resources.register_pipeline(main_pipeline_raw);
        let shadow_pipeline = resources.register_pipeline(shadow_pipeline_raw);
        let frame_bind_group = resources.register_bind_group(frame_bind_group);
        let shadow_frame_bind_group = resources.register_bind_group(shadow_frame_bind_group);
        let object_bind_group = resources.register_bind_group(object_bind_group);
        let shadow_sample_bind_group = resources.register_bind_group(shadow_sample_bind_group);
        let default_texture_bind_group = resources.register_bind_group(default_texture_bind_group);
        let texture_layout = resources.register_bind_group_layout(texture_layout_raw);

        Ok(Renderer {
            surface,
            device,
            queue,
            config,
            resources,
            camera_buffer,
            object_buffer,
            light_buffer,
            other_buffer,
            depth_texture,
            shadow_texture,
            main_pipeline,
            shadow_pipeline,
            frame_bind_group,
            shadow_frame_bind_group,
            object_bind_group,
            shadow_sample_bind_group,
            default_texture_bind_group,
            texture_layout,
            color_sampler,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut GpuResources {
        &mut self.resources
    }

    /// Uniform buffer handles for scene construction
    pub fn frame_buffers(&self) -> FrameBuffers {
        FrameBuffers {
            camera: self.camera_buffer,
            object: self.object_buffer,
            light: self.light_buffer,
            other: self.other_buffer,
        }
    }

    /// Pipeline handle draw entries should reference for the main pass
    pub fn main_pipeline(&self) -> Handle<wgpu::RenderPipeline> {
        self.main_pipeline
    }

    /// Builds a bind group pairing a loaded texture with the color sampler
    pub fn create_texture_bind_group(
        &mut self,
        texture: Handle<TextureBundle>,
    ) -> Result<Handle<wgpu::BindGroup>, GfxError> {
        let group = {
            let bundle = self
                .resources
                .texture(texture)
                .ok_or(GfxError::MissingFrameBuffer("texture"))?;
            let sampler = self
                .resources
                .sampler(self.color_sampler)
                .ok_or(GfxError::MissingFrameBuffer("color sampler"))?;
            let layout = self
                .resources
                .bind_group_layout(self.texture_layout)
                .ok_or(GfxError::MissingFrameBuffer("texture layout"))?;
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("texture bindings"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&bundle.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };
        Ok(self.resources.register_bind_group(group))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);

        self.resources.remove_texture(self.depth_texture);
        self.depth_texture =
            self.resources
                .create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Records and executes one pass over a scene
    pub fn render_pass(
        &mut self,
        target: PassTarget,
        scene: &mut RenderScene<'_>,
    ) -> Result<(), GfxError> {
        let commands = {
            let resources = &self.resources;
            frame::record_pass(target.kind(), scene, |entry| {
                resources.buffer(entry.vertex_buffer).is_some()
                    && resources.buffer(entry.index_buffer).is_some()
                    && resources.pipeline(entry.pipeline).is_some()
            })
        };
        self.execute(target, &commands)
    }

    fn execute(&self, target: PassTarget, commands: &FrameCommands) -> Result<(), GfxError> {
        // Uniform uploads first; the queue schedules them ahead of the
        // command buffer submitted below.
        for command in &commands.commands {
            if let Command::WriteUniform {
                buffer,
                offset,
                data,
            } = command
            {
                let buffer = self
                    .resources
                    .buffer(*buffer)
                    .ok_or(GfxError::MissingFrameBuffer("uniform"))?;
                if offset + data.len() as u64 > buffer.size() {
                    warn!("uniform write past end of buffer, skipping");
                    continue;
                }
                self.queue.write_buffer(buffer, *offset, data);
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pass encoder"),
            });

        let surface_texture = match target {
            PassTarget::Main => Some(self.surface.get_current_texture()?),
            PassTarget::ShadowFace { .. } => None,
        };

        {
            let surface_view = surface_texture.as_ref().map(|texture| {
                texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default())
            });

            let (color_attachments, depth_view) = match target {
                PassTarget::Main => {
                    let depth = self
                        .resources
                        .texture(self.depth_texture)
                        .ok_or(GfxError::MissingFrameBuffer("depth"))?;
                    (
                        vec![Some(wgpu::RenderPassColorAttachment {
                            view: surface_view.as_ref().ok_or(GfxError::MissingFrameBuffer(
                                "surface",
                            ))?,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth.view.clone(),
                    )
                }
                PassTarget::ShadowFace { light_slot, face } => {
                    let view = self
                        .resources
                        .shadow_face_view(self.shadow_texture, light_slot, face)
                        .ok_or(GfxError::MissingFrameBuffer("shadow cube"))?;
                    (Vec::new(), view)
                }
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            match target.kind() {
                PassKind::Main => {
                    let frame_group = self
                        .resources
                        .bind_group(self.frame_bind_group)
                        .ok_or(GfxError::MissingFrameBuffer("frame bindings"))?;
                    let shadow_group = self
                        .resources
                        .bind_group(self.shadow_sample_bind_group)
                        .ok_or(GfxError::MissingFrameBuffer("shadow bindings"))?;
                    pass.set_bind_group(0, frame_group, &[]);
                    pass.set_bind_group(3, shadow_group, &[]);
                }
                PassKind::ShadowMap => {
                    let frame_group = self
                        .resources
                        .bind_group(self.shadow_frame_bind_group)
                        .ok_or(GfxError::MissingFrameBuffer("shadow frame bindings"))?;
                    let pipeline = self
                        .resources
                        .pipeline(self.shadow_pipeline)
                        .ok_or(GfxError::MissingFrameBuffer("shadow pipeline"))?;
                    pass.set_bind_group(0, frame_group, &[]);
                    pass.set_pipeline(pipeline);
                }
            }

            let object_group = self
                .resources
                .bind_group(self.object_bind_group)
                .ok_or(GfxError::MissingFrameBuffer("object bindings"))?;

            for command in &commands.commands {
                let (entry, object_offset) = match command {
                    Command::DrawIndexed {
                        entry,
                        object_offset,
                    } => (entry, *object_offset),
                    Command::WriteUniform { .. } => continue,
                };
                if object_offset + OBJECT_UNIFORM_STRIDE > OBJECT_CAPACITY * OBJECT_UNIFORM_STRIDE
                {
                    warn!("draw entry past object buffer capacity, skipping");
                    continue;
                }

                let (vertex_buffer, index_buffer) = match (
                    self.resources.buffer(entry.vertex_buffer),
                    self.resources.buffer(entry.index_buffer),
                ) {
                    (Some(v), Some(i)) => (v, i),
                    _ => continue,
                };

                if target.kind() == PassKind::Main {
                    match self.resources.pipeline(entry.pipeline) {
                        Some(pipeline) => pass.set_pipeline(pipeline),
                        None => continue,
                    }
                    let texture_group = self
                        .resources
                        .bind_group(entry.texture_bind_group)
                        .or_else(|| self.resources.bind_group(self.default_texture_bind_group))
                        .ok_or(GfxError::MissingFrameBuffer("texture bindings"))?;
                    pass.set_bind_group(2, texture_group, &[]);
                }

                pass.set_bind_group(1, object_group, &[object_offset as u32]);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..entry.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(surface_texture) = surface_texture {
            surface_texture.present();
        }
        Ok(())
    }
}

fn uniform_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    dynamic: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}
