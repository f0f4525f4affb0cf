//! GPU resource manager
//!
//! One [`ResourceTable`] per kind of object the device can produce. All
//! creation goes through the methods here: the device call runs, the result
//! lands in its table, and the caller walks away with nothing but a
//! [`Handle`]. Renderer code resolves handles at draw time and treats a
//! miss as "skip this slot".

use wgpu::util::DeviceExt;

use crate::gfx::rendering::vertex::Vertex3D;
use crate::gfx::resources::handles::{Handle, ResourceTable};
use crate::gfx::texture::TextureData;

/// Depth format shared by the depth buffer and the shadow cubes
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A texture together with its default shader view
pub struct TextureBundle {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Per-kind handle tables over one wgpu device
#[derive(Default)]
pub struct GpuResources {
    buffers: ResourceTable<wgpu::Buffer>,
    shaders: ResourceTable<wgpu::ShaderModule>,
    pipelines: ResourceTable<wgpu::RenderPipeline>,
    bind_group_layouts: ResourceTable<wgpu::BindGroupLayout>,
    bind_groups: ResourceTable<wgpu::BindGroup>,
    samplers: ResourceTable<wgpu::Sampler>,
    textures: ResourceTable<TextureBundle>,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    // --- creation ---

    pub fn create_vertex_buffer(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        vertices: &[Vertex3D],
    ) -> Handle<wgpu::Buffer> {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.buffers.insert(buffer)
    }

    pub fn create_index_buffer(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        indices: &[u32],
    ) -> Handle<wgpu::Buffer> {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.buffers.insert(buffer)
    }

    /// Creates a zero-initialized uniform buffer of `size` bytes
    pub fn create_uniform_buffer(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        size: u64,
    ) -> Handle<wgpu::Buffer> {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.buffers.insert(buffer)
    }

    pub fn create_shader_module(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        wgsl: &str,
    ) -> Handle<wgpu::ShaderModule> {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });
        self.shaders.insert(module)
    }

    /// Linear clamp-to-edge sampler for color textures
    pub fn create_color_sampler(&mut self, device: &wgpu::Device) -> Handle<wgpu::Sampler> {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("color sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        self.samplers.insert(sampler)
    }

    /// Comparison sampler for shadow-map lookups
    pub fn create_shadow_sampler(&mut self, device: &wgpu::Device) -> Handle<wgpu::Sampler> {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        self.samplers.insert(sampler)
    }

    /// Depth buffer matching the presentation surface
    pub fn create_depth_texture(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Handle<TextureBundle> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.insert(TextureBundle { texture, view })
    }

    /// Depth texture holding one shadow cube per light
    ///
    /// `cubes * 6` layers; the stored view is a cube-array view for
    /// sampling. Render targets for individual faces come from
    /// [`GpuResources::shadow_face_view`].
    pub fn create_shadow_cube_array(
        &mut self,
        device: &wgpu::Device,
        size: u32,
        cubes: u32,
    ) -> Handle<TextureBundle> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow cubes"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: cubes * 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow cubes view"),
            dimension: Some(wgpu::TextureViewDimension::CubeArray),
            ..Default::default()
        });
        self.textures.insert(TextureBundle { texture, view })
    }

    /// A depth-attachment view onto face `face` of cube `cube` in a shadow
    /// cube array
    pub fn shadow_face_view(
        &self,
        handle: Handle<TextureBundle>,
        cube: u32,
        face: u32,
    ) -> Option<wgpu::TextureView> {
        let bundle = self.textures.get(handle)?;
        Some(bundle.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow cube face"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: cube * 6 + face,
            array_layer_count: Some(1),
            ..Default::default()
        }))
    }

    /// Uploads decoded RGBA8 data as a 2D texture or texture array
    pub fn create_texture_from_data(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &TextureData,
    ) -> Handle<TextureBundle> {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: data.depth,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.channels * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let dimension = if data.depth > 1 {
            wgpu::TextureViewDimension::D2Array
        } else {
            wgpu::TextureViewDimension::D2
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(dimension),
            ..Default::default()
        });
        self.textures.insert(TextureBundle { texture, view })
    }

    // --- registration for externally built objects ---

    pub fn register_pipeline(
        &mut self,
        pipeline: wgpu::RenderPipeline,
    ) -> Handle<wgpu::RenderPipeline> {
        self.pipelines.insert(pipeline)
    }

    pub fn register_bind_group_layout(
        &mut self,
        layout: wgpu::BindGroupLayout,
    ) -> Handle<wgpu::BindGroupLayout> {
        self.bind_group_layouts.insert(layout)
    }

    pub fn register_bind_group(&mut self, group: wgpu::BindGroup) -> Handle<wgpu::BindGroup> {
        self.bind_groups.insert(group)
    }

    // --- lookup ---

    pub fn buffer(&self, handle: Handle<wgpu::Buffer>) -> Option<&wgpu::Buffer> {
        self.buffers.get(handle)
    }

    pub fn shader(&self, handle: Handle<wgpu::ShaderModule>) -> Option<&wgpu::ShaderModule> {
        self.shaders.get(handle)
    }

    pub fn pipeline(&self, handle: Handle<wgpu::RenderPipeline>) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(handle)
    }

    pub fn bind_group_layout(
        &self,
        handle: Handle<wgpu::BindGroupLayout>,
    ) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layouts.get(handle)
    }

    pub fn bind_group(&self, handle: Handle<wgpu::BindGroup>) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(handle)
    }

    pub fn sampler(&self, handle: Handle<wgpu::Sampler>) -> Option<&wgpu::Sampler> {
        self.samplers.get(handle)
    }

    pub fn texture(&self, handle: Handle<TextureBundle>) -> Option<&TextureBundle> {
        self.textures.get(handle)
    }

    pub fn remove_texture(&mut self, handle: Handle<TextureBundle>) -> Option<TextureBundle> {
        self.textures.remove(handle)
    }

    pub fn remove_buffer(&mut self, handle: Handle<wgpu::Buffer>) -> Option<wgpu::Buffer> {
        self.buffers.remove(handle)
    }
}
