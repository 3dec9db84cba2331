//! Forward renderer
//!
//! Two pipelines share a single render pass: a full-screen background
//! triangle (only when the scene background is a texture, otherwise the clear
//! colour does the job) followed by lit meshes. GPU buffers are created lazily
//! per `(node, primitive)` and live as long as the renderer.
//! Skinned primitives are skinned on the CPU and re-uploaded every frame.

use std::collections::HashMap;
use std::mem::size_of;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::context::{DEPTH_FORMAT, WgpuContext};
use crate::errors::Result;
use crate::scene::{Background, Image, NodeHandle, Primitive, Scene, Vertex};

const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");
const BACKGROUND_SHADER: &str = include_str!("shaders/background.wgsl");

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    view_projection: [[f32; 4]; 4],
    light_direction: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
}

impl ObjectUniforms {
    fn new(model: Mat4, base_color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            base_color: base_color.to_array(),
        }
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A texture uploaded from an [`Image`]. The `Arc` keeps the image alive so
/// its address stays a valid cache key.
struct GpuTexture {
    _source: Arc<Image>,
    view: wgpu::TextureView,
}

pub struct Renderer {
    ctx: WgpuContext,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    background_layout: wgpu::BindGroupLayout,

    mesh_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,

    sampler: wgpu::Sampler,
    white_texture: wgpu::TextureView,
    textures: HashMap<usize, GpuTexture>,
    background: Option<(usize, wgpu::BindGroup)>,
    primitives: HashMap<(NodeHandle, usize), GpuPrimitive>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self> {
        let ctx = WgpuContext::new(window, width, height).await?;
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: uniform_binding(),
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: uniform_binding(),
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let background_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Background Layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mesh_pipeline = create_mesh_pipeline(device, ctx.color_format(), &frame_layout, &object_layout);
        let background_pipeline =
            create_background_pipeline(device, ctx.color_format(), &background_layout);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = upload_image(&ctx, &Image::solid([255, 255, 255, 255]), "White Texture");

        Ok(Self {
            ctx,
            frame_buffer,
            frame_bind_group,
            object_layout,
            background_layout,
            mesh_pipeline,
            background_pipeline,
            sampler,
            white_texture,
            textures: HashMap::new(),
            background: None,
            primitives: HashMap::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.ctx.size()
    }

    /// Draws one frame. A scene without a camera renders nothing.
    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        let Some(camera) = scene.camera() else {
            return Ok(());
        };

        let light = &scene.light;
        let frame = FrameUniforms {
            view_projection: camera.view_projection_matrix().to_cols_array_2d(),
            light_direction: light.direction().extend(light.intensity).to_array(),
            light_color: light.color.extend(scene.ambient).to_array(),
        };
        self.ctx
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let clear_color = self.sync_background(&scene.background);
        let draws = self.sync_primitives(scene);

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.ctx.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Stage Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some((_, bind_group)) = &self.background {
                pass.set_pipeline(&self.background_pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for key in &draws {
                let Some(gpu) = self.primitives.get(key) else {
                    continue;
                };
                pass.set_bind_group(1, &gpu.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Returns the clear colour and keeps the background bind group in step
    /// with the scene.
    fn sync_background(&mut self, background: &Background) -> wgpu::Color {
        match background {
            Background::Color(color) => {
                self.background = None;
                wgpu::Color {
                    r: f64::from(color.x),
                    g: f64::from(color.y),
                    b: f64::from(color.z),
                    a: f64::from(color.w),
                }
            }
            Background::Texture(image) => {
                let id = image_id(image);
                if self.background.as_ref().is_none_or(|(current, _)| *current != id) {
                    let view = self.texture_view(image);
                    let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Background Bind Group"),
                        layout: &self.background_layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(&view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::Sampler(&self.sampler),
                            },
                        ],
                    });
                    self.background = Some((id, bind_group));
                }
                wgpu::Color::BLACK
            }
        }
    }

    /// Uploads per-frame data for every visible primitive and returns the
    /// draw list.
    fn sync_primitives(&mut self, scene: &Scene) -> Vec<(NodeHandle, usize)> {
        let mut draws = Vec::new();

        for (handle, node, mesh) in scene.mesh_nodes() {
            let joint_matrices = node
                .skin
                .and_then(|key| scene.skeleton(key))
                .map(|skeleton| skeleton.joint_matrices());

            for (index, primitive) in mesh.primitives.iter().enumerate() {
                if primitive.indices.is_empty() {
                    continue;
                }
                let key = (handle, index);
                if !self.primitives.contains_key(&key) {
                    let gpu = self.create_primitive(&mesh.name, primitive);
                    self.primitives.insert(key, gpu);
                }
                let Some(gpu) = self.primitives.get(&key) else {
                    continue;
                };

                // Joint matrices already map into world space.
                let model = match joint_matrices {
                    Some(joints) if primitive.is_skinned() => {
                        let vertices = primitive.skinned_vertices(joints);
                        self.ctx.queue.write_buffer(
                            &gpu.vertex_buffer,
                            0,
                            bytemuck::cast_slice(&vertices),
                        );
                        Mat4::IDENTITY
                    }
                    _ => Mat4::from(*node.world_matrix()),
                };

                let uniforms = ObjectUniforms::new(model, primitive.base_color);
                self.ctx
                    .queue
                    .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                draws.push(key);
            }
        }

        draws
    }

    fn create_primitive(&mut self, label: &str, primitive: &Primitive) -> GpuPrimitive {
        let vertices = primitive.vertices();
        let device = &self.ctx.device;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&primitive.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let view = match &primitive.base_color_image {
            Some(image) => self.texture_view(image),
            None => self.white_texture.clone(),
        };

        let bind_group = self.ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        GpuPrimitive {
            vertex_buffer,
            index_buffer,
            index_count: primitive.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    fn texture_view(&mut self, image: &Arc<Image>) -> wgpu::TextureView {
        let id = image_id(image);
        if let Some(texture) = self.textures.get(&id) {
            return texture.view.clone();
        }
        let view = upload_image(&self.ctx, image, "Image Texture");
        self.textures.insert(
            id,
            GpuTexture {
                _source: Arc::clone(image),
                view: view.clone(),
            },
        );
        view
    }
}

fn image_id(image: &Arc<Image>) -> usize {
    Arc::as_ptr(image) as usize
}

fn upload_image(ctx: &WgpuContext, image: &Image, label: &str) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        texture.as_image_copy(),
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn uniform_binding() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh Pipeline Layout"),
        bind_group_layouts: &[frame_layout, object_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
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
            front_face: wgpu::FrontFace::Ccw,
            // glTF assets are frequently double sided.
            cull_mode: None,
            ..Default::default()
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
}

fn create_background_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    background_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Background Shader"),
        source: wgpu::ShaderSource::Wgsl(BACKGROUND_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[background_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Background Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
