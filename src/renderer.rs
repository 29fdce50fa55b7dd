//! wgpu implementation of [`RenderBackend`].
//!
//! Scene geometry is immutable after `prepare`, so buffers and pipelines are
//! built once; only the per-mesh uniform buffer is rewritten each frame.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::Vec3;
use log::info;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::harness::{HarnessError, RenderBackend};
use crate::scene::{Material, Mesh, Scene, Topology};

/// GPU renderer bound to one window surface.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthBuffer,
    uniform_layout: wgpu::BindGroupLayout,
    clear_color: wgpu::Color,
    pixel_ratio: f32,
    logical_size: (u32, u32),
    meshes: Vec<MeshResources>,
    disposed: bool,
}

impl Renderer {
    /// Binds a surface to the window and acquires a device for it. Any
    /// failure here means the drawable target is unusable, which is fatal
    /// for the sketch.
    pub async fn new(window: Arc<Window>) -> Result<Self, HarnessError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|err| HarnessError::SurfaceUnavailable(err.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| {
                HarnessError::SurfaceUnavailable(format!("no compatible adapter: {err}"))
            })?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("sketch-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .map_err(|err| HarnessError::SurfaceUnavailable(format!("no device: {err}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sketch-uniform-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<SketchUniform>() as u64)
                            .ok_or_else(|| anyhow!("uniform struct has zero size"))?,
                    ),
                },
                count: None,
            }],
        });

        info!(
            "renderer ready: {}x{} {:?}",
            config.width, config.height, surface_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            uniform_layout,
            clear_color: wgpu::Color::WHITE,
            pixel_ratio: 1.0,
            logical_size: (size.width, size.height),
            meshes: Vec::new(),
            disposed: false,
        })
    }

    fn reconfigure(&mut self) {
        let width = ((self.logical_size.0 as f32 * self.pixel_ratio) as u32).max(1);
        let height = ((self.logical_size.1 as f32 * self.pixel_ratio) as u32).max(1);
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, width, height);
    }

    fn build_mesh(&self, mesh: &Mesh) -> anyhow::Result<MeshResources> {
        let vertices = interleave(mesh);
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}-vertices", mesh.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}-indices", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let uniform = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{}-uniform", mesh.name)),
            size: std::mem::size_of::<SketchUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-bind-group", mesh.name)),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let source = match &mesh.material {
            Material::Flat { .. } => FLAT_SHADER,
            Material::Shader(material) => material.source.as_str(),
        };
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{}-shader", mesh.name)),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let topology = match mesh.geometry.topology {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
        };
        let cull_mode = match &mesh.material {
            Material::Flat {
                double_sided: true, ..
            } => None,
            Material::Flat {
                double_sided: false,
                ..
            } => Some(wgpu::Face::Back),
            Material::Shader(_) => None,
        };

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{}-pipeline-layout", mesh.name)),
                bind_group_layouts: &[&self.uniform_layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{}-pipeline", mesh.name)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: (5 * std::mem::size_of::<f32>()) as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 0,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x2,
                                offset: (3 * std::mem::size_of::<f32>()) as u64,
                                shader_location: 1,
                            },
                        ],
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthBuffer::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            });

        Ok(MeshResources {
            vertex,
            index,
            index_count: mesh.geometry.indices.len() as u32,
            uniform,
            bind_group,
            pipeline,
        })
    }

    fn mesh_uniform(mesh: &Mesh, camera: &PerspectiveCamera) -> SketchUniform {
        let (color, time) = match &mesh.material {
            Material::Flat { color, .. } => (*color, 0.0),
            Material::Shader(material) => (
                material.uniforms.vec3("color").unwrap_or(Vec3::ONE),
                material.uniforms.float("time").unwrap_or(0.0),
            ),
        };
        SketchUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
            color: color.extend(1.0).into(),
            params: [time, 0.0, 0.0, 0.0],
        }
    }
}

impl RenderBackend for Renderer {
    fn set_clear_color(&mut self, color: Vec3) {
        self.clear_color = wgpu::Color {
            r: color.x as f64,
            g: color.y as f64,
            b: color.z as f64,
            a: 1.0,
        };
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.max(f32::EPSILON);
        self.reconfigure();
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.logical_size = (width, height);
        self.reconfigure();
    }

    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.meshes.clear();
        for mesh in scene.meshes() {
            let resources = self
                .build_mesh(mesh)
                .with_context(|| format!("failed to upload mesh `{}`", mesh.name))?;
            self.meshes.push(resources);
        }
        Ok(())
    }

    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        // Surface errors bubble up unwrapped so the driver can match on
        // Lost/Outdated and recover with a resize.
        let output = self
            .surface
            .get_current_texture()
            .map_err(anyhow::Error::new)?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (mesh, resources) in scene.meshes().iter().zip(self.meshes.iter()) {
            let uniform = Self::mesh_uniform(mesh, camera);
            self.queue
                .write_buffer(&resources.uniform, 0, bytes_of(&uniform));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sketch-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sketch-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for resources in &self.meshes {
                pass.set_pipeline(&resources.pipeline);
                pass.set_bind_group(0, &resources.bind_group, &[]);
                pass.set_vertex_buffer(0, resources.vertex.slice(..));
                pass.set_index_buffer(resources.index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..resources.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        self.meshes.clear();
        self.disposed = true;
        info!("renderer disposed");
    }
}

/// Positions and uvs interleaved into one vertex stream.
fn interleave(mesh: &Mesh) -> Vec<f32> {
    let geometry = &mesh.geometry;
    let mut vertices = Vec::with_capacity(geometry.positions.len() * 5);
    for (position, uv) in geometry.positions.iter().zip(geometry.uvs.iter()) {
        vertices.extend_from_slice(position);
        vertices.extend_from_slice(uv);
    }
    vertices
}

struct MeshResources {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Shared uniform layout every sketch shader declares at group 0, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SketchUniform {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

const FLAT_SHADER: &str = r#"
struct SketchUniform {
    view_proj: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: SketchUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> @builtin(position) vec4<f32> {
    return u.view_proj * vec4<f32>(input.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::scene::Geometry;

    #[test]
    fn interleave_packs_position_then_uv() {
        let mut geometry = Geometry::triangle([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        geometry.uvs = vec![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]];
        let mesh = Mesh::new(
            "triangle",
            geometry,
            Material::Flat {
                color: Vec3::ONE,
                double_sided: false,
            },
        );
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 15);
        assert_eq!(&vertices[0..5], &[1.0, 2.0, 3.0, 0.1, 0.2]);
    }

    #[test]
    fn flat_mesh_uniform_carries_the_material_color() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        let mesh = Mesh::new(
            "triangle",
            Geometry::triangle([[0.0; 3]; 3]),
            Material::Flat {
                color: Vec3::new(0.2, 0.4, 0.6),
                double_sided: false,
            },
        );
        let uniform = Renderer::mesh_uniform(&mesh, &camera);
        assert_eq!(uniform.color, [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(uniform.params[0], 0.0);
        assert_eq!(uniform.view_proj, camera.view_proj().to_cols_array_2d());
    }

    #[test]
    fn uniform_struct_matches_the_wgsl_layout() {
        // mat4x4 + vec4 + vec4, all 16-byte aligned.
        assert_eq!(std::mem::size_of::<SketchUniform>(), 96);
    }
}
