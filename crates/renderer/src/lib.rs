//! Renderer: wgpu surface + depth, per-object uniforms, solid and hatched shading.
//! wgpu = 26.x, winit = 0.30.x

mod mesh;
mod texture;

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use asset::{Material, MeshData, texture::TextureData};
use bytemuck::{Pod, Zeroable};
use corelib::{Camera, Mat4};
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BlendState, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, DepthBiasState, DepthStencilState, Device, DeviceDescriptor,
    Extent3d, Features, FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayout, PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    Sampler, ShaderModule, ShaderModuleDescriptor, ShaderSource, ShaderStages, StoreOp, Surface,
    SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureView, TextureViewDescriptor, VertexState, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub use mesh::GpuMesh;
pub use texture::GpuTexture;

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_rows([
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.5, 0.5],
    [0.0, 0.0, 0.0, 1.0],
]);

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// How an object's fragments are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    Solid,
    /// Diagonal screen-space stripes; fragments between stripes are discarded.
    Hatch,
}

/// Handle returned by [`GpuState::add_object`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// One object to draw this frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawCommand {
    pub object: ObjectId,
    pub model_view: Mat4,
    /// Stripe width in pixels, used by [`Shading::Hatch`].
    pub line_width: f32,
}

impl DrawCommand {
    pub fn new(object: ObjectId, model_view: Mat4) -> Self {
        Self {
            object,
            model_view,
            line_width: 1.0,
        }
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }
}

/// Distance between hatch stripes in pixels.
pub const HATCH_GAP: f32 = 20.0;

/// Object UBO (column-major matrices, 16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model_view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    /// rgb = specular color, w = shininess
    specular: [f32; 4],
    hatch: [f32; 4],
}

impl ObjectUniform {
    fn new(model_view: Mat4, projection: Mat4, material: &Material, line_width: f32) -> Self {
        let normal_matrix = model_view.normal_matrix().unwrap_or_else(|e| {
            log::warn!("{e}; lighting falls back to the model-view matrix");
            model_view
        });
        let [ar, ag, ab] = material.ambient;
        let [dr, dg, db] = material.diffuse;
        let [sr, sg, sb] = material.specular;
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            ambient: [ar, ag, ab, 1.0],
            diffuse: [dr, dg, db, 1.0],
            specular: [sr, sg, sb, material.shininess],
            hatch: [HATCH_GAP, line_width, 0.0, 0.0],
        }
    }
}

struct SceneObject {
    mesh: GpuMesh,
    shading: Shading,
    uniform_buf: Buffer,
    bind_group: BindGroup,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipelines
    object_bgl: BindGroupLayout,
    solid_pipeline: RenderPipeline,
    hatch_pipeline: RenderPipeline,
    sampler: Sampler,
    white: GpuTexture,

    objects: Vec<SceneObject>,

    // Camera
    base_camera: Camera,
    camera: Camera,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends, camera: Camera) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Obsidian3D Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to request device")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Mesh WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        // ==== Object BGL ====
        let object_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Object BGL"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ==== Pipelines ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&object_bgl],
            push_constant_ranges: &[],
        });
        let solid_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, surface_format, "fs_solid");
        let hatch_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, surface_format, "fs_hatch");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mesh Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = GpuTexture::white(&device, &queue);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            object_bgl,
            solid_pipeline,
            hatch_pipeline,
            sampler,
            white,
            objects: Vec::new(),
            base_camera: camera,
            camera: camera.with_aspect(width as f32 / height as f32),
            depth_view,
            width,
            height,
        })
    }

    /// Upload a mesh and give it its own uniform buffer and bind group.
    pub fn add_object(
        &mut self,
        label: &str,
        data: &MeshData,
        material: Material,
        texture: Option<&TextureData>,
        shading: Shading,
    ) -> Result<ObjectId> {
        let mut mesh = GpuMesh::from_mesh_data(&self.device, label, data, material)?;
        if let Some(texture) = texture {
            mesh = mesh.with_texture(GpuTexture::from_texture_data(
                &self.device,
                &self.queue,
                label,
                texture,
            ));
        }

        let init = ObjectUniform::new(Mat4::IDENTITY, self.projection(), &material, 1.0);
        let uniform_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} UBO")),
                contents: bytemuck::bytes_of(&init),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            });
        let view = &mesh.texture.as_ref().unwrap_or(&self.white).view;
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} BG")),
            layout: &self.object_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::info!(
            "Added object '{}': {} vertices, {:?} shading",
            label,
            mesh.vertex_count(),
            shading
        );
        let id = ObjectId(self.objects.len());
        self.objects.push(SceneObject {
            mesh,
            shading,
            uniform_buf,
            bind_group,
        });
        Ok(id)
    }

    #[inline]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Projection in wgpu clip space.
    #[inline]
    pub fn projection(&self) -> Mat4 {
        OPENGL_TO_WGPU * self.camera.projection()
    }

    /// Resize: reconfigure surface, recreate depth view, refit the camera.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
        self.camera = self
            .base_camera
            .with_aspect(self.width as f32 / self.height as f32);
    }

    /// Render one frame. Each object's uniforms live in one buffer, so an
    /// object should appear at most once in `commands`.
    pub fn render(&mut self, commands: &[DrawCommand]) -> Result<(), SurfaceError> {
        let projection = self.projection();
        for cmd in commands {
            let Some(object) = self.objects.get(cmd.object.0) else {
                log::warn!("Skipping unknown object {:?}", cmd.object);
                continue;
            };
            let uniform = ObjectUniform::new(
                cmd.model_view,
                projection,
                &object.mesh.material,
                cmd.line_width,
            );
            self.queue
                .write_buffer(&object.uniform_buf, 0, bytemuck::bytes_of(&uniform));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for cmd in commands {
                let Some(object) = self.objects.get(cmd.object.0) else {
                    continue;
                };
                let pipeline = match object.shading {
                    Shading::Solid => &self.solid_pipeline,
                    Shading::Hatch => &self.hatch_pipeline,
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &object.bind_group, &[]);
                object.mesh.draw(&mut rpass);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn create_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    format: TextureFormat,
    fragment_entry: &str,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &mesh::LAYOUTS,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // OBJ winding is not trusted; draw both sides.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 256);
    }

    #[test]
    fn near_and_far_map_to_wgpu_depth_range() {
        let proj = OPENGL_TO_WGPU * Camera::default().projection();
        let near = proj.transform([0.0, 0.0, -1.0, 1.0]);
        let far = proj.transform([0.0, 0.0, -100.0, 1.0]);
        assert!((near[2] / near[3]).abs() < 1e-5);
        assert!((far[2] / far[3] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn singular_model_view_falls_back() {
        let flat = Mat4::scale(1.0, 0.0, 1.0);
        let material = Material::default().with_specular([0.25; 3], 16.0);
        let u = ObjectUniform::new(flat, Mat4::IDENTITY, &material, 2.0);
        assert_eq!(u.normal_matrix, flat.to_cols_array_2d());
        assert_eq!(u.specular, [0.25, 0.25, 0.25, 16.0]);
        assert_eq!(u.hatch, [HATCH_GAP, 2.0, 0.0, 0.0]);
        assert_eq!(u.ambient[3], 1.0);
    }
}
