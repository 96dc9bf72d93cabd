//! GPU-side mesh handle: one vertex buffer per attribute stream.

use anyhow::{Context, Result};
use asset::{Material, MeshData};
use wgpu::{Buffer, BufferUsages, Device, RenderPass, VertexBufferLayout, VertexStepMode, util::DeviceExt};

use crate::texture::GpuTexture;

/// Slot 0: positions.
pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Slot 1: texture coordinates.
pub const TEX_COORD_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![1 => Float32x2],
};

/// Slot 2: normals.
pub const NORMAL_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![2 => Float32x3],
};

pub const LAYOUTS: [VertexBufferLayout<'static>; 3] = [POSITION_LAYOUT, TEX_COORD_LAYOUT, NORMAL_LAYOUT];

/// Uploaded, immutable mesh drawn as a non-indexed triangle list.
pub struct GpuMesh {
    positions: Buffer,
    tex_coords: Buffer,
    normals: Buffer,
    vertex_count: u32,
    pub material: Material,
    pub texture: Option<GpuTexture>,
}

impl GpuMesh {
    pub fn from_mesh_data(device: &Device, label: &str, data: &MeshData, material: Material) -> Result<Self> {
        anyhow::ensure!(
            data.vertex_count() == 0 || data.is_valid(),
            "Mesh '{}' has mismatched vertex streams",
            label
        );
        let vertex_count = u32::try_from(data.vertex_count())
            .with_context(|| format!("Mesh '{}' has too many vertices", label))?;

        let create = |suffix: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {suffix}")),
                contents,
                usage: BufferUsages::VERTEX,
            })
        };

        log::debug!("Uploading mesh '{}' with {} vertices", label, vertex_count);
        Ok(Self {
            positions: create("positions", bytemuck::cast_slice(&data.positions)),
            tex_coords: create("tex coords", bytemuck::cast_slice(&data.tex_coords)),
            normals: create("normals", bytemuck::cast_slice(&data.normals)),
            vertex_count,
            material,
            texture: None,
        })
    }

    pub fn with_texture(mut self, texture: GpuTexture) -> Self {
        self.texture = Some(texture);
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Bind the three streams to slots 0..=2 and draw every vertex.
    pub fn draw(&self, rpass: &mut RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        rpass.set_vertex_buffer(0, self.positions.slice(..));
        rpass.set_vertex_buffer(1, self.tex_coords.slice(..));
        rpass.set_vertex_buffer(2, self.normals.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}
