use asset::texture::TextureData;
use wgpu::{Device, Extent3d, Queue, TextureDimension, TextureFormat, TextureUsages, TextureView};

/// Sampled 2D texture on the GPU.
pub struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub view: TextureView,
}

impl GpuTexture {
    /// Upload RGB8 pixels, widened to RGBA8 (wgpu has no three-channel format).
    pub fn from_texture_data(device: &Device, queue: &Queue, label: &str, data: &TextureData) -> Self {
        Self::from_rgba8(device, queue, label, data.width, data.height, &data.to_rgba8())
    }

    /// 1x1 white texture for meshes without one.
    pub fn white(device: &Device, queue: &Queue) -> Self {
        Self::from_rgba8(device, queue, "White", 1, 1, &[255, 255, 255, 255])
    }

    fn from_rgba8(device: &Device, queue: &Queue, label: &str, width: u32, height: u32, rgba: &[u8]) -> Self {
        let size = Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
