use image::RgbaImage;

use crate::graphics::{
    color::planar::PlanarImage,
    gpu::{GpuContext, texture::GpuTexture},
};

/// How the texels of a sprite texture are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteTextureKind {
    /// One RGBA level, shown as-is.
    Rgba,
    /// Two levels: (Y, A) at full size, then (Cb, Cr) at half size.
    PlanarYcbcr,
}

/// A texture that sprites can be drawn with.
#[derive(Clone, Debug)]
pub struct SpriteTexture {
    texture: GpuTexture,
    kind: SpriteTextureKind,
    width: u32,
    height: u32,
}

impl SpriteTexture {
    /// Upload straight RGBA texels.
    pub fn from_rgba(gpu: &GpuContext, image: &RgbaImage, label: &str) -> Self {
        let (width, height) = image.dimensions();
        let texture = Self::create_texture(
            gpu,
            label,
            width,
            height,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
        );
        write_level(gpu, &texture, 0, width, height, 4, image.as_raw());
        Self::finish(gpu, label, texture, SpriteTextureKind::Rgba, width, height)
    }

    /// Upload a planar YCbCr image, luma + alpha into level 0 and chroma into level 1.
    pub fn from_planar(gpu: &GpuContext, image: &PlanarImage, label: &str) -> Self {
        let (width, height) = (image.width(), image.height());
        let texture = Self::create_texture(
            gpu,
            label,
            width,
            height,
            PlanarImage::MIP_LEVELS,
            wgpu::TextureFormat::Rg8Unorm,
        );
        let bpt = PlanarImage::BYTES_PER_TEXEL;
        write_level(gpu, &texture, 0, width, height, bpt, image.luma_alpha());
        let (chroma_width, chroma_height) = PlanarImage::chroma_size(width, height);
        write_level(
            gpu,
            &texture,
            1,
            chroma_width,
            chroma_height,
            bpt,
            image.chroma(),
        );
        Self::finish(
            gpu,
            label,
            texture,
            SpriteTextureKind::PlanarYcbcr,
            width,
            height,
        )
    }

    /// A single opaque white texel.
    pub fn placeholder(gpu: &GpuContext) -> Self {
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255; 4]));
        Self::from_rgba(gpu, &white, "sprite_placeholder_texture")
    }

    fn create_texture(
        gpu: &GpuContext,
        label: &str,
        width: u32,
        height: u32,
        mip_level_count: u32,
        format: wgpu::TextureFormat,
    ) -> wgpu::Texture {
        gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn finish(
        gpu: &GpuContext,
        label: &str,
        texture: wgpu::Texture,
        kind: SpriteTextureKind,
        width: u32,
        height: u32,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = GpuTexture::create_sprite_sampler(gpu.device(), &format!("{label}_sampler"));
        Self {
            texture: GpuTexture::new(texture, view, sampler),
            kind,
            width,
            height,
        }
    }

    /// Get a handle to the texture.
    pub fn inner(&self) -> &GpuTexture {
        &self.texture
    }

    /// Whether sprites drawn with this texture must take the YCbCr decode path.
    pub fn is_planar(&self) -> bool {
        self.kind == SpriteTextureKind::PlanarYcbcr
    }

    /// Size of level 0 in texels.
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}

fn write_level(
    gpu: &GpuContext,
    texture: &wgpu::Texture,
    mip_level: u32,
    width: u32,
    height: u32,
    bytes_per_texel: u32,
    data: &[u8],
) {
    gpu.queue().write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_texel * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
