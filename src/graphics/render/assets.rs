use std::path::Path;

use anyhow::Context;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::graphics::{
    color::planar::PlanarImage,
    gpu::{GpuContext, bind_group::GpuBindGroup, texture::GpuTexture},
    textures::sprite::SpriteTexture,
};

new_key_type! {
    pub struct SpriteTextureId;
}

/// Owns every sprite texture, plus the per-texture bind group the single sprite program uses.
pub struct SpriteTextureStore {
    gpu: GpuContext,
    textures: SlotMap<SpriteTextureId, SpriteTexture>,
    bind_groups: SecondaryMap<SpriteTextureId, GpuBindGroup>,
    layout: wgpu::BindGroupLayout,
}

impl SpriteTextureStore {
    /// Initialize the store.
    pub fn new(gpu: GpuContext) -> Self {
        let layout =
            GpuBindGroup::create_layout("sprite_texture", &gpu, &GpuTexture::BIND_GROUP_LAYOUT_ENTRIES);
        Self {
            gpu,
            textures: SlotMap::with_key(),
            bind_groups: SecondaryMap::new(),
            layout,
        }
    }

    /// Add a texture to the store.
    pub fn add(&mut self, texture: SpriteTexture) -> SpriteTextureId {
        let id = self.textures.insert(texture);
        let bind_group = GpuBindGroup::create_with_layout(
            "sprite_texture",
            &self.gpu,
            &self.layout,
            &self.textures[id].inner().bind_group_entries(),
        );
        self.bind_groups.insert(id, bind_group);
        id
    }

    /// Upload RGBA texels and add them.
    pub fn add_rgba(&mut self, image: &image::RgbaImage, label: &str) -> SpriteTextureId {
        let texture = SpriteTexture::from_rgba(&self.gpu, image, label);
        self.add(texture)
    }

    /// Upload a planar YCbCr image and add it.
    pub fn add_planar(&mut self, image: &PlanarImage, label: &str) -> SpriteTextureId {
        let texture = SpriteTexture::from_planar(&self.gpu, image, label);
        self.add(texture)
    }

    /// Decode an image file and add it, optionally converting it to planar YCbCr first.
    pub fn load(&mut self, path: &Path, as_planar: bool) -> anyhow::Result<SpriteTextureId> {
        let label = path.display().to_string();
        let image = image::open(path)
            .with_context(|| format!("Failed to open sprite image {label}"))?
            .to_rgba8();
        let id = if as_planar {
            let planar = PlanarImage::encode(&image)
                .with_context(|| format!("Failed to convert {label} to planar YCbCr"))?;
            self.add_planar(&planar, &label)
        } else {
            self.add_rgba(&image, &label)
        };
        log::info!(
            "Loaded sprite texture {label} ({}x{}, planar: {as_planar})",
            image.width(),
            image.height()
        );
        Ok(id)
    }

    /// Remove a texture. Callers go through `Renderer::remove_texture`, which also frees
    /// its batch slot.
    pub(crate) fn remove(&mut self, id: SpriteTextureId) -> Option<SpriteTexture> {
        self.bind_groups.remove(id);
        self.textures.remove(id)
    }

    /// Get a sprite texture.
    pub fn get(&self, id: SpriteTextureId) -> Option<&SpriteTexture> {
        self.textures.get(id)
    }

    /// Get the group binding a texture on its own.
    pub fn bind_group(&self, id: SpriteTextureId) -> Option<&GpuBindGroup> {
        self.bind_groups.get(id)
    }

    /// The layout of every per-texture bind group.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn textures(&self) -> &SlotMap<SpriteTextureId, SpriteTexture> {
        &self.textures
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
