use std::num::NonZeroU32;

use slotmap::SlotMap;

use crate::graphics::{
    constants::MAX_SPRITE_TEXTURES,
    gpu::{GpuContext, bind_group::GpuBindGroup},
    render::assets::SpriteTextureId,
    textures::{
        slots::{TextureSetError, TextureSlots},
        sprite::SpriteTexture,
    },
};

/// The layout of the batched program's texture group: every slot, then one sampler.
pub const TEXTURE_SET_LAYOUT_ENTRIES: [wgpu::BindGroupLayoutEntry; 2] = [
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: NonZeroU32::new(MAX_SPRITE_TEXTURES),
    },
    wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    },
];

/// The textures bound to the batched program, addressed by slot.
///
/// The bind group is rebuilt lazily after the slots change. Empty slots are bound to a
/// placeholder so the whole array is always valid.
pub struct SpriteTextureSet {
    slots: TextureSlots<SpriteTextureId>,
    layout: wgpu::BindGroupLayout,
    placeholder: SpriteTexture,
    bind_group: Option<GpuBindGroup>,
}

impl SpriteTextureSet {
    pub fn new(gpu: &GpuContext) -> Self {
        let layout =
            GpuBindGroup::create_layout("sprite_texture_set", gpu, &TEXTURE_SET_LAYOUT_ENTRIES);
        Self {
            slots: TextureSlots::new(),
            layout,
            placeholder: SpriteTexture::placeholder(gpu),
            bind_group: None,
        }
    }

    /// Bind a texture into the lowest free slot. Binding the same texture twice returns its
    /// existing slot.
    pub fn bind(&mut self, id: SpriteTextureId) -> Result<u32, TextureSetError> {
        if let Some(slot) = self.slots.slot_of(&id) {
            return Ok(slot);
        }
        let slot = self.slots.insert(id)?;
        self.bind_group = None;
        Ok(slot)
    }

    /// Free whatever slot `id` occupies.
    pub fn unbind(&mut self, id: SpriteTextureId) -> Option<u32> {
        let slot = self.slots.remove_value(&id)?;
        self.bind_group = None;
        Some(slot)
    }

    pub fn slot_of(&self, id: SpriteTextureId) -> Option<u32> {
        self.slots.slot_of(&id)
    }

    pub fn slots(&self) -> &TextureSlots<SpriteTextureId> {
        &self.slots
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// The bind group for the current slots, rebuilding it if they changed.
    ///
    /// Slots whose texture has since been removed from `textures` are bound to the
    /// placeholder.
    pub fn bind_group(
        &mut self,
        gpu: &GpuContext,
        textures: &SlotMap<SpriteTextureId, SpriteTexture>,
    ) -> &GpuBindGroup {
        if self.bind_group.is_none() {
            log::debug!(
                "Rebuilding sprite texture set with {} bound textures",
                self.slots.len()
            );
        }
        let Self {
            slots,
            layout,
            placeholder,
            bind_group,
        } = self;
        let (slots, layout, placeholder) = (&*slots, &*layout, &*placeholder);
        bind_group.get_or_insert_with(|| {
            let views: Vec<&wgpu::TextureView> = (0..MAX_SPRITE_TEXTURES)
                .map(|slot| {
                    slots
                        .get(slot)
                        .and_then(|id| textures.get(*id))
                        .unwrap_or(placeholder)
                        .inner()
                        .view()
                })
                .collect();
            GpuBindGroup::create_with_layout(
                "sprite_texture_set",
                gpu,
                layout,
                &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureViewArray(&views),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(placeholder.inner().sampler()),
                    },
                ],
            )
        })
    }
}
