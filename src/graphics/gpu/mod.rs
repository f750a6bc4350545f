pub mod bind_group;
pub mod buffer;
pub mod pipeline;
pub mod shader;
pub mod texture;

use crate::graphics::constants::MAX_SPRITE_TEXTURES;

/// Abstraction over GPU-related data.
#[derive(Clone, Debug)]
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    /// Instantiate.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Features the batched sprite program needs on top of the defaults.
    pub fn batch_features() -> wgpu::Features {
        wgpu::Features::TEXTURE_BINDING_ARRAY
            | wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING
    }

    /// Whether this device was created with what the batched program needs.
    pub fn supports_sprite_batches(&self) -> bool {
        Self::meets_batch_requirements(self.device.features(), &self.device.limits())
    }

    /// Whether an adapter can create a device for the batched program.
    pub fn adapter_supports_sprite_batches(adapter: &wgpu::Adapter) -> bool {
        Self::meets_batch_requirements(adapter.features(), &adapter.limits())
    }

    /// Every element of the binding array counts as one sampled texture.
    fn meets_batch_requirements(features: wgpu::Features, limits: &wgpu::Limits) -> bool {
        features.contains(Self::batch_features())
            && limits.max_binding_array_elements_per_shader_stage >= MAX_SPRITE_TEXTURES
            && limits.max_sampled_textures_per_shader_stage >= MAX_SPRITE_TEXTURES
    }

    /// Features + limits to request from `adapter`.
    ///
    /// The batched program's requirements are only requested when the adapter has them;
    /// without them only single sprite draws are available.
    pub fn sprite_requirements(
        adapter: &wgpu::Adapter,
        base_limits: wgpu::Limits,
    ) -> (wgpu::Features, wgpu::Limits) {
        if Self::adapter_supports_sprite_batches(adapter) {
            let limits = wgpu::Limits {
                max_binding_array_elements_per_shader_stage: MAX_SPRITE_TEXTURES,
                max_sampled_textures_per_shader_stage: MAX_SPRITE_TEXTURES
                    .max(base_limits.max_sampled_textures_per_shader_stage),
                ..base_limits
            };
            (Self::batch_features(), limits)
        } else {
            log::warn!("Adapter lacks texture binding arrays, sprite batches are disabled");
            (wgpu::Features::empty(), base_limits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_cannot_batch() {
        let limits = wgpu::Limits::default();
        assert!(!GpuContext::meets_batch_requirements(
            GpuContext::batch_features(),
            &limits
        ));
    }

    #[test]
    fn batching_needs_features_and_limits() {
        let limits = wgpu::Limits {
            max_binding_array_elements_per_shader_stage: MAX_SPRITE_TEXTURES,
            max_sampled_textures_per_shader_stage: MAX_SPRITE_TEXTURES,
            ..wgpu::Limits::default()
        };
        assert!(GpuContext::meets_batch_requirements(
            GpuContext::batch_features(),
            &limits
        ));
        assert!(!GpuContext::meets_batch_requirements(
            wgpu::Features::TEXTURE_BINDING_ARRAY,
            &limits
        ));
    }
}
