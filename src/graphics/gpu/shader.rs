use std::borrow::Cow;

use crate::graphics::{color::ycbcr::wgsl_prelude, gpu::GpuContext};

/// Sampling + decode shared by both sprite programs.
const SPRITE_COMMON_WGSL: &str = include_str!("../shaders/sprite_common.wgsl");

#[derive(Clone, Debug)]
pub struct GpuShader {
    shader: wgpu::ShaderModule,
}

impl GpuShader {
    /// Create from a shader module descriptor.
    pub fn create(gpu: &GpuContext, desc: wgpu::ShaderModuleDescriptor<'_>) -> Self {
        let shader = gpu.device().create_shader_module(desc);
        Self { shader }
    }

    /// Create a sprite program: the color constants and shared decode are prepended
    /// to `program`.
    pub fn create_sprite(gpu: &GpuContext, label: &str, program: &str) -> Self {
        Self::create(
            gpu,
            wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Owned(Self::sprite_source(program))),
            },
        )
    }

    /// The full WGSL source of a sprite program.
    pub fn sprite_source(program: &str) -> String {
        let prelude = wgsl_prelude();
        let mut source =
            String::with_capacity(prelude.len() + SPRITE_COMMON_WGSL.len() + program.len() + 2);
        source.push_str(&prelude);
        source.push('\n');
        source.push_str(SPRITE_COMMON_WGSL);
        source.push('\n');
        source.push_str(program);
        source
    }

    /// Get the actual shader.
    pub fn handle(&self) -> &wgpu::ShaderModule {
        &self.shader
    }
}

/// Parse and validate WGSL the way device creation would, panicking with naga's report.
#[cfg(test)]
pub(crate) fn validate_wgsl(source: &str) -> naga::valid::ModuleInfo {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)))
}
