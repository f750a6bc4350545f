use crate::graphics::gpu::GpuContext;

/// A bind group paired with the layout it was created against.
///
/// Layouts are cheap to clone, so groups built from a shared layout each carry their own handle.
#[derive(Clone, Debug)]
pub struct GpuBindGroup {
    group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
}

impl GpuBindGroup {
    /// Create a bind group layout.
    pub fn create_layout(
        label: &str,
        gpu: &GpuContext,
        layout_entries: &[wgpu::BindGroupLayoutEntry],
    ) -> wgpu::BindGroupLayout {
        gpu.device()
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: layout_entries,
                label: Some(&format!("{label}_layout")),
            })
    }

    /// Create the bind group against an existing layout.
    pub fn create_with_layout(
        label: &str,
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        entries: &[wgpu::BindGroupEntry],
    ) -> Self {
        let group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries,
            label: Some(label),
        });
        Self {
            group,
            layout: layout.clone(),
        }
    }

    /// Get the actual bind group.
    pub fn handle(&self) -> &wgpu::BindGroup {
        &self.group
    }

    /// Get the group's layout.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}
