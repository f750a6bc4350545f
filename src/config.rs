/// Knobs for the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// The color every frame is cleared to.
    pub clear_color: wgpu::Color,
    /// Instance records the batch buffer starts with room for.
    pub initial_instance_capacity: u64,
    /// Sprite records the single-sprite uniform buffer starts with room for.
    pub initial_uniform_capacity: u64,
    /// Create the batched pipeline when the device supports it.
    pub batch_enabled: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
            initial_instance_capacity: 1024,
            initial_uniform_capacity: 64,
            batch_enabled: true,
        }
    }
}
