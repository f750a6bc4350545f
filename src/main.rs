use std::path::PathBuf;

use planar_sprites::{RendererConfig, app::App};
use winit::event_loop::EventLoop;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let image = std::env::args_os().nth(1).map(PathBuf::from);
    let event_loop = EventLoop::new()?;
    let mut app = App::new(RendererConfig::default(), image);
    event_loop.run_app(&mut app)?;
    Ok(())
}
