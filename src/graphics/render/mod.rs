pub mod assets;
pub mod batch;
pub mod commands;
pub mod frame;
pub mod instance_buffer;
pub mod renderer;
pub mod single;
