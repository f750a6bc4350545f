pub mod set;
pub mod slots;
pub mod sprite;
