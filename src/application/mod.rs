mod app;
pub mod cli;
pub mod render;

pub use app::*;
