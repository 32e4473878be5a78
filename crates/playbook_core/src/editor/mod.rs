pub mod input;
pub mod route_editor;

pub use input::*;
pub use route_editor::*;
