pub mod formation;
pub mod play;
pub mod player;
pub mod route;

// Re-export main types for convenience
pub use formation::*;
pub use play::*;
pub use player::*;
pub use route::*;
