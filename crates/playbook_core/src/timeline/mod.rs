//! Play timeline: keyframe interpolation, phases, the playback engine and
//! its video and frame-scheduling collaborators.

pub mod engine;
pub mod interpolate;
pub mod phase;
pub mod scheduler;
pub mod video;

pub use engine::*;
pub use interpolate::*;
pub use phase::*;
pub use scheduler::*;
pub use video::*;
