//! # playbook_core - Football Play Diagramming Core
//!
//! Formations, interactive drag/route editing and keyframe playback for an
//! American football play diagram, with the UI, video and storage behind
//! small collaborator traits.
//!
//! ## Features
//! - Field ⇄ canvas ⇄ screen coordinate mapping (yards, 120 × 53.33)
//! - Formation store over immutable templates and saved custom formations
//! - Route editor state machine (drag players, draw routes, snap to grid)
//! - Timeline engine: interpolation, phases, video clock reconciliation
//!
//! Everything is single-threaded and callback driven; nothing here is `Send`.

pub mod config;
pub mod editor;
pub mod error;
pub mod field;
pub mod formation;
pub mod models;
pub mod render;
pub mod session;
pub mod timeline;

pub use config::{EditorConfig, FieldConfig, PlaybookConfig, TimelineConfig};
pub use error::{PlaybookError, Result};

pub use editor::{EditorAction, EditorKey, PointerEvent, PointerTarget, RouteEditor};
pub use field::{ContainerRect, CoordinateMapper, PixelPos, Viewport, FIELD_LENGTH_YD, FIELD_WIDTH_YD};
pub use formation::{FormationRepository, FormationStore, JsonFileRepository, MemoryRepository};
pub use models::{
    EventType, FieldPos, FlipAxis, FootballPosition, Formation, FormationMetadata, FormationType,
    PlaySequence, Player, PositionMap, Route, RouteType, Team, TimelineEvent, ValidationReport,
};
pub use render::{RecordingSurface, RenderSurface};
pub use session::AnalyzerSession;
pub use timeline::{
    interpolate_positions, FrameScheduler, ManualFrameScheduler, PlayPhase, SharedVideo, TimelineEngine,
    TimelineState, VideoElement, VideoEvent,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
