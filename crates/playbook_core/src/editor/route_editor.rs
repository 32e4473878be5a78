//! Route Editor State Machine
//!
//! Turns pointer and key input over the field overlay into player moves and
//! finished routes. The editor never touches the formation or the renderer;
//! every change leaves as an [`EditorAction`] for the composing application.
//!
//! ## Transitions
//! ```text
//! Idle --down on player--> Dragging --move--> Dragging --up--> Idle (MovePlayer)
//! Idle --shift+down------> Drawing  --up----> Drawing (append point)
//! Drawing --Enter (>= 2 points)--> Idle (RouteFinished)
//! Dragging | Drawing --Escape--> Idle (nothing committed)
//! ```
//! A pointer-down on a player glyph always starts a drag, shift or not.
//! Dragging and Drawing are exclusive: a pointer-down that would start one
//! while the other is running is ignored.
//!
//! Pointer positions go through the screen-fraction mapping against the
//! overlay's container rectangle, never through zoom/pan.

use super::input::{EditorKey, PointerEvent, PointerTarget};
use crate::config::EditorConfig;
use crate::error::{PlaybookError, Result};
use crate::field::{
    clamp_to_field, field_to_screen_fraction, screen_to_field_fraction, snap_to_grid, ContainerRect,
    PixelPos,
};
use crate::models::{FieldPos, Route};
use serde::Serialize;
use tracing::debug;

pub const MIN_GRID_SIZE: f64 = 0.5;
pub const MAX_GRID_SIZE: f64 = 5.0;

/// Callback payload produced by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    MovePlayer { player_id: String, position: FieldPos },
    RouteFinished(Route),
    RouteCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    Waypoint,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteMarker {
    pub position: FieldPos,
    pub kind: MarkerKind,
}

/// Live coordinates shown while dragging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragFeedback {
    pub player_id: String,
    pub position: FieldPos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub player_id: String,
    /// Position when grabbed; a cancelled drag leaves the player here.
    pub origin: FieldPos,
    /// Pointer minus the player's on-screen position at grab time.
    pub grab_offset: PixelPos,
    pub preview: FieldPos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteDraft {
    pub route: Route,
    pub cursor: Option<FieldPos>,
    /// The release of the shift-click that started the route.
    awaiting_start_release: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Dragging(DragSession),
    Drawing(RouteDraft),
}

impl EditorState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, EditorState::Dragging(_))
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, EditorState::Drawing(_))
    }
}

/// Start for index 0, End for the last of two or more, Waypoint between.
pub fn markers_for(points: &[FieldPos]) -> Vec<RouteMarker> {
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let kind = match i {
                0 => MarkerKind::Start,
                i if i == last => MarkerKind::End,
                _ => MarkerKind::Waypoint,
            };
            RouteMarker { position, kind }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RouteEditor {
    state: EditorState,
    container: ContainerRect,
    snap_to_grid: bool,
    grid_size: f64,
    route_speed_yards_per_sec: f64,
    active_route: Option<Route>,
}

impl RouteEditor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: EditorState::Idle,
            container: ContainerRect::default(),
            snap_to_grid: config.snap_to_grid,
            grid_size: config.grid_size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE),
            route_speed_yards_per_sec: config.route_speed_yards_per_sec,
            active_route: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// On-screen bounding rectangle of the overlay.
    pub fn set_container(&mut self, rect: ContainerRect) {
        self.container = rect;
    }

    pub fn container(&self) -> ContainerRect {
        self.container
    }

    pub fn set_grid_size(&mut self, grid_size: f64) {
        if grid_size.is_finite() {
            self.grid_size = grid_size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        }
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_to_grid
    }

    fn snapped(&self, pos: FieldPos) -> FieldPos {
        if self.snap_to_grid {
            snap_to_grid(pos, self.grid_size)
        } else {
            pos
        }
    }

    fn to_field(&self, screen: PixelPos) -> Result<FieldPos> {
        screen_to_field_fraction(screen, &self.container)
    }

    fn drag_target(&self, session: &DragSession, event: &PointerEvent) -> Result<FieldPos> {
        let screen = PixelPos::new(event.x - session.grab_offset.x, event.y - session.grab_offset.y);
        Ok(self.snapped(self.to_field(screen)?))
    }

    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> Result<Option<EditorAction>> {
        match (&self.state, &event.target) {
            (EditorState::Idle, PointerTarget::Player { id, origin }) => {
                let on_screen = field_to_screen_fraction(*origin, &self.container)?;
                let grab_offset = PixelPos::new(event.x - on_screen.x, event.y - on_screen.y);
                debug!(player_id = %id, "drag started");
                self.state = EditorState::Dragging(DragSession {
                    player_id: id.clone(),
                    origin: *origin,
                    grab_offset,
                    preview: *origin,
                });
            }
            (EditorState::Idle, _) if event.modifiers.shift => {
                let start = self.to_field(event.screen())?;
                debug!(x = start.x, y = start.y, "route drawing started");
                self.state = EditorState::Drawing(RouteDraft {
                    route: Route::start_at(start),
                    cursor: None,
                    awaiting_start_release: true,
                });
            }
            (EditorState::Drawing(_), PointerTarget::Player { id, .. }) => {
                debug!(player_id = %id, "drag ignored while drawing a route");
            }
            (EditorState::Dragging(_), _) if event.modifiers.shift => {
                debug!("route drawing ignored while dragging");
            }
            _ => {}
        }
        Ok(None)
    }

    /// Updates the drag preview or the drawing cursor. Never commits.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> Result<Option<EditorAction>> {
        match &self.state {
            EditorState::Dragging(session) => {
                let preview = self.drag_target(session, event)?;
                if let EditorState::Dragging(session) = &mut self.state {
                    session.preview = preview;
                }
            }
            EditorState::Drawing(_) => {
                let cursor = self.snapped(self.to_field(event.screen())?);
                if let EditorState::Drawing(draft) = &mut self.state {
                    draft.cursor = Some(cursor);
                }
            }
            EditorState::Idle => {}
        }
        Ok(None)
    }

    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> Result<Option<EditorAction>> {
        match &self.state {
            EditorState::Dragging(session) => {
                let position = clamp_to_field(self.drag_target(session, event)?);
                let player_id = session.player_id.clone();
                debug!(player_id = %player_id, x = position.x, y = position.y, "drag committed");
                self.state = EditorState::Idle;
                Ok(Some(EditorAction::MovePlayer { player_id, position }))
            }
            EditorState::Drawing(_) => {
                let point = self.snapped(self.to_field(event.screen())?);
                if let EditorState::Drawing(draft) = &mut self.state {
                    if draft.awaiting_start_release {
                        draft.awaiting_start_release = false;
                    } else {
                        draft.route.points.push(point);
                    }
                }
                Ok(None)
            }
            EditorState::Idle => Ok(None),
        }
    }

    pub fn on_key(&mut self, key: EditorKey) -> Option<EditorAction> {
        match key {
            EditorKey::Escape => {
                if !self.state.is_idle() {
                    debug!("editor session cancelled");
                }
                self.state = EditorState::Idle;
                None
            }
            EditorKey::Enter => self.finish_route(),
            EditorKey::ToggleGrid => {
                self.snap_to_grid = !self.snap_to_grid;
                None
            }
            EditorKey::Delete => self.clear_route(),
        }
    }

    /// Ends drawing. Fewer than two points cancels silently.
    pub fn finish_route(&mut self) -> Option<EditorAction> {
        let EditorState::Drawing(draft) = std::mem::take(&mut self.state) else {
            return None;
        };
        let mut route = draft.route;
        if route.apply_metadata(self.route_speed_yards_per_sec).is_none() {
            let err = PlaybookError::InvalidState(format!(
                "route needs at least 2 points, has {}",
                route.points.len()
            ));
            debug!(error = %err, "route discarded");
            return None;
        }
        debug!(id = %route.id, depth = route.depth_yards, timing_ms = route.timing_ms, "route finished");
        self.active_route = Some(route.clone());
        Some(EditorAction::RouteFinished(route))
    }

    pub fn load_route(&mut self, route: Route) {
        self.active_route = Some(route);
    }

    pub fn clear_route(&mut self) -> Option<EditorAction> {
        self.active_route.take().map(|_| EditorAction::RouteCleared)
    }

    pub fn active_route(&self) -> Option<&Route> {
        self.active_route.as_ref()
    }

    /// Markers of the route being drawn, else of the active route.
    pub fn markers(&self) -> Vec<RouteMarker> {
        match &self.state {
            EditorState::Drawing(draft) => markers_for(&draft.route.points),
            _ => self.active_route.as_ref().map(|r| markers_for(&r.points)).unwrap_or_default(),
        }
    }

    /// Polyline for the overlay: draft points plus the cursor while drawing.
    pub fn route_preview(&self) -> Vec<FieldPos> {
        match &self.state {
            EditorState::Drawing(draft) => {
                let mut points = draft.route.points.clone();
                points.extend(draft.cursor);
                points
            }
            _ => self.active_route.as_ref().map(|r| r.points.clone()).unwrap_or_default(),
        }
    }

    pub fn feedback(&self) -> Option<DragFeedback> {
        match &self.state {
            EditorState::Dragging(session) => {
                Some(DragFeedback { player_id: session.player_id.clone(), position: session.preview })
            }
            _ => None,
        }
    }
}

impl Default for RouteEditor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::{FormationStore, MemoryRepository};

    // 10 screen pixels per yard on both axes.
    fn editor() -> RouteEditor {
        let mut editor = RouteEditor::default();
        editor.set_container(ContainerRect::new(0.0, 0.0, 1200.0, 533.3));
        editor
    }

    fn apply(store: &mut FormationStore, action: Option<EditorAction>) {
        if let Some(EditorAction::MovePlayer { player_id, position }) = action {
            store.move_player(&player_id, position.x, position.y);
        }
    }

    #[test]
    fn test_drag_commits_once_on_pointer_up() {
        let mut store = FormationStore::new(Box::new(MemoryRepository::new()));
        store.load("i-formation").unwrap();
        let qb = store.player("qb").unwrap().position();

        let mut editor = editor();
        let mut actions = Vec::new();
        actions.push(editor.on_pointer_down(&PointerEvent::on_player(252.0, 263.0, "qb", qb)).unwrap());
        assert!(editor.state().is_dragging());

        for x in [262.0, 282.0, 302.0] {
            actions.push(editor.on_pointer_move(&PointerEvent::on_field(x, 208.0)).unwrap());
            assert_eq!(store.player("qb").unwrap().position(), qb);
        }
        let feedback = editor.feedback().unwrap();
        assert_eq!(feedback.player_id, "qb");
        assert_eq!(feedback.position, FieldPos::new(30.0, 21.0));

        let up = editor.on_pointer_up(&PointerEvent::on_field(302.0, 208.0)).unwrap();
        assert!(editor.state().is_idle());
        assert!(editor.feedback().is_none());
        actions.push(up);

        let commits: Vec<_> = actions.into_iter().flatten().collect();
        assert_eq!(
            commits,
            vec![EditorAction::MovePlayer { player_id: "qb".to_string(), position: FieldPos::new(30.0, 21.0) }]
        );
        apply(&mut store, commits.into_iter().next());
        assert_eq!(store.player("qb").unwrap().position(), FieldPos::new(30.0, 21.0));
    }

    #[test]
    fn test_drag_release_is_clamped() {
        let mut editor = editor();
        editor.on_pointer_down(&PointerEvent::on_player(250.0, 265.0, "qb", FieldPos::new(25.0, 26.5))).unwrap();
        let action = editor.on_pointer_up(&PointerEvent::on_field(1500.0, -40.0)).unwrap();
        assert_eq!(
            action,
            Some(EditorAction::MovePlayer { player_id: "qb".to_string(), position: FieldPos::new(120.0, 0.0) })
        );
    }

    #[test]
    fn test_escape_reverts_drag() {
        let mut editor = editor();
        editor.on_pointer_down(&PointerEvent::on_player(250.0, 265.0, "qb", FieldPos::new(25.0, 26.5))).unwrap();
        editor.on_pointer_move(&PointerEvent::on_field(400.0, 100.0)).unwrap();
        assert_eq!(editor.on_key(EditorKey::Escape), None);
        assert!(editor.state().is_idle());
        assert_eq!(editor.on_pointer_up(&PointerEvent::on_field(400.0, 100.0)).unwrap(), None);
    }

    fn draw(editor: &mut RouteEditor, clicks: &[(f64, f64)]) {
        let (sx, sy) = clicks[0];
        editor.on_pointer_down(&PointerEvent::on_field(sx, sy).with_shift()).unwrap();
        editor.on_pointer_up(&PointerEvent::on_field(sx, sy).with_shift()).unwrap();
        for &(x, y) in &clicks[1..] {
            editor.on_pointer_down(&PointerEvent::on_field(x, y)).unwrap();
            editor.on_pointer_up(&PointerEvent::on_field(x, y)).unwrap();
        }
    }

    #[test]
    fn test_straight_route_metadata() {
        let mut editor = editor();
        draw(&mut editor, &[(0.0, 0.0), (0.0, 100.0), (0.0, 200.0)]);

        let Some(EditorAction::RouteFinished(route)) = editor.on_key(EditorKey::Enter) else {
            panic!("route was not finished");
        };
        assert_eq!(route.points, vec![FieldPos::new(0.0, 0.0), FieldPos::new(0.0, 10.0), FieldPos::new(0.0, 20.0)]);
        assert_eq!(route.depth_yards, 20.0);
        assert!((route.timing_ms - 909.0909).abs() < 1e-3);
        assert_eq!(editor.active_route().map(|r| r.id.clone()), Some(route.id));
    }

    #[test]
    fn test_single_point_route_is_discarded() {
        let mut editor = editor();
        draw(&mut editor, &[(0.0, 0.0)]);
        assert_eq!(editor.route_preview(), vec![FieldPos::new(0.0, 0.0)]);
        assert_eq!(editor.on_key(EditorKey::Enter), None);
        assert!(editor.state().is_idle());
        assert!(editor.active_route().is_none());
    }

    #[test]
    fn test_exactly_one_end_marker() {
        let mut editor = editor();
        draw(&mut editor, &[(100.0, 100.0)]);
        assert_eq!(editor.markers().iter().map(|m| m.kind).collect::<Vec<_>>(), vec![MarkerKind::Start]);

        let clicks = [(200.0, 100.0), (300.0, 150.0), (300.0, 300.0)];
        for (n, &(x, y)) in clicks.iter().enumerate() {
            editor.on_pointer_up(&PointerEvent::on_field(x, y)).unwrap();
            let markers = editor.markers();
            assert_eq!(markers.len(), n + 2);
            assert_eq!(markers.iter().filter(|m| m.kind == MarkerKind::End).count(), 1);
            assert_eq!(markers.last().map(|m| m.kind), Some(MarkerKind::End));
            assert_eq!(markers[0].kind, MarkerKind::Start);
        }
    }

    #[test]
    fn test_sessions_are_exclusive() {
        let mut editor = editor();
        draw(&mut editor, &[(100.0, 100.0)]);
        editor.on_pointer_down(&PointerEvent::on_player(250.0, 265.0, "qb", FieldPos::new(25.0, 26.5))).unwrap();
        assert!(editor.state().is_drawing());
        editor.on_key(EditorKey::Escape);

        editor.on_pointer_down(&PointerEvent::on_player(250.0, 265.0, "qb", FieldPos::new(25.0, 26.5))).unwrap();
        editor.on_pointer_down(&PointerEvent::on_field(10.0, 10.0).with_shift()).unwrap();
        assert!(editor.state().is_dragging());
    }

    #[test]
    fn test_shift_down_on_player_starts_drag() {
        let mut editor = editor();
        let qb = FieldPos::new(25.0, 26.5);
        editor.on_pointer_down(&PointerEvent::on_player(250.0, 265.0, "qb", qb).with_shift()).unwrap();
        assert!(editor.state().is_dragging());
        assert!(!editor.state().is_drawing());
        assert!(editor.markers().is_empty());

        let up = editor.on_pointer_up(&PointerEvent::on_field(300.0, 260.0).with_shift()).unwrap();
        assert_eq!(
            up,
            Some(EditorAction::MovePlayer { player_id: "qb".to_string(), position: FieldPos::new(30.0, 26.0) })
        );
    }

    #[test]
    fn test_drawing_cursor_preview() {
        let mut editor = editor();
        draw(&mut editor, &[(0.0, 0.0)]);
        editor.on_pointer_move(&PointerEvent::on_field(151.0, 99.0)).unwrap();
        assert_eq!(editor.route_preview(), vec![FieldPos::new(0.0, 0.0), FieldPos::new(15.0, 10.0)]);
    }

    #[test]
    fn test_delete_clears_active_route() {
        let mut editor = editor();
        assert_eq!(editor.on_key(EditorKey::Delete), None);

        let mut route = Route::start_at(FieldPos::new(1.0, 1.0));
        route.points.push(FieldPos::new(4.0, 5.0));
        editor.load_route(route);
        assert_eq!(editor.markers().len(), 2);

        assert_eq!(editor.on_key(EditorKey::Delete), Some(EditorAction::RouteCleared));
        assert!(editor.markers().is_empty());
    }

    #[test]
    fn test_grid_settings() {
        let mut editor = editor();
        editor.set_grid_size(10.0);
        assert_eq!(editor.grid_size(), MAX_GRID_SIZE);
        editor.set_grid_size(0.1);
        assert_eq!(editor.grid_size(), MIN_GRID_SIZE);

        assert!(editor.snap_enabled());
        editor.on_key(EditorKey::ToggleGrid);
        assert!(!editor.snap_enabled());
    }

    #[test]
    fn test_zero_sized_container_is_geometry_error() {
        let mut editor = RouteEditor::default();
        let err = editor.on_pointer_down(&PointerEvent::on_field(10.0, 10.0).with_shift()).unwrap_err();
        assert!(matches!(err, PlaybookError::Geometry(_)));
        assert!(editor.state().is_idle());
    }
}
