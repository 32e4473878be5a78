//! Analyzer Session
//!
//! Wires the components together the way the diagramming screen does:
//! - store → surface: every formation change is rendered
//! - editor → store: committed drags become `move_player`; routes are drawn
//! - engine → surface: interpolated positions are applied to a playback
//!   copy of the play's roster and rendered, never to the store

use crate::config::PlaybookConfig;
use crate::editor::{EditorAction, EditorKey, PointerEvent, RouteEditor};
use crate::error::Result;
use crate::field::{ContainerRect, CoordinateMapper, PixelPos, Viewport};
use crate::formation::{FormationRepository, FormationStore};
use crate::models::{FieldPos, Formation, PlaySequence, Player};
use crate::render::RenderSurface;
use crate::timeline::{FrameScheduler, TimelineEngine, VideoEvent};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub struct AnalyzerSession<S: RenderSurface + 'static> {
    surface: Rc<RefCell<S>>,
    store: FormationStore,
    editor: RouteEditor,
    engine: TimelineEngine,
    mapper: CoordinateMapper,
    viewport: Viewport,
    /// Roster animated during playback.
    playback_roster: Rc<RefCell<Vec<Player>>>,
}

impl<S: RenderSurface + 'static> AnalyzerSession<S> {
    pub fn new(
        config: &PlaybookConfig,
        repository: Box<dyn FormationRepository>,
        scheduler: Box<dyn FrameScheduler>,
        surface: Rc<RefCell<S>>,
    ) -> Self {
        let mut store = FormationStore::new(repository);
        let sink = Rc::clone(&surface);
        store.set_on_change(move |formation: &Formation| sink.borrow_mut().render(&formation.players));

        let playback_roster = Rc::new(RefCell::new(Vec::<Player>::new()));
        let mut engine = TimelineEngine::new(config.timeline.clone(), scheduler);
        let (roster, sink) = (Rc::clone(&playback_roster), Rc::clone(&surface));
        engine.set_on_time_update(move |_, positions| {
            let mut roster = roster.borrow_mut();
            for player in roster.iter_mut() {
                if let Some(pos) = positions.get(&player.id) {
                    player.set_position(*pos);
                }
            }
            sink.borrow_mut().render(&roster);
        });

        Self {
            surface,
            store,
            editor: RouteEditor::new(&config.editor),
            engine,
            mapper: CoordinateMapper::from_config(&config.field),
            viewport: Viewport::default(),
            playback_roster,
        }
    }

    pub fn store(&self) -> &FormationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FormationStore {
        &mut self.store
    }

    pub fn editor(&self) -> &RouteEditor {
        &self.editor
    }

    pub fn engine(&self) -> &TimelineEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TimelineEngine {
        &mut self.engine
    }

    pub fn surface(&self) -> Rc<RefCell<S>> {
        Rc::clone(&self.surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn playback_roster(&self) -> Vec<Player> {
        self.playback_roster.borrow().clone()
    }

    pub fn load_formation(&mut self, formation_id: &str) -> Result<()> {
        self.store.load(formation_id).map(|_| ())
    }

    // === Editor ===

    fn apply(&mut self, action: Option<EditorAction>) {
        match action {
            Some(EditorAction::MovePlayer { player_id, position }) => {
                if !self.store.move_player(&player_id, position.x, position.y) {
                    debug!(player_id = %player_id, "move ignored, player not in current formation");
                }
            }
            Some(EditorAction::RouteFinished(route)) => self.surface.borrow_mut().render_route(&route.points),
            Some(EditorAction::RouteCleared) => self.surface.borrow_mut().render_route(&[]),
            None => {}
        }
    }

    /// Overlay rectangle changed; the surface is asked to resize.
    pub fn set_container(&mut self, rect: ContainerRect) {
        self.editor.set_container(rect);
        self.surface.borrow_mut().resize();
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> Result<()> {
        let action = self.editor.on_pointer_down(event)?;
        self.apply(action);
        Ok(())
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> Result<()> {
        let action = self.editor.on_pointer_move(event)?;
        self.apply(action);
        if self.editor.state().is_drawing() {
            self.surface.borrow_mut().render_route(&self.editor.route_preview());
        }
        Ok(())
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> Result<()> {
        let action = self.editor.on_pointer_up(event)?;
        self.apply(action);
        Ok(())
    }

    pub fn key(&mut self, key: EditorKey) {
        let action = self.editor.on_key(key);
        self.apply(action);
    }

    // === Viewport ===

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.push_viewport();
    }

    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.viewport.set_pan(pan_x, pan_y);
        self.push_viewport();
    }

    fn push_viewport(&mut self) {
        let Viewport { zoom, pan_x, pan_y } = self.viewport;
        self.surface.borrow_mut().set_viewport(zoom, pan_x, pan_y);
    }

    /// Canvas pixel of a player in the current formation.
    pub fn player_on_canvas(&self, player_id: &str) -> Option<PixelPos> {
        let player = self.store.player(player_id)?;
        Some(self.mapper.field_to_canvas(player.position(), &self.viewport))
    }

    pub fn canvas_to_field(&self, canvas: PixelPos) -> Result<FieldPos> {
        self.mapper.canvas_to_field(canvas, &self.viewport)
    }

    // === Playback ===

    /// Loads a play and renders its first frame.
    pub fn load_play(&mut self, sequence: PlaySequence) {
        *self.playback_roster.borrow_mut() = sequence.formation.players.clone();
        self.engine.set_timeline(sequence);
        self.engine.seek(0.0);
    }

    pub fn toggle_playback(&mut self) {
        self.engine.toggle();
    }

    pub fn step(&mut self, delta_ms: f64) {
        self.engine.step(delta_ms);
    }

    /// Body of a fired animation frame.
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    pub fn on_video_event(&mut self, event: VideoEvent) {
        self.engine.on_video_event(event);
    }

    pub fn display_clock(&self) -> String {
        self.engine.display_clock()
    }

    pub fn progress_percent(&self) -> f64 {
        self.engine.progress_percent()
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}
