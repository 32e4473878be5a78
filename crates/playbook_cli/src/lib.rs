//! Playbook CLI Library
//!
//! File-level commands over `playbook_core`: formations from templates or
//! JSON files, custom formation storage, route figures and headless play
//! simulation. `main.rs` only parses arguments and prints.

use anyhow::{bail, Context, Result};
use playbook_core::formation::{all_templates, template_by_id};
use playbook_core::models::route_metadata;
use playbook_core::timeline::{phase_start, PlayPhase};
use playbook_core::{
    AnalyzerSession, FieldPos, FlipAxis, Formation, FormationStore, JsonFileRepository, ManualFrameScheduler,
    MemoryRepository, PlaySequence, PlaybookConfig, PositionMap, RecordingSurface, ValidationReport,
};
use serde::Serialize;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;

/// Where a formation comes from.
#[derive(Debug, Clone)]
pub enum FormationSource {
    Template(String),
    File(PathBuf),
}

pub fn load_config(path: Option<&Path>) -> Result<PlaybookConfig> {
    match path {
        Some(path) => PlaybookConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(PlaybookConfig::default()),
    }
}

pub fn resolve_formation(source: &FormationSource) -> Result<Formation> {
    match source {
        FormationSource::Template(id) => match template_by_id(id) {
            Some(formation) => Ok(formation.clone()),
            None => bail!("Unknown template: {}", id),
        },
        FormationSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read formation file: {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid formation JSON: {}", path.display()))
        }
    }
}

pub fn read_play(path: &Path) -> Result<PlaySequence> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read play file: {}", path.display()))?;
    PlaySequence::from_json(&text).with_context(|| format!("Invalid play JSON: {}", path.display()))
}

// ============================================================================
// Formations
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub formation_type: String,
    pub personnel: Option<String>,
    pub players: usize,
}

pub fn template_summaries() -> Vec<TemplateSummary> {
    all_templates()
        .map(|f| TemplateSummary {
            id: f.id.clone(),
            name: f.name.clone(),
            formation_type: f.formation_type.as_str().to_string(),
            personnel: f.metadata.personnel.clone(),
            players: f.players.len(),
        })
        .collect()
}

/// Validates one formation, or several merged into a single roster (e.g.
/// an offensive and a defensive template).
pub fn validate_formations(sources: &[FormationSource]) -> Result<ValidationReport> {
    let mut formations = sources.iter().map(resolve_formation).collect::<Result<Vec<_>>>()?;
    let Some(mut merged) = formations.pop() else {
        bail!("No formation given");
    };
    for other in formations {
        merged.players.extend(other.players);
    }
    Ok(merged.validate())
}

pub fn flip_formation(source: &FormationSource, axis: FlipAxis) -> Result<Formation> {
    let mut formation = resolve_formation(source)?;
    formation.flip(axis);
    Ok(formation)
}

/// Imports a formation JSON file into the custom formation store at `dir`.
pub fn import_formation(store_dir: &Path, file: &Path) -> Result<Formation> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read formation file: {}", file.display()))?;
    let repository = JsonFileRepository::open(store_dir)
        .with_context(|| format!("Failed to open formation store: {}", store_dir.display()))?;
    let mut store = FormationStore::new(Box::new(repository));
    let formation = store.import_json(&text)?;
    info!(id = %formation.id, "formation imported");
    Ok(formation)
}

/// Saves a template (optionally flipped) as a new custom formation.
pub fn save_custom(store_dir: &Path, template_id: &str, name: &str, flip: Option<FlipAxis>) -> Result<Formation> {
    let repository = JsonFileRepository::open(store_dir)
        .with_context(|| format!("Failed to open formation store: {}", store_dir.display()))?;
    let mut store = FormationStore::new(Box::new(repository));
    store.load(template_id)?;
    if let Some(axis) = flip {
        store.flip(axis);
    }
    store.save_current_as_custom(name).context("Failed to save custom formation")
}

pub fn list_custom(store_dir: &Path) -> Result<Vec<Formation>> {
    let repository = JsonFileRepository::open(store_dir)
        .with_context(|| format!("Failed to open formation store: {}", store_dir.display()))?;
    let store = FormationStore::new(Box::new(repository));
    let available = store.available();
    Ok(available
        .offensive
        .into_iter()
        .chain(available.defensive)
        .filter(|f| template_by_id(&f.id).is_none())
        .collect())
}

pub fn formation_schema() -> Result<serde_json::Value> {
    Ok(serde_json::to_value(Formation::json_schema())?)
}

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub points: Vec<FieldPos>,
    pub depth_yards: f64,
    pub length_yards: f64,
    pub timing_ms: f64,
}

/// Parses `x,y;x,y;...` in yards.
pub fn parse_points(text: &str) -> Result<Vec<FieldPos>> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (x, y) = pair.split_once(',').with_context(|| format!("Expected x,y but got '{}'", pair))?;
            let x: f64 = x.trim().parse().with_context(|| format!("Invalid x in '{}'", pair))?;
            let y: f64 = y.trim().parse().with_context(|| format!("Invalid y in '{}'", pair))?;
            Ok(FieldPos::new(x, y))
        })
        .collect()
}

pub fn route_report(points: Vec<FieldPos>, config: &PlaybookConfig) -> Result<RouteReport> {
    let Some(meta) = route_metadata(&points, config.editor.route_speed_yards_per_sec) else {
        bail!("A route needs at least 2 points, got {}", points.len());
    };
    Ok(RouteReport {
        points,
        depth_yards: meta.depth_yards,
        length_yards: meta.length_yards,
        timing_ms: meta.timing_ms,
    })
}

// ============================================================================
// Plays
// ============================================================================

pub fn interpolate_play(play: &PlaySequence, at_ms: f64) -> PositionMap {
    playbook_core::interpolate_positions(&play.timeline, at_ms)
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseMark {
    pub phase: PlayPhase,
    pub start_ms: Option<f64>,
}

pub fn phase_marks(play: &PlaySequence, config: &PlaybookConfig) -> Vec<PhaseMark> {
    PlayPhase::ALL
        .into_iter()
        .map(|phase| PhaseMark {
            phase,
            start_ms: phase_start(&play.timeline, play.duration_ms, phase, config.timeline.snap_window_ms),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameSample {
    pub frame: usize,
    pub time_ms: f64,
    pub phase: PlayPhase,
    pub positions: PositionMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: usize,
    pub final_time_ms: f64,
    pub clock: String,
    pub render_calls: usize,
    pub samples: Vec<FrameSample>,
}

/// Plays `play` start to finish on a manual frame clock, sampling every
/// `sample_every` frames (and always the last one).
pub fn simulate_play(
    play: PlaySequence,
    config: &PlaybookConfig,
    rate: f64,
    sample_every: usize,
) -> Result<SimulationReport> {
    if play.duration_ms <= 0.0 {
        bail!("Play '{}' has no duration", play.id);
    }
    let sample_every = sample_every.max(1);
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let scheduler = ManualFrameScheduler::new();
    let mut session = AnalyzerSession::new(
        config,
        Box::new(MemoryRepository::new()),
        Box::new(scheduler.clone()),
        Rc::clone(&surface),
    );
    session.load_play(play);
    session.engine_mut().set_playback_rate(rate);
    session.toggle_playback();

    let mut frames = 0;
    let mut samples = Vec::new();
    while scheduler.fire().is_some() {
        session.tick();
        frames += 1;
        let engine = session.engine();
        if frames % sample_every == 0 || !engine.is_playing() {
            samples.push(FrameSample {
                frame: frames,
                time_ms: engine.current_time_ms(),
                phase: engine.current_phase(),
                positions: engine.current_positions(),
            });
        }
    }

    let report = SimulationReport {
        frames,
        final_time_ms: session.engine().current_time_ms(),
        clock: session.display_clock(),
        render_calls: surface.borrow().render_count(),
        samples,
    };
    session.dispose();
    Ok(report)
}
