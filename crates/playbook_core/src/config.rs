//! # Playbook Configuration
//!
//! Every tuning constant of the editor and the timeline lives here so the
//! adapters (browser shell, CLI, tests) can swap presets without touching
//! the state machines.
//!
//! ## Usage
//! ```rust
//! use playbook_core::config::PlaybookConfig;
//!
//! let config = PlaybookConfig::default();
//! let yaml = "editor:\n  grid_size: 2.0\n";
//! let custom = PlaybookConfig::from_yaml_str(yaml).unwrap();
//! assert_eq!(custom.editor.grid_size, 2.0);
//! assert_eq!(custom.timeline.frame_interval_ms, config.timeline.frame_interval_ms);
//! ```

use crate::error::{PlaybookError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canvas geometry used by the coordinate mapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Canvas width in pixels (default: 1200, i.e. 120 yd * 10 px)
    pub canvas_width: f64,
    /// Canvas height in pixels (default: 533)
    pub canvas_height: f64,
    /// Horizontal pixels per yard (default: 10)
    pub yard_to_pixel: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self { canvas_width: 1200.0, canvas_height: 533.0, yard_to_pixel: 10.0 }
    }
}

/// Route editor parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Snap dragged players and route points to the grid (default: true)
    pub snap_to_grid: bool,
    /// Grid size in yards, clamped to [0.5, 5] by the editor (default: 1)
    pub grid_size: f64,
    /// Traversal speed used to estimate route timing (default: 22 yd/s).
    ///
    /// Kept for compatibility with saved play timings; it is a tunable,
    /// not a measured running speed.
    pub route_speed_yards_per_sec: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { snap_to_grid: true, grid_size: 1.0, route_speed_yards_per_sec: 22.0 }
    }
}

/// Timeline engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    // === Clock ===
    /// Clock advance per animation frame at 1x (default: 16.67ms, ~60 Hz)
    pub frame_interval_ms: f64,
    /// Initial playback rate (default: 1.0)
    pub default_playback_rate: f64,

    // === Video sync ===
    /// Keep a bound video in lock-step with the timeline (default: true)
    pub auto_sync: bool,
    /// Video time minus timeline time, in ms (default: 0)
    pub offset_ms: f64,

    // === Event editing ===
    /// `remove_event` matches events within this distance (default: 50ms)
    pub remove_tolerance_ms: f64,
    /// `event_at` matches events within this distance (default: 100ms)
    pub lookup_tolerance_ms: f64,
    /// Length of the `snap` phase after the snap event (default: 500ms)
    pub snap_window_ms: f64,
    /// Duration is extended to at least `timestamp + tail` on insert (default: 1000ms)
    pub event_tail_ms: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16.67,
            default_playback_rate: 1.0,

            auto_sync: true,
            offset_ms: 0.0,

            remove_tolerance_ms: 50.0,
            lookup_tolerance_ms: 100.0,
            snap_window_ms: 500.0,
            event_tail_ms: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlaybookConfig {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl PlaybookConfig {
    /// Free placement: no snapping, half-yard grid when re-enabled.
    pub fn precise() -> Self {
        let mut cfg = Self::default();
        cfg.editor.snap_to_grid = false;
        cfg.editor.grid_size = 0.5;
        cfg
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(text).map_err(|e| PlaybookError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json` file, anything else is read as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("field.canvas_width", self.field.canvas_width),
            ("field.canvas_height", self.field.canvas_height),
            ("field.yard_to_pixel", self.field.yard_to_pixel),
            ("editor.grid_size", self.editor.grid_size),
            ("editor.route_speed_yards_per_sec", self.editor.route_speed_yards_per_sec),
            ("timeline.frame_interval_ms", self.timeline.frame_interval_ms),
            ("timeline.default_playback_rate", self.timeline.default_playback_rate),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlaybookError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !self.timeline.offset_ms.is_finite() {
            return Err(PlaybookError::Config("timeline.offset_ms must be finite".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = PlaybookConfig::default();
        assert_eq!(cfg.editor.route_speed_yards_per_sec, 22.0);
        assert_eq!(cfg.editor.grid_size, 1.0);
        assert!((cfg.timeline.frame_interval_ms - 16.67).abs() < 1e-9);
        assert!(cfg.timeline.auto_sync);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_precise_preset_disables_snapping() {
        let cfg = PlaybookConfig::precise();
        assert!(!cfg.editor.snap_to_grid);
        assert!(cfg.editor.grid_size < PlaybookConfig::default().editor.grid_size);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = PlaybookConfig::from_yaml_str("timeline:\n  offset_ms: 200\n").unwrap();
        assert_eq!(cfg.timeline.offset_ms, 200.0);
        assert_eq!(cfg.timeline.remove_tolerance_ms, 50.0);
        assert_eq!(cfg.field, FieldConfig::default());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut cfg = PlaybookConfig::default();
        cfg.editor.grid_size = 2.5;
        cfg.timeline.auto_sync = false;
        let yaml = cfg.to_yaml_string().unwrap();
        let parsed = PlaybookConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_rejects_zero_frame_interval() {
        let err = PlaybookConfig::from_json_str(r#"{"timeline": {"frame_interval_ms": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, PlaybookError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playbook.yaml");
        std::fs::write(&path, "editor:\n  snap_to_grid: false\n").unwrap();
        let cfg = PlaybookConfig::load(&path).unwrap();
        assert!(!cfg.editor.snap_to_grid);
    }
}
