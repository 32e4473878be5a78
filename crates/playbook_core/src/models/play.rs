use super::formation::Formation;
use super::player::FieldPos;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Player id → position. Ordered so output is deterministic.
pub type PositionMap = BTreeMap<String, FieldPos>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Snap,
    Movement,
    Contact,
    Completion,
    Pressure,
}

/// Keyframe: positions of some (not necessarily all) players at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(rename = "timestamp", alias = "timestampMs")]
    pub timestamp_ms: f64,
    pub player_positions: PositionMap,
    pub event_type: EventType,
}

impl TimelineEvent {
    pub fn new(timestamp_ms: f64, event_type: EventType) -> Self {
        Self { timestamp_ms, player_positions: PositionMap::new(), event_type }
    }

    pub fn with_position(mut self, player_id: impl Into<String>, x: f64, y: f64) -> Self {
        self.player_positions.insert(player_id.into(), FieldPos::new(x, y));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PlaySequence {
    pub id: String,
    pub name: String,
    pub formation: Formation,
    /// Sorted ascending by timestamp.
    pub timeline: Vec<TimelineEvent>,
    #[serde(rename = "duration", alias = "durationMs")]
    pub duration_ms: f64,
}

impl PlaySequence {
    pub fn is_chronological(&self) -> bool {
        self.timeline.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms)
    }

    /// Stable sort by timestamp; equal timestamps keep their relative order.
    pub fn sort_timeline(&mut self) {
        self.timeline.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
    }

    pub fn snap_event(&self) -> Option<&TimelineEvent> {
        self.timeline.iter().find(|e| e.event_type == EventType::Snap)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
