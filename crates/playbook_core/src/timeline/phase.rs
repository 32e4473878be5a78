use crate::models::{EventType, TimelineEvent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PlayPhase {
    PreSnap,
    Snap,
    PostSnap,
    End,
}

impl PlayPhase {
    pub const ALL: [PlayPhase; 4] = [PlayPhase::PreSnap, PlayPhase::Snap, PlayPhase::PostSnap, PlayPhase::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayPhase::PreSnap => "pre-snap",
            PlayPhase::Snap => "snap",
            PlayPhase::PostSnap => "post-snap",
            PlayPhase::End => "end",
        }
    }
}

impl fmt::Display for PlayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayPhase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase '{}'", s))
    }
}

/// Time of the first snap event, if any.
pub fn snap_time(events: &[TimelineEvent]) -> Option<f64> {
    events.iter().find(|e| e.event_type == EventType::Snap).map(|e| e.timestamp_ms)
}

/// Phase at `time_ms`. Without a snap event the whole play is pre-snap.
pub fn phase_at(events: &[TimelineEvent], duration_ms: f64, time_ms: f64, snap_window_ms: f64) -> PlayPhase {
    let Some(snap) = snap_time(events) else {
        return PlayPhase::PreSnap;
    };
    if time_ms < snap {
        PlayPhase::PreSnap
    } else if time_ms < snap + snap_window_ms {
        PlayPhase::Snap
    } else if time_ms < duration_ms - snap_window_ms {
        PlayPhase::PostSnap
    } else {
        PlayPhase::End
    }
}

/// Seek target for the start of `phase`. `None` for `snap` without a snap
/// event; post-snap falls back to half the duration.
pub fn phase_start(events: &[TimelineEvent], duration_ms: f64, phase: PlayPhase, snap_window_ms: f64) -> Option<f64> {
    let snap = snap_time(events);
    match phase {
        PlayPhase::PreSnap => Some(0.0),
        PlayPhase::Snap => snap,
        PlayPhase::PostSnap => Some(snap.map_or(duration_ms * 0.5, |t| t + snap_window_ms)),
        PlayPhase::End => Some(duration_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_with_snap_at(t: f64) -> Vec<TimelineEvent> {
        vec![TimelineEvent::new(0.0, EventType::Movement), TimelineEvent::new(t, EventType::Snap)]
    }

    #[test]
    fn test_phase_boundaries() {
        let events = events_with_snap_at(1000.0);
        assert_eq!(phase_at(&events, 5000.0, 999.0, 500.0), PlayPhase::PreSnap);
        assert_eq!(phase_at(&events, 5000.0, 1000.0, 500.0), PlayPhase::Snap);
        assert_eq!(phase_at(&events, 5000.0, 1499.0, 500.0), PlayPhase::Snap);
        assert_eq!(phase_at(&events, 5000.0, 1500.0, 500.0), PlayPhase::PostSnap);
        assert_eq!(phase_at(&events, 5000.0, 4500.0, 500.0), PlayPhase::End);
    }

    #[test]
    fn test_no_snap_is_always_pre_snap() {
        let events = vec![TimelineEvent::new(0.0, EventType::Movement)];
        assert_eq!(phase_at(&events, 5000.0, 4999.0, 500.0), PlayPhase::PreSnap);
        assert_eq!(phase_start(&events, 5000.0, PlayPhase::Snap, 500.0), None);
        assert_eq!(phase_start(&events, 5000.0, PlayPhase::PostSnap, 500.0), Some(2500.0));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(serde_json::to_string(&PlayPhase::PostSnap).unwrap(), "\"post-snap\"");
        assert_eq!("pre-snap".parse::<PlayPhase>(), Ok(PlayPhase::PreSnap));
        assert!("halftime".parse::<PlayPhase>().is_err());
    }
}
