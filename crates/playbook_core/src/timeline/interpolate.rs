//! Keyframe interpolation.

use crate::models::{PositionMap, TimelineEvent};

/// Player positions at `time_ms` from a timeline sorted by timestamp.
///
/// - before the first event: the first event's positions
/// - at or after the last event: the last event's positions
/// - between two events: per-player linear blend; a player present in only
///   one of the two keeps that event's position
///
/// An empty timeline yields an empty map.
pub fn interpolate_positions(events: &[TimelineEvent], time_ms: f64) -> PositionMap {
    // index of the first event strictly after `time_ms`
    let split = events.partition_point(|e| e.timestamp_ms <= time_ms);

    let Some(before) = split.checked_sub(1).map(|i| &events[i]) else {
        return events.first().map(|e| e.player_positions.clone()).unwrap_or_default();
    };
    let Some(after) = events.get(split) else {
        return before.player_positions.clone();
    };

    let span = after.timestamp_ms - before.timestamp_ms;
    let t = if span > 0.0 { (time_ms - before.timestamp_ms) / span } else { 0.0 };

    let mut positions = after.player_positions.clone();
    for (player_id, from) in &before.player_positions {
        let blended = match after.player_positions.get(player_id) {
            Some(to) => from.lerp(to, t),
            None => *from,
        };
        positions.insert(player_id.clone(), blended);
    }
    positions
}
