//! Timeline Engine
//!
//! Owns one [`PlaySequence`], a play/pause/seek clock advanced one repaint
//! frame at a time, and keyframe interpolation for any time on that clock.
//!
//! ## Video sync
//!
//! With auto-sync on, the engine and a bound video follow each other:
//! - engine seek / new sequence: video time := `(current + offset) / 1000` s
//! - video `seeked`, or `timeupdate` while the engine is idle:
//!   current := `clamp(video_s * 1000 - offset, 0, duration)`
//! - play/pause go both ways; a transport change that came *from* the video
//!   is never sent back to it.
//!
//! [`ClockAuthority`] names the side that currently owns the clock: the
//! engine while it animates, the video otherwise.
//!
//! Every operation is a no-op while no sequence is loaded.

use super::interpolate::interpolate_positions;
use super::phase::{phase_at, phase_start, PlayPhase};
use super::scheduler::{FrameHandle, FrameScheduler};
use super::video::{ClockAuthority, VideoElement, VideoEvent};
use crate::config::TimelineConfig;
use crate::models::{EventType, PlaySequence, PositionMap, TimelineEvent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Video seconds compared this closely count as the same position.
const VIDEO_TIME_EPSILON_S: f64 = 1e-6;

pub type TimeUpdateCallback = Box<dyn FnMut(f64, &PositionMap)>;
pub type PlayStateCallback = Box<dyn FnMut(bool)>;
pub type SeekCallback = Box<dyn FnMut(f64)>;

/// Saved engine state. Missing fields are left untouched on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<PlaySequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

/// `m:ss` with whole seconds truncated.
pub fn format_clock(time_ms: f64) -> String {
    let total_s = if time_ms.is_finite() && time_ms > 0.0 { (time_ms / 1000.0).floor() as u64 } else { 0 };
    format!("{}:{:02}", total_s / 60, total_s % 60)
}

pub struct TimelineEngine {
    config: TimelineConfig,
    sequence: Option<PlaySequence>,

    // === Clock ===
    current_time_ms: f64,
    duration_ms: f64,
    is_playing: bool,
    playback_rate: f64,
    scheduler: Box<dyn FrameScheduler>,
    pending_frame: Option<FrameHandle>,

    // === Video sync ===
    auto_sync: bool,
    offset_ms: f64,
    video: Option<Box<dyn VideoElement>>,
    /// Video time we last pushed; its `seeked` echo is dropped.
    pending_video_seek: Option<f64>,

    // === Observers ===
    on_time_update: Option<TimeUpdateCallback>,
    on_play_state_change: Option<PlayStateCallback>,
    on_seek: Option<SeekCallback>,
}

impl TimelineEngine {
    pub fn new(config: TimelineConfig, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            sequence: None,
            current_time_ms: 0.0,
            duration_ms: 0.0,
            is_playing: false,
            playback_rate: config.default_playback_rate,
            scheduler,
            pending_frame: None,
            auto_sync: config.auto_sync,
            offset_ms: config.offset_ms,
            video: None,
            pending_video_seek: None,
            on_time_update: None,
            on_play_state_change: None,
            on_seek: None,
            config,
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn set_on_time_update(&mut self, callback: impl FnMut(f64, &PositionMap) + 'static) {
        self.on_time_update = Some(Box::new(callback));
    }

    pub fn set_on_play_state_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_play_state_change = Some(Box::new(callback));
    }

    pub fn set_on_seek(&mut self, callback: impl FnMut(f64) + 'static) {
        self.on_seek = Some(Box::new(callback));
    }

    fn emit_positions(&mut self) {
        let Some(sequence) = &self.sequence else {
            return;
        };
        let positions = interpolate_positions(&sequence.timeline, self.current_time_ms);
        if let Some(callback) = self.on_time_update.as_mut() {
            callback(self.current_time_ms, &positions);
        }
    }

    fn emit_play_state(&mut self) {
        if let Some(callback) = self.on_play_state_change.as_mut() {
            callback(self.is_playing);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn sequence(&self) -> Option<&PlaySequence> {
        self.sequence.as_ref()
    }

    pub fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn auto_sync(&self) -> bool {
        self.auto_sync
    }

    pub fn offset_ms(&self) -> f64 {
        self.offset_ms
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn clock_authority(&self) -> ClockAuthority {
        if self.is_playing {
            ClockAuthority::Engine
        } else {
            ClockAuthority::Video
        }
    }

    // ========================================================================
    // Sequence
    // ========================================================================

    /// Replaces the sequence and rewinds to 0. An unsorted timeline is
    /// stable-sorted first; a negative or non-finite duration becomes 0.
    pub fn set_timeline(&mut self, mut sequence: PlaySequence) {
        if !sequence.is_chronological() {
            warn!(play_id = %sequence.id, "timeline events out of order, sorting");
            sequence.sort_timeline();
        }
        if !(sequence.duration_ms.is_finite() && sequence.duration_ms >= 0.0) {
            warn!(play_id = %sequence.id, duration_ms = sequence.duration_ms, "invalid play duration, using 0");
            sequence.duration_ms = 0.0;
        }
        debug!(play_id = %sequence.id, events = sequence.timeline.len(), duration_ms = sequence.duration_ms, "timeline set");
        self.duration_ms = sequence.duration_ms;
        self.current_time_ms = 0.0;
        self.sequence = Some(sequence);
        self.sync_video_to_timeline();
    }

    /// Inserts after any events with the same timestamp and extends the
    /// duration to cover the event. Returns false without a sequence or
    /// for a non-finite timestamp.
    pub fn add_event(&mut self, event: TimelineEvent) -> bool {
        if !event.timestamp_ms.is_finite() {
            debug!(timestamp_ms = event.timestamp_ms, "rejecting event with non-finite timestamp");
            return false;
        }
        let tail = self.config.event_tail_ms;
        let Some(sequence) = self.sequence.as_mut() else {
            return false;
        };
        let index = sequence.timeline.partition_point(|e| e.timestamp_ms <= event.timestamp_ms);
        self.duration_ms = self.duration_ms.max(event.timestamp_ms + tail);
        sequence.duration_ms = self.duration_ms;
        sequence.timeline.insert(index, event);
        true
    }

    /// Removes the first event within the remove tolerance of `timestamp_ms`.
    pub fn remove_event(&mut self, timestamp_ms: f64) -> Option<TimelineEvent> {
        let tolerance = self.config.remove_tolerance_ms;
        let sequence = self.sequence.as_mut()?;
        let index = sequence.timeline.iter().position(|e| (e.timestamp_ms - timestamp_ms).abs() < tolerance)?;
        Some(sequence.timeline.remove(index))
    }

    pub fn event_at(&self, time_ms: f64) -> Option<&TimelineEvent> {
        let tolerance = self.config.lookup_tolerance_ms;
        self.sequence.as_ref()?.timeline.iter().find(|e| (e.timestamp_ms - time_ms).abs() < tolerance)
    }

    pub fn positions_at(&self, time_ms: f64) -> PositionMap {
        self.sequence.as_ref().map(|s| interpolate_positions(&s.timeline, time_ms)).unwrap_or_default()
    }

    pub fn current_positions(&self) -> PositionMap {
        self.positions_at(self.current_time_ms)
    }

    /// A `movement` event at the current time holding the interpolated
    /// positions.
    pub fn create_snapshot(&self) -> TimelineEvent {
        TimelineEvent {
            timestamp_ms: self.current_time_ms,
            player_positions: self.current_positions(),
            event_type: EventType::Movement,
        }
    }

    pub fn phase_at(&self, time_ms: f64) -> PlayPhase {
        match &self.sequence {
            Some(s) => phase_at(&s.timeline, self.duration_ms, time_ms, self.config.snap_window_ms),
            None => PlayPhase::PreSnap,
        }
    }

    pub fn current_phase(&self) -> PlayPhase {
        self.phase_at(self.current_time_ms)
    }

    /// Seeks to the start of `phase`; `snap` without a snap event stays put.
    pub fn seek_to_phase(&mut self, phase: PlayPhase) {
        let Some(sequence) = &self.sequence else {
            return;
        };
        if let Some(target) = phase_start(&sequence.timeline, self.duration_ms, phase, self.config.snap_window_ms) {
            self.seek(target);
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn play(&mut self) {
        self.start_playback(true);
    }

    pub fn pause(&mut self) {
        self.stop_playback(true);
    }

    pub fn toggle(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    fn start_playback(&mut self, drive_video: bool) {
        if self.is_playing || self.sequence.is_none() {
            return;
        }
        self.is_playing = true;
        debug!(time_ms = self.current_time_ms, "playback started");
        self.emit_play_state();
        if drive_video && self.auto_sync {
            if let Some(video) = self.video.as_mut() {
                video.play();
            }
        }
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn stop_playback(&mut self, drive_video: bool) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        debug!(time_ms = self.current_time_ms, "playback paused");
        self.emit_play_state();
        if drive_video && self.auto_sync {
            if let Some(video) = self.video.as_mut() {
                video.pause();
            }
        }
        self.cancel_pending_frame();
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Clamps to `[0, duration]`, emits positions and pushes the video clock.
    pub fn seek(&mut self, time_ms: f64) {
        if self.sequence.is_none() || time_ms.is_nan() {
            return;
        }
        self.current_time_ms = time_ms.clamp(0.0, self.duration_ms);
        self.sync_video_to_timeline();
        self.emit_positions();
        if let Some(callback) = self.on_seek.as_mut() {
            callback(self.current_time_ms);
        }
    }

    pub fn step(&mut self, delta_ms: f64) {
        self.seek(self.current_time_ms + delta_ms);
    }

    /// One animation frame. Ignored unless a frame is pending.
    pub fn tick(&mut self) {
        if self.pending_frame.take().is_none() || !self.is_playing {
            return;
        }
        self.current_time_ms += self.config.frame_interval_ms * self.playback_rate;

        if self.current_time_ms >= self.duration_ms {
            self.current_time_ms = self.duration_ms;
            self.emit_positions();
            debug!(duration_ms = self.duration_ms, "reached end of play");
            self.stop_playback(true);
            return;
        }

        self.emit_positions();
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Also applied to the bound video. Non-positive rates are ignored.
    pub fn set_playback_rate(&mut self, rate: f64) {
        if !(rate.is_finite() && rate > 0.0) {
            debug!(rate, "ignoring invalid playback rate");
            return;
        }
        self.playback_rate = rate;
        if let Some(video) = self.video.as_mut() {
            video.set_playback_rate(rate);
        }
    }

    pub fn set_offset(&mut self, offset_ms: f64) {
        if offset_ms.is_finite() {
            self.offset_ms = offset_ms;
        }
    }

    pub fn set_auto_sync(&mut self, enabled: bool) {
        self.auto_sync = enabled;
    }

    // ========================================================================
    // Video
    // ========================================================================

    /// Replaces any bound video and pushes the current clock to it.
    pub fn bind_video(&mut self, video: Box<dyn VideoElement>) {
        self.video = Some(video);
        self.pending_video_seek = None;
        self.sync_video_to_timeline();
    }

    pub fn unbind_video(&mut self) -> Option<Box<dyn VideoElement>> {
        self.pending_video_seek = None;
        self.video.take()
    }

    fn sync_video_to_timeline(&mut self) {
        if !self.auto_sync || self.sequence.is_none() {
            return;
        }
        if let Some(video) = self.video.as_mut() {
            let seconds = (self.current_time_ms + self.offset_ms) / 1000.0;
            video.set_current_time_s(seconds);
            self.pending_video_seek = Some(seconds);
        }
    }

    fn sync_timeline_to_video(&mut self, video_time_s: f64) {
        if self.sequence.is_none() || !video_time_s.is_finite() {
            return;
        }
        let timeline_ms = video_time_s * 1000.0 - self.offset_ms;
        self.current_time_ms = timeline_ms.clamp(0.0, self.duration_ms);
        self.emit_positions();
    }

    /// Entry point for events raised by the bound video.
    pub fn on_video_event(&mut self, event: VideoEvent) {
        if self.video.is_none() {
            return;
        }
        match event {
            VideoEvent::Play => self.start_playback(false),
            VideoEvent::Pause => self.stop_playback(false),
            VideoEvent::Seeked { current_time_s } => {
                if !self.auto_sync {
                    return;
                }
                let echo = self
                    .pending_video_seek
                    .take()
                    .is_some_and(|pushed| (pushed - current_time_s).abs() < VIDEO_TIME_EPSILON_S);
                if echo {
                    return;
                }
                self.sync_timeline_to_video(current_time_s);
            }
            VideoEvent::TimeUpdate { current_time_s } => {
                if self.auto_sync && self.clock_authority() == ClockAuthority::Video {
                    self.sync_timeline_to_video(current_time_s);
                }
            }
            VideoEvent::RateChange { rate } => {
                if rate.is_finite() && rate > 0.0 {
                    self.playback_rate = rate;
                }
            }
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn export_state(&self) -> Option<TimelineState> {
        let sequence = self.sequence.as_ref()?;
        Some(TimelineState {
            timeline: Some(sequence.clone()),
            current_time: Some(self.current_time_ms),
            playback_rate: Some(self.playback_rate),
            offset: Some(self.offset_ms),
        })
    }

    /// Applies timeline, then seek, then rate, then offset.
    pub fn import_state(&mut self, state: TimelineState) {
        if let Some(sequence) = state.timeline {
            self.set_timeline(sequence);
        }
        if let Some(time) = state.current_time {
            self.seek(time);
        }
        if let Some(rate) = state.playback_rate {
            self.set_playback_rate(rate);
        }
        if let Some(offset) = state.offset {
            self.set_offset(offset);
        }
    }

    /// 0 for an empty play.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (self.current_time_ms / self.duration_ms * 100.0).clamp(0.0, 100.0)
    }

    pub fn display_clock(&self) -> String {
        format!("{} / {}", format_clock(self.current_time_ms), format_clock(self.duration_ms))
    }

    /// Stops playback, cancels the pending frame and drops the video.
    pub fn dispose(&mut self) {
        self.pause();
        self.cancel_pending_frame();
        self.unbind_video();
    }
}
