//! Video element collaborator
//!
//! The engine binds to at most one [`VideoElement`]. The element's own
//! events reach the engine as [`VideoEvent`] values pushed by the adapter.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// VideoElement Trait
// ============================================================================

/// Clock and transport controls of a bound video.
pub trait VideoElement {
    /// Playback position (seconds)
    fn current_time_s(&self) -> f64;

    fn set_current_time_s(&mut self, seconds: f64);

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    fn play(&mut self);

    fn pause(&mut self);
}

/// Events emitted by the video element itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VideoEvent {
    Play,
    Pause,
    Seeked { current_time_s: f64 },
    TimeUpdate { current_time_s: f64 },
    RateChange { rate: f64 },
}

/// Which side owns the timeline clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockAuthority {
    /// The engine is animating; video time updates are ignored.
    Engine,
    /// The engine is idle; the video's clock drives the timeline.
    Video,
}

// ============================================================================
// SharedVideo
// ============================================================================

/// A call made on a [`SharedVideo`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VideoCall {
    Play,
    Pause,
    Seek(f64),
    Rate(f64),
}

#[derive(Debug)]
struct VideoInner {
    current_time_s: f64,
    playback_rate: f64,
    paused: bool,
    calls: Vec<VideoCall>,
}

/// In-memory video element. Clones share state, so a test or the CLI can
/// keep one handle while the engine owns another.
#[derive(Debug, Clone)]
pub struct SharedVideo {
    inner: Rc<RefCell<VideoInner>>,
}

impl Default for SharedVideo {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedVideo {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VideoInner {
                current_time_s: 0.0,
                playback_rate: 1.0,
                paused: true,
                calls: Vec::new(),
            })),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    pub fn calls(&self) -> Vec<VideoCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn count(&self, call: fn(&VideoCall) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| call(c)).count()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

impl VideoElement for SharedVideo {
    fn current_time_s(&self) -> f64 {
        self.inner.borrow().current_time_s
    }

    fn set_current_time_s(&mut self, seconds: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.current_time_s = seconds;
        inner.calls.push(VideoCall::Seek(seconds));
    }

    fn playback_rate(&self) -> f64 {
        self.inner.borrow().playback_rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.playback_rate = rate;
        inner.calls.push(VideoCall::Rate(rate));
    }

    fn play(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.paused = false;
        inner.calls.push(VideoCall::Play);
    }

    fn pause(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.paused = true;
        inner.calls.push(VideoCall::Pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let video = SharedVideo::new();
        let mut handle = video.clone();
        handle.set_current_time_s(3.5);
        handle.play();

        assert_eq!(video.current_time_s(), 3.5);
        assert!(!video.is_paused());
        assert_eq!(video.calls(), vec![VideoCall::Seek(3.5), VideoCall::Play]);
        assert_eq!(video.count(|c| matches!(c, VideoCall::Play)), 1);
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(VideoEvent::Seeked { current_time_s: 6.0 }).unwrap();
        assert_eq!(json["kind"], "seeked");
        assert_eq!(json["current_time_s"], 6.0);
    }
}
