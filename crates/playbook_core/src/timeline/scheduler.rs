//! Repaint-driven frame scheduling.
//!
//! The engine asks for one frame at a time and advances its clock when the
//! adapter reports that frame as fired ([`TimelineEngine::tick`]). Stopping
//! playback is "don't request the next frame", plus cancelling the one that
//! is still pending.
//!
//! [`TimelineEngine::tick`]: super::engine::TimelineEngine::tick

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

pub trait FrameScheduler {
    /// Ask for one callback on the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    /// Drop a pending request. Unknown or fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler whose frames fire only when [`fire`](Self::fire) is called.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the oldest pending frame. The caller then runs the frame body.
    pub fn fire(&self) -> Option<FrameHandle> {
        self.inner.borrow_mut().pending.pop_front()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn requested_count(&self) -> u64 {
        self.inner.borrow().requested
    }

    pub fn cancelled_count(&self) -> u64 {
        self.inner.borrow().cancelled
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        inner.requested += 1;
        let handle = FrameHandle(inner.next_id);
        inner.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.pending.len();
        inner.pending.retain(|h| *h != handle);
        if inner.pending.len() != before {
            inner.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fire_cancel() {
        let scheduler = ManualFrameScheduler::new();
        let mut handle = scheduler.clone();

        let a = handle.request_frame();
        let b = handle.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count(), 2);

        handle.cancel_frame(b);
        handle.cancel_frame(b);
        assert_eq!(scheduler.cancelled_count(), 1);

        assert_eq!(scheduler.fire(), Some(a));
        assert_eq!(scheduler.fire(), None);
        assert_eq!(scheduler.requested_count(), 2);
    }
}
