//! Per-frame cooperative scheduling.
//!
//! Every frame-driven component (path sampler, compositor, settle timer) registers one pending
//! callback at a time and re-registers itself after doing one frame of work. Cancelling a handle
//! removes the entry, so a cancelled callback can never fire afterwards.

use std::time::Duration;

/// Identifies one pending callback. Handles are never reused within a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

#[derive(Clone, Copy, Debug)]
enum Wake {
    NextFrame,
    At(Duration),
}

#[derive(Debug)]
struct Entry<T> {
    handle: FrameHandle,
    wake: Wake,
    task: T,
}

/// Display-refresh scheduler holding typed tasks instead of closures.
///
/// `take_due` returns callbacks in registration order. Callbacks registered while a frame is
/// being dispatched fire on the following frame.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameScheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, wake: Wake, task: T) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, wake, task });
        handle
    }

    /// Run `task` on the next display frame.
    pub fn request_frame(&mut self, task: T) -> FrameHandle {
        self.push(Wake::NextFrame, task)
    }

    /// Run `task` on the first display frame at or after `at`.
    pub fn set_timeout(&mut self, at: Duration, task: T) -> FrameHandle {
        self.push(Wake::At(at), task)
    }

    /// Cancel a pending callback. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        before != self.entries.len()
    }

    /// Return `true` when `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Remove and return every callback due at display time `now`, in registration order.
    pub fn take_due(&mut self, now: Duration) -> Vec<(FrameHandle, T)> {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.entries.len());
        for e in self.entries.drain(..) {
            let ready = match e.wake {
                Wake::NextFrame => true,
                Wake::At(at) => at <= now,
            };
            if ready {
                due.push((e.handle, e.task));
            } else {
                keep.push(e);
            }
        }
        self.entries = keep;
        due
    }

    /// Number of pending callbacks.
    pub fn pending_len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is scheduled.
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
