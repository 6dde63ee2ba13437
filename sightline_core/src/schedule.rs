// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pass coalescing.
//!
//! Any number of triggers between two frames collapse into one pass. The
//! [`PassScheduler`] holds a single pending flag:
//!
//! - [`request`](PassScheduler::request) arms exactly one frame when nothing
//!   is pending and at least one item is tracked, and is a no-op otherwise.
//! - [`begin_pass`](PassScheduler::begin_pass) clears the flag **before** the
//!   pass body runs, so a trigger raised by a callback during the pass arms a
//!   fresh frame instead of being swallowed.

use crate::host::FrameRequester;

/// Counters kept by a [`PassScheduler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    /// Every call to [`PassScheduler::request`].
    pub requests: u64,
    /// Requests that armed a frame.
    pub frames_requested: u64,
    /// Passes started.
    pub passes: u64,
}

/// Single-flag frame batcher.
#[derive(Clone, Debug, Default)]
pub struct PassScheduler {
    pending: bool,
    stats: ScheduleStats,
}

impl PassScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: false,
            stats: ScheduleStats {
                requests: 0,
                frames_requested: 0,
                passes: 0,
            },
        }
    }

    /// Whether a frame has been requested and not yet delivered.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Counters since creation.
    #[must_use]
    pub const fn stats(&self) -> ScheduleStats {
        self.stats
    }

    /// Requests a pass. Returns `true` if this call armed a frame.
    pub fn request(&mut self, has_items: bool, frames: &mut (impl FrameRequester + ?Sized)) -> bool {
        self.stats.requests += 1;
        if self.pending || !has_items {
            return false;
        }
        self.pending = true;
        self.stats.frames_requested += 1;
        frames.request_frame();
        true
    }

    /// Marks the start of a pass and returns its index.
    ///
    /// Called from the frame callback whether or not a request is pending.
    pub fn begin_pass(&mut self) -> u64 {
        self.pending = false;
        let index = self.stats.passes;
        self.stats.passes += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingFrames(u32);

    impl FrameRequester for CountingFrames {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn burst_of_requests_arms_one_frame() {
        let mut sched = PassScheduler::new();
        let mut frames = CountingFrames::default();
        let armed = (0..100).filter(|_| sched.request(true, &mut frames)).count();
        assert_eq!(armed, 1);
        assert_eq!(frames.0, 1);
        assert!(sched.is_pending());
        assert_eq!(sched.stats().requests, 100);
    }

    #[test]
    fn nothing_is_armed_without_items() {
        let mut sched = PassScheduler::new();
        let mut frames = CountingFrames::default();
        assert!(!sched.request(false, &mut frames));
        assert_eq!(frames.0, 0);
        assert!(!sched.is_pending());
    }

    #[test]
    fn request_during_a_pass_arms_the_next_frame() {
        let mut sched = PassScheduler::new();
        let mut frames = CountingFrames::default();
        sched.request(true, &mut frames);

        assert_eq!(sched.begin_pass(), 0);
        assert!(sched.request(true, &mut frames), "flag cleared before the pass body");
        assert_eq!(frames.0, 2);
        assert_eq!(sched.begin_pass(), 1);
        assert_eq!(sched.stats().passes, 2);
    }
}
