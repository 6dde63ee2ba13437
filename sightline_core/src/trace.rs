// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for visibility passes.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! pass driver emits. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates the per-item [`ItemVerdictEvent`]
//!   and the corresponding `TraceSink` method.

use kurbo::Size;

use crate::host::{DispatchOutcome, ScreenEvent};
use crate::pass::PassReport;
use crate::registry::ItemId;
use crate::side::Side;
use crate::time::HostTime;

#[cfg(feature = "trace-rich")]
use crate::visibility::Offset;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted before the first item of a pass is evaluated.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Frame time the pass runs at.
    pub timestamp: HostTime,
    /// Number of items the pass will visit.
    pub items: usize,
    /// Viewport size queried for this pass.
    pub viewport: Size,
}

/// Emitted after the last item of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Frame time the pass ran at.
    pub timestamp: HostTime,
    /// What the pass did.
    pub report: PassReport,
}

/// Emitted for every notification delivered to the host.
#[derive(Clone, Copy, Debug)]
pub struct NotificationEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Item the notification targeted.
    pub item: ItemId,
    /// Which notification.
    pub event: ScreenEvent,
    /// The side carried in the notification detail.
    pub side: Side,
    /// Whether a listener canceled it.
    pub outcome: DispatchOutcome,
}

/// Emitted when an item's callback returns an error.
#[derive(Clone, Copy, Debug)]
pub struct CallbackFailedEvent<'a> {
    /// Pass counter.
    pub pass_index: u64,
    /// Item whose callback failed.
    pub item: ItemId,
    /// The notification the callback was handling.
    pub event: ScreenEvent,
    /// Error description.
    pub message: &'a str,
}

/// The raw evaluation of one item (requires `trace-rich` feature).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ItemVerdictEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Item evaluated.
    pub item: ItemId,
    /// Off-screen side, `None` when on-screen.
    pub side: Option<Side>,
    /// Normalized offsets.
    pub offset: Offset,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the pass driver.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of a pass.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pass.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called after each notification is dispatched.
    fn on_notification(&mut self, e: &NotificationEvent) {
        _ = e;
    }

    /// Called when a callback fails.
    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        _ = e;
    }

    /// Called with each item's evaluation (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_item_verdict(&mut self, e: &ItemVerdictEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NotificationEvent`].
    #[inline]
    pub fn notification(&mut self, e: &NotificationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_notification(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CallbackFailedEvent`].
    #[inline]
    pub fn callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_callback_failed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ItemVerdictEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn item_verdict(&mut self, e: &ItemVerdictEvent) {
        if let Some(s) = &mut self.sink {
            s.on_item_verdict(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> PassBeginEvent {
        PassBeginEvent {
            pass_index: 3,
            timestamp: HostTime(16_000),
            items: 2,
            viewport: Size::new(1024.0, 768.0),
        }
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&sample_begin());
        sink.on_pass_end(&PassEndEvent {
            pass_index: 3,
            timestamp: HostTime(16_500),
            report: PassReport::default(),
        });
        sink.on_callback_failed(&CallbackFailedEvent {
            pass_index: 3,
            item: ItemId {
                idx: 0,
                generation: 0,
            },
            event: ScreenEvent::Enter,
            message: "boom",
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pass_begin(&sample_begin());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pass_begin(&mut self, e: &PassBeginEvent) {
                self.passes.push(e.pass_index);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.pass_begin(&sample_begin());
        drop(tracer);
        assert_eq!(sink.passes, &[3]);
    }
}
