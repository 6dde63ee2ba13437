// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to milliseconds using a [`Timebase`].

use std::io::Write;

use sightline_core::host::{DispatchOutcome, ScreenEvent};
use sightline_core::registry::ItemId;
use sightline_core::time::{HostTime, Timebase};
use sightline_core::trace::{
    CallbackFailedEvent, ItemVerdictEvent, NotificationEvent, PassBeginEvent, PassEndEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn host_ms(&self, t: HostTime) -> f64 {
        t.to_nanos(self.timebase) as f64 / 1_000_000.0
    }
}

fn item(id: ItemId) -> String {
    format!("#{}.{}", id.index(), id.generation())
}

fn event_name(event: ScreenEvent) -> &'static str {
    match event {
        ScreenEvent::Enter => "enter",
        ScreenEvent::Leave => "leave",
        ScreenEvent::Move => "move",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} at {:.3}ms items={} viewport={}x{}",
            e.pass_index,
            self.host_ms(e.timestamp),
            e.items,
            e.viewport.width,
            e.viewport.height,
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let r = &e.report;
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} at {:.3}ms evaluated={} enter={} leave={} move={} \
             canceled={} stopped={} failed={}",
            e.pass_index,
            self.host_ms(e.timestamp),
            r.evaluated,
            r.entered,
            r.left,
            r.moved,
            r.canceled,
            r.stopped,
            r.failed,
        );
    }

    fn on_notification(&mut self, e: &NotificationEvent) {
        let canceled = match e.outcome {
            DispatchOutcome::Delivered => "",
            DispatchOutcome::Canceled => " CANCELED",
        };
        let _ = writeln!(
            self.writer,
            "[{}] pass={} item={} side={}{canceled}",
            event_name(e.event),
            e.pass_index,
            item(e.item),
            e.side,
        );
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[callback:error] pass={} item={} {}: {}",
            e.pass_index,
            item(e.item),
            e.event.name(),
            e.message,
        );
    }

    fn on_item_verdict(&mut self, e: &ItemVerdictEvent) {
        let side = e.side.map_or("on-screen", |side| side.as_str());
        let _ = writeln!(
            self.writer,
            "[verdict] pass={} item={} {side} offset=({:.3}, {:.3}, {:.3}, {:.3})",
            e.pass_index,
            item(e.item),
            e.offset.top,
            e.offset.right,
            e.offset.bottom,
            e.offset.left,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_core::pass::PassReport;
    use sightline_core::side::Side;
    use sightline_core::visibility::Offset;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_pass_bracket() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 4,
            timestamp: HostTime(16_500),
            items: 3,
            viewport: kurbo::Size::new(800.0, 600.0),
        });
        sink.on_pass_end(&PassEndEvent {
            pass_index: 4,
            timestamp: HostTime(16_500),
            report: PassReport {
                evaluated: 3,
                entered: 1,
                ..PassReport::default()
            },
        });
        let out = output(sink);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2, "got: {out}");
        assert!(lines[0].starts_with("[pass:begin] pass=4 at 16.500ms"), "got: {out}");
        assert!(lines[0].contains("viewport=800x600"), "got: {out}");
        assert!(lines[1].contains("evaluated=3 enter=1 leave=0"), "got: {out}");
    }

    #[test]
    fn pretty_print_notification_marks_cancel() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_notification(&NotificationEvent {
            pass_index: 1,
            item: ItemId::from_raw(2, 1),
            event: ScreenEvent::Leave,
            side: Side::TopLeft,
            outcome: DispatchOutcome::Canceled,
        });
        let out = output(sink);
        assert_eq!(out, "[leave] pass=1 item=#2.1 side=top-left CANCELED\n");
    }

    #[test]
    fn pretty_print_verdict_and_failure() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_item_verdict(&ItemVerdictEvent {
            pass_index: 2,
            item: ItemId::from_raw(0, 0),
            side: None,
            offset: Offset {
                top: 0.25,
                right: 0.0,
                bottom: 0.5,
                left: 0.0,
            },
        });
        sink.on_callback_failed(&CallbackFailedEvent {
            pass_index: 2,
            item: ItemId::from_raw(0, 0),
            event: ScreenEvent::Enter,
            message: "boom",
        });
        let out = output(sink);
        assert!(out.contains("[verdict] pass=2 item=#0.0 on-screen"), "got: {out}");
        assert!(out.contains("offset=(0.250, 0.000, 0.500, 0.000)"), "got: {out}");
        assert!(out.contains("[callback:error] pass=2 item=#0.0 screenenter: boom"), "got: {out}");
    }
}
