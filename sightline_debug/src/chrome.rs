// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each pass becomes a `B`/`E` span on thread 0. Notifications, callback
//! failures and verdicts carry no timestamp of their own; they are placed at
//! the time of the pass that produced them, on a thread per item slot.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use sightline_core::host::DispatchOutcome;
use sightline_core::registry::ItemId;
use sightline_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut pass_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PassBegin(e) => {
                pass_ts = host_us(e.timestamp, timebase);
                events.push(json!({
                    "ph": "B",
                    "name": "Pass",
                    "cat": "Pass",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "pass_index": e.pass_index,
                        "items": e.items,
                        "viewport": [e.viewport.width, e.viewport.height],
                    }
                }));
            }
            RecordedEvent::PassEnd(e) => {
                let r = e.report;
                events.push(json!({
                    "ph": "E",
                    "name": "Pass",
                    "cat": "Pass",
                    "ts": host_us(e.timestamp, timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "pass_index": e.pass_index,
                        "evaluated": r.evaluated,
                        "entered": r.entered,
                        "left": r.left,
                        "moved": r.moved,
                        "canceled": r.canceled,
                        "stopped": r.stopped,
                        "failed": r.failed,
                    }
                }));
            }
            RecordedEvent::Notification(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.event.name(),
                    "cat": "Notification",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": item_tid(e.item),
                    "s": "t",
                    "args": {
                        "pass_index": e.pass_index,
                        "generation": e.item.generation(),
                        "side": e.side.as_str(),
                        "canceled": e.outcome == DispatchOutcome::Canceled,
                    }
                }));
            }
            RecordedEvent::CallbackFailed(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CallbackFailed",
                    "cat": "Error",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": item_tid(e.item),
                    "s": "t",
                    "args": {
                        "pass_index": e.pass_index,
                        "event": e.event.name(),
                        "message": e.message,
                    }
                }));
            }
            RecordedEvent::ItemVerdict(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Verdict",
                    "cat": "Rich",
                    "ts": pass_ts,
                    "pid": 0,
                    "tid": item_tid(e.item),
                    "s": "t",
                    "args": {
                        "pass_index": e.pass_index,
                        "side": e.side.map(|side| side.as_str()),
                        "offset": [e.offset.top, e.offset.right, e.offset.bottom, e.offset.left],
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn host_us(t: HostTime, timebase: Timebase) -> f64 {
    t.to_nanos(timebase) as f64 / 1000.0
}

/// Thread 0 is reserved for pass spans.
fn item_tid(item: ItemId) -> u64 {
    u64::from(item.index()) + 1
}
