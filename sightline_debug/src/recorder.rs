// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, one tag byte followed by the event's
//! fields. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Callback error messages are stored as a length-prefixed UTF-8 string.

use kurbo::Size;

use sightline_core::host::{DispatchOutcome, ScreenEvent};
use sightline_core::pass::PassReport;
use sightline_core::registry::ItemId;
use sightline_core::side::Side;
use sightline_core::time::HostTime;
use sightline_core::trace::{
    CallbackFailedEvent, ItemVerdictEvent, NotificationEvent, PassBeginEvent, PassEndEvent,
    TraceSink,
};
use sightline_core::visibility::Offset;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PASS_END: u8 = 2;
const TAG_NOTIFICATION: u8 = 3;
const TAG_CALLBACK_FAILED: u8 = 4;
const TAG_ITEM_VERDICT: u8 = 5;

const NO_SIDE: u8 = u8::MAX;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_item(&mut self, id: ItemId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_event(&mut self, event: ScreenEvent) {
        self.write_u8(match event {
            ScreenEvent::Enter => 0,
            ScreenEvent::Leave => 1,
            ScreenEvent::Move => 2,
        });
    }

    fn write_side(&mut self, side: Option<Side>) {
        let code = side
            .and_then(|side| Side::ALL.iter().position(|s| *s == side))
            .and_then(|i| u8::try_from(i).ok())
            .unwrap_or(NO_SIDE);
        self.write_u8(code);
    }

    fn write_offset(&mut self, offset: &Offset) {
        self.write_f64(offset.top);
        self.write_f64(offset.right);
        self.write_f64(offset.bottom);
        self.write_f64(offset.left);
    }

    fn write_report(&mut self, r: &PassReport) {
        for v in [
            r.evaluated,
            r.entered,
            r.left,
            r.moved,
            r.canceled,
            r.stopped,
            r.failed,
        ] {
            self.write_u32(v);
        }
    }

    fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&bytes[..len as usize]);
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass_index);
        self.write_u64(e.timestamp.ticks());
        self.write_u64(u64::try_from(e.items).unwrap_or(u64::MAX));
        self.write_f64(e.viewport.width);
        self.write_f64(e.viewport.height);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.write_u8(TAG_PASS_END);
        self.write_u64(e.pass_index);
        self.write_u64(e.timestamp.ticks());
        self.write_report(&e.report);
    }

    fn on_notification(&mut self, e: &NotificationEvent) {
        self.write_u8(TAG_NOTIFICATION);
        self.write_u64(e.pass_index);
        self.write_item(e.item);
        self.write_event(e.event);
        self.write_side(Some(e.side));
        self.write_u8(u8::from(e.outcome == DispatchOutcome::Canceled));
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        self.write_u8(TAG_CALLBACK_FAILED);
        self.write_u64(e.pass_index);
        self.write_item(e.item);
        self.write_event(e.event);
        self.write_str(e.message);
    }

    fn on_item_verdict(&mut self, e: &ItemVerdictEvent) {
        self.write_u8(TAG_ITEM_VERDICT);
        self.write_u64(e.pass_index);
        self.write_item(e.item);
        self.write_side(e.side);
        self.write_offset(&e.offset);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// An owned copy of a [`CallbackFailedEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Pass counter.
    pub pass_index: u64,
    /// Item whose callback failed.
    pub item: ItemId,
    /// The notification the callback was handling.
    pub event: ScreenEvent,
    /// Error description.
    pub message: String,
}

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`NotificationEvent`].
    Notification(NotificationEvent),
    /// A [`CallbackFailedEvent`].
    CallbackFailed(CallbackFailure),
    /// An [`ItemVerdictEvent`].
    ItemVerdict(ItemVerdictEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_item(&mut self) -> Option<ItemId> {
        Some(ItemId::from_raw(self.read_u32()?, self.read_u32()?))
    }

    fn read_event(&mut self) -> Option<ScreenEvent> {
        Some(match self.read_u8()? {
            0 => ScreenEvent::Enter,
            1 => ScreenEvent::Leave,
            _ => ScreenEvent::Move,
        })
    }

    fn read_side(&mut self) -> Option<Option<Side>> {
        let code = self.read_u8()?;
        Some(Side::ALL.get(usize::from(code)).copied())
    }

    fn read_offset(&mut self) -> Option<Offset> {
        Some(Offset {
            top: self.read_f64()?,
            right: self.read_f64()?,
            bottom: self.read_f64()?,
            left: self.read_f64()?,
        })
    }

    fn read_report(&mut self) -> Option<PassReport> {
        Some(PassReport {
            evaluated: self.read_u32()?,
            entered: self.read_u32()?,
            left: self.read_u32()?,
            moved: self.read_u32()?,
            canceled: self.read_u32()?,
            stopped: self.read_u32()?,
            failed: self.read_u32()?,
        })
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass_index: self.read_u64()?,
            timestamp: HostTime(self.read_u64()?),
            items: usize::try_from(self.read_u64()?).ok()?,
            viewport: Size::new(self.read_f64()?, self.read_f64()?),
        }))
    }

    fn decode_pass_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassEndEvent {
            pass_index: self.read_u64()?,
            timestamp: HostTime(self.read_u64()?),
            report: self.read_report()?,
        }))
    }

    fn decode_notification(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Notification(NotificationEvent {
            pass_index: self.read_u64()?,
            item: self.read_item()?,
            event: self.read_event()?,
            side: self.read_side()?.unwrap_or_default(),
            outcome: if self.read_u8()? != 0 {
                DispatchOutcome::Canceled
            } else {
                DispatchOutcome::Delivered
            },
        }))
    }

    fn decode_callback_failed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CallbackFailed(CallbackFailure {
            pass_index: self.read_u64()?,
            item: self.read_item()?,
            event: self.read_event()?,
            message: self.read_string()?,
        }))
    }

    fn decode_item_verdict(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ItemVerdict(ItemVerdictEvent {
            pass_index: self.read_u64()?,
            item: self.read_item()?,
            side: self.read_side()?,
            offset: self.read_offset()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PASS_END => self.decode_pass_end(),
            TAG_NOTIFICATION => self.decode_notification(),
            TAG_CALLBACK_FAILED => self.decode_callback_failed(),
            TAG_ITEM_VERDICT => self.decode_item_verdict(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
