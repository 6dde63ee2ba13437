// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scroll that exercises visibility passes and the tracing pipeline.
//!
//! A column of boxes is scrolled down and back up over 60 synthetic frames.
//! Every pass is traced to both a
//! [`PrettyPrintSink`](sightline_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](sightline_debug::recorder::RecorderSink); the recording
//! is then exported as a Chrome trace JSON file.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Rect, Size};

use sightline_core::host::{DispatchOutcome, FrameRequester, ScreenDetail, ScreenEvent, Surface};
use sightline_core::modifier::{EdgeModifiersPatch, Modifier};
use sightline_core::options::{
    CallbackError, ItemOptionsPatch, Propagation, callback, try_callback,
};
use sightline_core::time::{HostTime, Timebase};
use sightline_core::trace::{
    CallbackFailedEvent, ItemVerdictEvent, NotificationEvent, PassBeginEvent, PassEndEvent,
    TraceSink, Tracer,
};
use sightline_core::tracker::Tracker;

use sightline_debug::pretty::PrettyPrintSink;
use sightline_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 60;
/// 16.5ms frame interval in microseconds.
const FRAME_INTERVAL_US: u64 = 16_500;
const BOX_COUNT: u32 = 6;
const BOX_HEIGHT: f64 = 300.0;
const BOX_GAP: f64 = 250.0;
const SCROLL_STEP: f64 = 90.0;

/// A page of boxes stacked in one column, seen through a scrolled viewport.
struct Page {
    viewport: Size,
    scroll_y: f64,
    classes: BTreeMap<u32, Vec<String>>,
}

impl Page {
    fn new(viewport: Size) -> Self {
        Self {
            viewport,
            scroll_y: 0.0,
            classes: BTreeMap::new(),
        }
    }

    fn page_rect(element: u32) -> Rect {
        let top = 100.0 + f64::from(element) * (BOX_HEIGHT + BOX_GAP);
        Rect::new(100.0, top, 700.0, top + BOX_HEIGHT)
    }
}

impl Surface for Page {
    type Element = u32;
    type Data = &'static str;

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn bounds(&self, element: &u32) -> Rect {
        Self::page_rect(*element) - kurbo::Vec2::new(0.0, self.scroll_y)
    }

    fn dispatch(
        &mut self,
        _element: &u32,
        _event: ScreenEvent,
        _detail: &ScreenDetail<&'static str>,
    ) -> DispatchOutcome {
        DispatchOutcome::Delivered
    }

    fn add_class(&mut self, element: &u32, class: &str) {
        let list = self.classes.entry(*element).or_default();
        if !list.iter().any(|c| c == class) {
            list.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, element: &u32, class: &str) {
        if let Some(list) = self.classes.get_mut(element) {
            list.retain(|c| c != class);
        }
    }

    fn callback_failed(&mut self, element: &u32, event: ScreenEvent, error: &CallbackError) {
        println!("box {element}: {} handler failed: {error}", event.name());
    }
}

/// Single-shot frame request, delivered by the simulated loop.
#[derive(Default)]
struct SimulatedFrames {
    armed: bool,
}

impl FrameRequester for SimulatedFrames {
    fn request_frame(&mut self) {
        self.armed = true;
    }
}

/// Forwards every event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.pretty.on_pass_end(e);
        self.recorder.on_pass_end(e);
    }

    fn on_notification(&mut self, e: &NotificationEvent) {
        self.pretty.on_notification(e);
        self.recorder.on_notification(e);
    }

    fn on_callback_failed(&mut self, e: &CallbackFailedEvent<'_>) {
        self.pretty.on_callback_failed(e);
        self.recorder.on_callback_failed(e);
    }

    fn on_item_verdict(&mut self, e: &ItemVerdictEvent) {
        self.pretty.on_item_verdict(e);
        self.recorder.on_item_verdict(e);
    }
}

fn box_options(element: u32, failures_left: Rc<Cell<u32>>) -> ItemOptionsPatch<u32, &'static str> {
    let mut options = ItemOptionsPatch {
        screen_enter_class: Some("visible".to_owned()),
        screen_leave_class: Some("hidden".to_owned()),
        disable_screen_move: Some(true),
        data: Some(if element % 2 == 0 { "even" } else { "odd" }),
        on_screen_enter: Some(callback(|el: &u32, detail: &ScreenDetail<&'static str>| {
            println!("box {el} entered from {} ({:?})", detail.side, detail.data);
            Propagation::Continue
        })),
        on_screen_leave: Some(try_callback(move |el: &u32, detail| {
            if failures_left.get() > 0 {
                failures_left.set(failures_left.get() - 1);
                return Err(CallbackError::new("leave handler not ready"));
            }
            println!("box {el} left toward {}", detail.side);
            Ok(Propagation::Continue)
        })),
        ..ItemOptionsPatch::default()
    };

    // The last box ignores the bottom fifth of the viewport.
    if element == BOX_COUNT - 1 {
        options.screen = EdgeModifiersPatch {
            bottom: Some(Modifier::parse("20%")),
            ..EdgeModifiersPatch::default()
        };
    }
    options
}

fn main() {
    let timebase = Timebase::MICROS;
    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sightline_trace.json".to_owned());

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::stderr(timebase);
    let mut recorder = RecorderSink::new();

    // -- tracker -----------------------------------------------------------
    let mut page = Page::new(Size::new(800.0, 600.0));
    let mut frames = SimulatedFrames::default();
    let mut tracker = Tracker::detached();

    let failures_left = Rc::new(Cell::new(1));
    for element in 0..BOX_COUNT {
        tracker.add_item(element, box_options(element, Rc::clone(&failures_left)));
    }
    tracker.request_pass(&mut frames);

    // -- simulated loop ----------------------------------------------------
    let mut now_ticks: u64 = 1_000_000; // start at 1s
    let turn_at = FRAME_COUNT / 2;

    for frame_index in 0..FRAME_COUNT {
        if frame_index > 0 {
            let delta = if frame_index <= turn_at { SCROLL_STEP } else { -SCROLL_STEP };
            page.scroll_y = (page.scroll_y + delta).max(0.0);
            // Each scroll event asks for a pass; repeated asks share one frame.
            tracker.request_pass(&mut frames);
            tracker.request_pass(&mut frames);
        }

        if std::mem::take(&mut frames.armed) {
            let mut tee = Tee {
                pretty: &mut pretty,
                recorder: &mut recorder,
            };
            let mut tracer = Tracer::new(&mut tee);
            tracker.on_frame(HostTime(now_ticks), &mut page, &mut tracer);
        }

        now_ticks += FRAME_INTERVAL_US;
    }

    // -- results -----------------------------------------------------------
    let stats = tracker.stats();
    println!(
        "requests={} frames={} passes={}",
        stats.requests, stats.frames_requested, stats.passes
    );
    for item in tracker.items() {
        println!(
            "box {} on_screen={} side={} classes={:?}",
            item.element(),
            item.is_on_screen(),
            item.side(),
            page.classes.get(item.element()).map(Vec::as_slice).unwrap_or_default(),
        );
    }

    // -- export chrome trace -----------------------------------------------
    let bytes = recorder.into_bytes();
    println!("Recorded {} bytes of trace data", bytes.len());

    let file = File::create(&out_path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    sightline_debug::chrome::export(&bytes, timebase, &mut writer).expect("failed to export trace");
    println!("Chrome trace written to {out_path}");
}
