// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A self-driving tracker for the browser.
//!
//! [`WebTracker`] owns a [`SharedTracker`] together with its DOM surface, its
//! `requestAnimationFrame` requester and its event listeners. Listeners and
//! the frame callback hold weak references, so dropping the last
//! `WebTracker` handle tears everything down.
//!
//! Callbacks and event listeners run in the middle of a pass and may call
//! back into the tracker; [`SharedTracker`] queues those calls until the pass
//! ends.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{Element, EventTarget, Window};

use sightline_core::options::{ItemOptions, ItemOptionsPatch, TrackerConfigPatch};
use sightline_core::pass::PassReport;
use sightline_core::shared::SharedTracker;
use sightline_core::time::HostTime;
use sightline_core::trace::{TraceSink, Tracer};

pub use sightline_core::shared::ItemState;

use crate::element::{ElementKeys, TrackedElement};
use crate::listeners::DomTriggers;
use crate::raf::RafRequester;
use crate::surface::DomSurface;

/// Options for an item tracked by a [`WebTracker`].
pub type WebItemOptions<D> = ItemOptions<TrackedElement, D>;

/// Partial options for [`WebTracker::add_item`].
pub type WebItemOptionsPatch<D> = ItemOptionsPatch<TrackedElement, D>;

struct Shared<D: 'static> {
    tracker: SharedTracker<TrackedElement, D, RafRequester, DomTriggers>,
    surface: RefCell<DomSurface<D>>,
    keys: RefCell<ElementKeys>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
}

/// Tracks DOM elements against the browser viewport.
///
/// Cloning yields another handle to the same tracker.
pub struct WebTracker<D: 'static> {
    shared: Rc<Shared<D>>,
}

impl<D: 'static> Clone for WebTracker<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<D: 'static> core::fmt::Debug for WebTracker<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebTracker")
            .field("tracker", &self.shared.tracker)
            .finish_non_exhaustive()
    }
}

impl<D: Clone + Into<JsValue> + 'static> WebTracker<D> {
    /// Creates a tracker for `window` and subscribes its triggers.
    ///
    /// Scroll containers are [`EventTarget`]s; without an override they are
    /// the document body, the document root element and the window.
    #[must_use]
    pub fn new(window: Window, config: TrackerConfigPatch<EventTarget>) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared<D>>| {
            let on_trigger = weak.clone();
            let triggers = DomTriggers::new(window.clone(), move || {
                if let Some(shared) = on_trigger.upgrade() {
                    shared.tracker.request_pass();
                }
            });

            let on_frame = weak.clone();
            let frames = RafRequester::new(move |now| {
                if let Some(shared) = on_frame.upgrade() {
                    shared.run_frame(now);
                }
            });

            Shared {
                tracker: SharedTracker::new(config, triggers, frames),
                surface: RefCell::new(DomSurface::new(window)),
                keys: RefCell::new(ElementKeys::new()),
                sink: RefCell::new(None),
            }
        });
        Self { shared }
    }

    /// Routes pass events to `sink`, or stops tracing with `None`.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) {
        *self.shared.sink.borrow_mut() = sink;
    }

    /// Starts tracking `element`. Returns its state, or `None` when called
    /// during a pass (the add is applied when the pass ends).
    pub fn add_item(&self, element: &Element, options: WebItemOptionsPatch<D>) -> Option<ItemState> {
        let handle = self.shared.keys.borrow_mut().handle(element);
        self.shared.tracker.add_item(handle, options)
    }

    /// Replaces the options of a tracked element.
    ///
    /// Returns `None` for unknown elements and during a pass.
    pub fn update_item(&self, element: &Element, options: WebItemOptions<D>) -> Option<ItemState> {
        let handle = self.shared.keys.borrow().lookup(element)?;
        self.shared.tracker.update_item(&handle, options)
    }

    /// Stops tracking `element`.
    pub fn remove_item(&self, element: &Element) {
        if let Some(handle) = self.shared.keys.borrow().lookup(element) {
            self.shared.tracker.remove_item(&handle);
        }
    }

    /// Stops tracking every element.
    pub fn empty(&self) {
        self.shared.tracker.empty();
    }

    /// Stops tracking every element and removes every listener.
    pub fn dispose(&self) {
        self.shared.tracker.dispose();
    }

    /// Requests a pass on the next animation frame.
    pub fn update(&self) {
        self.shared.tracker.request_pass();
    }

    /// The state of `element`, if tracked and not mid-pass.
    #[must_use]
    pub fn item(&self, element: &Element) -> Option<ItemState> {
        let handle = self.shared.keys.borrow().lookup(element)?;
        self.shared.tracker.item(&handle)
    }

    /// Number of tracked elements, if not mid-pass.
    #[must_use]
    pub fn tracked_count(&self) -> Option<usize> {
        self.shared.tracker.tracked_count()
    }

    /// The report of the most recent pass.
    #[must_use]
    pub fn last_report(&self) -> Option<PassReport> {
        self.shared.tracker.last_report()
    }
}

impl<D: Clone + Into<JsValue> + 'static> Shared<D> {
    fn run_frame(&self, now: HostTime) {
        let mut surface = self.surface.borrow_mut();
        let mut sink = self.sink.borrow_mut();
        let mut tracer = match sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        };
        self.tracker.run_frame(now, &mut *surface, &mut tracer);
    }
}
