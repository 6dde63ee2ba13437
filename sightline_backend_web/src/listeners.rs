// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM event listeners as a [`TriggerSource`].

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, EventTarget, Window};

use sightline_core::host::{Trigger, TriggerSource};

/// Forwards `scroll`, `resize` and `load` events to one handler.
///
/// Every subscription shares a single JS function, so all triggers feed the
/// same pass request. Subscriptions still active when this value is dropped
/// are removed.
pub struct DomTriggers {
    window: Window,
    listener: Closure<dyn FnMut(Event)>,
    active: BTreeMap<u32, (EventTarget, &'static str)>,
    next: u32,
}

impl DomTriggers {
    /// Creates a source that calls `on_trigger` for every subscribed event.
    pub fn new(window: Window, mut on_trigger: impl FnMut() + 'static) -> Self {
        let listener = Closure::wrap(Box::new(move |_: Event| on_trigger()) as Box<dyn FnMut(Event)>);
        Self {
            window,
            listener,
            active: BTreeMap::new(),
            next: 0,
        }
    }

    /// Number of listeners currently registered.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.len()
    }

    fn detach(&self, target: &EventTarget, event: &str) {
        let _ = target.remove_event_listener_with_callback(event, self.listener.as_ref().unchecked_ref());
    }
}

impl TriggerSource for DomTriggers {
    type Container = EventTarget;
    type Subscription = u32;

    /// The document body, the document root element and the window.
    fn default_scroll_containers(&self) -> Vec<EventTarget> {
        let mut containers = Vec::with_capacity(3);
        if let Some(document) = self.window.document() {
            if let Some(body) = document.body() {
                containers.push(body.into());
            }
            if let Some(root) = document.document_element() {
                containers.push(root.into());
            }
        }
        containers.push(self.window.clone().into());
        containers
    }

    fn subscribe(&mut self, trigger: Trigger<EventTarget>) -> u32 {
        let (target, event) = match trigger {
            Trigger::Scroll(target) => (target, "scroll"),
            Trigger::Resize => (self.window.clone().into(), "resize"),
            Trigger::Load => (self.window.clone().into(), "load"),
        };

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            self.listener.as_ref().unchecked_ref(),
            &options,
        );

        let token = self.next;
        self.next = self.next.wrapping_add(1);
        self.active.insert(token, (target, event));
        token
    }

    fn unsubscribe(&mut self, subscription: u32) {
        if let Some((target, event)) = self.active.remove(&subscription) {
            self.detach(&target, event);
        }
    }
}

impl Drop for DomTriggers {
    fn drop(&mut self) {
        for (target, event) in core::mem::take(&mut self.active).into_values() {
            self.detach(&target, event);
        }
    }
}

impl core::fmt::Debug for DomTriggers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomTriggers")
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}
