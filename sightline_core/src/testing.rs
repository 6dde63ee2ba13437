// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted host doubles shared by the unit tests.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use kurbo::{Rect, Size};

use crate::host::{
    DispatchOutcome, FrameRequester, ScreenDetail, ScreenEvent, Surface, Trigger, TriggerSource,
};
use crate::options::CallbackError;
use crate::side::Side;

/// A notification as seen by [`MockSurface`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Note {
    pub element: u32,
    pub event: ScreenEvent,
    pub side: Side,
}

impl Note {
    pub(crate) fn new(element: u32, event: ScreenEvent, side: Side) -> Self {
        Self {
            element,
            event,
            side,
        }
    }
}

/// Elements are plain numbers placed at fixed rectangles.
#[derive(Debug)]
pub(crate) struct MockSurface {
    viewport: Size,
    bounds: BTreeMap<u32, Rect>,
    class_lists: BTreeMap<u32, Vec<String>>,
    canceled: Vec<ScreenEvent>,
    pub notes: Vec<Note>,
    pub failures: Vec<(u32, String)>,
    pub viewport_queries: Cell<u32>,
}

impl MockSurface {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            bounds: BTreeMap::new(),
            class_lists: BTreeMap::new(),
            canceled: Vec::new(),
            notes: Vec::new(),
            failures: Vec::new(),
            viewport_queries: Cell::new(0),
        }
    }

    pub(crate) fn place(&mut self, element: u32, rect: Rect) {
        self.bounds.insert(element, rect);
    }

    /// Makes every later `event` notification come back canceled.
    pub(crate) fn cancel(&mut self, event: ScreenEvent) {
        self.canceled.push(event);
    }

    pub(crate) fn classes(&self, element: u32) -> Vec<String> {
        self.class_lists.get(&element).cloned().unwrap_or_default()
    }
}

impl Surface for MockSurface {
    type Element = u32;
    type Data = &'static str;

    fn viewport(&self) -> Size {
        self.viewport_queries.set(self.viewport_queries.get() + 1);
        self.viewport
    }

    fn bounds(&self, element: &u32) -> Rect {
        self.bounds.get(element).copied().unwrap_or(Rect::ZERO)
    }

    fn dispatch(
        &mut self,
        element: &u32,
        event: ScreenEvent,
        detail: &ScreenDetail<&'static str>,
    ) -> DispatchOutcome {
        self.notes.push(Note::new(*element, event, detail.side));
        if self.canceled.contains(&event) {
            DispatchOutcome::Canceled
        } else {
            DispatchOutcome::Delivered
        }
    }

    fn add_class(&mut self, element: &u32, class: &str) {
        let list = self.class_lists.entry(*element).or_default();
        if !list.iter().any(|c| c == class) {
            list.push(String::from(class));
        }
    }

    fn remove_class(&mut self, element: &u32, class: &str) {
        if let Some(list) = self.class_lists.get_mut(element) {
            list.retain(|c| c != class);
        }
    }

    fn callback_failed(&mut self, element: &u32, _event: ScreenEvent, error: &CallbackError) {
        self.failures.push((*element, String::from(error.message())));
    }
}

/// Counts frame requests.
#[derive(Debug, Default)]
pub(crate) struct MockFrames {
    pub requested: u32,
}

impl FrameRequester for MockFrames {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

/// Records live subscriptions by token.
#[derive(Debug, Default)]
pub(crate) struct MockTriggers {
    next: u32,
    pub active: BTreeMap<u32, Trigger<&'static str>>,
}

impl TriggerSource for MockTriggers {
    type Container = &'static str;
    type Subscription = u32;

    fn default_scroll_containers(&self) -> Vec<&'static str> {
        alloc::vec!["body", "html", "window"]
    }

    fn subscribe(&mut self, trigger: Trigger<&'static str>) -> u32 {
        let token = self.next;
        self.next += 1;
        self.active.insert(token, trigger);
        token
    }

    fn unsubscribe(&mut self, subscription: u32) {
        self.active.remove(&subscription);
    }
}
