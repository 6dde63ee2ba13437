// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hashable element handles.
//!
//! DOM elements have no Rust-side identity, so each tracker numbers the
//! elements it sees in a `WeakMap`. A [`TrackedElement`] pairs the element
//! with that number and compares by number only.

use core::hash::{Hash, Hasher};

use js_sys::{Object, WeakMap};
use wasm_bindgen::JsValue;
use web_sys::Element;

/// A DOM element with a per-tracker identity key.
#[derive(Clone, Debug)]
pub struct TrackedElement {
    key: u32,
    element: Element,
}

impl TrackedElement {
    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The identity key.
    #[must_use]
    pub fn key(&self) -> u32 {
        self.key
    }
}

impl PartialEq for TrackedElement {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TrackedElement {}

impl Hash for TrackedElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Assigns identity keys to elements without touching the DOM.
pub(crate) struct ElementKeys {
    keys: WeakMap,
    next: u32,
}

impl ElementKeys {
    pub(crate) fn new() -> Self {
        Self {
            keys: WeakMap::new(),
            next: 0,
        }
    }

    /// The handle for an element seen before, without assigning one.
    pub(crate) fn lookup(&self, element: &Element) -> Option<TrackedElement> {
        let key = self.keys.get(as_object(element)).as_f64()?;
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "stored keys are u32 values written by `handle`"
        )]
        let key = key as u32;
        Some(TrackedElement {
            key,
            element: element.clone(),
        })
    }

    /// The handle for `element`, assigning a fresh key on first sight.
    pub(crate) fn handle(&mut self, element: &Element) -> TrackedElement {
        if let Some(handle) = self.lookup(element) {
            return handle;
        }
        let key = self.next;
        self.next = self.next.wrapping_add(1);
        self.keys.set(as_object(element), &JsValue::from(key));
        TrackedElement {
            key,
            element: element.clone(),
        }
    }
}

fn as_object(element: &Element) -> &Object {
    element.as_ref()
}

impl core::fmt::Debug for ElementKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementKeys")
            .field("assigned", &self.next)
            .finish_non_exhaustive()
    }
}
