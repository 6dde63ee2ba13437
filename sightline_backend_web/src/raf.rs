// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot `requestAnimationFrame` scheduling.
//!
//! [`RafRequester`] registers a single frame callback per
//! [`request_frame`](FrameRequester::request_frame) call. Requests made
//! while a frame is already armed are ignored. Each callback receives a
//! [`DOMHighResTimeStamp`][mdn] (milliseconds), converted to microsecond
//! [`HostTime`] ticks.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use sightline_core::host::FrameRequester;
use sightline_core::time::HostTime;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Converts a `DOMHighResTimeStamp` in milliseconds to microsecond ticks.
pub(crate) fn ms_to_host_time(ms: f64) -> HostTime {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "timestamps are small positive f64; µs fits in u64 and negatives saturate to 0"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// Registered with `requestAnimationFrame` on every request.
    closure: RefCell<Option<RafClosure>>,
    callback: RefCell<Box<dyn FnMut(HostTime)>>,
    /// The armed frame, if any.
    raf_id: Cell<Option<i32>>,
    frames_delivered: Cell<u64>,
}

/// A `requestAnimationFrame` [`FrameRequester`].
pub struct RafRequester {
    inner: Rc<RafInner>,
}

impl RafRequester {
    /// Creates a requester that calls `callback` once per requested frame.
    pub fn new(callback: impl FnMut(HostTime) + 'static) -> Self {
        let inner = Rc::new(RafInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            raf_id: Cell::new(None),
            frames_delivered: Cell::new(0),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Cleared first so the callback can arm the next frame.
            inner.raf_id.set(None);
            inner.frames_delivered.set(inner.frames_delivered.get() + 1);
            inner.callback.borrow_mut()(ms_to_host_time(timestamp_ms));
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Whether a frame is armed and has not fired yet.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.raf_id.get().is_some()
    }

    /// Number of frame callbacks delivered so far.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.inner.frames_delivered.get()
    }

    /// Cancels the armed frame, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
    }
}

impl FrameRequester for RafRequester {
    fn request_frame(&mut self) {
        if self.is_armed() {
            return;
        }
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.raf_id.set(Some(id));
        }
    }
}

impl Drop for RafRequester {
    fn drop(&mut self) {
        self.cancel();
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafRequester {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafRequester")
            .field("armed", &self.is_armed())
            .field("frames_delivered", &self.frames_delivered())
            .finish()
    }
}
