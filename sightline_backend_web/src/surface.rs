// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM geometry, notification dispatch and class edits.

use alloc::format;
use core::marker::PhantomData;

use js_sys::{Object, Reflect};
use kurbo::{Rect, Size};
use wasm_bindgen::JsValue;
use web_sys::{CustomEvent, CustomEventInit, Window, console};

use sightline_core::host::{DispatchOutcome, ScreenDetail, ScreenEvent, Surface};
use sightline_core::options::CallbackError;

use crate::element::TrackedElement;

/// The browser viewport as a [`Surface`].
///
/// `D` is the notification payload; it is converted to a `JsValue` for the
/// `detail.data` field of each dispatched `CustomEvent`.
pub struct DomSurface<D> {
    window: Window,
    _data: PhantomData<fn() -> D>,
}

impl<D> core::fmt::Debug for DomSurface<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSurface").finish_non_exhaustive()
    }
}

impl<D> DomSurface<D> {
    /// Creates a surface measuring `window`'s viewport.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            _data: PhantomData,
        }
    }

    /// The observed window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// Builds the `{ side, offset: { top, right, bottom, left }, data }` object
/// handed to listeners and JS callbacks.
pub(crate) fn detail_object<D: Clone + Into<JsValue>>(detail: &ScreenDetail<D>) -> Object {
    let offset = Object::new();
    let _ = Reflect::set(&offset, &"top".into(), &detail.offset.top.into());
    let _ = Reflect::set(&offset, &"right".into(), &detail.offset.right.into());
    let _ = Reflect::set(&offset, &"bottom".into(), &detail.offset.bottom.into());
    let _ = Reflect::set(&offset, &"left".into(), &detail.offset.left.into());

    let obj = Object::new();
    let _ = Reflect::set(&obj, &"side".into(), &detail.side.as_str().into());
    let _ = Reflect::set(&obj, &"offset".into(), &offset);
    let data = detail.data.clone().map_or(JsValue::UNDEFINED, Into::into);
    let _ = Reflect::set(&obj, &"data".into(), &data);
    obj
}

impl<D: Clone + Into<JsValue>> Surface for DomSurface<D> {
    type Element = TrackedElement;
    type Data = D;

    fn viewport(&self) -> Size {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        Size::new(width, height)
    }

    fn bounds(&self, element: &TrackedElement) -> Rect {
        let r = element.element().get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn dispatch(
        &mut self,
        element: &TrackedElement,
        event: ScreenEvent,
        detail: &ScreenDetail<D>,
    ) -> DispatchOutcome {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_detail(&detail_object(detail));

        let Ok(custom) = CustomEvent::new_with_event_init_dict(event.name(), &init) else {
            return DispatchOutcome::Delivered;
        };
        match element.element().dispatch_event(&custom) {
            Ok(false) => DispatchOutcome::Canceled,
            _ => DispatchOutcome::Delivered,
        }
    }

    fn add_class(&mut self, element: &TrackedElement, class: &str) {
        let _ = element.element().class_list().add_1(class);
    }

    fn remove_class(&mut self, element: &TrackedElement, class: &str) {
        let _ = element.element().class_list().remove_1(class);
    }

    fn callback_failed(&mut self, element: &TrackedElement, event: ScreenEvent, error: &CallbackError) {
        console::error_2(
            &format!("sightline: {} handler: {error}", event.name()).into(),
            element.element(),
        );
    }
}
