// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The JavaScript-facing `OnScreen` class.
//!
//! ```js
//! const onScreen = new OnScreen({ resize: false });
//! onScreen.addItem(el, {
//!   screen: { bottom: "20%" },
//!   onScreenEnter(detail) { console.log(this, detail.side); },
//! });
//! onScreen.update();
//! ```
//!
//! Options are plain objects read with `Reflect`. Missing or mistyped fields
//! fall back to their defaults. Callbacks are called with the element as
//! `this` and the notification detail as the only argument; returning
//! `false` stops the item's processing for the pass, and a thrown exception
//! is logged and treated the same way.

use alloc::string::String;
use alloc::vec::Vec;

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget};

use sightline_core::host::ScreenDetail;
use sightline_core::modifier::{EdgeModifiersPatch, Modifier};
use sightline_core::options::{
    Callback, CallbackError, ItemOptions, ItemOptionsPatch, Merge, Propagation, TrackerConfigPatch,
    try_callback,
};

use crate::element::TrackedElement;
use crate::surface::detail_object;
use crate::tracker::{ItemState, WebTracker};

/// Tracks elements entering and leaving the browser viewport.
#[wasm_bindgen]
#[derive(Debug)]
pub struct OnScreen {
    inner: WebTracker<JsValue>,
}

#[wasm_bindgen]
impl OnScreen {
    /// Creates a tracker.
    ///
    /// Accepts `{ scrollContainer, scroll, resize, load }`. `scrollContainer`
    /// is an event target or an array of them.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("OnScreen needs a window"))?;
        Ok(Self {
            inner: WebTracker::new(window, parse_config(&options)),
        })
    }

    /// Starts tracking `element`. Returns `{ onScreen, side, offset }`, or
    /// `undefined` when called during a pass.
    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&self, element: Element, options: JsValue) -> JsValue {
        state_value(self.inner.add_item(&element, parse_item(&options)))
    }

    /// Replaces an element's options; omitted fields take their defaults.
    #[wasm_bindgen(js_name = updateItem)]
    pub fn update_item(&self, element: Element, options: JsValue) -> JsValue {
        let options = ItemOptions::default().merged(parse_item(&options));
        state_value(self.inner.update_item(&element, options))
    }

    /// Stops tracking `element`.
    #[wasm_bindgen(js_name = removeItem)]
    pub fn remove_item(&self, element: Element) {
        self.inner.remove_item(&element);
    }

    /// Stops tracking every element.
    pub fn empty(&self) {
        self.inner.empty();
    }

    /// Stops tracking every element and removes every listener.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Requests a pass on the next animation frame.
    pub fn update(&self) {
        self.inner.update();
    }
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    if !obj.is_object() {
        return JsValue::UNDEFINED;
    }
    Reflect::get(obj, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn get_bool(obj: &JsValue, key: &str) -> Option<bool> {
    get(obj, key).as_bool()
}

fn get_string(obj: &JsValue, key: &str) -> Option<String> {
    get(obj, key).as_string()
}

fn parse_config(options: &JsValue) -> TrackerConfigPatch<EventTarget> {
    let containers = get(options, "scrollContainer");
    let scroll_containers = if Array::is_array(&containers) {
        let list: Vec<EventTarget> = Array::from(&containers)
            .iter()
            .filter_map(|c| c.dyn_into::<EventTarget>().ok())
            .collect();
        Some(list)
    } else {
        containers.dyn_into::<EventTarget>().ok().map(|c| alloc::vec![c])
    };

    TrackerConfigPatch {
        scroll_containers,
        scroll: get_bool(options, "scroll"),
        resize: get_bool(options, "resize"),
        load: get_bool(options, "load"),
    }
}

/// Numbers are pixels, strings go through [`Modifier::parse`], anything
/// else is zero.
fn parse_modifier(value: &JsValue) -> Option<Modifier> {
    if value.is_undefined() {
        return None;
    }
    Some(if let Some(px) = value.as_f64() {
        Modifier::Absolute(px)
    } else if let Some(text) = value.as_string() {
        Modifier::parse(&text)
    } else {
        Modifier::ZERO
    })
}

fn parse_edges(obj: &JsValue) -> EdgeModifiersPatch {
    EdgeModifiersPatch {
        top: parse_modifier(&get(obj, "top")),
        right: parse_modifier(&get(obj, "right")),
        bottom: parse_modifier(&get(obj, "bottom")),
        left: parse_modifier(&get(obj, "left")),
    }
}

fn parse_callback(obj: &JsValue, key: &str) -> Option<Callback<TrackedElement, JsValue>> {
    let function = get(obj, key).dyn_into::<Function>().ok()?;
    Some(try_callback(
        move |element: &TrackedElement, detail: &ScreenDetail<JsValue>| {
            let arg = detail_object(detail);
            match function.call1(element.element(), &arg) {
                Ok(ret) => Ok(propagation(ret.as_bool())),
                Err(thrown) => Err(CallbackError::new(describe_exception(&thrown))),
            }
        },
    ))
}

/// `false` stops; any other return value continues.
fn propagation(returned: Option<bool>) -> Propagation {
    if returned == Some(false) {
        Propagation::Stop
    } else {
        Propagation::Continue
    }
}

fn describe_exception(thrown: &JsValue) -> String {
    if let Some(err) = thrown.dyn_ref::<js_sys::Error>() {
        return err.message().into();
    }
    thrown
        .as_string()
        .unwrap_or_else(|| String::from("non-error exception"))
}

fn parse_item(options: &JsValue) -> ItemOptionsPatch<TrackedElement, JsValue> {
    let data = get(options, "data");
    ItemOptionsPatch {
        screen: parse_edges(&get(options, "screen")),
        target: parse_edges(&get(options, "target")),
        screen_enter_class: get_string(options, "screenEnterClass"),
        screen_leave_class: get_string(options, "screenLeaveClass"),
        on_screen_enter: parse_callback(options, "onScreenEnter"),
        on_screen_leave: parse_callback(options, "onScreenLeave"),
        on_screen_move: parse_callback(options, "onScreenMove"),
        fire_screen_move_off_screen: get_bool(options, "fireScreenMoveOffScreen"),
        disable_screen_move: get_bool(options, "disableScreenMove"),
        data: (!data.is_undefined()).then_some(data),
    }
}

fn state_value(state: Option<ItemState>) -> JsValue {
    let Some(state) = state else {
        return JsValue::UNDEFINED;
    };
    let detail = ScreenDetail::<JsValue> {
        side: state.side,
        offset: state.offset,
        data: None,
    };
    let obj = detail_object(&detail);
    let _ = Reflect::delete_property(&obj, &"data".into());
    let _ = Reflect::set(&obj, &"onScreen".into(), &state.on_screen.into());
    obj.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_false_stops() {
        assert_eq!(propagation(Some(false)), Propagation::Stop);
        assert_eq!(propagation(Some(true)), Propagation::Continue);
        assert_eq!(propagation(None), Propagation::Continue);
    }
}
