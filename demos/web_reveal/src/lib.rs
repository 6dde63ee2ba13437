// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: boxes revealed as they scroll into view.
//!
//! Builds a tall column of cards. Each card is tracked by a [`WebTracker`]
//! and fades in when it enters the viewport (`revealed` class) and back out
//! when it leaves (`concealed` class). The enter callback writes the side the
//! card came from into its label. Every fourth card only counts while it
//! overlaps the middle half of the viewport.
//!
//! Build with: `wasm-pack build --target web demos/web_reveal`
//!
//! Then serve the page that loads the generated module and scroll.
//!
//! [`WebTracker`]: sightline_backend_web::WebTracker

// This crate only runs in the browser; suppress dead-code warnings when
// cargo-checking on a native host target.
#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::borrow::ToOwned as _;
use alloc::format;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use sightline_backend_web::{TrackedElement, WebItemOptionsPatch, WebTracker};
use sightline_core::host::ScreenDetail;
use sightline_core::modifier::{EdgeModifiersPatch, Modifier};
use sightline_core::options::{Propagation, TrackerConfigPatch, callback};

const CARD_COUNT: usize = 24;

const CARD_COLORS: [&str; 4] = [
    "rgba(242, 67, 54, 0.9)",
    "rgba(77, 176, 80, 0.9)",
    "rgba(33, 150, 243, 0.9)",
    "rgba(255, 194, 8, 0.9)",
];

const STYLESHEET: &str = "
.card { transition: opacity 400ms ease, transform 400ms ease; opacity: 0; }
.card.revealed { opacity: 1; transform: none; }
.card.concealed--top { transform: translateY(-40px); }
.card.concealed--bottom { transform: translateY(40px); }
";

/// Entry point, called automatically by `wasm_bindgen(start)`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().expect("no global window");
    let document = window.document().expect("no document");
    let body = document.body().expect("no body");

    let style = document.create_element("style")?;
    style.set_text_content(Some(STYLESHEET));
    body.append_child(&style)?;

    let tracker: WebTracker<&'static str> =
        WebTracker::new(window, TrackerConfigPatch::default());

    for i in 0..CARD_COUNT {
        let card = create_card(&document, i)?;
        body.append_child(&card)?;
        tracker.add_item(&card, card_options(i));
    }
    tracker.update();

    // The tracker lives for the lifetime of the page.
    core::mem::forget(tracker);
    Ok(())
}

fn card_options(index: usize) -> WebItemOptionsPatch<&'static str> {
    let mut options = WebItemOptionsPatch {
        screen_enter_class: Some("revealed".to_owned()),
        screen_leave_class: Some("concealed".to_owned()),
        disable_screen_move: Some(true),
        data: Some(CARD_COLORS[index % CARD_COLORS.len()]),
        on_screen_enter: Some(callback(
            |card: &TrackedElement, detail: &ScreenDetail<&'static str>| {
                let label = format!("entered from {}", detail.side);
                card.element().set_text_content(Some(&label));
                Propagation::Continue
            },
        )),
        ..WebItemOptionsPatch::default()
    };
    if index % 4 == 3 {
        options.screen = EdgeModifiersPatch {
            top: Some(Modifier::parse("25%")),
            bottom: Some(Modifier::parse("25%")),
            ..EdgeModifiersPatch::default()
        };
    }
    options
}

fn create_card(doc: &Document, index: usize) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = doc.create_element("div")?.unchecked_into();
    el.set_class_name("card");
    el.set_text_content(Some(&format!("card {index}")));
    let s = el.style();
    s.set_property("width", "480px")?;
    s.set_property("height", "220px")?;
    s.set_property("margin", "120px auto")?;
    s.set_property("display", "flex")?;
    s.set_property("align-items", "center")?;
    s.set_property("justify-content", "center")?;
    s.set_property("font", "600 20px system-ui, sans-serif")?;
    s.set_property("color", "#1e1e2e")?;
    s.set_property("background", CARD_COLORS[index % CARD_COLORS.len()])?;
    s.set_property("border-radius", "16px")?;
    Ok(el)
}
