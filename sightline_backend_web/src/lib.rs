// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for sightline.
//!
//! This crate provides the browser host for `sightline_core`:
//!
//! - [`RafRequester`]: one-shot `requestAnimationFrame` scheduling
//! - [`DomSurface`]: viewport size, `getBoundingClientRect`, `CustomEvent`
//!   dispatch and `classList` edits
//! - [`DomTriggers`]: `scroll`, `resize` and `load` listeners
//! - [`WebTracker`]: all of the above wired to a tracker, for Rust callers
//! - [`OnScreen`]: the same, exported to JavaScript

#![no_std]

extern crate alloc;

mod element;
mod js;
mod listeners;
mod raf;
mod surface;
mod tracker;

pub use element::TrackedElement;
pub use js::OnScreen;
pub use listeners::DomTriggers;
pub use raf::RafRequester;
pub use surface::DomSurface;
pub use tracker::{ItemState, WebItemOptions, WebItemOptionsPatch, WebTracker};

use sightline_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    raf::ms_to_host_time(raf::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}
