// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport visibility tracking.
//!
//! `sightline_core` decides, once per animation frame, whether each tracked
//! element intersects the screen, and reports transitions as `screenenter`,
//! `screenleave` and `screenmove` notifications while keeping presentation
//! classes on the elements in sync. It is `no_std` compatible (with `alloc`)
//! and knows nothing about any particular host: geometry, notification
//! delivery, frame scheduling and trigger subscription are injected through
//! the traits in [`host`].
//!
//! # Architecture
//!
//! ```text
//!   scroll / resize / load / manual
//!       │
//!       ▼
//!   Tracker::request_pass() ──► PassScheduler ──► FrameRequester (once)
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   Tracker::on_frame() ──► pass::run() over Registry snapshot
//!                                │
//!                 ┌──────────────┘
//!                 ▼
//!   modify(screen), modify(bounds) ──► evaluate() ──► Verdict
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   Surface::dispatch() ──► callback ──► Surface::add_class / remove_class
//! ```
//!
//! **[`modifier`]**: Inset/outset adjustments (absolute or percentage) that
//! turn a base rectangle into the rectangle used for comparison.
//!
//! **[`visibility`]**: The on/off-screen verdict, the off-screen [`side`],
//! and normalized offsets.
//!
//! **[`registry`]**: Slot arena of tracked items with generational
//! [`ItemId`](registry::ItemId) handles and an element index.
//!
//! **[`schedule`]**: Coalesces trigger bursts into one pass per frame.
//!
//! **[`pass`]**: The per-item state machine run on each frame.
//!
//! **[`options`]**: Item options, tracker configuration, and the
//! [`Merge`](options::Merge) patch trait.
//!
//! **[`tracker`]**: The public [`Tracker`](tracker::Tracker) facade.
//!
//! **[`shared`]**: [`SharedTracker`](shared::SharedTracker), a tracker that
//! callbacks may call back into. Calls made during a pass are queued until
//! it ends.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and pass events,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-item
//!   verdict events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod host;
pub mod modifier;
pub mod options;
pub mod pass;
pub mod registry;
pub mod schedule;
pub mod shared;
pub mod side;
pub mod time;
pub mod trace;
pub mod tracker;
pub mod visibility;

#[cfg(test)]
mod testing;
