// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for sightline
//! diagnostics.
//!
//! This crate provides [`TraceSink`](sightline_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: one line per pass event.
//! - [`recorder::RecorderSink`]: compact binary recording, read back with
//!   [`recorder::decode`].
//! - [`chrome::export`]: Chrome Trace Event Format JSON from recorded bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
