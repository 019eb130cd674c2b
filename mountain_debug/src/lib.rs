// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and trace export for mountain chart
//! diagnostics.
//!
//! This crate provides [`TraceSink`](mountain_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//! - [`shared::SharedSink`] and [`shared::Tee`]: keep a handle on a sink
//!   after boxing it into a render loop, and fan events out to two sinks.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod shared;
