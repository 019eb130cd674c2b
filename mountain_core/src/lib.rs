// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Density sampling, stacking, and incremental redraw for mountain charts.
//!
//! A *mountain chart* draws each entity (a country, a region, ...) as a
//! log-normal density curve whose shape is driven by three time-varying
//! parameters: a weight, a center, and a spread. Curves share one horizontal
//! domain and are either overlapped or stacked on top of each other.
//!
//! `mountain_core` is `no_std` compatible (with `alloc`) and owns only the
//! data-to-geometry pipeline. Models, scales, event delivery, and painting
//! are supplied by the host through the traits in [`accessor`], [`scale`],
//! [`events`], and [`paint`].
//!
//! # Architecture
//!
//! ```text
//!   EventSource (host) ──► Subscription ──► RenderLoop::handle()
//!                                                │
//!        ┌───────────────────────────────────────┤
//!        ▼                                       ▼
//!   update_entities()                       update_time() / on_resize()
//!   PeakRanker: rank + size y domain        mark dirty channels
//!        │                                       │
//!        └──────────────► redraw() ◄─────────────┘
//!                           │
//!   DistributionEngine ──► StackLayout ──► PaintFrame ──► Painter::apply()
//! ```
//!
//! **[`density`]**: log-normal density sampled over a linear or logarithmic
//! grid ([`DistributionEngine`](density::DistributionEngine)).
//!
//! **[`peak`]**: closed-form peak estimate used for ordering and for sizing
//! the vertical scale.
//!
//! **[`stack`]**: cumulative baselines, globally or per categorical group.
//!
//! **[`render_loop`]**: the [`RenderLoop`](render_loop::RenderLoop) state
//! machine that reacts to entity-set, time, and viewport changes.
//!
//! **[`dirty`]**: dirty channels (via `understory_dirty`) deciding which
//! entities must be resampled on the next redraw.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! redraw instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-entity
//!   sampling events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod accessor;
pub mod config;
pub mod density;
pub mod dirty;
pub mod error;
pub mod events;
pub mod layout;
pub mod model;
pub mod paint;
pub mod peak;
pub mod render_loop;
pub mod scale;
pub mod stack;
pub mod trace;

mod float;

#[cfg(test)]
pub(crate) mod testing;
