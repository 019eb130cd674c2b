// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render loop state machine.
//!
//! A [`RenderLoop`] starts [`Uninitialized`](LoopState::Uninitialized) and
//! becomes [`Ready`](LoopState::Ready) on [`on_ready`](RenderLoop::on_ready).
//! From then on it reacts to three triggers, each of which runs to
//! completion synchronously and ends with exactly one
//! [`redraw`](RenderLoop::redraw):
//!
//! | trigger            | sequence                                              |
//! |--------------------|-------------------------------------------------------|
//! | entity set changed | `update_entities`, `on_resize`, `update_time`, redraw |
//! | time changed       | `update_time`, redraw                                 |
//! | resized            | `on_resize`, `update_time`, redraw                    |
//!
//! # Ownership
//!
//! The render loop exclusively owns the [`EntityBuffer`]. The buffer is
//! reallocated only by `update_entities`; redraws mutate its records in
//! place. Scales are host-owned and only resized through their
//! [`set_domain`](crate::scale::ScaleAdapter::set_domain) and
//! [`set_range`](crate::scale::ScaleAdapter::set_range) calls.
//!
//! # Panics
//!
//! Calling a trigger method directly before `on_ready` panics.
//! Notifications delivered through [`handle`](RenderLoop::handle) before
//! `on_ready` are ignored, since hosts commonly publish while still wiring
//! models together.

mod handlers;
mod redraw;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::accessor::{Models, Scales};
use crate::config::ChartConfig;
use crate::density::DistributionEngine;
use crate::dirty::DirtySet;
use crate::error::DomainError;
use crate::layout::{ChartLayout, LayoutProfile};
use crate::model::{EntityBuffer, EntityKey};
use crate::paint::{PaintItem, Painter};
use crate::scale::ScaleType;
use crate::stack::StackConfig;
use crate::trace::{TraceSink, Tracer};

/// Lifecycle state of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Constructed; triggers are not accepted yet.
    Uninitialized,
    /// Set up; triggers are handled.
    Ready,
}

/// Drives the entity buffer from host notifications to paint frames.
pub struct RenderLoop {
    state: LoopState,

    // -- Collaborators --
    models: Models,
    scales: Scales,
    painter: Box<dyn Painter>,
    sink: Option<Box<dyn TraceSink>>,
    config: ChartConfig,

    // -- Entity state --
    buffer: EntityBuffer,
    dirty: DirtySet,
    engine: Result<DistributionEngine, DomainError>,
    stacking: StackConfig,
    y_max: f64,

    // -- View state --
    viewport: Size,
    layout: ChartLayout,
    time: f64,
    time_label: String,
    x_title: String,

    // -- Output --
    cycle: u64,
    items: Vec<PaintItem>,
    pending_added: Vec<EntityKey>,
    pending_removed: Vec<EntityKey>,
    stack_scratch: Vec<f64>,
}

impl fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoop")
            .field("state", &self.state)
            .field("models", &self.models)
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field("layout", &self.layout)
            .field("time", &self.time)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl RenderLoop {
    /// Creates an uninitialized render loop.
    #[must_use]
    pub fn new(
        models: Models,
        scales: Scales,
        painter: Box<dyn Painter>,
        config: ChartConfig,
    ) -> Self {
        let engine = DistributionEngine::new(
            ScaleType::Linear,
            config.x_domain.linear,
            config.sampling.fallback_resolution,
        );
        Self {
            state: LoopState::Uninitialized,
            models,
            scales,
            painter,
            sink: None,
            config,
            buffer: EntityBuffer::new(),
            dirty: DirtySet::new(),
            engine,
            stacking: StackConfig::none(),
            y_max: 0.0,
            viewport: Size::ZERO,
            layout: ChartLayout::compute(Size::ZERO, LayoutProfile::default()),
            time: 0.0,
            time_label: String::new(),
            x_title: String::new(),
            cycle: 0,
            items: Vec::new(),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            stack_scratch: Vec::new(),
        }
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(
        &mut self,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Option<Box<dyn TraceSink>> {
        core::mem::replace(&mut self.sink, sink)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns the chart configuration.
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Returns the entity buffer.
    #[must_use]
    pub fn buffer(&self) -> &EntityBuffer {
        &self.buffer
    }

    /// Returns the current layout.
    #[must_use]
    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Returns the background time label.
    #[must_use]
    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    /// Returns the horizontal axis title.
    #[must_use]
    pub fn x_title(&self) -> &str {
        &self.x_title
    }

    /// Returns the items of the last painted frame.
    #[must_use]
    pub fn items(&self) -> &[PaintItem] {
        &self.items
    }

    /// Returns the upper bound of the vertical domain.
    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Returns the number of completed redraw cycles.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn assert_ready(&self) {
        assert!(
            self.state == LoopState::Ready,
            "render loop is not ready; call on_ready first"
        );
    }
}

/// Builds a [`Tracer`] over an optional boxed sink.
fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => Tracer::new(&mut **sink),
        None => Tracer::none(),
    }
}
