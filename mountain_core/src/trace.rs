// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! render loop calls as it handles triggers. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! The core has no clock. Events are ordered by a `cycle` counter that
//! advances once per handled trigger (entity-set change, time change,
//! resize, or explicit redraw).
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`RedrawSummaryBuilder`] collects per-phase counts during a redraw and
//! produces a [`RedrawSummary`] at the end.
//!
//! Per-entity data problems never abort a redraw; they surface here as
//! [`EntityDegradedEvent`]s.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`EntitySampledEvent`] and the
//!   corresponding `TraceSink` method.

use crate::error::EntityError;
use crate::layout::LayoutProfile;
use crate::model::{EntityKey, Version};
use crate::stack::StackUse;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a redraw cycle is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Peak estimation and ordering (entity-set changes only).
    Rank,
    /// Density sampling of dirty entities.
    Sample,
    /// Baseline accumulation.
    Stack,
    /// Path building and painter dispatch.
    Paint,
}

impl PhaseKind {
    /// All phases in execution order.
    pub const ALL: [Self; 4] = [Self::Rank, Self::Sample, Self::Stack, Self::Paint];

    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Sample => "sample",
            Self::Stack => "stack",
            Self::Paint => "paint",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after the entity buffer was rebuilt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitiesRebuiltEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Buffer version after the rebuild.
    pub version: Version,
    /// Entities in the new set.
    pub total: u32,
    /// Entities not present in the previous set.
    pub added: u32,
    /// Entities dropped from the previous set.
    pub removed: u32,
    /// New upper bound of the vertical domain.
    pub y_max: f64,
}

/// Emitted when the displayed time changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeChangedEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// New time value.
    pub time: f64,
}

/// Emitted after the layout was recomputed for a new viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizedEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Profile in effect.
    pub profile: LayoutProfile,
    /// Plot area width.
    pub width: f64,
    /// Plot area height.
    pub height: f64,
}

/// Marks the beginning of a redraw phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a redraw phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Entities the phase touched.
    pub entities: u32,
}

/// Emitted when an entity could not be sampled and was hidden.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityDegradedEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Affected entity.
    pub key: EntityKey,
    /// Why it was hidden.
    pub error: EntityError,
}

/// A per-entity sampling record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySampledEvent {
    /// Cycle counter.
    pub cycle: u64,
    /// Sampled entity.
    pub key: EntityKey,
    /// Number of samples.
    pub samples: u32,
    /// Total density mass.
    pub mass: f64,
}

/// Per-redraw summary produced by [`RedrawSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RedrawSummary {
    /// Cycle counter.
    pub cycle: u64,
    /// Buffer version the redraw ran against.
    pub version: Version,
    /// Entities in the buffer.
    pub entities: u32,
    /// Entities painted with a visible area.
    pub visible: u32,
    /// Entities hidden because of a data or domain error.
    pub degraded: u32,
    /// Entities resampled this cycle.
    pub resampled: u32,
    /// Samples per curve.
    pub samples_per_curve: u32,
    /// Stacking driver in effect.
    pub stacking: StackUse,
    /// Whether baselines were recomputed.
    pub restacked: bool,
    /// Upper bound of the vertical domain.
    pub y_max: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the entity buffer was rebuilt.
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        _ = e;
    }

    /// Called when the displayed time changes.
    fn on_time_changed(&mut self, e: &TimeChangedEvent) {
        _ = e;
    }

    /// Called after a resize.
    fn on_resized(&mut self, e: &ResizedEvent) {
        _ = e;
    }

    /// Called at the beginning of a redraw phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a redraw phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when an entity is hidden because of bad data.
    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        _ = e;
    }

    /// Called with a per-redraw summary.
    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        _ = s;
    }

    /// Called for every resampled entity (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_entity_sampled(&mut self, e: &EntitySampledEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`EntitiesRebuiltEvent`].
    #[inline]
    pub fn entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_entities_rebuilt(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TimeChangedEvent`].
    #[inline]
    pub fn time_changed(&mut self, e: &TimeChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_time_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResizedEvent`].
    #[inline]
    pub fn resized(&mut self, e: &ResizedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resized(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EntityDegradedEvent`].
    #[inline]
    pub fn entity_degraded(&mut self, e: &EntityDegradedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_entity_degraded(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RedrawSummary`].
    #[inline]
    pub fn redraw_summary(&mut self, s: &RedrawSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_redraw_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits an [`EntitySampledEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn entity_sampled(&mut self, e: &EntitySampledEvent) {
        if let Some(s) = &mut self.sink {
            s.on_entity_sampled(e);
        }
    }
}

// ---------------------------------------------------------------------------
// RedrawSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects counts during a redraw and produces a [`RedrawSummary`].
#[derive(Debug)]
pub struct RedrawSummaryBuilder {
    summary: RedrawSummary,
}

impl RedrawSummaryBuilder {
    /// Starts building a summary for one cycle.
    #[must_use]
    pub fn new(cycle: u64, version: Version, stacking: StackUse) -> Self {
        Self {
            summary: RedrawSummary {
                cycle,
                version,
                entities: 0,
                visible: 0,
                degraded: 0,
                resampled: 0,
                samples_per_curve: 0,
                stacking,
                restacked: false,
                y_max: 0.0,
            },
        }
    }

    /// Records one resampled entity.
    pub fn resampled(&mut self, samples: usize) {
        self.summary.resampled += 1;
        self.summary.samples_per_curve = saturate(samples);
    }

    /// Records one entity hidden because of an error.
    pub fn degraded(&mut self) {
        self.summary.degraded += 1;
    }

    /// Records one painted entity.
    pub fn painted(&mut self, visible: bool) {
        self.summary.entities += 1;
        if visible {
            self.summary.visible += 1;
        }
    }

    /// Records that baselines were recomputed.
    pub fn set_restacked(&mut self, restacked: bool) {
        self.summary.restacked = restacked;
    }

    /// Records the vertical domain bound.
    pub fn set_y_max(&mut self, y_max: f64) {
        self.summary.y_max = y_max;
    }

    /// Consumes the builder and produces the final [`RedrawSummary`].
    #[must_use]
    pub fn finish(self) -> RedrawSummary {
        self.summary
    }
}

/// Narrows a count to `u32`, saturating.
pub(crate) fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
