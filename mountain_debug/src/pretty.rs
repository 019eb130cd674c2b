// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use mountain_core::error::EntityError;
use mountain_core::trace::{
    EntitiesRebuiltEvent, EntityDegradedEvent, EntitySampledEvent, PhaseBeginEvent,
    PhaseEndEvent, RedrawSummary, ResizedEvent, TimeChangedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    verbose: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also prints phase boundaries and per-entity sampling lines.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn describe(error: &EntityError) -> String {
    match error {
        EntityError::Data(e) => format!("data:{}", e.field.as_str()),
        EntityError::Domain(e) => format!("domain:{e}"),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuilt] cycle={} version={} total={} +{} -{} y_max={:.4}",
            e.cycle, e.version, e.total, e.added, e.removed, e.y_max,
        );
    }

    fn on_time_changed(&mut self, e: &TimeChangedEvent) {
        let _ = writeln!(self.writer, "[time] cycle={} t={}", e.cycle, e.time);
    }

    fn on_resized(&mut self, e: &ResizedEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] cycle={} profile={} plot={}x{}",
            e.cycle, e.profile, e.width, e.height,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        if self.verbose {
            let _ = writeln!(
                self.writer,
                "[phase:begin] cycle={} {}",
                e.cycle,
                e.phase.as_str(),
            );
        }
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        if self.verbose {
            let _ = writeln!(
                self.writer,
                "[phase:end] cycle={} {} entities={}",
                e.cycle,
                e.phase.as_str(),
                e.entities,
            );
        }
    }

    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        let _ = writeln!(
            self.writer,
            "[degraded] cycle={} key={} {}",
            e.cycle,
            e.key,
            describe(&e.error),
        );
    }

    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] cycle={} version={} visible={}/{} degraded={} resampled={} \
             samples={} stacking={:?} restacked={} y_max={:.4}",
            s.cycle,
            s.version,
            s.visible,
            s.entities,
            s.degraded,
            s.resampled,
            s.samples_per_curve,
            s.stacking,
            s.restacked,
            s.y_max,
        );
    }

    fn on_entity_sampled(&mut self, e: &EntitySampledEvent) {
        if self.verbose {
            let _ = writeln!(
                self.writer,
                "[sampled] cycle={} key={} samples={} mass={:.4}",
                e.cycle, e.key, e.samples, e.mass,
            );
        }
    }
}
