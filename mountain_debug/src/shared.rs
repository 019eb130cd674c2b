// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sink adapters.
//!
//! A render loop owns its sink as a `Box<dyn TraceSink>`. [`SharedSink`] lets
//! the host keep a handle to the same sink so it can read results back (for
//! example the bytes of a [`RecorderSink`](crate::recorder::RecorderSink))
//! while the loop is still running. [`Tee`] forwards every event to two sinks.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use mountain_core::trace::{
    EntitiesRebuiltEvent, EntityDegradedEvent, EntitySampledEvent, PhaseBeginEvent,
    PhaseEndEvent, RedrawSummary, ResizedEvent, TimeChangedEvent, TraceSink,
};

/// A clonable handle to a sink shared between the host and a render loop.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> SharedSink<S> {
    /// Wraps a sink.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(sink)),
        }
    }

    /// Borrows the wrapped sink.
    ///
    /// # Panics
    ///
    /// Panics if the sink is currently receiving an event.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, S> {
        self.inner.borrow()
    }

    /// Mutably borrows the wrapped sink.
    ///
    /// # Panics
    ///
    /// Panics if the sink is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.inner.borrow_mut()
    }
}

impl<S: TraceSink> TraceSink for SharedSink<S> {
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        self.inner.borrow_mut().on_entities_rebuilt(e);
    }

    fn on_time_changed(&mut self, e: &TimeChangedEvent) {
        self.inner.borrow_mut().on_time_changed(e);
    }

    fn on_resized(&mut self, e: &ResizedEvent) {
        self.inner.borrow_mut().on_resized(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.inner.borrow_mut().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.inner.borrow_mut().on_phase_end(e);
    }

    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        self.inner.borrow_mut().on_entity_degraded(e);
    }

    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        self.inner.borrow_mut().on_redraw_summary(s);
    }

    fn on_entity_sampled(&mut self, e: &EntitySampledEvent) {
        self.inner.borrow_mut().on_entity_sampled(e);
    }
}

/// Forwards every event to two sinks, `A` first.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    /// First receiver.
    pub first: A,
    /// Second receiver.
    pub second: B,
}

impl<A, B> Tee<A, B> {
    /// Pairs two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        self.first.on_entities_rebuilt(e);
        self.second.on_entities_rebuilt(e);
    }

    fn on_time_changed(&mut self, e: &TimeChangedEvent) {
        self.first.on_time_changed(e);
        self.second.on_time_changed(e);
    }

    fn on_resized(&mut self, e: &ResizedEvent) {
        self.first.on_resized(e);
        self.second.on_resized(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        self.first.on_entity_degraded(e);
        self.second.on_entity_degraded(e);
    }

    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        self.first.on_redraw_summary(s);
        self.second.on_redraw_summary(s);
    }

    fn on_entity_sampled(&mut self, e: &EntitySampledEvent) {
        self.first.on_entity_sampled(e);
        self.second.on_entity_sampled(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::PrettyPrintSink;
    use crate::recorder::{RecorderSink, decode};

    #[test]
    fn shared_handle_sees_events() {
        let shared = SharedSink::new(RecorderSink::new());
        let mut boxed: Box<dyn TraceSink> = Box::new(shared.clone());
        boxed.on_time_changed(&TimeChangedEvent {
            cycle: 0,
            time: 2005.0,
        });
        assert_eq!(decode(shared.borrow().as_bytes()).count(), 1, "recorded");
    }

    #[test]
    fn tee_forwards_to_both() {
        let mut tee = Tee::new(
            RecorderSink::new(),
            PrettyPrintSink::with_writer(Vec::<u8>::new()),
        );
        tee.on_time_changed(&TimeChangedEvent {
            cycle: 3,
            time: 2012.0,
        });
        assert_eq!(decode(tee.first.as_bytes()).count(), 1, "recorder");
        let text = String::from_utf8(tee.second.into_inner()).unwrap();
        assert!(text.contains("t=2012"), "got: {text}");
    }
}
