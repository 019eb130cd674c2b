// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty tracking for incremental redraws.
//!
//! Invalidation is tracked with [`understory_dirty`] over `u32` keys. Key
//! [`FRAME_KEY`] stands for the chart as a whole; entity slot `s` uses key
//! `s + 1`. Every entity key depends on the frame key.
//!
//! # Channels
//!
//! - **Propagating**: [`SAMPLES`] is marked on the frame key with
//!   [`EagerPolicy`] when the time or the sampling grid changes, which
//!   marks every entity. A single entity can also be marked on its own.
//!
//! - **Local-only**: [`STACK`] is marked on the frame key when only the
//!   stacking configuration changed. The next redraw re-stacks and repaints
//!   without resampling any curve.
//!
//! # Consumption
//!
//! [`RenderLoop::redraw`](crate::render_loop::RenderLoop::redraw) drains both
//! channels once per cycle.

use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

/// Curve samples are stale; propagates from the frame to every entity.
pub const SAMPLES: Channel = Channel::new(0);

/// Stacking baselines are stale; frame-local.
pub const STACK: Channel = Channel::new(1);

/// Key standing for the whole chart.
pub const FRAME_KEY: u32 = 0;

/// Dirty state for one entity set.
#[derive(Debug)]
pub(crate) struct DirtySet {
    tracker: DirtyTracker<u32>,
    slots: u32,
}

impl DirtySet {
    pub(crate) fn new() -> Self {
        Self {
            tracker: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            slots: 0,
        }
    }

    /// Replaces the tracked entity slots with `0..slots`.
    ///
    /// Every new slot starts dirty.
    pub(crate) fn rekey(&mut self, slots: u32) {
        for slot in 0..self.slots {
            self.tracker.remove_key(slot + 1);
        }
        for slot in 0..slots {
            let _ = self.tracker.add_dependency(slot + 1, FRAME_KEY, SAMPLES);
        }
        self.slots = slots;
        self.mark_all();
    }

    /// Marks every entity for resampling.
    pub(crate) fn mark_all(&mut self) {
        self.tracker.mark_with(FRAME_KEY, SAMPLES, &EagerPolicy);
    }

    /// Marks one entity slot for resampling.
    pub(crate) fn mark_slot(&mut self, slot: u32) {
        if slot < self.slots {
            self.tracker.mark(slot + 1, SAMPLES);
        }
    }

    /// Marks the stacking baselines stale.
    pub(crate) fn mark_restack(&mut self) {
        self.tracker.mark(FRAME_KEY, STACK);
    }

    /// Drains [`SAMPLES`] and returns the dirty entity slots in ascending
    /// order.
    pub(crate) fn drain_samples(&mut self) -> Vec<u32> {
        let mut slots: Vec<u32> = self
            .tracker
            .drain(SAMPLES)
            .affected()
            .deterministic()
            .run()
            .filter(|&key| key != FRAME_KEY && key <= self.slots)
            .map(|key| key - 1)
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Drains [`STACK`] and returns whether it was marked.
    pub(crate) fn drain_restack(&mut self) -> bool {
        let keys: Vec<u32> = self.tracker.drain(STACK).deterministic().run().collect();
        keys.contains(&FRAME_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rekey_marks_every_slot() {
        let mut dirty = DirtySet::new();
        dirty.rekey(3);
        assert_eq!(dirty.drain_samples(), [0, 1, 2]);
        assert!(dirty.drain_samples().is_empty(), "draining clears");
    }

    #[test]
    fn frame_mark_propagates_to_entities() {
        let mut dirty = DirtySet::new();
        dirty.rekey(2);
        let _ = dirty.drain_samples();
        dirty.mark_all();
        assert_eq!(dirty.drain_samples(), [0, 1]);
    }

    #[test]
    fn slot_mark_is_local() {
        let mut dirty = DirtySet::new();
        dirty.rekey(4);
        let _ = dirty.drain_samples();
        dirty.mark_slot(2);
        dirty.mark_slot(9);
        assert_eq!(dirty.drain_samples(), [2]);
    }

    #[test]
    fn shrinking_drops_stale_slots() {
        let mut dirty = DirtySet::new();
        dirty.rekey(5);
        dirty.rekey(2);
        assert_eq!(dirty.drain_samples(), [0, 1]);
    }

    #[test]
    fn restack_does_not_mark_samples() {
        let mut dirty = DirtySet::new();
        dirty.rekey(2);
        let _ = dirty.drain_samples();
        dirty.mark_restack();
        assert!(dirty.drain_samples().is_empty());
        assert!(dirty.drain_restack());
        assert!(!dirty.drain_restack());
    }
}
