// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigger handlers: lifecycle, entity-set, time, and resize.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashSet;
use kurbo::Size;

use super::{LoopState, RenderLoop, tracer};
use crate::error::LayoutProfileError;
use crate::events::{EventSource, Notification, Subscription, SubscriptionId, Topic};
use crate::layout::{ChartLayout, LayoutProfile};
use crate::model::{EntityRecord, Parameters};
use crate::peak::{self, vertical_extent};
use crate::trace::{
    EntitiesRebuiltEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, ResizedEvent,
    TimeChangedEvent, saturate,
};

impl RenderLoop {
    /// Registers one subscription per [`Topic`] on `source`.
    ///
    /// Returns the subscription handles in [`Topic::ALL`] order.
    pub fn bind(this: &Rc<RefCell<Self>>, source: &dyn EventSource) -> [SubscriptionId; 3] {
        Topic::ALL.map(|topic| {
            source.subscribe(topic, Box::new(Subscription::new(topic, Rc::clone(this))))
        })
    }

    /// Completes setup and paints the first frame.
    ///
    /// Runs the entity-set sequence: entities, layout, time, redraw.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    pub fn on_ready(&mut self, viewport: Size, profile: LayoutProfile) {
        assert!(
            self.state == LoopState::Uninitialized,
            "render loop is already ready"
        );
        self.state = LoopState::Ready;
        self.update_entities();
        self.on_resize(viewport, profile);
        self.update_time();
        self.redraw();
    }

    /// Reacts to a host notification.
    ///
    /// Notifications arriving before [`on_ready`](Self::on_ready) are ignored.
    pub fn handle(&mut self, notification: &Notification) {
        if self.state != LoopState::Ready {
            return;
        }
        match *notification {
            Notification::EntitiesChanged => {
                self.update_entities();
                self.on_resize(self.viewport, self.layout.profile);
                self.update_time();
            }
            Notification::TimeChanged => self.update_time(),
            Notification::Resized { viewport, profile } => {
                self.on_resize(viewport, profile);
                self.update_time();
            }
        }
        self.redraw();
    }

    /// Rebuilds the entity buffer from the marker.
    ///
    /// Entities are ranked by their peak estimate at the end of the time
    /// range, the horizontal domain is reset from the scale type, and the
    /// vertical domain is sized from the peaks. Every entity is resampled
    /// on the next redraw.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn update_entities(&mut self) {
        self.assert_ready();
        let cycle = self.cycle;
        let marker = Rc::clone(&self.models.marker);
        let mut tracer = tracer(&mut self.sink);

        let scale_type = marker.scale_type();
        self.scales
            .x
            .borrow_mut()
            .set_domain(self.config.x_domain.for_scale(scale_type));
        self.x_title = self.models.language.translate("unit", marker.x_unit());
        self.stacking = marker.stacking();

        tracer.phase_begin(&PhaseBeginEvent {
            cycle,
            phase: PhaseKind::Rank,
        });
        let end = self.models.time.end();
        let keys = marker.keys();
        let ranked = peak::rank(
            keys.iter()
                .map(|&key| (key, Parameters::read(&*marker, key, end).ok())),
        );
        self.y_max = vertical_extent(ranked.iter().map(|r| r.peak), self.config.total_mode);
        self.scales.y.borrow_mut().set_domain([0.0, self.y_max]);
        tracer.phase_end(&PhaseEndEvent {
            cycle,
            phase: PhaseKind::Rank,
            entities: saturate(ranked.len()),
        });

        let previous: HashSet<_> = self.buffer.records().iter().map(|r| r.key).collect();
        let current: HashSet<_> = keys.iter().copied().collect();
        let added_before = self.pending_added.len();
        let removed_before = self.pending_removed.len();
        self.pending_added
            .extend(keys.iter().copied().filter(|k| !previous.contains(k)));
        self.pending_removed.extend(
            self.buffer
                .records()
                .iter()
                .map(|r| r.key)
                .filter(|k| !current.contains(k)),
        );

        let records: Vec<EntityRecord> = ranked
            .iter()
            .zip(0_u32..)
            .map(|(r, index)| {
                let mut record = EntityRecord::new(r.key);
                record.time = end;
                record.sort_value = r.peak;
                record.rank = index;
                record.slot = index;
                record
            })
            .collect();
        let total = saturate(records.len());
        self.buffer.replace(records);
        self.dirty.rekey(total);
        self.dirty.mark_restack();

        tracer.entities_rebuilt(&EntitiesRebuiltEvent {
            cycle,
            version: self.buffer.version(),
            total,
            added: saturate(self.pending_added.len() - added_before),
            removed: saturate(self.pending_removed.len() - removed_before),
            y_max: self.y_max,
        });
    }

    /// Reads the current time and refreshes the time label.
    ///
    /// Every entity is resampled on the next redraw.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn update_time(&mut self) {
        self.assert_ready();
        let time = self.models.time.value();
        self.time = time;
        self.time_label = self.models.time.format_label(time);
        self.dirty.mark_all();
        tracer(&mut self.sink).time_changed(&TimeChangedEvent {
            cycle: self.cycle,
            time,
        });
    }

    /// Recomputes the layout for `viewport` and rescales the axis ranges.
    ///
    /// Does not resample by itself; the next redraw resamples only if the
    /// sampling resolution changed.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn on_resize(&mut self, viewport: Size, profile: LayoutProfile) {
        self.assert_ready();
        let layout = ChartLayout::compute(viewport, profile);
        self.scales.x.borrow_mut().set_range(layout.x_range());
        self.scales.y.borrow_mut().set_range(layout.y_range());
        self.viewport = viewport;
        self.layout = layout;
        tracer(&mut self.sink).resized(&ResizedEvent {
            cycle: self.cycle,
            profile,
            width: layout.width,
            height: layout.height,
        });
    }

    /// Like [`on_resize`](Self::on_resize), with the profile given by name.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutProfileError`] if `profile` is not `small`, `medium`,
    /// or `large`. The layout is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn on_resize_named(
        &mut self,
        viewport: Size,
        profile: &str,
    ) -> Result<(), LayoutProfileError> {
        let profile = profile.parse()?;
        self.on_resize(viewport, profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use kurbo::Size;

    use crate::config::ChartConfig;
    use crate::events::{EventSource, Notification};
    use crate::layout::LayoutProfile;
    use crate::model::{EntityKey, Parameters};
    use crate::peak::peak_value;
    use crate::render_loop::{LoopState, RenderLoop};
    use crate::scale::ScaleType;
    use crate::testing::{TestBus, TestEntity, VIEWPORT, harness, ready};

    fn three() -> alloc::vec::Vec<TestEntity> {
        vec![
            TestEntity::new(1, 1.0, 10.0, 0.5),
            TestEntity::new(2, 3.0, 10.0, 0.5),
            TestEntity::new(3, 2.0, 10.0, 0.5),
        ]
    }

    fn keys(render_loop: &RenderLoop) -> alloc::vec::Vec<u64> {
        render_loop.buffer().records().iter().map(|r| r.key.0).collect()
    }

    #[test]
    fn on_ready_paints_first_frame() {
        let (h, render_loop) = ready(three(), ChartConfig::standard());
        assert_eq!(render_loop.state(), LoopState::Ready);
        assert_eq!(h.paint.len(), 1);

        let frame = h.paint.last();
        assert_eq!(frame.cycle, 0);
        assert_eq!(frame.items.len(), 3);
        assert_eq!(frame.time_label, "2000");
        assert_eq!(frame.x_title, "unit/income_per_day");
        assert_eq!(frame.added, [EntityKey(1), EntityKey(2), EntityKey(3)]);
        assert!(frame.removed.is_empty());
        assert_eq!(frame.layout.width, 740.0);
        assert_eq!(render_loop.cycle(), 1);

        assert_eq!(h.x.borrow().domain(), [0.02, 200.0]);
        assert_eq!(h.x.borrow().range(), [0.0, 740.0]);
        assert_eq!(h.y.borrow().range(), [530.0, 0.0]);
    }

    #[test]
    fn linear_scale_type_uses_linear_preset() {
        let (h, mut render_loop) = harness(three(), ChartConfig::standard());
        h.marker.scale_type.set(ScaleType::Linear);
        render_loop.on_ready(VIEWPORT, LayoutProfile::Medium);
        assert_eq!(h.x.borrow().domain(), [1.0, 50.0]);
        let first = &render_loop.buffer().records()[0].points;
        assert_eq!(first[0].x, 1.0);
        assert_eq!(first[first.len() - 1].x, 50.0);
    }

    #[test]
    fn entities_ranked_by_peak_at_range_end() {
        let (h, render_loop) = ready(three(), ChartConfig::standard());
        assert_eq!(keys(&render_loop), [2, 3, 1]);

        let tallest = peak_value(&Parameters {
            weight: 3.0,
            center: 10.0,
            spread: 0.5,
        });
        assert!((render_loop.y_max() - tallest).abs() < 1e-12);
        assert_eq!(h.y.borrow().domain(), [0.0, render_loop.y_max()]);
        let records = render_loop.buffer().records();
        assert!(records.windows(2).all(|w| w[0].sort_value >= w[1].sort_value));
        assert!(records.iter().all(|r| r.time == 2000.0), "resampled at current time");
    }

    #[test]
    fn sum_mode_sizes_for_stacking() {
        let (_, render_loop) = ready(three(), ChartConfig::stacked());
        let unit = peak_value(&Parameters {
            weight: 1.0,
            center: 10.0,
            spread: 0.5,
        });
        assert!((render_loop.y_max() - 6.0 * unit).abs() < 1e-12);
    }

    #[test]
    fn notifications_before_ready_are_ignored() {
        let (h, mut render_loop) = harness(three(), ChartConfig::standard());
        render_loop.handle(&Notification::TimeChanged);
        render_loop.handle(&Notification::EntitiesChanged);
        assert_eq!(render_loop.state(), LoopState::Uninitialized);
        assert_eq!(h.paint.len(), 0);
        assert!(render_loop.buffer().is_empty());
    }

    #[test]
    #[should_panic(expected = "render loop is not ready")]
    fn direct_trigger_before_ready_panics() {
        let (_, mut render_loop) = harness(three(), ChartConfig::standard());
        render_loop.update_time();
    }

    #[test]
    #[should_panic(expected = "already ready")]
    fn on_ready_twice_panics() {
        let (_, mut render_loop) = ready(three(), ChartConfig::standard());
        render_loop.on_ready(VIEWPORT, LayoutProfile::Medium);
    }

    #[test]
    fn entity_set_change_reports_membership_diff() {
        let (h, mut render_loop) = ready(three(), ChartConfig::standard());
        let version = render_loop.buffer().version();
        h.marker.entities.borrow_mut().retain(|e| e.key != EntityKey(1));
        h.marker
            .entities
            .borrow_mut()
            .push(TestEntity::new(4, 0.5, 2.0, 0.8));

        render_loop.handle(&Notification::EntitiesChanged);

        let frame = h.paint.last();
        assert_eq!(frame.added, [EntityKey(4)]);
        assert_eq!(frame.removed, [EntityKey(1)]);
        assert_eq!(render_loop.buffer().version(), version + 1);
        assert!(render_loop.buffer().get(EntityKey(1)).is_none());
        assert_eq!(render_loop.buffer().len(), 3);
        assert_eq!(frame.layout.width, 740.0, "keeps the last viewport");
    }

    #[test]
    fn time_change_updates_label_and_resamples() {
        let (h, mut render_loop) = ready(three(), ChartConfig::standard());
        let version = render_loop.buffer().version();
        h.time.value.set(2005.5);
        render_loop.handle(&Notification::TimeChanged);

        assert_eq!(h.paint.last().time_label, "2005");
        assert_eq!(render_loop.time_label(), "2005");
        assert!(render_loop.buffer().records().iter().all(|r| r.time == 2005.5));
        assert_eq!(render_loop.buffer().version(), version, "no reallocation");
    }

    #[test]
    fn resize_changes_layout_and_resolution() {
        let (h, mut render_loop) = ready(three(), ChartConfig::standard());
        assert_eq!(render_loop.buffer().records()[0].points.len(), 247);

        render_loop.handle(&Notification::Resized {
            viewport: Size::new(320.0, 240.0),
            profile: LayoutProfile::Small,
        });
        assert_eq!(render_loop.layout().width, 280.0);
        assert_eq!(render_loop.layout().tick_spacing, 60.0);
        assert_eq!(h.x.borrow().range(), [0.0, 280.0]);
        assert!(render_loop.buffer().records().iter().all(|r| r.points.len() == 93));
    }

    #[test]
    fn unknown_profile_name_is_an_error() {
        let (_, mut render_loop) = ready(three(), ChartConfig::standard());
        let err = render_loop
            .on_resize_named(Size::new(100.0, 100.0), "huge")
            .unwrap_err();
        assert_eq!(err.name, "huge");
        assert_eq!(render_loop.layout().width, 740.0);

        render_loop
            .on_resize_named(Size::new(1000.0, 700.0), "large")
            .unwrap();
        assert_eq!(render_loop.layout().profile, LayoutProfile::Large);
    }

    #[test]
    fn bound_subscriptions_drive_the_loop() {
        let (h, render_loop) = harness(three(), ChartConfig::standard());
        let render_loop = Rc::new(RefCell::new(render_loop));
        let bus = TestBus::default();
        let ids = RenderLoop::bind(&render_loop, &bus);
        assert_eq!(bus.len(), 3);

        bus.publish(&Notification::TimeChanged);
        assert_eq!(h.paint.len(), 0, "not ready yet");

        render_loop
            .borrow_mut()
            .on_ready(VIEWPORT, LayoutProfile::Medium);
        bus.publish(&Notification::TimeChanged);
        assert_eq!(h.paint.len(), 2);

        assert!(bus.unsubscribe(ids[1]));
        assert!(!bus.unsubscribe(ids[1]));
        bus.publish(&Notification::TimeChanged);
        assert_eq!(h.paint.len(), 2);

        bus.publish(&Notification::Resized {
            viewport: Size::new(640.0, 480.0),
            profile: LayoutProfile::Small,
        });
        assert_eq!(h.paint.len(), 3);
        assert_eq!(render_loop.borrow().layout().width, 600.0);
    }
}
