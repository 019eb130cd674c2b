// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles for host models, painters, sinks, and event sources.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Size;

use crate::accessor::{EntitySource, LanguageSource, MarkerSource, Models, Scales, TimeSource};
use crate::config::ChartConfig;
use crate::events::{EventSource, Notification, Subscriber, SubscriptionId, Topic};
use crate::layout::{ChartLayout, LayoutProfile};
use crate::model::{EntityKey, ParamField};
use crate::paint::{PaintFrame, PaintItem, Painter, Rgba};
use crate::render_loop::RenderLoop;
use crate::scale::{ColorScale, ContinuousScale, ScaleType, SharedScale};
use crate::stack::StackConfig;
use crate::trace::{
    EntitiesRebuiltEvent, EntityDegradedEvent, PhaseEndEvent, PhaseKind, RedrawSummary,
    TraceSink,
};

/// One synthetic entity with constant parameters.
#[derive(Clone, Debug)]
pub(crate) struct TestEntity {
    pub(crate) key: EntityKey,
    pub(crate) weight: Option<f64>,
    pub(crate) center: Option<f64>,
    pub(crate) spread: Option<f64>,
    pub(crate) group: Option<String>,
}

impl TestEntity {
    pub(crate) fn new(key: u64, weight: f64, center: f64, spread: f64) -> Self {
        Self {
            key: EntityKey(key),
            weight: Some(weight),
            center: Some(center),
            spread: Some(spread),
            group: None,
        }
    }

    pub(crate) fn in_group(mut self, group: &str) -> Self {
        self.group = Some(String::from(group));
        self
    }
}

/// Marker over a mutable list of [`TestEntity`].
#[derive(Debug)]
pub(crate) struct TestMarker {
    pub(crate) entities: RefCell<Vec<TestEntity>>,
    pub(crate) scale_type: Cell<ScaleType>,
    pub(crate) stacking: RefCell<StackConfig>,
    /// Number of parameter reads, for asserting that work was skipped.
    pub(crate) reads: Cell<usize>,
}

impl TestMarker {
    pub(crate) fn new(entities: Vec<TestEntity>) -> Self {
        Self {
            entities: RefCell::new(entities),
            scale_type: Cell::new(ScaleType::Log),
            stacking: RefCell::new(StackConfig::none()),
            reads: Cell::new(0),
        }
    }

    pub(crate) fn set_stacking(&self, stacking: StackConfig) {
        *self.stacking.borrow_mut() = stacking;
    }

    pub(crate) fn with_entity(&self, key: EntityKey, f: impl FnOnce(&mut TestEntity)) {
        if let Some(e) = self.entities.borrow_mut().iter_mut().find(|e| e.key == key) {
            f(e);
        }
    }
}

impl MarkerSource for TestMarker {
    fn keys(&self) -> Vec<EntityKey> {
        self.entities.borrow().iter().map(|e| e.key).collect()
    }

    fn value(&self, field: ParamField, key: EntityKey, _time: f64) -> Option<f64> {
        self.reads.set(self.reads.get() + 1);
        let entities = self.entities.borrow();
        let e = entities.iter().find(|e| e.key == key)?;
        match field {
            ParamField::Weight => e.weight,
            ParamField::Center => e.center,
            ParamField::Spread => e.spread,
        }
    }

    fn group(&self, key: EntityKey, _time: f64) -> Option<String> {
        let entities = self.entities.borrow();
        entities.iter().find(|e| e.key == key)?.group.clone()
    }

    fn color_value(&self, key: EntityKey, time: f64) -> Option<String> {
        self.group(key, time)
    }

    fn label(&self, key: EntityKey) -> String {
        format!("entity {}", key.0)
    }

    fn scale_type(&self) -> ScaleType {
        self.scale_type.get()
    }

    fn x_unit(&self) -> &str {
        "income_per_day"
    }

    fn tick(&self, value: f64) -> String {
        format!("${value}")
    }

    fn stacking(&self) -> StackConfig {
        self.stacking.borrow().clone()
    }
}

/// Time axis with a settable current value.
#[derive(Debug)]
pub(crate) struct TestTime {
    pub(crate) value: Cell<f64>,
    pub(crate) end: f64,
}

impl TimeSource for TestTime {
    fn value(&self) -> f64 {
        self.value.get()
    }

    fn end(&self) -> f64 {
        self.end
    }

    fn dimension(&self) -> &str {
        "time"
    }
}

/// Entity set recording selections.
#[derive(Debug, Default)]
pub(crate) struct TestEntities {
    pub(crate) selected: RefCell<Vec<EntityKey>>,
}

impl EntitySource for TestEntities {
    fn dimension(&self) -> &str {
        "geo"
    }

    fn select_entity(&self, key: EntityKey) {
        self.selected.borrow_mut().push(key);
    }
}

/// Translator returning `namespace/key`.
#[derive(Debug)]
pub(crate) struct TestLanguage;

impl LanguageSource for TestLanguage {
    fn translate(&self, namespace: &str, key: &str) -> String {
        format!("{namespace}/{key}")
    }
}

/// Color scale keyed on whether a group is present.
#[derive(Debug)]
pub(crate) struct TestColors;

impl TestColors {
    pub(crate) const GROUPED: Rgba = Rgba(0x3366_99ff);
    pub(crate) const UNGROUPED: Rgba = Rgba(0x9999_99ff);
}

impl ColorScale for TestColors {
    fn color(&self, value: Option<&str>) -> Rgba {
        match value {
            Some(_) => Self::GROUPED,
            None => Self::UNGROUPED,
        }
    }
}

/// One painted frame, owned.
#[derive(Clone, Debug)]
pub(crate) struct PaintedFrame {
    pub(crate) cycle: u64,
    pub(crate) time_label: String,
    pub(crate) x_title: String,
    pub(crate) layout: ChartLayout,
    pub(crate) items: Vec<PaintItem>,
    pub(crate) added: Vec<EntityKey>,
    pub(crate) removed: Vec<EntityKey>,
}

/// Painter that records every frame into a shared log.
#[derive(Clone, Debug, Default)]
pub(crate) struct PaintLog(pub(crate) Rc<RefCell<Vec<PaintedFrame>>>);

impl PaintLog {
    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub(crate) fn last(&self) -> PaintedFrame {
        self.0.borrow().last().cloned().expect("no frame painted")
    }
}

impl Painter for PaintLog {
    fn apply(&mut self, frame: &PaintFrame<'_>) {
        self.0.borrow_mut().push(PaintedFrame {
            cycle: frame.cycle,
            time_label: frame.time_label.into(),
            x_title: frame.x_title.into(),
            layout: *frame.layout,
            items: frame.items.to_vec(),
            added: frame.added.to_vec(),
            removed: frame.removed.to_vec(),
        });
    }
}

/// Recorded trace events.
#[derive(Debug, Default)]
pub(crate) struct TraceRecord {
    pub(crate) rebuilt: Vec<EntitiesRebuiltEvent>,
    pub(crate) degraded: Vec<EntityDegradedEvent>,
    pub(crate) phases: Vec<(PhaseKind, u32)>,
    pub(crate) summaries: Vec<RedrawSummary>,
}

/// Sink that records into a shared [`TraceRecord`].
#[derive(Clone, Debug, Default)]
pub(crate) struct TraceLog(pub(crate) Rc<RefCell<TraceRecord>>);

impl TraceSink for TraceLog {
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        self.0.borrow_mut().rebuilt.push(*e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.0.borrow_mut().phases.push((e.phase, e.entities));
    }

    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        self.0.borrow_mut().degraded.push(*e);
    }

    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        self.0.borrow_mut().summaries.push(*s);
    }
}

/// Single-threaded in-memory event source.
#[derive(Default)]
pub(crate) struct TestBus {
    next: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Topic, Box<dyn Subscriber>)>>,
}

impl TestBus {
    pub(crate) fn publish(&self, notification: &Notification) {
        for (_, topic, subscriber) in self.subscribers.borrow().iter() {
            if *topic == notification.topic() {
                subscriber.notify(notification);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl EventSource for TestBus {
    fn subscribe(&self, topic: Topic, subscriber: Box<dyn Subscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next.get());
        self.next.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, topic, subscriber));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _, _)| *sid != id);
        subscribers.len() != before
    }
}

/// Handles to everything a test render loop is wired to.
pub(crate) struct Harness {
    pub(crate) marker: Rc<TestMarker>,
    pub(crate) time: Rc<TestTime>,
    pub(crate) entities: Rc<TestEntities>,
    pub(crate) x: SharedScale,
    pub(crate) y: SharedScale,
    pub(crate) paint: PaintLog,
}

/// Default viewport used by [`ready`].
pub(crate) const VIEWPORT: Size = Size::new(800.0, 600.0);

/// Builds an uninitialized render loop over `entities`.
pub(crate) fn harness(entities: Vec<TestEntity>, config: ChartConfig) -> (Harness, RenderLoop) {
    let marker = Rc::new(TestMarker::new(entities));
    let time = Rc::new(TestTime {
        value: Cell::new(2000.0),
        end: 2020.0,
    });
    let entity_set = Rc::new(TestEntities::default());
    let x = ContinuousScale::log([1.0, 10.0], [0.0, 1.0]).shared();
    let y = ContinuousScale::linear([0.0, 1.0], [1.0, 0.0]).shared();
    let paint = PaintLog::default();

    let models = Models {
        marker: marker.clone(),
        time: time.clone(),
        entities: entity_set.clone(),
        language: Rc::new(TestLanguage),
    };
    let scales = Scales {
        x: x.clone(),
        y: y.clone(),
        color: Rc::new(TestColors),
    };
    let render_loop = RenderLoop::new(models, scales, Box::new(paint.clone()), config);
    (
        Harness {
            marker,
            time,
            entities: entity_set,
            x,
            y,
            paint,
        },
        render_loop,
    )
}

/// Builds a render loop and runs `on_ready` at [`VIEWPORT`] / medium.
pub(crate) fn ready(entities: Vec<TestEntity>, config: ChartConfig) -> (Harness, RenderLoop) {
    let (h, mut render_loop) = harness(entities, config);
    render_loop.on_ready(VIEWPORT, LayoutProfile::Medium);
    (h, render_loop)
}
