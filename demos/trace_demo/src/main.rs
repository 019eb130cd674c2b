// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic host that exercises the render loop and the diagnostics pipeline.
//!
//! Builds a handful of regions whose income distributions drift over time,
//! binds a [`RenderLoop`] to an in-memory event bus, then scrubs the time
//! axis, resizes the viewport, and switches stacking modes. Events go to both
//! a [`PrettyPrintSink`] on stdout and a [`RecorderSink`], and the recording
//! is exported as a Chrome trace JSON file.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Point, Size};

use mountain_core::accessor::{
    EntitySource, LanguageSource, MarkerSource, Models, Scales, TimeSource,
};
use mountain_core::config::ChartConfig;
use mountain_core::events::{EventSource, Notification, Subscriber, SubscriptionId, Topic};
use mountain_core::layout::LayoutProfile;
use mountain_core::model::{EntityKey, ParamField};
use mountain_core::paint::{PaintFrame, Painter, Rgba};
use mountain_core::render_loop::RenderLoop;
use mountain_core::scale::{ColorScale, ContinuousScale, ScaleType};
use mountain_core::stack::StackConfig;

use mountain_debug::pretty::PrettyPrintSink;
use mountain_debug::recorder::{RecorderSink, decode};
use mountain_debug::shared::{SharedSink, Tee};

const FIRST_YEAR: f64 = 1990.0;
const LAST_YEAR: f64 = 2020.0;

// ---------------------------------------------------------------------------
// Host models
// ---------------------------------------------------------------------------

struct Region {
    key: EntityKey,
    name: &'static str,
    continent: &'static str,
    /// Population in billions at the first year, and yearly growth.
    population: (f64, f64),
    /// Mean daily income at the first year, and yearly growth rate.
    income: (f64, f64),
    spread: f64,
    /// Spread data is missing before this year.
    spread_from: f64,
}

impl Region {
    fn years(time: f64) -> f64 {
        (time - FIRST_YEAR).max(0.0)
    }

    fn weight(&self, time: f64) -> f64 {
        self.population.0 + self.population.1 * Self::years(time)
    }

    fn center(&self, time: f64) -> f64 {
        self.income.0 * (1.0 + self.income.1).powf(Self::years(time))
    }
}

struct World {
    regions: RefCell<Vec<Region>>,
    stacking: RefCell<StackConfig>,
}

impl MarkerSource for World {
    fn keys(&self) -> Vec<EntityKey> {
        self.regions.borrow().iter().map(|r| r.key).collect()
    }

    fn value(&self, field: ParamField, key: EntityKey, time: f64) -> Option<f64> {
        let regions = self.regions.borrow();
        let region = regions.iter().find(|r| r.key == key)?;
        match field {
            ParamField::Weight => Some(region.weight(time)),
            ParamField::Center => Some(region.center(time)),
            ParamField::Spread => (time >= region.spread_from).then_some(region.spread),
        }
    }

    fn group(&self, key: EntityKey, _time: f64) -> Option<String> {
        let regions = self.regions.borrow();
        regions
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.continent.to_owned())
    }

    fn color_value(&self, key: EntityKey, time: f64) -> Option<String> {
        self.group(key, time)
    }

    fn label(&self, key: EntityKey) -> String {
        let regions = self.regions.borrow();
        regions
            .iter()
            .find(|r| r.key == key)
            .map_or_else(|| format!("#{}", key.0), |r| r.name.to_owned())
    }

    fn scale_type(&self) -> ScaleType {
        ScaleType::Log
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

struct Clock {
    now: Cell<f64>,
}

impl TimeSource for Clock {
    fn value(&self) -> f64 {
        self.now.get()
    }

    fn end(&self) -> f64 {
        LAST_YEAR
    }

    fn dimension(&self) -> &str {
        "time"
    }
}

struct Geo;

impl EntitySource for Geo {
    fn dimension(&self) -> &str {
        "geo"
    }

    fn select_entity(&self, key: EntityKey) {
        println!("host: selected {key}");
    }
}

struct English;

impl LanguageSource for English {
    fn translate(&self, _namespace: &str, key: &str) -> String {
        match key {
            "income_per_day" => "Income per day ($)".to_owned(),
            other => other.to_owned(),
        }
    }
}

struct ContinentColors;

impl ColorScale for ContinentColors {
    fn color(&self, value: Option<&str>) -> Rgba {
        match value {
            Some("africa") => Rgba::new(0x00, 0xd5, 0xe9, 0xff),
            Some("asia") => Rgba::new(0xff, 0x58, 0x72, 0xff),
            Some("americas") => Rgba::new(0x7f, 0xeb, 0x00, 0xff),
            Some("europe") => Rgba::new(0xff, 0xe7, 0x00, 0xff),
            _ => Rgba::new(0x99, 0x99, 0x99, 0xff),
        }
    }
}

/// Counts path elements instead of rasterizing.
struct OutlinePainter;

impl Painter for OutlinePainter {
    fn apply(&mut self, frame: &PaintFrame<'_>) {
        let visible = frame.items.iter().filter(|i| i.visible).count();
        let elements: usize = frame.items.iter().map(|i| i.path.elements().len()).sum();
        println!(
            "paint: cycle={} label={} visible={visible}/{} elements={elements} +{} -{}",
            frame.cycle,
            frame.time_label,
            frame.items.len(),
            frame.added.len(),
            frame.removed.len(),
        );
    }
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Bus {
    next: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Topic, Box<dyn Subscriber>)>>,
}

impl Bus {
    fn publish(&self, notification: &Notification) {
        for (_, topic, subscriber) in self.subscribers.borrow().iter() {
            if *topic == notification.topic() {
                subscriber.notify(notification);
            }
        }
    }
}

impl EventSource for Bus {
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

fn regions() -> Vec<Region> {
    vec![
        Region {
            key: EntityKey(1),
            name: "Sub-Saharan Africa",
            continent: "africa",
            population: (0.5, 0.02),
            income: (2.0, 0.03),
            spread: 0.9,
            spread_from: FIRST_YEAR,
        },
        Region {
            key: EntityKey(2),
            name: "South Asia",
            continent: "asia",
            population: (1.1, 0.02),
            income: (2.5, 0.05),
            spread: 0.8,
            spread_from: FIRST_YEAR,
        },
        Region {
            key: EntityKey(3),
            name: "East Asia",
            continent: "asia",
            population: (1.6, 0.01),
            income: (3.0, 0.08),
            spread: 1.0,
            spread_from: 2000.0,
        },
        Region {
            key: EntityKey(4),
            name: "Latin America",
            continent: "americas",
            population: (0.45, 0.007),
            income: (12.0, 0.02),
            spread: 1.1,
            spread_from: FIRST_YEAR,
        },
        Region {
            key: EntityKey(5),
            name: "Europe",
            continent: "europe",
            population: (0.7, 0.001),
            income: (40.0, 0.015),
            spread: 0.7,
            spread_from: FIRST_YEAR,
        },
    ]
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let recorder = SharedSink::new(RecorderSink::new());
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));

    // -- host --------------------------------------------------------------
    let world = Rc::new(World {
        regions: RefCell::new(regions()),
        stacking: RefCell::new(StackConfig::none()),
    });
    let clock = Rc::new(Clock {
        now: Cell::new(FIRST_YEAR),
    });
    let models = Models {
        marker: world.clone(),
        time: clock.clone(),
        entities: Rc::new(Geo),
        language: Rc::new(English),
    };
    let scales = Scales {
        x: ContinuousScale::log([1.0, 10.0], [0.0, 1.0]).shared(),
        y: ContinuousScale::linear([0.0, 1.0], [1.0, 0.0]).shared(),
        color: Rc::new(ContinentColors),
    };

    let mut render_loop = RenderLoop::new(
        models,
        scales,
        Box::new(OutlinePainter),
        ChartConfig::standard(),
    );
    render_loop.set_trace_sink(Some(Box::new(Tee::new(pretty, recorder.clone()))));
    let render_loop = Rc::new(RefCell::new(render_loop));

    let bus = Bus::default();
    RenderLoop::bind(&render_loop, &bus);
    render_loop
        .borrow_mut()
        .on_ready(Size::new(800.0, 600.0), LayoutProfile::Medium);

    // -- scrub time --------------------------------------------------------
    let mut year = FIRST_YEAR;
    while year < LAST_YEAR {
        year += 5.0;
        clock.now.set(year);
        bus.publish(&Notification::TimeChanged);
    }

    // -- resize ------------------------------------------------------------
    bus.publish(&Notification::Resized {
        viewport: Size::new(320.0, 240.0),
        profile: LayoutProfile::Small,
    });

    // -- stacking ----------------------------------------------------------
    *world.stacking.borrow_mut() = StackConfig::by_property("continent");
    bus.publish(&Notification::EntitiesChanged);
    *world.stacking.borrow_mut() = StackConfig::all();
    render_loop.borrow_mut().restack();

    // -- membership --------------------------------------------------------
    world.regions.borrow_mut().retain(|r| r.continent != "europe");
    bus.publish(&Notification::EntitiesChanged);

    // -- pointer -----------------------------------------------------------
    {
        let render_loop = render_loop.borrow();
        let layout = render_loop.layout();
        let probe = Point::new(layout.width * 0.3, layout.height * 0.95);
        match render_loop.pick(probe) {
            Some(key) => {
                println!("host: hover {}", render_loop.tooltip(key));
                render_loop.select(key);
            }
            None => println!("host: nothing under {probe:?}"),
        }
    }

    // -- export Chrome trace -----------------------------------------------
    let bytes = recorder.borrow().as_bytes().to_vec();
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    mountain_debug::chrome::export(&bytes, &mut writer).expect("failed to write Chrome trace");

    println!(
        "Wrote {path} ({} events over {} redraws)",
        decode(&bytes).count(),
        render_loop.borrow().cycle(),
    );
}
