// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side model accessors.
//!
//! The render loop never owns chart data. It reads entity keys, parameters,
//! grouping, and labels through these traits and pushes selection back out
//! through [`EntitySource::select_entity`]. All methods take `&self`; hosts
//! with mutable state use interior mutability.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::float::FloatExt as _;
use crate::model::{EntityKey, ParamField};
use crate::scale::{ColorScale, ScaleType, SharedScale};
use crate::stack::StackConfig;

/// Per-entity parameters and presentation settings.
pub trait MarkerSource {
    /// Keys of the current entity set, in model order.
    fn keys(&self) -> Vec<EntityKey>;

    /// Value of a density parameter for `key` at `time`.
    ///
    /// `None` means missing or non-numeric.
    fn value(&self, field: ParamField, key: EntityKey, time: f64) -> Option<f64>;

    /// Categorical group of `key` at `time`, used by property stacking.
    fn group(&self, key: EntityKey, time: f64) -> Option<String>;

    /// Value fed to the color scale for `key` at `time`.
    fn color_value(&self, key: EntityKey, time: f64) -> Option<String>;

    /// Display label of `key`.
    fn label(&self, key: EntityKey) -> String;

    /// Scale type of the horizontal axis.
    fn scale_type(&self) -> ScaleType;

    /// Unit key of the horizontal axis, translated into the axis title.
    fn x_unit(&self) -> &str;

    /// Formats an axis tick value.
    fn tick(&self, value: f64) -> String;

    /// Current stacking configuration.
    fn stacking(&self) -> StackConfig;
}

/// The time axis.
pub trait TimeSource {
    /// Current time.
    fn value(&self) -> f64;

    /// End of the time range.
    fn end(&self) -> f64;

    /// Name of the time dimension.
    fn dimension(&self) -> &str;

    /// Formats `time` for the background label.
    ///
    /// Defaults to the whole year.
    fn format_label(&self, time: f64) -> String {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "years fit in i64; out-of-range values saturate"
        )]
        let year = time.floor() as i64;
        format!("{year}")
    }
}

/// The entity set.
pub trait EntitySource {
    /// Name of the entity dimension.
    fn dimension(&self) -> &str;

    /// Propagates a pointer selection to the host.
    fn select_entity(&self, key: EntityKey);
}

/// Text translation.
pub trait LanguageSource {
    /// Translates `key` within `namespace`.
    fn translate(&self, namespace: &str, key: &str) -> String;
}

/// The host models a render loop reads from.
#[derive(Clone)]
pub struct Models {
    /// Marker accessor.
    pub marker: Rc<dyn MarkerSource>,
    /// Time accessor.
    pub time: Rc<dyn TimeSource>,
    /// Entity-set accessor.
    pub entities: Rc<dyn EntitySource>,
    /// Translation accessor.
    pub language: Rc<dyn LanguageSource>,
}

impl fmt::Debug for Models {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Models")
            .field("time_dimension", &self.time.dimension())
            .field("entity_dimension", &self.entities.dimension())
            .field("scale_type", &self.marker.scale_type())
            .finish_non_exhaustive()
    }
}

/// The host scales a render loop sizes and reads from.
#[derive(Clone)]
pub struct Scales {
    /// Horizontal scale; its domain is fixed from the scale type.
    pub x: SharedScale,
    /// Vertical scale; its domain is sized from peak estimates.
    pub y: SharedScale,
    /// Fill colors.
    pub color: Rc<dyn ColorScale>,
}

impl fmt::Debug for Scales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scales")
            .field("x_domain", &self.x.borrow().domain())
            .field("y_domain", &self.y.borrow().domain())
            .finish_non_exhaustive()
    }
}
