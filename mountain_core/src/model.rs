// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity records, density samples, and the versioned entity buffer.
//!
//! The [`EntityBuffer`] is the only shared mutable state of a chart. It is
//! owned by the [`RenderLoop`](crate::render_loop::RenderLoop), fully
//! reallocated when the entity set changes, and mutated in place by every
//! redraw (time, samples, `all_zeros`, baselines, and order).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::accessor::MarkerSource;
use crate::error::DataAccessError;

/// Opaque identifier of a visualized entity.
///
/// Hosts map their own identifiers (strings, database ids) onto stable
/// `EntityKey`s; the core only compares and hashes them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey(pub u64);

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({})", self.0)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One point of a sampled density curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    /// Domain position.
    pub x: f64,
    /// Stacking baseline: `0` before layout, cumulative offset after.
    pub y0: f64,
    /// Density mass at `x`.
    pub y: f64,
}

impl Sample {
    /// Creates an unstacked sample.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y0: 0.0, y }
    }

    /// Returns the upper edge of the stacked band, `y0 + y`.
    #[inline]
    #[must_use]
    pub fn top(&self) -> f64 {
        self.y0 + self.y
    }
}

/// The per-entity parameter read from the marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamField {
    /// Normalization / height scalar.
    Weight,
    /// Arithmetic center of the underlying distribution.
    Center,
    /// Scale parameter of the log-normal.
    Spread,
}

impl ParamField {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Center => "center",
            Self::Spread => "spread",
        }
    }
}

/// Distribution parameters of one entity at one time point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    /// Height scalar applied to the density. Zero is valid and yields an
    /// all-zero curve.
    pub weight: f64,
    /// Center of the distribution; `ln(center)` is the log-normal `mu`.
    pub center: f64,
    /// Log-normal scale parameter (`sigma`, not its square).
    pub spread: f64,
}

impl Parameters {
    /// Validates and wraps raw parameter values.
    ///
    /// # Errors
    ///
    /// Returns a [`DataAccessError`] naming the first field that is missing,
    /// non-finite, or outside its valid range (`weight >= 0`, `center > 0`,
    /// `spread > 0`).
    pub fn new(
        key: EntityKey,
        weight: Option<f64>,
        center: Option<f64>,
        spread: Option<f64>,
    ) -> Result<Self, DataAccessError> {
        let check = |field: ParamField, v: Option<f64>, valid: fn(f64) -> bool| match v {
            Some(v) if v.is_finite() && valid(v) => Ok(v),
            _ => Err(DataAccessError { key, field }),
        };
        Ok(Self {
            weight: check(ParamField::Weight, weight, |v| v >= 0.0)?,
            center: check(ParamField::Center, center, |v| v > 0.0)?,
            spread: check(ParamField::Spread, spread, |v| v > 0.0)?,
        })
    }

    /// Reads the parameters of `key` at `time` from the marker.
    ///
    /// # Errors
    ///
    /// See [`Parameters::new`].
    pub fn read(
        marker: &dyn MarkerSource,
        key: EntityKey,
        time: f64,
    ) -> Result<Self, DataAccessError> {
        Self::new(
            key,
            marker.value(ParamField::Weight, key, time),
            marker.value(ParamField::Center, key, time),
            marker.value(ParamField::Spread, key, time),
        )
    }

    /// Returns the log-normal location parameter, `ln(center)`.
    #[must_use]
    pub fn mu(&self) -> f64 {
        use crate::float::FloatExt as _;
        self.center.ln()
    }
}

/// One visualized entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    /// Entity identity.
    pub key: EntityKey,
    /// Time the current `points` were sampled at.
    pub time: f64,
    /// Peak estimate at the end of the time range, used for ordering.
    pub sort_value: f64,
    /// Sampled curve, strictly increasing in `x`.
    pub points: Vec<Sample>,
    /// Whether the curve carries no mass (degenerate or missing data).
    pub all_zeros: bool,
    /// Categorical group used by property stacking.
    pub group: Option<String>,
    /// Position in descending-peak order.
    pub(crate) rank: u32,
    /// Dirty-tracking slot, stable across reorders.
    pub(crate) slot: u32,
}

impl EntityRecord {
    /// Creates an empty record for `key`.
    #[must_use]
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            time: 0.0,
            sort_value: 0.0,
            points: Vec::new(),
            all_zeros: true,
            group: None,
            rank: 0,
            slot: 0,
        }
    }

    /// Returns the total density mass of the curve.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.points.iter().map(|s| s.y).sum()
    }

    /// Recomputes [`all_zeros`](Self::all_zeros) from the current points.
    pub fn refresh_all_zeros(&mut self) {
        self.all_zeros = self.mass() == 0.0;
    }

    /// Clears the curve and marks the record as degenerate.
    pub fn degrade(&mut self) {
        self.points.clear();
        self.all_zeros = true;
    }
}

/// Monotonic version counter for the entity buffer.
pub type Version = u64;

/// Explicitly owned, versioned list of entity records.
///
/// [`replace`](Self::replace) is the only operation that reallocates and the
/// only one that bumps the version.
#[derive(Debug, Default)]
pub struct EntityBuffer {
    version: Version,
    records: Vec<EntityRecord>,
}

impl EntityBuffer {
    /// Creates an empty buffer at version `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffer version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Replaces every record and bumps the version.
    pub fn replace(&mut self, records: Vec<EntityRecord>) {
        self.records = records;
        self.version = self.version.wrapping_add(1);
    }

    /// Returns the records in paint order.
    #[must_use]
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Returns the records for in-place mutation.
    ///
    /// A slice cannot grow or shrink, so callers cannot reallocate the buffer.
    pub fn records_mut(&mut self) -> &mut [EntityRecord] {
        &mut self.records
    }

    /// Returns the record for `key`, if present.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&EntityRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the buffer holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
