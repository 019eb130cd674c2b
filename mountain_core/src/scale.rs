// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale adapters.
//!
//! Scales are owned by the host and shared with the render loop through
//! [`SharedScale`] handles. The render loop only touches them through two
//! sizing calls:
//!
//! - [`ScaleAdapter::set_domain`] on entity-set change (x from the
//!   [`DomainPreset`](crate::config::DomainPreset), y from the peak total),
//! - [`ScaleAdapter::set_range`] on resize.
//!
//! [`ContinuousScale`] is a minimal adapter for hosts (and tests) without a
//! scale implementation of their own.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::float::FloatExt as _;
use crate::paint::Rgba;

/// Interpolation type of a continuous scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleType {
    /// Uniform in data units.
    #[default]
    Linear,
    /// Uniform in `ln` of data units.
    Log,
}

impl ScaleType {
    /// Returns `"linear"` or `"log"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
        }
    }
}

/// Maps domain values to render coordinates.
pub trait ScaleAdapter {
    /// Returns the current `[min, max]` domain.
    fn domain(&self) -> [f64; 2];

    /// Replaces the domain.
    fn set_domain(&mut self, domain: [f64; 2]);

    /// Returns the current output range.
    fn range(&self) -> [f64; 2];

    /// Replaces the output range.
    fn set_range(&mut self, range: [f64; 2]);

    /// Maps a domain value to a render coordinate.
    fn map(&self, value: f64) -> f64;
}

/// A scale shared between the host and the render loop.
pub type SharedScale = Rc<RefCell<dyn ScaleAdapter>>;

/// Maps a categorical value to a fill color.
pub trait ColorScale {
    /// Returns the fill for `value`, or for a missing value when `None`.
    fn color(&self, value: Option<&str>) -> Rgba;
}

/// A linear or logarithmic scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContinuousScale {
    kind: ScaleType,
    domain: [f64; 2],
    range: [f64; 2],
}

impl ContinuousScale {
    /// Creates a linear scale.
    #[must_use]
    pub const fn linear(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            kind: ScaleType::Linear,
            domain,
            range,
        }
    }

    /// Creates a logarithmic scale. Domain bounds must be positive for
    /// [`map`](ScaleAdapter::map) to produce finite values.
    #[must_use]
    pub const fn log(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            kind: ScaleType::Log,
            domain,
            range,
        }
    }

    /// Returns the interpolation type.
    #[must_use]
    pub const fn kind(&self) -> ScaleType {
        self.kind
    }

    /// Wraps the scale in a [`SharedScale`] handle.
    #[must_use]
    pub fn shared(self) -> SharedScale {
        Rc::new(RefCell::new(self))
    }

    fn normalize(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let (v, d0, d1) = match self.kind {
            ScaleType::Linear => (value, d0, d1),
            ScaleType::Log => {
                if value <= 0.0 || d0 <= 0.0 || d1 <= 0.0 {
                    return f64::NAN;
                }
                (value.ln(), d0.ln(), d1.ln())
            }
        };
        let span = d1 - d0;
        if span == 0.0 {
            // Degenerate domain (e.g. all peaks zero) collapses onto the range start.
            return 0.0;
        }
        (v - d0) / span
    }
}

impl ScaleAdapter for ContinuousScale {
    fn domain(&self) -> [f64; 2] {
        self.domain
    }

    fn set_domain(&mut self, domain: [f64; 2]) {
        self.domain = domain;
    }

    fn range(&self) -> [f64; 2] {
        self.range
    }

    fn set_range(&mut self, range: [f64; 2]) {
        self.range = range;
    }

    fn map(&self, value: f64) -> f64 {
        let [r0, r1] = self.range;
        r0 + self.normalize(value) * (r1 - r0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints_and_midpoint() {
        let s = ContinuousScale::linear([0.0, 10.0], [100.0, 0.0]);
        assert_eq!(s.map(0.0), 100.0);
        assert_eq!(s.map(10.0), 0.0);
        assert_eq!(s.map(5.0), 50.0);
    }

    #[test]
    fn log_is_uniform_in_log_space() {
        let s = ContinuousScale::log([1.0, 100.0], [0.0, 200.0]);
        assert!((s.map(10.0) - 100.0).abs() < 1e-9);
        assert!(s.map(0.0).is_nan(), "log scales are undefined at zero");
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let s = ContinuousScale::linear([0.0, 0.0], [300.0, 0.0]);
        assert_eq!(s.map(0.0), 300.0);
    }

    #[test]
    fn shared_handle_sees_sizing_calls() {
        let handle = ContinuousScale::linear([0.0, 1.0], [0.0, 1.0]).shared();
        handle.borrow_mut().set_range([0.0, 640.0]);
        assert_eq!(handle.borrow().range(), [0.0, 640.0]);
        assert_eq!(handle.borrow().map(0.5), 320.0);
    }
}
