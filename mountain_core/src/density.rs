// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Log-normal density curves sampled over the horizontal domain.
//!
//! A [`DistributionEngine`] owns one sampling grid: `resolution` positions
//! spread uniformly across the domain, in data units for
//! [`ScaleType::Linear`] and in `ln` units for [`ScaleType::Log`]. The log
//! grid is exponentiated before evaluation, which keeps sample density even
//! across decades instead of crowding the high end.
//!
//! Both endpoints are included, so the first and last samples sit exactly on
//! the domain bounds.
//!
//! Each curve is `y = weight * pdf(x; ln(center), spread)` where `pdf` is the
//! log-normal density with `spread` used directly as `sigma`.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::error::DomainError;
use crate::float::FloatExt as _;
use crate::model::{Parameters, Sample};
use crate::scale::ScaleType;

/// Log-normal probability density of `x` with location `mu` and scale `sigma`.
///
/// Returns `0` outside the support (`x <= 0`).
#[must_use]
pub fn lognormal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let z = (x.ln() - mu) / sigma;
    (-0.5 * z * z).exp() / (x * sigma * (2.0 * PI).sqrt())
}

/// Samples density curves over a fixed grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionEngine {
    scale_type: ScaleType,
    domain: [f64; 2],
    xs: Vec<f64>,
}

impl DistributionEngine {
    /// Builds the sampling grid.
    ///
    /// # Errors
    ///
    /// - [`DomainError::ZeroResolution`] if `resolution < 2`.
    /// - [`DomainError::EmptyDomain`] if the bounds are non-finite or not
    ///   increasing.
    /// - [`DomainError::NonPositiveLogBound`] if `scale_type` is
    ///   [`ScaleType::Log`] and a bound is `<= 0`.
    pub fn new(
        scale_type: ScaleType,
        domain: [f64; 2],
        resolution: usize,
    ) -> Result<Self, DomainError> {
        let mut engine = Self {
            scale_type,
            domain,
            xs: Vec::new(),
        };
        engine.rebuild(scale_type, domain, resolution)?;
        Ok(engine)
    }

    /// Rebuilds the grid in place, reusing its allocation.
    ///
    /// On error the previous grid is left untouched.
    ///
    /// # Errors
    ///
    /// See [`DistributionEngine::new`].
    pub fn rebuild(
        &mut self,
        scale_type: ScaleType,
        domain: [f64; 2],
        resolution: usize,
    ) -> Result<(), DomainError> {
        let [from, to] = domain;
        if resolution < 2 {
            return Err(DomainError::ZeroResolution);
        }
        if scale_type == ScaleType::Log {
            for bound in [from, to] {
                if bound <= 0.0 {
                    return Err(DomainError::NonPositiveLogBound { bound });
                }
            }
        }
        if !from.is_finite() || !to.is_finite() || from >= to {
            return Err(DomainError::EmptyDomain { from, to });
        }

        let (lo, hi) = match scale_type {
            ScaleType::Linear => (from, to),
            ScaleType::Log => (from.ln(), to.ln()),
        };
        let last = resolution - 1;
        let step = (hi - lo) / last as f64;

        self.xs.clear();
        self.xs.reserve(resolution);
        for i in 0..resolution {
            let t = if i == last { hi } else { lo + step * i as f64 };
            self.xs.push(match scale_type {
                ScaleType::Linear => t,
                ScaleType::Log => t.exp(),
            });
        }
        if scale_type == ScaleType::Log {
            // Pin the endpoints so exp(ln(b)) rounding cannot leave the domain.
            self.xs[0] = from;
            self.xs[last] = to;
        }

        self.scale_type = scale_type;
        self.domain = domain;
        Ok(())
    }

    /// Returns the grid's scale type.
    #[must_use]
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Returns the sampled domain.
    #[must_use]
    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    /// Returns the number of samples per curve.
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.xs.len()
    }

    /// Returns the sample positions.
    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Samples one curve.
    #[must_use]
    pub fn generate(&self, params: &Parameters) -> Vec<Sample> {
        let mut out = Vec::with_capacity(self.xs.len());
        self.generate_into(params, &mut out);
        out
    }

    /// Samples one curve into `out`, reusing its allocation.
    ///
    /// Every `y0` is reset to `0`.
    pub fn generate_into(&self, params: &Parameters, out: &mut Vec<Sample>) {
        let mu = params.mu();
        out.clear();
        out.extend(
            self.xs
                .iter()
                .map(|&x| Sample::new(x, params.weight * lognormal_pdf(x, mu, params.spread))),
        );
    }
}

/// Checks that every sampled density and the curve's total mass are finite.
///
/// Huge weights can overflow the mass sum, and tiny spreads can push single
/// densities to infinity.
///
/// # Errors
///
/// Returns [`DomainError::NonFiniteDensity`] if any `y` or the sum of all
/// `y` is NaN or infinite.
pub fn check_finite(points: &[Sample]) -> Result<(), DomainError> {
    let mut mass = 0.0;
    for s in points {
        if !s.y.is_finite() {
            return Err(DomainError::NonFiniteDensity);
        }
        mass += s.y;
    }
    if mass.is_finite() {
        Ok(())
    } else {
        Err(DomainError::NonFiniteDensity)
    }
}
