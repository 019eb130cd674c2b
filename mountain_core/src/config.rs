// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart configuration.
//!
//! [`ChartConfig`] groups the constants the render loop needs that are not
//! read from the host's models: sampling density, the fixed horizontal
//! domain, and how the vertical domain is sized.

use crate::float::FloatExt as _;
use crate::scale::ScaleType;

/// How the upper bound of the vertical domain is derived from peak values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TotalMode {
    /// Tallest single peak. Suits overlapping curves.
    #[default]
    Max,
    /// Sum of all peaks. Guarantees a fully stacked chart fits.
    Sum,
}

/// Controls how many samples each curve gets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    /// Plot pixels covered by one sample when the width is known.
    pub pixels_per_sample: f64,
    /// Sample count used before the first resize.
    pub fallback_resolution: usize,
}

impl SamplingConfig {
    /// One sample every three pixels, 196 samples without a width.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            pixels_per_sample: 3.0,
            fallback_resolution: 196,
        }
    }

    /// Returns the sample count for a plot of the given width.
    ///
    /// A missing or non-positive width falls back to
    /// [`fallback_resolution`](Self::fallback_resolution). The result is never
    /// below 2 so that the grid always brackets the domain.
    #[must_use]
    pub fn resolution(&self, width: Option<f64>) -> usize {
        match width {
            Some(w) if w > 0.0 && w.is_finite() && self.pixels_per_sample > 0.0 => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "sample counts are bounded by the plot width"
                )]
                let n = (w / self.pixels_per_sample).round() as usize;
                n.max(2)
            }
            _ => self.fallback_resolution.max(2),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Horizontal domain applied on every entity-set change.
///
/// Distributions have to be evaluated over a known domain before any of them
/// is drawn, so the domain is fixed per scale type rather than fitted to data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainPreset {
    /// Domain used with a logarithmic x scale.
    pub log: [f64; 2],
    /// Domain used with a linear x scale.
    pub linear: [f64; 2],
}

impl DomainPreset {
    /// Income-style presets: `[0.02, 200]` on log scales, `[1, 50]` on linear.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            log: [0.02, 200.0],
            linear: [1.0, 50.0],
        }
    }

    /// Returns the domain for the given scale type.
    #[must_use]
    pub const fn for_scale(&self, scale_type: ScaleType) -> [f64; 2] {
        match scale_type {
            ScaleType::Log => self.log,
            ScaleType::Linear => self.linear,
        }
    }
}

impl Default for DomainPreset {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration for a [`RenderLoop`](crate::render_loop::RenderLoop).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartConfig {
    /// Sample density.
    pub sampling: SamplingConfig,
    /// Horizontal domain presets.
    pub x_domain: DomainPreset,
    /// Vertical domain sizing.
    pub total_mode: TotalMode,
}

impl ChartConfig {
    /// Standard configuration: overlapping peaks sized by the tallest one.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            sampling: SamplingConfig::standard(),
            x_domain: DomainPreset::standard(),
            total_mode: TotalMode::Max,
        }
    }

    /// Standard configuration with the vertical domain sized for stacking.
    #[must_use]
    pub const fn stacked() -> Self {
        Self {
            total_mode: TotalMode::Sum,
            ..Self::standard()
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_follows_width() {
        let s = SamplingConfig::standard();
        assert_eq!(s.resolution(Some(600.0)), 200);
        assert_eq!(s.resolution(Some(601.0)), 200);
        assert_eq!(s.resolution(None), 196);
        assert_eq!(s.resolution(Some(0.0)), 196, "zero width is unknown width");
        assert_eq!(s.resolution(Some(3.0)), 2, "never fewer than two samples");
    }

    #[test]
    fn domain_preset_by_scale_type() {
        let d = DomainPreset::standard();
        assert_eq!(d.for_scale(ScaleType::Log), [0.02, 200.0]);
        assert_eq!(d.for_scale(ScaleType::Linear), [1.0, 50.0]);
    }

    #[test]
    fn stacked_preset_sums_peaks() {
        assert_eq!(ChartConfig::stacked().total_mode, TotalMode::Sum);
        assert_eq!(ChartConfig::default().total_mode, TotalMode::Max);
    }
}
