// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport-dependent plot geometry.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use kurbo::{Insets, Point, Size};

use crate::error::LayoutProfileError;

/// Named layout profile chosen by the host from the viewport class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutProfile {
    /// Phones and narrow embeds.
    Small,
    /// Default desktop embed.
    #[default]
    Medium,
    /// Full-screen presentation.
    Large,
}

impl LayoutProfile {
    /// Returns the profile name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Plot margins as `Insets` (left, top, right, bottom).
    #[must_use]
    pub fn margin(self) -> Insets {
        match self {
            Self::Small => Insets::new(20.0, 30.0, 20.0, 40.0),
            Self::Medium | Self::Large => Insets::new(30.0, 30.0, 30.0, 40.0),
        }
    }

    /// Minimum spacing between axis ticks, in pixels.
    #[must_use]
    pub const fn tick_spacing(self) -> f64 {
        match self {
            Self::Small => 60.0,
            Self::Medium => 80.0,
            Self::Large => 100.0,
        }
    }
}

impl fmt::Display for LayoutProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutProfile {
    type Err = LayoutProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(LayoutProfileError {
                name: String::from(s),
            }),
        }
    }
}

/// Plot area and decoration placement for one viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    /// Profile the layout was computed from.
    pub profile: LayoutProfile,
    /// Margins around the plot area.
    pub margin: Insets,
    /// Minimum axis tick spacing.
    pub tick_spacing: f64,
    /// Plot area width; the x range is `[0, width]`.
    pub width: f64,
    /// Plot area height; the y range is `[height, 0]`.
    pub height: f64,
    /// Center of the large background time label, in plot coordinates.
    pub time_label_anchor: Point,
    /// Font size of the background time label.
    pub time_label_font_size: f64,
}

impl ChartLayout {
    /// Computes the layout of a `viewport` under `profile`.
    ///
    /// Plot dimensions are clamped at zero when the margins do not fit.
    #[must_use]
    pub fn compute(viewport: Size, profile: LayoutProfile) -> Self {
        let margin = profile.margin();
        let width = (viewport.width - margin.x0 - margin.x1).max(0.0);
        let height = (viewport.height - margin.y0 - margin.y1).max(0.0);
        Self {
            profile,
            margin,
            tick_spacing: profile.tick_spacing(),
            width,
            height,
            time_label_anchor: Point::new(width / 2.0, height / 3.0),
            time_label_font_size: (height / 4.0).max(width / 4.0),
        }
    }

    /// Plot area size.
    #[must_use]
    pub fn plot_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Horizontal pixel range.
    #[must_use]
    pub fn x_range(&self) -> [f64; 2] {
        [0.0, self.width]
    }

    /// Vertical pixel range, inverted so larger values draw higher.
    #[must_use]
    pub fn y_range(&self) -> [f64; 2] {
        [self.height, 0.0]
    }
}
