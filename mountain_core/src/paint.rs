// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint output.
//!
//! Each redraw produces one [`PaintFrame`] and hands it to the host's
//! [`Painter`]. Items are listed in paint order: later items draw on top, so
//! [`RenderLoop::pick`](crate::render_loop::RenderLoop::pick) walks them in
//! reverse.

use core::fmt;

use kurbo::BezPath;

use crate::layout::ChartLayout;
use crate::model::{EntityKey, Sample};
use crate::scale::ScaleAdapter;

/// Packed `0xRRGGBBAA` color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub u32);

impl Rgba {
    /// Builds a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Returns the `[r, g, b, a]` channels.
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// Paint instructions for one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintItem {
    /// Entity identity.
    pub key: EntityKey,
    /// `false` for entities without mass; their path is empty.
    pub visible: bool,
    /// Fill color, `None` when hidden.
    pub fill: Option<Rgba>,
    /// Closed area outline in render coordinates.
    pub path: BezPath,
}

/// Everything a painter needs for one redraw.
#[derive(Clone, Copy, Debug)]
pub struct PaintFrame<'a> {
    /// Trigger-handling cycle that produced this frame.
    pub cycle: u64,
    /// Background time label.
    pub time_label: &'a str,
    /// Horizontal axis title.
    pub x_title: &'a str,
    /// Plot geometry.
    pub layout: &'a ChartLayout,
    /// Items in paint order.
    pub items: &'a [PaintItem],
    /// Entities that appeared since the previous frame.
    pub added: &'a [EntityKey],
    /// Entities that disappeared since the previous frame.
    pub removed: &'a [EntityKey],
}

/// Applies paint frames to a host surface (DOM, canvas, scene graph).
pub trait Painter {
    /// Paints `frame`.
    fn apply(&mut self, frame: &PaintFrame<'_>);
}

/// Builds the closed area outline of a stacked curve.
///
/// The upper edge runs left to right along `y0 + y`, the lower edge back
/// along `y0`. Returns an empty path for fewer than two points.
#[must_use]
pub fn area_path(points: &[Sample], x: &dyn ScaleAdapter, y: &dyn ScaleAdapter) -> BezPath {
    let mut path = BezPath::new();
    let [first, .., last] = points else {
        return path;
    };
    path.move_to((x.map(first.x), y.map(first.top())));
    for s in &points[1..] {
        path.line_to((x.map(s.x), y.map(s.top())));
    }
    path.line_to((x.map(last.x), y.map(last.y0)));
    for s in points.iter().rev().skip(1) {
        path.line_to((x.map(s.x), y.map(s.y0)));
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use kurbo::{PathEl, Point, Shape};

    use super::*;
    use crate::scale::ContinuousScale;

    #[test]
    fn area_outline_follows_top_then_baseline() {
        let x = ContinuousScale::linear([0.0, 2.0], [0.0, 200.0]);
        let y = ContinuousScale::linear([0.0, 4.0], [100.0, 0.0]);
        let mut points = [
            Sample::new(0.0, 1.0),
            Sample::new(1.0, 2.0),
            Sample::new(2.0, 1.0),
        ];
        for p in &mut points {
            p.y0 = 1.0;
        }
        let path = area_path(&points, &x, &y);
        let els = path.elements();
        assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 50.0)));
        assert_eq!(els[1], PathEl::LineTo(Point::new(100.0, 25.0)));
        assert_eq!(els[2], PathEl::LineTo(Point::new(200.0, 50.0)));
        assert_eq!(els[3], PathEl::LineTo(Point::new(200.0, 75.0)));
        assert_eq!(els[5], PathEl::LineTo(Point::new(0.0, 75.0)));
        assert_eq!(els.last(), Some(&PathEl::ClosePath));

        assert!(path.contains(Point::new(100.0, 40.0)));
        assert!(!path.contains(Point::new(100.0, 90.0)), "below the baseline");
    }

    #[test]
    fn short_curves_have_empty_paths() {
        let x = ContinuousScale::linear([0.0, 1.0], [0.0, 1.0]);
        let y = ContinuousScale::linear([0.0, 1.0], [1.0, 0.0]);
        assert!(area_path(&[], &x, &y).elements().is_empty());
        assert!(area_path(&[Sample::new(0.5, 1.0)], &x, &y).elements().is_empty());
    }

    #[test]
    fn rgba_channels() {
        let c = Rgba::new(0x12, 0x34, 0x56, 0xff);
        assert_eq!(c, Rgba(0x1234_56ff));
        assert_eq!(c.channels(), [0x12, 0x34, 0x56, 0xff]);
        assert_eq!(alloc::format!("{c:?}"), "#123456ff");
    }
}
