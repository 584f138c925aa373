// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arrowhead geometry for line ends.

use kurbo::{Point, Vec2};

/// A directed line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment {
    /// Start point.
    pub p0: Point,
    /// End point, where the arrowhead goes.
    pub p1: Point,
}

impl LineSegment {
    /// Create a segment from `p0` to `p1`.
    pub const fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (self.p1 - self.p0).hypot()
    }
}

/// A filled triangle at the end of a line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Arrowhead {
    /// The tip, at the end of the line segment.
    pub tip: Point,
    /// Wing on the left of the line direction.
    pub left: Point,
    /// Wing on the right of the line direction.
    pub right: Point,
    /// Where the visible line should stop so that it ends under the head.
    pub anchor: Point,
}

impl Arrowhead {
    /// Triangle corners, tip first.
    pub fn triangle(&self) -> [Point; 3] {
        [self.tip, self.left, self.right]
    }
}

/// Length of the arrowhead for a line of `line_width`.
pub fn head_length(line_width: f64) -> f64 {
    10.0 + 3.0 * line_width
}

/// Arrowhead at `segment.p1`, sized for `line_width`.
///
/// A zero-length segment points along the positive x axis.
pub fn arrowhead(segment: LineSegment, line_width: f64) -> Arrowhead {
    let d = segment.p1 - segment.p0;
    let angle = d.y.atan2(d.x);
    let dir = Vec2::from_angle(angle);
    let normal = Vec2::new(-dir.y, dir.x);

    let length = head_length(line_width);
    let half_width = length * 0.4;
    let tip = segment.p1;
    let base = tip - dir * length;
    Arrowhead {
        tip,
        left: base + normal * half_width,
        right: base - normal * half_width,
        anchor: tip - dir * (length / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_behind_tip() {
        let head = arrowhead(
            LineSegment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
            4.0,
        );
        assert_eq!(head.tip, Point::new(100.0, 0.0));
        assert!((head.anchor.x - 89.0).abs() < 1e-9, "anchor {:?}", head.anchor);
        assert!(head.anchor.x < 100.0);
        let spread = (head.left.y - head.right.y).abs();
        assert!((spread - 2.0 * 0.4 * 22.0).abs() < 1e-9, "spread {spread}");
        assert!((head.left.x - 78.0).abs() < 1e-9);
    }

    #[test]
    fn follows_direction() {
        let head = arrowhead(
            LineSegment::new(Point::new(5.0, 50.0), Point::new(5.0, 10.0)),
            0.0,
        );
        assert!((head.anchor.y - 15.0).abs() < 1e-9, "anchor {:?}", head.anchor);
        assert!((head.anchor.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_segment_is_finite() {
        let p = Point::new(3.0, 4.0);
        let head = arrowhead(LineSegment::new(p, p), 1.0);
        for q in head.triangle() {
            assert!(q.x.is_finite() && q.y.is_finite());
        }
        assert!(head.anchor.x < p.x);
    }
}
