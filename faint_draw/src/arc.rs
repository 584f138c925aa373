// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elliptical arcs approximated by cubic Béziers.
//!
//! The ellipse of a [`Tri`] has radii `width / 2` and `height / 2`, is rotated
//! by the frame angle, and is centered at the frame center. Arcs are split into
//! a fixed number of equal sub-spans and each sub-span is approximated by one
//! cubic curve (L. Maisonobe, "Drawing an elliptical arc using polylines,
//! quadratic or cubic Bézier curves").

use core::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{Point, Vec2};

use crate::tri::Tri;

/// A start/stop angle range, in radians, on the ellipse inscribed in a [`Tri`].
///
/// `start == stop` denotes the full ellipse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleSpan {
    /// Start angle in radians.
    pub start: f64,
    /// Stop angle in radians.
    pub stop: f64,
}

impl AngleSpan {
    /// Create a span from `start` to `stop`.
    pub const fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    /// The span covering the whole ellipse.
    pub const fn full() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Whether this span denotes the full ellipse.
    pub fn is_full(&self) -> bool {
        self.start == self.stop
    }

    /// Signed angular extent, `stop - start`.
    pub fn extent(&self) -> f64 {
        self.stop - self.start
    }
}

/// Number of cubic curves used for an arc spanning `span` radians.
///
/// This is a fixed lookup rather than an error-driven subdivision.
pub fn required_curve_count(span: f64) -> usize {
    let span = span.abs();
    if span <= FRAC_PI_2 {
        2
    } else if span <= PI {
        4
    } else if span <= 3.0 * FRAC_PI_2 {
        6
    } else {
        8
    }
}

struct Ellipse {
    center: Point,
    rx: f64,
    ry: f64,
    cos_m: f64,
    sin_m: f64,
}

impl Ellipse {
    fn of(tri: &Tri) -> Self {
        let (sin_m, cos_m) = tri.angle().sin_cos();
        Self {
            center: tri.center_point(),
            rx: tri.width() / 2.0,
            ry: tri.height() / 2.0,
            cos_m,
            sin_m,
        }
    }

    fn point(&self, theta: f64) -> Point {
        let (sin_t, cos_t) = theta.sin_cos();
        self.center
            + Vec2::new(
                self.rx * cos_t * self.cos_m - self.ry * sin_t * self.sin_m,
                self.rx * cos_t * self.sin_m + self.ry * sin_t * self.cos_m,
            )
    }

    fn derivative(&self, theta: f64) -> Vec2 {
        let (sin_t, cos_t) = theta.sin_cos();
        Vec2::new(
            -self.rx * sin_t * self.cos_m - self.ry * cos_t * self.sin_m,
            -self.rx * sin_t * self.sin_m + self.ry * cos_t * self.cos_m,
        )
    }
}

/// Control points approximating the arc `span` of the ellipse inscribed in `tri`.
///
/// Returns `1 + 3 * N` points where `N` is [`required_curve_count`]: the start
/// point followed by `(control1, control2, end)` for every curve. A zero span
/// or a zero-area frame yields coincident points.
pub fn arc_as_path(tri: &Tri, span: AngleSpan) -> Vec<Point> {
    let extent = span.extent();
    let count = required_curve_count(extent);
    let ellipse = Ellipse::of(tri);

    let delta = extent / count as f64;
    let t = (delta / 2.0).tan();
    let alpha = delta.sin() * ((4.0 + 3.0 * t * t).sqrt() - 1.0) / 3.0;

    let mut points = Vec::with_capacity(1 + 3 * count);
    let mut theta = span.start;
    let mut prev = ellipse.point(theta);
    let mut prev_dot = ellipse.derivative(theta);
    points.push(prev);
    for _ in 0..count {
        theta += delta;
        let cur = ellipse.point(theta);
        let cur_dot = ellipse.derivative(theta);
        points.push(prev + prev_dot * alpha);
        points.push(cur - cur_dot * alpha);
        points.push(cur);
        prev = cur;
        prev_dot = cur_dot;
    }
    points
}

/// Control points for the full ellipse inscribed in `tri`.
pub fn ellipse_as_path(tri: &Tri) -> Vec<Point> {
    arc_as_path(tri, AngleSpan::new(0.0, TAU))
}

/// First and last point of the arc `span` on the ellipse inscribed in `tri`.
pub fn arc_end_points(tri: &Tri, span: AngleSpan) -> (Point, Point) {
    let ellipse = Ellipse::of(tri);
    (ellipse.point(span.start), ellipse.point(span.stop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn curve_count_breakpoints() {
        assert_eq!(required_curve_count(0.0), 2);
        assert_eq!(required_curve_count(FRAC_PI_2), 2);
        assert_eq!(required_curve_count(FRAC_PI_2 + 1e-9), 4);
        assert_eq!(required_curve_count(PI), 4);
        assert_eq!(required_curve_count(PI + 1e-9), 6);
        assert_eq!(required_curve_count(3.0 * FRAC_PI_2), 6);
        assert_eq!(required_curve_count(3.0 * FRAC_PI_2 + 1e-9), 8);
        assert_eq!(required_curve_count(-PI), 4, "sign must not matter");
    }

    #[test]
    fn curve_count_is_monotonic() {
        let mut last = 0;
        for i in 0..=700 {
            let span = f64::from(i) * 0.01;
            let n = required_curve_count(span);
            assert!(n >= last, "count dropped at span {span}");
            last = n;
        }
    }

    #[test]
    fn point_count_matches_curve_count() {
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 40.0, 20.0));
        for (span, n) in [(1.0, 2), (3.0, 4), (4.0, 6), (TAU, 8)] {
            let pts = arc_as_path(&tri, AngleSpan::new(0.0, span));
            assert_eq!(pts.len(), 1 + 3 * n, "span {span}");
        }
    }

    #[test]
    fn zero_span_is_degenerate() {
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 40.0, 20.0));
        let pts = arc_as_path(&tri, AngleSpan::new(0.8, 0.8));
        let first = pts[0];
        assert!(
            pts.iter().all(|p| p.distance(first) < 1e-9),
            "zero span should collapse to one point"
        );
    }

    #[test]
    fn zero_area_frame_is_degenerate() {
        let tri = Tri::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        let pts = ellipse_as_path(&tri);
        assert!(pts.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(pts.iter().all(|p| p.distance(Point::new(5.0, 5.0)) < 1e-9));
    }

    #[test]
    fn full_ellipse_closes_and_stays_on_ellipse() {
        let tri = Tri::from_rect(Rect::new(10.0, 10.0, 50.0, 30.0));
        let pts = ellipse_as_path(&tri);
        let first = pts[0];
        let last = *pts.last().expect("non-empty");
        assert!(first.distance(last) < 1e-9, "full ellipse should close");
        assert!(first.distance(Point::new(50.0, 20.0)) < 1e-9, "starts at angle 0");
        for end in pts.iter().skip(3).step_by(3) {
            let dx = (end.x - 30.0) / 20.0;
            let dy = (end.y - 20.0) / 10.0;
            assert!((dx * dx + dy * dy - 1.0).abs() < 1e-9, "end point off the ellipse");
        }
    }

    #[test]
    fn end_points_follow_rotation() {
        let tri = crate::tri::rotated(
            Tri::from_rect(Rect::new(0.0, 0.0, 20.0, 20.0)),
            FRAC_PI_2,
            Point::new(10.0, 10.0),
        );
        let (start, _) = arc_end_points(&tri, AngleSpan::new(0.0, PI));
        assert!(start.distance(Point::new(10.0, 20.0)) < 1e-9, "got {start:?}");
    }
}
