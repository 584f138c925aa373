// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path descriptions and their conversion to Bézier paths.

use kurbo::{BezPath, Point, Rect, SvgArc, Vec2};

/// Tolerance used when approximating arcs with cubic curves.
const ARC_TOLERANCE: f64 = 0.1;

/// One element of a path description.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathPt {
    /// Start a new sub-path.
    MoveTo(Point),
    /// Straight segment.
    LineTo(Point),
    /// Cubic Bézier segment.
    CubicBezier {
        /// First control point.
        c: Point,
        /// Second control point.
        d: Point,
        /// End point.
        to: Point,
    },
    /// Circular arc from the current point to `to`, clockwise in y-down space.
    ArcTo {
        /// End point.
        to: Point,
        /// Take the longer of the two possible arcs.
        large_arc: bool,
    },
    /// Close the current sub-path.
    Close,
}

impl PathPt {
    /// The point this element ends at, if any.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(*p),
            Self::CubicBezier { to, .. } | Self::ArcTo { to, .. } => Some(*to),
            Self::Close => None,
        }
    }
}

/// Build a Bézier path from a path description.
///
/// `ArcTo` becomes cubic segments on the circle whose radius is the chord
/// length, or a straight segment when that arc is degenerate. An `ArcTo`
/// without a current point starts a sub-path at its end point.
pub fn to_bez_path(points: &[PathPt]) -> BezPath {
    let mut path = BezPath::new();
    let mut current: Option<Point> = None;
    let mut start = Point::ZERO;
    for pt in points {
        match *pt {
            PathPt::MoveTo(p) => {
                path.move_to(p);
                start = p;
                current = Some(p);
            }
            PathPt::LineTo(p) => {
                path.line_to(p);
                current = Some(p);
            }
            PathPt::CubicBezier { c, d, to } => {
                path.curve_to(c, d, to);
                current = Some(to);
            }
            PathPt::ArcTo { to, large_arc } => {
                let Some(from) = current else {
                    path.move_to(to);
                    start = to;
                    current = Some(to);
                    continue;
                };
                append_arc(&mut path, from, to, large_arc);
                current = Some(to);
            }
            PathPt::Close => {
                path.close_path();
                current = Some(start);
            }
        }
    }
    path
}

fn append_arc(path: &mut BezPath, from: Point, to: Point, large_arc: bool) {
    let chord = (to - from).hypot();
    let svg = SvgArc {
        from,
        to,
        radii: Vec2::new(chord, chord),
        x_rotation: 0.0,
        large_arc,
        sweep: true,
    };
    match kurbo::Arc::from_svg_arc(&svg) {
        Some(arc) => {
            for el in arc.append_iter(ARC_TOLERANCE) {
                path.push(el);
            }
        }
        None => path.line_to(to),
    }
}

/// Smooth curve through `points` using midpoint cubic segments.
///
/// The curve starts at the first point, runs through the midpoints between
/// consecutive interior points, and ends at the last point. Fewer than three
/// points give an empty path.
pub fn spline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let [first, second, rest @ ..] = points else {
        return path;
    };
    if rest.is_empty() {
        return path;
    }
    let mut control = *second;
    let mut mid = first.midpoint(control);
    path.move_to(*first);
    path.line_to(mid);
    for p in rest {
        let prev_mid = mid;
        let prev_control = control;
        control = *p;
        mid = prev_control.midpoint(control);
        path.curve_to(prev_mid, prev_control, mid);
    }
    path.line_to(control);
    path
}

/// Bounding rectangle of all coordinates in `points`, control points included.
pub fn control_bounds(points: &[PathPt]) -> Option<Rect> {
    let mut iter = points.iter().flat_map(|pt| {
        let extra = match pt {
            PathPt::CubicBezier { c, d, .. } => [Some(*c), Some(*d)],
            _ => [None, None],
        };
        extra.into_iter().flatten().chain(pt.end_point())
    });
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}
