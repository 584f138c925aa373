// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Oriented-rectangle affine frames.
//!
//! A [`Tri`] positions and orients every shape the drawing engine renders.
//! It is defined by three corners: `p0` (the origin corner), `p1` (along the
//! width axis) and `p2` (along the height axis). The fourth corner is derived.
//!
//! Tris are immutable. The free functions [`skewed`], [`rotated`],
//! [`translated`] and [`scaled`] build new frames.

use core::f64::consts::FRAC_PI_2;

use kurbo::{Point, Rect, Vec2};

/// Lengths below this are treated as zero.
const EPSILON: f64 = 1e-9;

/// An oriented, possibly skewed, rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tri {
    p0: Point,
    p1: Point,
    p2: Point,
}

impl Tri {
    /// Create a frame from its origin corner and the corners along its width
    /// and height axes.
    pub const fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Self { p0, p1, p2 }
    }

    /// Create an axis-aligned frame covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x0, rect.y1),
        )
    }

    /// Create a frame from an origin corner, a rotation and a signed size.
    ///
    /// A negative `height` produces a vertically flipped frame.
    pub fn from_origin(p0: Point, angle: f64, width: f64, height: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let (nsin, ncos) = (angle + FRAC_PI_2).sin_cos();
        Self::new(
            p0,
            p0 + Vec2::new(cos, sin) * width,
            p0 + Vec2::new(ncos, nsin) * height,
        )
    }

    /// Origin corner.
    pub fn p0(&self) -> Point {
        self.p0
    }

    /// Corner along the width axis.
    pub fn p1(&self) -> Point {
        self.p1
    }

    /// Corner along the height axis.
    pub fn p2(&self) -> Point {
        self.p2
    }

    /// Corner opposite to `p0`, derived as `p1 + p2 - p0`.
    pub fn p3(&self) -> Point {
        self.p1 + (self.p2 - self.p0)
    }

    /// Length of the `p0 -> p1` edge.
    pub fn width(&self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// Signed length of the `p0 -> p2` edge.
    ///
    /// Negative when `p2` lies on the counter-clockwise side of the width
    /// axis (in y-down coordinates), which expresses a vertical flip.
    pub fn height(&self) -> f64 {
        let len = (self.p2 - self.p0).hypot();
        if self.orientation() < 0.0 { -len } else { len }
    }

    /// Angle of the `p0 -> p1` edge in radians.
    pub fn angle(&self) -> f64 {
        let d = self.p1 - self.p0;
        if d.hypot() < EPSILON {
            return 0.0;
        }
        d.y.atan2(d.x)
    }

    /// Offset of `p0` from `p2` along the width axis.
    ///
    /// Zero for an unskewed frame.
    pub fn skew(&self) -> f64 {
        let axis = self.width_axis();
        (self.p0 - self.p2).dot(axis)
    }

    /// Area of the parallelogram spanned by the frame.
    pub fn area(&self) -> f64 {
        self.orientation().abs()
    }

    /// Whether the frame has no width or no height.
    pub fn is_degenerate(&self) -> bool {
        self.width() < EPSILON || self.height().abs() < EPSILON
    }

    /// Smallest axis-aligned rectangle containing all four corners.
    pub fn bounding_rect(&self) -> Rect {
        let p3 = self.p3();
        let xs = [self.p0.x, self.p1.x, self.p2.x, p3.x];
        let ys = [self.p0.y, self.p1.y, self.p2.y, p3.y];
        let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Center of the parallelogram.
    pub fn center_point(&self) -> Point {
        self.p1.midpoint(self.p2)
    }

    /// Translate along the frame's own axes.
    ///
    /// `dx` moves along the width axis and `dy` along the height axis.
    pub fn offset_aligned(&self, dx: f64, dy: f64) -> Self {
        let angle = self.angle();
        let (sin, cos) = angle.sin_cos();
        let (nsin, ncos) = (angle + FRAC_PI_2).sin_cos();
        let d = Vec2::new(cos, sin) * dx + Vec2::new(ncos, nsin) * dy;
        translated(*self, d.x, d.y)
    }

    fn width_axis(&self) -> Vec2 {
        let (sin, cos) = self.angle().sin_cos();
        Vec2::new(cos, sin)
    }

    fn orientation(&self) -> f64 {
        (self.p1 - self.p0).cross(self.p2 - self.p0)
    }
}

/// Area of the parallelogram spanned by `tri`.
pub fn area(tri: Tri) -> f64 {
    tri.area()
}

/// Shift the `p0`/`p1` edge of `tri` by `skew` along its width axis.
///
/// `p2` and the derived `p3` stay put, so the area is unchanged.
pub fn skewed(tri: Tri, skew: f64) -> Tri {
    let d = tri.width_axis() * skew;
    Tri::new(tri.p0 + d, tri.p1 + d, tri.p2)
}

/// Rotate every corner of `tri` by `angle` radians about `pivot`.
pub fn rotated(tri: Tri, angle: f64, pivot: Point) -> Tri {
    let rotate = |p: Point| {
        let (sin, cos) = angle.sin_cos();
        let v = p - pivot;
        pivot + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    };
    Tri::new(rotate(tri.p0), rotate(tri.p1), rotate(tri.p2))
}

/// Translate every corner of `tri`.
pub fn translated(tri: Tri, dx: f64, dy: f64) -> Tri {
    let d = Vec2::new(dx, dy);
    Tri::new(tri.p0 + d, tri.p1 + d, tri.p2 + d)
}

/// Scale every corner of `tri` relative to `origin`.
pub fn scaled(tri: Tri, sx: f64, sy: f64, origin: Point) -> Tri {
    let scale = |p: Point| {
        let v = p - origin;
        origin + Vec2::new(v.x * sx, v.y * sy)
    };
    Tri::new(scale(tri.p0), scale(tri.p1), scale(tri.p2))
}
