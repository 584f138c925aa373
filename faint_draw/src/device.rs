// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster-mode rendering of user-space shapes.
//!
//! [`DeviceMap`] carries the origin offset and scale of a drawing context and
//! renders shapes with the aliased primitives from [`crate::raster`].

use kurbo::{Affine, BezPath, PathEl, Point, Vec2};

use crate::arrow::{LineSegment, arrowhead};
use crate::bitmap::{Bitmap, IntPoint, IntRect};
use crate::paint::Paint;
use crate::raster::{self, RasterPen, RasterSource};
use crate::settings::{ArrowHead, Settings};
use crate::tri::Tri;

/// Tolerance for flattening curves into raster polygons.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Maps user space to device pixels: `device = user * scale + origin`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct DeviceMap {
    pub(crate) origin: Vec2,
    pub(crate) scale: f64,
}

impl DeviceMap {
    pub(crate) fn device(&self, p: Point) -> Point {
        (p.to_vec2() * self.scale + self.origin).to_point()
    }

    pub(crate) fn pixel(&self, p: Point) -> IntPoint {
        IntPoint::floored(self.device(p))
    }

    pub(crate) fn device_from_user(&self) -> Affine {
        Affine::translate(self.origin) * Affine::scale(self.scale)
    }

    /// The same mapping for a bitmap whose pixel `(0, 0)` is device pixel `offset`.
    pub(crate) fn shifted(&self, offset: IntPoint) -> Self {
        Self {
            origin: self.origin - Vec2::new(f64::from(offset.x), f64::from(offset.y)),
            scale: self.scale,
        }
    }

    pub(crate) fn source<'p>(&self, paint: &'p Paint, tri: &Tri) -> RasterSource<'p> {
        match paint {
            Paint::Color(c) => RasterSource::Solid(c.to_rgba8()),
            _ => RasterSource::Paint {
                paint,
                paint_from_device: paint.paint_transform(tri).inverse()
                    * self.device_from_user().inverse(),
            },
        }
    }

    pub(crate) fn pen(&self, s: &Settings) -> RasterPen {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "line widths are small and saturate"
        )]
        let width = (s.line_width * self.scale).trunc().max(1.0) as u32;
        RasterPen {
            width,
            dashed: s.dashed,
            cap: s.line_cap,
        }
    }

    /// Inclusive device rectangle between the `p0` and `p3` corners of `tri`.
    pub(crate) fn rect_of(&self, tri: &Tri) -> IntRect {
        IntRect::from_corners(self.pixel(tri.p0()), self.pixel(tri.p3()))
    }

    pub(crate) fn line(&self, bmp: &mut Bitmap, p0: Point, p1: Point, s: &Settings) {
        self.polyline(bmp, &[p0, p1], &bounding_tri(&[p0, p1]), s);
    }

    pub(crate) fn polyline(&self, bmp: &mut Bitmap, points: &[Point], tri: &Tri, s: &Settings) {
        let mut device: Vec<Point> = points.iter().map(|p| self.device(*p)).collect();
        let n = device.len();
        if n > 2 && device[n - 1] == device[n - 2] {
            device.pop();
        }
        let src = self.source(&s.fg, tri);
        let pen = self.pen(s);
        let mut pixels: Vec<IntPoint> = device.iter().map(|p| IntPoint::floored(*p)).collect();
        if s.arrowhead == ArrowHead::Front && device.len() >= 2 {
            let n = device.len();
            let head = arrowhead(
                LineSegment::new(device[n - 2], device[n - 1]),
                s.line_width * self.scale,
            );
            if let Some(last) = pixels.last_mut() {
                *last = IntPoint::rounded(head.anchor);
            }
            raster::fill_triangle(bmp, head.tip, head.left, head.right, &src);
        }
        raster::draw_polyline(bmp, &pixels, &src, pen);
    }

    pub(crate) fn polygon(&self, bmp: &mut Bitmap, points: &[Point], tri: &Tri, s: &Settings) {
        let pixels: Vec<IntPoint> = points.iter().map(|p| self.pixel(*p)).collect();
        if s.fill_mode.fills() {
            raster::fill_polygon(bmp, &pixels, &self.source(&s.bg, tri));
        }
        if s.fill_mode.strokes() {
            raster::draw_polygon(bmp, &pixels, &self.source(&s.fg, tri), self.pen(s));
        }
    }

    pub(crate) fn rect(&self, bmp: &mut Bitmap, tri: &Tri, s: &Settings) {
        let r = self.rect_of(tri);
        if s.fill_mode.fills() {
            raster::fill_rect(bmp, r, &self.source(&s.bg, tri));
        }
        if s.fill_mode.strokes() {
            raster::draw_rect(bmp, r, &self.source(&s.fg, tri), self.pen(s));
        }
    }

    pub(crate) fn ellipse(&self, bmp: &mut Bitmap, tri: &Tri, s: &Settings) {
        let r = self.rect_of(tri);
        if s.fill_mode.fills() {
            raster::fill_ellipse(bmp, r, &self.source(&s.bg, tri));
        }
        if s.fill_mode.strokes() {
            raster::draw_ellipse(bmp, r, &self.source(&s.fg, tri), self.pen(s).width);
        }
    }

    /// Render a curved path by flattening it.
    ///
    /// Closed sub-paths are filled and outlined according to the fill mode.
    /// Open sub-paths are only ever outlined.
    pub(crate) fn bez(&self, bmp: &mut Bitmap, path: &BezPath, tri: &Tri, s: &Settings) {
        let fg = self.source(&s.fg, tri);
        let bg = self.source(&s.bg, tri);
        let pen = self.pen(s);
        for (points, closed) in flatten(path) {
            let pixels: Vec<IntPoint> = points.iter().map(|p| self.pixel(*p)).collect();
            if closed {
                if s.fill_mode.fills() {
                    raster::fill_polygon(bmp, &pixels, &bg);
                }
                if s.fill_mode.strokes() {
                    raster::draw_polygon(bmp, &pixels, &fg, pen);
                }
            } else if s.fill_mode.strokes() {
                raster::draw_polyline(bmp, &pixels, &fg, pen);
            }
        }
    }

    /// Outline a flattened path with the foreground regardless of fill mode.
    pub(crate) fn bez_outline(&self, bmp: &mut Bitmap, path: &BezPath, tri: &Tri, s: &Settings) {
        let fg = self.source(&s.fg, tri);
        let pen = self.pen(s);
        for (points, _) in flatten(path) {
            let pixels: Vec<IntPoint> = points.iter().map(|p| self.pixel(*p)).collect();
            raster::draw_polyline(bmp, &pixels, &fg, pen);
        }
    }
}

/// Axis-aligned frame around `points`.
pub(crate) fn bounding_tri(points: &[Point]) -> Tri {
    let Some((first, rest)) = points.split_first() else {
        return Tri::new(Point::ZERO, Point::ZERO, Point::ZERO);
    };
    let rect = rest
        .iter()
        .fold(kurbo::Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
    Tri::from_rect(rect)
}

/// Sub-paths of `path` as polylines, each with whether it was closed.
fn flatten(path: &BezPath) -> Vec<(Vec<Point>, bool)> {
    let mut out: Vec<(Vec<Point>, bool)> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => out.push((vec![p], false)),
        PathEl::LineTo(p) => match out.last_mut() {
            Some((points, false)) => points.push(p),
            _ => out.push((vec![p], false)),
        },
        PathEl::ClosePath => {
            if let Some((points, closed)) = out.last_mut() {
                *closed = true;
                let start = points.first().copied();
                // Following segments start a new sub-path at the same point.
                if let Some(start) = start {
                    out.push((vec![start], false));
                }
            }
        }
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    out.retain(|(points, closed)| *closed || points.len() > 1);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn flatten_splits_sub_paths() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.close_path();
        path.move_to((20.0, 0.0));
        path.curve_to((25.0, 5.0), (30.0, 5.0), (35.0, 0.0));
        let parts = flatten(&path);
        assert_eq!(parts.len(), 2, "{parts:?}");
        assert!(parts[0].1, "first sub-path is closed");
        assert!(!parts[1].1, "second sub-path is open");
        assert!(parts[1].0.len() > 2, "curve flattened into several points");
    }

    #[test]
    fn device_map_scales_then_offsets() {
        let map = DeviceMap {
            origin: Vec2::new(5.0, -2.0),
            scale: 2.0,
        };
        assert_eq!(map.device(Point::new(1.0, 3.0)), Point::new(7.0, 4.0));
        let shifted = map.shifted(IntPoint::new(5, 0));
        assert_eq!(shifted.pixel(Point::new(1.0, 3.0)), IntPoint::new(2, 4));
        assert_eq!(
            map.device_from_user() * Point::new(1.0, 3.0),
            map.device(Point::new(1.0, 3.0))
        );
    }

    #[test]
    fn bounding_tri_is_axis_aligned() {
        let tri = bounding_tri(&[Point::new(4.0, 1.0), Point::new(-2.0, 7.0)]);
        assert_eq!(tri.bounding_rect(), Rect::new(-2.0, 1.0, 4.0, 7.0));
        assert_eq!(tri.angle(), 0.0);
    }
}
