// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing context.
//!
//! A [`DrawingContext`] renders shapes onto a borrowed target [`Bitmap`].
//! Every draw call takes its style from a [`Settings`] value:
//!
//! - with `antialias` on, the shape is built as a path on the context's
//!   [`PathSink`], filled and/or stroked, and the sink's pixels are then
//!   composited onto the target;
//! - with `antialias` off, the shape is drawn with the aliased primitives in
//!   [`crate::raster`], directly in device pixels.
//!
//! User coordinates map to device pixels by `device = user * scale + origin`.
//! In vector mode, coordinates are snapped to the pixel grid before they
//! reach the sink (see [`align_to_pixels`]) so that thin horizontal and
//! vertical lines stay crisp.

use kurbo::{BezPath, PathEl, Point, Size, Vec2};
use peniko::color::Rgba8;

use crate::arc::{AngleSpan, arc_as_path, ellipse_as_path};
use crate::arrow::{LineSegment, arrowhead};
use crate::bitmap::{self, Bitmap, IntPoint, IntRect, scale_bilinear, scale_nearest};
use crate::brush::{self, Brush};
use crate::device::{DeviceMap, bounding_tri};
use crate::error::DrawError;
use crate::filter::Filter;
use crate::paint::Paint;
use crate::path::{PathPt, control_bounds, spline, to_bez_path};
use crate::raster::{self, RasterPen};
use crate::settings::{ArrowHead, BitmapComposite, FillMode, Settings};
use crate::sink::{PathSink, PathSinkExt};
use crate::text::TextShape;
use crate::tri::Tri;

/// Extra pixels around the shape in the scratch bitmap of filtered draws.
const FILTER_MARGIN: i32 = 20;

/// Snap a user-space point to the device pixel grid.
///
/// Strokes with an odd device line width are centered on pixel centers
/// (`floor + 0.5`); strokes with an even width and fill-only shapes are
/// placed on pixel edges (nearest integer).
pub fn align_to_pixels(p: Point, s: &Settings, scale: f64) -> Point {
    PixelAlign::new(s, scale).apply(p)
}

#[derive(Copy, Clone, Debug)]
struct PixelAlign {
    scale: f64,
    half: bool,
}

impl PixelAlign {
    fn new(s: &Settings, scale: f64) -> Self {
        let fill_only = s.fill_mode == FillMode::Fill;
        let even = (s.line_width * scale).round().rem_euclid(2.0) == 0.0;
        Self {
            scale,
            half: !(even || fill_only),
        }
    }

    fn apply(&self, p: Point) -> Point {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return p;
        }
        let snap = |v: f64| {
            let d = v * self.scale;
            let d = if self.half { d.floor() + 0.5 } else { d.round() };
            d / self.scale
        };
        Point::new(snap(p.x), snap(p.y))
    }
}

/// Renders shapes onto a target bitmap.
pub struct DrawingContext<'b, S: PathSink> {
    target: &'b mut Bitmap,
    sink: S,
    map: DeviceMap,
}

impl<S: PathSink> core::fmt::Debug for DrawingContext<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawingContext")
            .field("target", &self.target)
            .field("origin", &self.map.origin)
            .field("scale", &self.map.scale)
            .finish_non_exhaustive()
    }
}

impl<'b, S: PathSink> DrawingContext<'b, S> {
    /// Draw onto `target` through `sink`, with no offset and unit scale.
    pub fn new(target: &'b mut Bitmap, sink: S) -> Self {
        Self::with_origin_and_scale(target, sink, Vec2::ZERO, 1.0)
    }

    /// Draw onto `target` through `sink` with the given device mapping.
    pub fn with_origin_and_scale(target: &'b mut Bitmap, sink: S, origin: Vec2, scale: f64) -> Self {
        tracing::debug!(
            width = target.width(),
            height = target.height(),
            ?origin,
            scale,
            "drawing context created"
        );
        if !sink.is_ok() {
            tracing::warn!(error = ?sink.error_string(), "path sink is not usable");
        }
        Self {
            target,
            sink,
            map: DeviceMap { origin, scale },
        }
    }

    /// Set the device position of the user-space origin.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.map.origin = origin;
    }

    /// Set the user-to-device scale factor.
    pub fn set_scale(&mut self, scale: f64) {
        self.map.scale = scale;
    }

    /// Device position of the user-space origin.
    pub fn origin(&self) -> Vec2 {
        self.map.origin
    }

    /// User-to-device scale factor.
    pub fn scale(&self) -> f64 {
        self.map.scale
    }

    /// Target color under the user-space point `p`, or `None` outside the target.
    pub fn get_pixel(&self, p: Point) -> Option<Rgba8> {
        let px = self.map.pixel(p);
        self.target.get(px.x, px.y)
    }

    /// Whether the path sink is usable.
    pub fn is_ok(&self) -> bool {
        self.sink.is_ok()
    }

    /// Description of the sink failure, if any.
    pub fn error_string(&self) -> Option<String> {
        self.sink.error_string()
    }

    /// The target bitmap.
    pub fn target(&self) -> &Bitmap {
        self.target
    }

    /// The path sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Release the target and return the path sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Overwrite the whole target with `paint`.
    ///
    /// Non-solid paints are placed on the target's full rectangle.
    pub fn clear(&mut self, paint: &Paint) {
        if let Some(color) = paint.as_color() {
            self.target.fill(color.to_rgba8());
            return;
        }
        let size = kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.target.width()),
            f64::from(self.target.height()),
        );
        let paint_from_device = paint.paint_transform(&Tri::from_rect(size)).inverse();
        let (w, h) = (self.target.width() as i32, self.target.height() as i32);
        for y in 0..h {
            for x in 0..w {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let color = paint.sample_in_paint_space(paint_from_device * center);
                self.target.put(x, y, color);
            }
        }
    }

    /// Use `paint` as the sink source, placed for `tri`.
    ///
    /// The paint transform is derived from `tri` on every call.
    pub fn set_source_for_tri(&mut self, paint: &Paint, tri: &Tri) {
        match paint {
            Paint::Color(c) => self.sink.set_source_rgba(*c),
            Paint::Gradient(g) => self
                .sink
                .set_source_gradient(g, paint.paint_transform(tri)),
            Paint::Pattern(p) => self
                .sink
                .set_source_surface(&p.bitmap, paint.paint_transform(tri)),
        }
    }

    /// Draw a straight line from `p0` to `p1` with the foreground paint.
    pub fn line(&mut self, p0: Point, p1: Point, s: &Settings) {
        tracing::trace!(?p0, ?p1, antialias = s.antialias, "line");
        if !s.antialias {
            self.map.line(self.target, p0, p1, s);
            return;
        }
        self.vector_polyline(&bounding_tri(&[p0, p1]), &[p0, p1], s);
    }

    /// Draw connected line segments with the foreground paint.
    ///
    /// With a front arrowhead the last segment ends at the arrowhead anchor
    /// and the head is filled separately. When the last two points coincide
    /// the head points along the segment before them.
    pub fn polyline(&mut self, tri: &Tri, points: &[Point], s: &Settings) {
        tracing::trace!(points = points.len(), antialias = s.antialias, "polyline");
        if points.len() < 2 {
            return;
        }
        if !s.antialias {
            self.map.polyline(self.target, points, tri, s);
            return;
        }
        self.vector_polyline(tri, points, s);
    }

    /// Draw a closed polygon.
    pub fn polygon(&mut self, tri: &Tri, points: &[Point], s: &Settings) {
        tracing::trace!(points = points.len(), antialias = s.antialias, "polygon");
        if points.len() < 2 {
            return;
        }
        if !s.antialias {
            self.map.polygon(self.target, points, tri, s);
            return;
        }
        self.vector_shape(tri, &polygon_path(points), s);
    }

    /// Draw the parallelogram of `tri`.
    ///
    /// In raster mode the axis-aligned rectangle between `p0` and `p3` is drawn.
    pub fn rectangle(&mut self, tri: &Tri, s: &Settings) {
        tracing::trace!(?tri, antialias = s.antialias, "rectangle");
        if !s.antialias {
            self.map.rect(self.target, tri, s);
            return;
        }
        let corners = [tri.p0(), tri.p1(), tri.p3(), tri.p2()];
        self.vector_shape(tri, &polygon_path(&corners), s);
    }

    /// Draw the ellipse inscribed in `tri`.
    pub fn ellipse(&mut self, tri: &Tri, s: &Settings) {
        tracing::trace!(?tri, antialias = s.antialias, "ellipse");
        if !s.antialias {
            self.map.ellipse(self.target, tri, s);
            return;
        }
        let mut path = curve_path(&ellipse_as_path(tri));
        path.close_path();
        self.vector_shape(tri, &path, s);
    }

    /// Draw a pie slice of the ellipse inscribed in `tri`.
    ///
    /// A full span draws the whole ellipse.
    pub fn arc(&mut self, tri: &Tri, span: AngleSpan, s: &Settings) {
        tracing::trace!(?tri, ?span, antialias = s.antialias, "arc");
        if span.is_full() {
            self.ellipse(tri, s);
            return;
        }
        let points = arc_as_path(tri, span);
        let mut path = BezPath::new();
        path.move_to(tri.center_point());
        path.extend(curve_path(&points).elements().iter().map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::LineTo(p),
            other => other,
        }));
        path.close_path();
        if !s.antialias {
            self.map.bez(self.target, &path, tri, s);
            return;
        }
        self.vector_shape(tri, &path, s);
    }

    /// Draw a path description.
    ///
    /// Paints are placed on the bounding rectangle of all path coordinates.
    pub fn path(&mut self, points: &[PathPt], s: &Settings) {
        tracing::trace!(points = points.len(), antialias = s.antialias, "path");
        let Some(bounds) = control_bounds(points) else {
            return;
        };
        let tri = Tri::from_rect(bounds);
        let path = to_bez_path(points);
        if !s.antialias {
            self.map.bez(self.target, &path, &tri, s);
            return;
        }
        self.vector_shape(&tri, &path, s);
    }

    /// Draw a smooth curve through `points` with the foreground paint.
    ///
    /// Fewer than three points draw nothing.
    pub fn spline(&mut self, points: &[Point], s: &Settings) {
        tracing::trace!(points = points.len(), antialias = s.antialias, "spline");
        let path = spline(points);
        if path.is_empty() {
            return;
        }
        let tri = bounding_tri(points);
        if !s.antialias {
            self.map.bez_outline(self.target, &path, &tri, s);
            return;
        }
        let align = PixelAlign::new(s, self.map.scale);
        self.vector(s, |cx| {
            cx.emit(&path, align);
            cx.set_source_for_tri(&s.fg, &tri);
            cx.sink.stroke();
        });
    }

    /// Draw `text` with the foreground paint.
    ///
    /// The text starts at `tri.p0()`, runs along the frame's width axis and
    /// is flipped when the frame's height is negative. The top of a capital
    /// `M` touches `p0`. Each line starts below the previous one by that
    /// line's height, and never by less than the height of `M`. Text is
    /// always rendered through the path sink.
    pub fn text(&mut self, tri: &Tri, text: &str, s: &Settings) {
        tracing::trace!(?tri, len = text.len(), "text");
        self.saved(|cx| {
            cx.sink.translate(cx.map.origin);
            cx.sink.scale(cx.map.scale, cx.map.scale);
            cx.set_source_for_tri(&s.fg, tri);
            cx.sink.translate(tri.p0().to_vec2());
            cx.sink.rotate(tri.angle());
            if tri.height() < 0.0 {
                cx.sink.scale(1.0, -1.0);
            }
            let reference = cx.sink.shape_text("M", &s.font);
            cx.sink.translate(Vec2::new(0.0, reference.ink.height()));
            let mut dy = 0.0;
            for line in text.lines() {
                let shape = cx.sink.shape_text(line, &s.font);
                cx.sink.with_saved(|sink| {
                    sink.translate(Vec2::new(0.0, dy));
                    sink.text_path(line, &s.font);
                });
                dy += shape.height.max(reference.height);
            }
            cx.sink.fill();
        });
        self.composite();
    }

    /// Layout size of `text` in the settings' font.
    pub fn text_size(&mut self, text: &str, s: &Settings) -> Size {
        self.sink.shape_text(text, &s.font).size()
    }

    /// Full measurements of `text` in the settings' font.
    pub fn text_extents(&mut self, text: &str, s: &Settings) -> TextShape {
        self.sink.shape_text(text, &s.font)
    }

    /// Advance width after each character of `text`.
    pub fn cumulative_text_width(&mut self, text: &str, s: &Settings) -> Vec<f64> {
        self.sink.shape_text(text, &s.font).prefix_widths
    }

    /// Draw `bmp` with its top-left corner at the user-space point `top_left`.
    ///
    /// The bitmap is resampled for the context scale: bilinear below one and
    /// nearest-neighbour by the integer part above one. Pixels equal to the
    /// background color are skipped when the settings ask for masking and
    /// the background is a solid color.
    pub fn bitmap(&mut self, bmp: &Bitmap, top_left: Point, s: &Settings) -> Result<(), DrawError> {
        let device = self.map.device(top_left);
        if device.x >= f64::from(self.target.width()) || device.y >= f64::from(self.target.height()) {
            return Ok(());
        }
        tracing::trace!(width = bmp.width(), height = bmp.height(), ?top_left, "bitmap");
        let at = IntPoint::floored(device);
        let scale = self.map.scale;
        let scaled;
        let src = if scale < 1.0 {
            scaled = scale_bilinear(bmp, scale)?;
            &scaled
        } else if scale > 1.0 {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "zoom factors are small"
            )]
            let factor = scale.trunc() as u32;
            scaled = scale_nearest(bmp, factor)?;
            &scaled
        } else {
            bmp
        };
        let mask = s.mask_color().map(|c| c.to_rgba8());
        match (s.bitmap_composite, mask) {
            (BitmapComposite::BlendAlpha, None) => bitmap::blend(src, self.target, at),
            (BitmapComposite::BlendAlpha, Some(m)) => bitmap::blend_masked(src, self.target, m, at),
            (BitmapComposite::SetAlpha, None) => bitmap::blit(src, self.target, at),
            (BitmapComposite::SetAlpha, Some(m)) => bitmap::blit_masked(src, self.target, m, at),
        }
        Ok(())
    }

    /// Freehand stroke through user-space pixel positions.
    ///
    /// Uses a brush stamp when the settings have a brush size, and
    /// [`DrawingContext::pen_stroke`] otherwise.
    pub fn stroke(&mut self, points: &[IntPoint], s: &Settings) {
        if points.is_empty() {
            return;
        }
        if s.brush_size == 0 {
            self.pen_stroke(points, s);
            return;
        }
        tracing::trace!(points = points.len(), size = s.brush_size, "brush stroke");
        let user = user_points(points);
        let tri = bounding_tri(&user);
        let src = self.map.source(&s.fg, &tri);
        let brush = Brush::from_settings(s.brush_size, s.brush_shape);
        let device: Vec<IntPoint> = user.iter().map(|p| self.map.pixel(*p)).collect();
        brush::stroke(self.target, &device, &brush, &src);
    }

    /// One pixel wide freehand stroke through user-space pixel positions.
    ///
    /// A single point colors one pixel.
    pub fn pen_stroke(&mut self, points: &[IntPoint], s: &Settings) {
        tracing::trace!(points = points.len(), "pen stroke");
        let user = user_points(points);
        let tri = bounding_tri(&user);
        let src = self.map.source(&s.fg, &tri);
        let device: Vec<IntPoint> = user.iter().map(|p| self.map.pixel(*p)).collect();
        match device.as_slice() {
            [] => {}
            [p] => raster::draw_line(self.target, *p, *p, &src, RasterPen::THIN),
            _ => {
                for seg in device.windows(2) {
                    raster::draw_line(self.target, seg[0], seg[1], &src, RasterPen::THIN);
                }
            }
        }
    }

    /// Draw an aliased line into a scratch bitmap, filter it, and blend the
    /// result onto the target.
    pub fn line_filtered(
        &mut self,
        p0: Point,
        p1: Point,
        filter: &dyn Filter,
        s: &Settings,
    ) -> Result<(), DrawError> {
        let pen = self.map.pen(s);
        let margin = FILTER_MARGIN + i32::try_from(pen.width).unwrap_or(0);
        let area = IntRect::from_corners(self.map.pixel(p0), self.map.pixel(p1));
        self.filtered(area, margin, filter, |map, bmp| map.line(bmp, p0, p1, s))
    }

    /// Draw an aliased rectangle into a scratch bitmap, filter it, and blend
    /// the result onto the target.
    pub fn rectangle_filtered(
        &mut self,
        tri: &Tri,
        filter: &dyn Filter,
        s: &Settings,
    ) -> Result<(), DrawError> {
        let area = self.map.rect_of(tri);
        self.filtered(area, FILTER_MARGIN, filter, |map, bmp| map.rect(bmp, tri, s))
    }

    /// Draw an aliased ellipse into a scratch bitmap, filter it, and blend
    /// the result onto the target.
    pub fn ellipse_filtered(
        &mut self,
        tri: &Tri,
        filter: &dyn Filter,
        s: &Settings,
    ) -> Result<(), DrawError> {
        let area = self.map.rect_of(tri);
        self.filtered(area, FILTER_MARGIN, filter, |map, bmp| map.ellipse(bmp, tri, s))
    }

    fn filtered(
        &mut self,
        area: IntRect,
        margin: i32,
        filter: &dyn Filter,
        draw: impl FnOnce(&DeviceMap, &mut Bitmap),
    ) -> Result<(), DrawError> {
        let width = area.w.saturating_add(2 * margin);
        let height = area.h.saturating_add(2 * margin);
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(DrawError::InvalidDimensions {
                width: width.unsigned_abs(),
                height: height.unsigned_abs(),
            });
        };
        tracing::trace!(w, h, "filtered scratch");
        let mut scratch = Bitmap::new(w, h)?;
        let offset = IntPoint::new(area.x - margin, area.y - margin);
        draw(&self.map.shifted(offset), &mut scratch);
        filter.apply(&mut scratch)?;
        bitmap::blend(&scratch, self.target, offset);
        Ok(())
    }

    fn vector_polyline(&mut self, tri: &Tri, points: &[Point], s: &Settings) {
        let n = points.len();
        let skip_two = n > 2 && points[n - 1] == points[n - 2];
        let first_end = if skip_two { n - 2 } else { n - 1 };
        let from = if skip_two { points[n - 3] } else { points[n - 2] };
        let to = points[n - 1];

        let align = PixelAlign::new(s, self.map.scale);
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..first_end] {
            path.line_to(*p);
        }
        let head = (s.arrowhead == ArrowHead::Front)
            .then(|| arrowhead(LineSegment::new(from, to), s.line_width));
        path.line_to(head.map_or(to, |h| h.anchor));

        let head_align = PixelAlign::new(
            &Settings {
                fill_mode: FillMode::Border,
                line_width: s.line_width,
                ..Settings::default()
            },
            self.map.scale,
        );
        self.vector(s, |cx| {
            cx.emit(&path, align);
            cx.set_source_for_tri(&s.fg, tri);
            cx.sink.stroke();
            if let Some(head) = head {
                cx.emit(&polygon_path(&head.triangle()), head_align);
                cx.sink.fill();
            }
        });
    }

    fn vector_shape(&mut self, tri: &Tri, path: &BezPath, s: &Settings) {
        let align = PixelAlign::new(s, self.map.scale);
        self.vector(s, |cx| {
            cx.emit(path, align);
            cx.fill_and_or_stroke(tri, s);
        });
    }

    /// Run `f` with the sink state saved, restoring it afterwards.
    fn saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.sink.save();
        let out = f(self);
        self.sink.restore();
        out
    }

    /// Run `f` in device space with the line style of `s`, then composite.
    fn vector(&mut self, s: &Settings, f: impl FnOnce(&mut Self)) {
        self.saved(|cx| {
            cx.sink.translate(cx.map.origin);
            cx.sink.scale(cx.map.scale, cx.map.scale);
            cx.sink.new_path();
            cx.sink.set_line_width(s.line_width);
            cx.sink.set_line_cap(s.line_cap);
            cx.sink.set_line_join(s.line_join);
            if s.dashed {
                let dash = 2.0 * s.line_width;
                cx.sink.set_dash(&[dash, dash], 0.0);
            } else {
                cx.sink.set_dash(&[], 0.0);
            }
            f(cx);
        });
        self.composite();
    }

    fn composite(&mut self) {
        self.sink.composite_into(self.target);
        if !self.sink.is_ok() {
            tracing::warn!(error = ?self.sink.error_string(), "path sink failed");
        }
    }

    fn fill_and_or_stroke(&mut self, tri: &Tri, s: &Settings) {
        match s.fill_mode {
            FillMode::Fill => {
                self.set_source_for_tri(&s.bg, tri);
                self.sink.fill();
            }
            FillMode::BorderAndFill => {
                self.set_source_for_tri(&s.bg, tri);
                self.sink.fill_preserve();
                self.set_source_for_tri(&s.fg, tri);
                self.sink.stroke();
            }
            FillMode::Border => {
                self.set_source_for_tri(&s.fg, tri);
                self.sink.stroke();
            }
            FillMode::None => self.sink.new_path(),
        }
    }

    fn emit(&mut self, path: &BezPath, align: PixelAlign) {
        let mut last = Point::ZERO;
        let mut start = Point::ZERO;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.sink.move_to(align.apply(p));
                    last = p;
                    start = p;
                }
                PathEl::LineTo(p) => {
                    self.sink.line_to(align.apply(p));
                    last = p;
                }
                PathEl::QuadTo(q, p) => {
                    let c = kurbo::QuadBez::new(last, q, p).raise();
                    self.sink
                        .curve_to(align.apply(c.p1), align.apply(c.p2), align.apply(p));
                    last = p;
                }
                PathEl::CurveTo(a, b, p) => {
                    self.sink
                        .curve_to(align.apply(a), align.apply(b), align.apply(p));
                    last = p;
                }
                PathEl::ClosePath => {
                    self.sink.close_path();
                    last = start;
                }
            }
        }
    }
}

fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Path from `1 + 3 * N` arc control points.
fn curve_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for c in rest.chunks_exact(3) {
        path.curve_to(c[0], c[1], c[2]);
    }
    path
}

fn user_points(points: &[IntPoint]) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
        .collect()
}
