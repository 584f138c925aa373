// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aliased pixel primitives.
//!
//! Everything here works in device pixels on a [`Bitmap`]. Positions are
//! pixel indices and rectangles include both corners. Nothing is ever
//! anti-aliased; these are the primitives used when a draw call has
//! anti-aliasing turned off, and for filtered scratch drawing.

use kurbo::{Affine, Point, Vec2};
use peniko::color::Rgba8;
use smallvec::SmallVec;

use crate::bitmap::{Bitmap, IntPoint, IntRect};
use crate::paint::Paint;
use crate::settings::LineCap;

/// Where raster pixels get their color from.
#[derive(Clone, Debug)]
pub enum RasterSource<'a> {
    /// A single color, written over the target pixels.
    Solid(Rgba8),
    /// A paint sampled at each pixel center and blended onto the target.
    Paint {
        /// The paint.
        paint: &'a Paint,
        /// Map from device pixels into the paint's own space.
        paint_from_device: Affine,
    },
}

impl RasterSource<'_> {
    /// Color the pixel at `(x, y)`.
    pub fn plot(&self, bmp: &mut Bitmap, x: i32, y: i32) {
        match self {
            Self::Solid(color) => bmp.put(x, y, *color),
            Self::Paint {
                paint,
                paint_from_device,
            } => {
                if !bmp.contains(x, y) {
                    return;
                }
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let color = paint.sample_in_paint_space(*paint_from_device * center);
                bmp.blend_pixel(x, y, color);
            }
        }
    }

    fn span(&self, bmp: &mut Bitmap, x0: i32, x1: i32, y: i32) {
        if y < 0 || y >= bmp.height() as i32 {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(bmp.width() as i32 - 1);
        for x in x0..=x1 {
            self.plot(bmp, x, y);
        }
    }
}

/// Line style for raster outlines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RasterPen {
    /// Width in pixels. Zero behaves like one.
    pub width: u32,
    /// Dashes of `2 * width` pixels on and off.
    pub dashed: bool,
    /// End cap for wide lines.
    pub cap: LineCap,
}

impl RasterPen {
    /// A solid one pixel pen.
    pub const THIN: Self = Self {
        width: 1,
        dashed: false,
        cap: LineCap::Butt,
    };

    fn effective_width(&self) -> u32 {
        self.width.max(1)
    }

    fn dash_len(&self) -> u32 {
        2 * self.effective_width()
    }
}

/// Bitmap bounds grown by `margin` pixels on every side.
pub(crate) fn reach(bmp: &Bitmap, margin: i32) -> IntRect {
    let margin = margin.max(0);
    IntRect::new(
        -margin,
        -margin,
        (bmp.width() as i32).saturating_add(margin.saturating_mul(2)),
        (bmp.height() as i32).saturating_add(margin.saturating_mul(2)),
    )
}

/// Parameter range of the segment `a + t * (b - a)` inside `[min, max]`,
/// by Liang-Barsky.
fn clip_params(a: Point, b: Point, min: Point, max: Point) -> Option<(f64, f64)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

/// Cut the integer segment `a`..`b` down to the part inside `clip`.
///
/// Segments entirely inside come back unchanged.
fn clip_segment(a: IntPoint, b: IntPoint, clip: IntRect) -> Option<(IntPoint, IntPoint)> {
    if clip.is_empty() {
        return None;
    }
    let inside = |p: IntPoint| {
        p.x >= clip.x && p.x <= clip.right() && p.y >= clip.y && p.y <= clip.bottom()
    };
    if inside(a) && inside(b) {
        return Some((a, b));
    }
    let (pa, pb) = (to_point(a), to_point(b));
    let min = Point::new(f64::from(clip.x), f64::from(clip.y));
    let max = Point::new(f64::from(clip.right()), f64::from(clip.bottom()));
    let (t0, t1) = clip_params(pa, pb, min, max)?;
    Some((
        IntPoint::rounded(pa.lerp(pb, t0)),
        IntPoint::rounded(pa.lerp(pb, t1)),
    ))
}

/// Call `f` for every pixel on the Bresenham line from `a` to `b`, both ends
/// included, leaving out the parts of the line outside `clip`.
pub fn line_points(a: IntPoint, b: IntPoint, clip: IntRect, mut f: impl FnMut(IntPoint)) {
    line_steps(a, b, clip, |_, p| f(p));
}

/// Like [`line_points`], also passing the number of steps each pixel is
/// away from `a`.
fn line_steps(a: IntPoint, b: IntPoint, clip: IntRect, mut f: impl FnMut(u64, IntPoint)) {
    let Some((start, end)) = clip_segment(a, b, clip) else {
        return;
    };
    let skipped = (i64::from(start.x) - i64::from(a.x))
        .unsigned_abs()
        .max((i64::from(start.y) - i64::from(a.y)).unsigned_abs());

    let (bx, by) = (i64::from(end.x), i64::from(end.y));
    let (mut x, mut y) = (i64::from(start.x), i64::from(start.y));
    let dx = (bx - x).abs();
    let dy = -(by - y).abs();
    let sx = if x < bx { 1 } else { -1 };
    let sy = if y < by { 1 } else { -1 };
    let mut err = dx + dy;
    let mut step = skipped;
    loop {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "steps stay between two i32 points"
        )]
        let p = IntPoint::new(x as i32, y as i32);
        f(step, p);
        if x == bx && y == by {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

/// Draw a line from `a` to `b`.
///
/// One pixel lines use Bresenham directly. Wider lines are filled as a quad
/// around the center line, with discs at the ends for round caps. Only the
/// part of the line that can reach the bitmap is walked.
pub fn draw_line(bmp: &mut Bitmap, a: IntPoint, b: IntPoint, src: &RasterSource<'_>, pen: RasterPen) {
    let width = pen.effective_width();
    if width == 1 {
        let dash = u64::from(pen.dash_len());
        line_steps(a, b, reach(bmp, 1), |step, p| {
            if !pen.dashed || (step / dash) % 2 == 0 {
                src.plot(bmp, p.x, p.y);
            }
        });
        return;
    }

    let radius = f64::from(width - 1) / 2.0;
    if a == b {
        fill_circle(bmp, a, radius, src);
        return;
    }

    let pa = to_point(a);
    let pb = to_point(b);
    let margin = radius + 1.0;
    let min = Point::new(-margin, -margin);
    let max = Point::new(
        f64::from(bmp.width()) + margin,
        f64::from(bmp.height()) + margin,
    );
    let Some((t0, t1)) = clip_params(pa, pb, min, max) else {
        return;
    };
    let len = (pb - pa).hypot();
    let dir = (pb - pa) / len;
    let (from, to) = (t0 * len, t1 * len);
    if pen.dashed {
        let dash = f64::from(pen.dash_len());
        let mut t = (from / (2.0 * dash)).floor() * 2.0 * dash;
        while t < to {
            let start = t.max(from);
            let end = (t + dash).min(to);
            if start < end {
                fill_quad(bmp, pa + dir * start, pa + dir * end, radius, src);
            }
            t += 2.0 * dash;
        }
    } else {
        fill_quad(bmp, pa + dir * from, pa + dir * to, radius, src);
        if pen.cap == LineCap::Round {
            fill_circle(bmp, a, radius, src);
            fill_circle(bmp, b, radius, src);
        }
    }
}

fn to_point(p: IntPoint) -> Point {
    Point::new(f64::from(p.x), f64::from(p.y))
}

fn fill_quad(bmp: &mut Bitmap, a: Point, b: Point, radius: f64, src: &RasterSource<'_>) {
    let d = b - a;
    let len = d.hypot();
    if len == 0.0 {
        return;
    }
    let n = Vec2::new(-d.y, d.x) * (radius / len);
    let corners = [
        IntPoint::rounded(a + n),
        IntPoint::rounded(b + n),
        IntPoint::rounded(b - n),
        IntPoint::rounded(a - n),
    ];
    fill_polygon(bmp, &corners, src);
}

/// Fill the pixels within `radius` of `center`.
pub fn fill_circle(bmp: &mut Bitmap, center: IntPoint, radius: f64, src: &RasterSource<'_>) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "radii are bounded by line widths"
    )]
    let r = radius.ceil() as i32;
    let limit = radius * radius;
    for dy in -r..=r {
        for dx in -r..=r {
            if f64::from(dx * dx + dy * dy) <= limit {
                src.plot(bmp, center.x + dx, center.y + dy);
            }
        }
    }
}

/// Fill the interior and the edges of a polygon with the even-odd rule.
pub fn fill_polygon(bmp: &mut Bitmap, points: &[IntPoint], src: &RasterSource<'_>) {
    if points.is_empty() {
        return;
    }
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_y = points
        .iter()
        .map(|p| p.y)
        .max()
        .unwrap_or(0)
        .min(bmp.height() as i32 - 1);

    let mut crossings: SmallVec<[f64; 8]> = SmallVec::new();
    for y in min_y..=max_y {
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            let inside = (a.y <= y && y < b.y) || (b.y <= y && y < a.y);
            if inside {
                let t = (f64::from(y) - f64::from(a.y)) / (f64::from(b.y) - f64::from(a.y));
                crossings.push(f64::from(a.x) + t * (f64::from(b.x) - f64::from(a.x)));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "crossings lie between polygon vertices"
            )]
            let (x0, x1) = (pair[0].ceil() as i32, pair[1].floor() as i32);
            src.span(bmp, x0, x1, y);
        }
    }

    let clip = reach(bmp, 1);
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        line_points(*a, b, clip, |p| src.plot(bmp, p.x, p.y));
    }
}

/// Fill the triangle `a`, `b`, `c`.
pub fn fill_triangle(bmp: &mut Bitmap, a: Point, b: Point, c: Point, src: &RasterSource<'_>) {
    let pts = [
        IntPoint::rounded(a),
        IntPoint::rounded(b),
        IntPoint::rounded(c),
    ];
    fill_polygon(bmp, &pts, src);
}

/// Draw connected line segments through `points`.
///
/// Wide polylines get round joins.
pub fn draw_polyline(bmp: &mut Bitmap, points: &[IntPoint], src: &RasterSource<'_>, pen: RasterPen) {
    match points {
        [] => {}
        [p] => draw_line(bmp, *p, *p, src, pen),
        _ => {
            let radius = f64::from(pen.effective_width() - 1) / 2.0;
            for (i, seg) in points.windows(2).enumerate() {
                draw_line(bmp, seg[0], seg[1], src, pen);
                if i > 0 && radius > 0.0 && !pen.dashed {
                    fill_circle(bmp, seg[0], radius, src);
                }
            }
        }
    }
}

/// Draw the closed outline through `points`.
pub fn draw_polygon(bmp: &mut Bitmap, points: &[IntPoint], src: &RasterSource<'_>, pen: RasterPen) {
    let Some(first) = points.first() else {
        return;
    };
    let mut closed: Vec<IntPoint> = points.to_vec();
    closed.push(*first);
    let pen = RasterPen {
        cap: LineCap::Round,
        ..pen
    };
    draw_polyline(bmp, &closed, src, pen);
}

/// Rows of `rect` that lie on the bitmap.
fn visible_rows(bmp: &Bitmap, rect: IntRect) -> std::ops::RangeInclusive<i32> {
    rect.y.max(0)..=rect.bottom().min(bmp.height() as i32 - 1)
}

/// Fill every pixel of `rect`.
pub fn fill_rect(bmp: &mut Bitmap, rect: IntRect, src: &RasterSource<'_>) {
    if rect.is_empty() {
        return;
    }
    for y in visible_rows(bmp, rect) {
        src.span(bmp, rect.x, rect.right(), y);
    }
}

/// Draw the outline of `rect`, growing inwards for wider pens.
pub fn draw_rect(bmp: &mut Bitmap, rect: IntRect, src: &RasterSource<'_>, pen: RasterPen) {
    if rect.is_empty() {
        return;
    }
    let width = i32::try_from(pen.effective_width()).unwrap_or(i32::MAX);
    if 2 * width >= rect.w.min(rect.h) {
        fill_rect(bmp, rect, src);
        return;
    }
    let thin = RasterPen {
        width: 1,
        dashed: pen.dashed,
        cap: LineCap::Butt,
    };
    for i in 0..width {
        let r = IntRect::new(rect.x + i, rect.y + i, rect.w - 2 * i, rect.h - 2 * i);
        let tl = IntPoint::new(r.x, r.y);
        let tr = IntPoint::new(r.right(), r.y);
        let br = IntPoint::new(r.right(), r.bottom());
        let bl = IntPoint::new(r.x, r.bottom());
        draw_line(bmp, tl, tr, src, thin);
        draw_line(bmp, tr, br, src, thin);
        draw_line(bmp, br, bl, src, thin);
        draw_line(bmp, bl, tl, src, thin);
    }
}

#[derive(Copy, Clone)]
struct EllipseRows {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
}

impl EllipseRows {
    fn new(rect: IntRect) -> Self {
        let rx = f64::from(rect.w) / 2.0;
        let ry = f64::from(rect.h) / 2.0;
        Self {
            cx: f64::from(rect.x) + rx,
            cy: f64::from(rect.y) + ry,
            rx,
            ry,
        }
    }

    fn inset(&self, by: f64) -> Option<Self> {
        let (rx, ry) = (self.rx - by, self.ry - by);
        (rx > 0.0 && ry > 0.0).then_some(Self { rx, ry, ..*self })
    }

    /// Inclusive column range covered on row `y`, by pixel centers.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ellipse spans lie inside the bounding rectangle"
    )]
    fn span(&self, y: i32) -> Option<(i32, i32)> {
        let dy = (f64::from(y) + 0.5 - self.cy) / self.ry;
        if dy.abs() > 1.0 {
            return None;
        }
        let half = self.rx * (1.0 - dy * dy).sqrt();
        let x0 = (self.cx - half - 0.5).ceil() as i32;
        let x1 = (self.cx + half - 0.5).floor() as i32;
        (x0 <= x1).then_some((x0, x1))
    }
}

/// Fill the ellipse inscribed in `rect`.
pub fn fill_ellipse(bmp: &mut Bitmap, rect: IntRect, src: &RasterSource<'_>) {
    if rect.is_empty() {
        return;
    }
    let rows = EllipseRows::new(rect);
    for y in visible_rows(bmp, rect) {
        if let Some((x0, x1)) = rows.span(y) {
            src.span(bmp, x0, x1, y);
        }
    }
}

/// Draw the outline of the ellipse inscribed in `rect`, `width` pixels thick.
pub fn draw_ellipse(bmp: &mut Bitmap, rect: IntRect, src: &RasterSource<'_>, width: u32) {
    if rect.is_empty() {
        return;
    }
    let outer = EllipseRows::new(rect);
    let inner = outer.inset(f64::from(width.max(1)));
    for y in visible_rows(bmp, rect) {
        let Some((x0, x1)) = outer.span(y) else {
            continue;
        };
        match inner.and_then(|e| e.span(y)) {
            Some((i0, i1)) => {
                src.span(bmp, x0, (i0 - 1).max(x0), y);
                src.span(bmp, (i1 + 1).min(x1), x1, y);
            }
            None => src.span(bmp, x0, x1, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    fn canvas(w: u32, h: u32) -> Bitmap {
        Bitmap::filled(w, h, WHITE).expect("alloc")
    }

    fn count(bmp: &Bitmap, color: Rgba8) -> usize {
        bmp.data()
            .chunks_exact(4)
            .filter(|px| px == &[color.r, color.g, color.b, color.a])
            .count()
    }

    #[test]
    fn bresenham_includes_both_ends() {
        let mut pts = Vec::new();
        let clip = IntRect::new(0, 0, 10, 10);
        line_points(IntPoint::new(0, 0), IntPoint::new(5, 2), clip, |p| pts.push(p));
        assert_eq!(pts.first(), Some(&IntPoint::new(0, 0)));
        assert_eq!(pts.last(), Some(&IntPoint::new(5, 2)));
        assert_eq!(pts.len(), 6, "one pixel per column on a shallow line");
    }

    #[test]
    fn thin_line_is_contiguous() {
        let mut bmp = canvas(20, 20);
        let src = RasterSource::Solid(BLACK);
        draw_line(&mut bmp, IntPoint::new(2, 3), IntPoint::new(17, 3), &src, RasterPen::THIN);
        assert_eq!(count(&bmp, BLACK), 16);
        assert_eq!(bmp.get(1, 3), Some(WHITE));
        assert_eq!(bmp.get(18, 3), Some(WHITE));
    }

    #[test]
    fn dashed_thin_line_alternates() {
        let mut bmp = canvas(20, 1);
        let pen = RasterPen {
            dashed: true,
            ..RasterPen::THIN
        };
        draw_line(
            &mut bmp,
            IntPoint::new(0, 0),
            IntPoint::new(7, 0),
            &RasterSource::Solid(BLACK),
            pen,
        );
        let row: Vec<bool> = (0..8).map(|x| bmp.get(x, 0) == Some(BLACK)).collect();
        assert_eq!(row, [true, true, false, false, true, true, false, false]);
    }

    #[test]
    fn wide_line_has_requested_thickness() {
        let mut bmp = canvas(30, 20);
        let pen = RasterPen {
            width: 4,
            ..RasterPen::THIN
        };
        draw_line(
            &mut bmp,
            IntPoint::new(5, 10),
            IntPoint::new(25, 10),
            &RasterSource::Solid(BLACK),
            pen,
        );
        let column: usize = (0..20).filter(|y| bmp.get(15, *y) == Some(BLACK)).count();
        assert_eq!(column, 4);
    }

    #[test]
    fn polygon_fill_covers_interior_and_edges() {
        let mut bmp = canvas(10, 10);
        let square = [
            IntPoint::new(2, 2),
            IntPoint::new(6, 2),
            IntPoint::new(6, 6),
            IntPoint::new(2, 6),
        ];
        fill_polygon(&mut bmp, &square, &RasterSource::Solid(BLACK));
        assert_eq!(count(&bmp, BLACK), 25);
    }

    #[test]
    fn rect_is_inclusive() {
        let mut bmp = canvas(10, 10);
        let src = RasterSource::Solid(BLACK);
        fill_rect(&mut bmp, IntRect::new(1, 1, 3, 2), &src);
        assert_eq!(count(&bmp, BLACK), 6);

        let mut bmp = canvas(10, 10);
        draw_rect(&mut bmp, IntRect::new(0, 0, 5, 5), &src, RasterPen::THIN);
        assert_eq!(count(&bmp, BLACK), 16);
        assert_eq!(bmp.get(2, 2), Some(WHITE));
    }

    #[test]
    fn ellipse_outline_is_inside_filled_ellipse() {
        let rect = IntRect::new(2, 2, 15, 9);
        let src = RasterSource::Solid(BLACK);
        let mut filled = canvas(20, 14);
        fill_ellipse(&mut filled, rect, &src);
        let mut outline = canvas(20, 14);
        draw_ellipse(&mut outline, rect, &src, 1);
        for y in 0..14 {
            for x in 0..20 {
                if outline.get(x, y) == Some(BLACK) {
                    assert_eq!(filled.get(x, y), Some(BLACK), "outline pixel ({x},{y}) outside fill");
                }
            }
        }
        assert_eq!(outline.get(9, 6), Some(WHITE), "outline must be hollow");
        assert!(count(&outline, BLACK) < count(&filled, BLACK));
    }

    #[test]
    fn clipped_primitives_do_not_panic() {
        let mut bmp = canvas(4, 4);
        let src = RasterSource::Solid(BLACK);
        let wide = RasterPen {
            width: 5,
            cap: LineCap::Round,
            dashed: false,
        };
        draw_line(&mut bmp, IntPoint::new(-10, -10), IntPoint::new(20, 30), &src, wide);
        fill_ellipse(&mut bmp, IntRect::new(-5, -5, 20, 20), &src);
        fill_polygon(&mut bmp, &[IntPoint::new(-3, 1), IntPoint::new(9, 2)], &src);
        fill_rect(&mut bmp, IntRect::new(1, -1_000_000_000, 1, 2_000_000_000), &src);
        assert!(count(&bmp, BLACK) > 0);
        assert_eq!(bmp.get(1, 0), Some(BLACK), "tall rect reaches the canvas");
    }

    #[test]
    fn far_lines_are_clipped_before_walking() {
        let src = RasterSource::Solid(BLACK);
        let (a, b) = (IntPoint::new(-2_000_000_000, 2), IntPoint::new(2_000_000_000, 2));

        let mut thin = canvas(8, 5);
        draw_line(&mut thin, a, b, &src, RasterPen::THIN);
        assert_eq!(count(&thin, BLACK), 8, "exactly the visible row");

        let mut wide = canvas(8, 5);
        let pen = RasterPen {
            width: 3,
            dashed: true,
            cap: LineCap::Butt,
        };
        draw_line(&mut wide, a, b, &src, pen);
        assert!(count(&wide, BLACK) > 0, "dashes reach the canvas");
        assert_eq!(wide.get(0, 0), Some(WHITE));

        let mut pts = Vec::new();
        let clip = IntRect::new(0, 0, 4, 4);
        line_points(IntPoint::new(0, 0), IntPoint::new(i32::MAX, 0), clip, |p| pts.push(p));
        assert_eq!(pts.len(), 4);
        assert_eq!(pts.last(), Some(&IntPoint::new(3, 0)));
    }

    #[test]
    fn clipped_dashes_keep_their_phase() {
        let pen = RasterPen {
            dashed: true,
            ..RasterPen::THIN
        };
        let src = RasterSource::Solid(BLACK);
        let mut bmp = canvas(8, 1);
        draw_line(&mut bmp, IntPoint::new(-6, 0), IntPoint::new(7, 0), &src, pen);
        let row: Vec<bool> = (0..8).map(|x| bmp.get(x, 0) == Some(BLACK)).collect();
        assert_eq!(row, [false, false, true, true, false, false, true, true]);
    }

    #[test]
    fn paint_source_samples_per_pixel() {
        use crate::paint::{Color, ColorStop, Gradient, LinearGradient};
        let paint = Paint::Gradient(Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(1.0, Color::WHITE),
            ],
            object_aligned: false,
        }));
        let src = RasterSource::Paint {
            paint: &paint,
            paint_from_device: Affine::scale(0.1),
        };
        let mut bmp = Bitmap::new(10, 1).expect("alloc");
        fill_rect(&mut bmp, IntRect::new(0, 0, 10, 1), &src);
        let left = bmp.get(0, 0).expect("in bounds");
        let right = bmp.get(9, 0).expect("in bounds");
        assert!(left.r < right.r, "gradient should brighten: {left:?} {right:?}");
        assert_eq!(left.a, 255);
    }
}
