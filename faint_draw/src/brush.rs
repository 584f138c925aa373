// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stamp masks and brushed strokes.

use crate::bitmap::{Bitmap, IntPoint};
use crate::raster::{RasterSource, line_points, reach};
use crate::settings::BrushShape;

/// Mask values at or below this are not stamped.
const STAMP_THRESHOLD: u8 = 10;

/// Largest brush edge in pixels. Larger sizes are clamped.
pub const MAX_BRUSH_SIZE: u32 = 1024;

/// An 8-bit coverage mask stamped along strokes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Brush {
    width: u32,
    height: u32,
    mask: Vec<u8>,
}

impl Brush {
    /// A fully covered `size` by `size` square. Sizes below one give one pixel.
    pub fn square(size: u32) -> Self {
        let size = size.clamp(1, MAX_BRUSH_SIZE);
        Self {
            width: size,
            height: size,
            mask: vec![u8::MAX; (size * size) as usize],
        }
    }

    /// A disc with diameter `size`. Sizes of one or less give one pixel.
    pub fn circle(size: u32) -> Self {
        if size <= 1 {
            return Self::square(1);
        }
        let size = size.min(MAX_BRUSH_SIZE);
        let center = f64::from(size - 1) / 2.0;
        let radius = f64::from(size) / 2.0;
        let mut mask = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = f64::from(x) - center;
                let dy = f64::from(y) - center;
                let inside = (dx * dx + dy * dy).sqrt() <= radius;
                mask.push(if inside { u8::MAX } else { 0 });
            }
        }
        Self {
            width: size,
            height: size,
            mask,
        }
    }

    /// The brush for a size and shape setting.
    pub fn from_settings(size: u32, shape: BrushShape) -> Self {
        match shape {
            BrushShape::Square => Self::square(size),
            BrushShape::Circle => Self::circle(size),
        }
    }

    /// Mask width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.mask[(y * self.width + x) as usize]
    }

    /// Stamp the brush centered on `at`.
    pub fn stamp(&self, bmp: &mut Bitmap, at: IntPoint, src: &RasterSource<'_>) {
        let w = i32::try_from(self.width).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height).unwrap_or(i32::MAX);
        let origin = IntPoint::new(at.x - w / 2, at.y - h / 2);
        for (i, coverage) in self.mask.iter().enumerate() {
            if *coverage <= STAMP_THRESHOLD {
                continue;
            }
            let i = i32::try_from(i).unwrap_or(i32::MAX);
            src.plot(bmp, origin.x + i % w, origin.y + i / w);
        }
    }
}

/// Stamp `brush` at every Bresenham step between consecutive device points.
///
/// A single point is stamped once.
pub fn stroke(bmp: &mut Bitmap, points: &[IntPoint], brush: &Brush, src: &RasterSource<'_>) {
    match points {
        [] => {}
        [p] => brush.stamp(bmp, *p, src),
        _ => {
            let margin = i32::try_from(brush.width.max(brush.height)).unwrap_or(i32::MAX);
            let clip = reach(bmp, margin);
            for seg in points.windows(2) {
                line_points(seg[0], seg[1], clip, |p| brush.stamp(bmp, p, src));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::Rgba8;

    const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    #[test]
    fn small_circles_are_single_pixels() {
        for size in [0, 1] {
            let b = Brush::circle(size);
            assert_eq!((b.width(), b.height()), (1, 1), "size {size}");
            assert_eq!(b.get(0, 0), u8::MAX);
        }
    }

    #[test]
    fn circle_mask_is_round() {
        let b = Brush::circle(5);
        assert_eq!(b.get(2, 2), u8::MAX, "center");
        assert_eq!(b.get(0, 2), u8::MAX, "edge midpoint");
        assert_eq!(b.get(0, 0), 0, "corner");
        assert_eq!(b.get(9, 9), 0, "outside");
    }

    #[test]
    fn circle_stroke_leaves_no_gap() {
        let mut bmp = Bitmap::filled(20, 20, WHITE).expect("alloc");
        let brush = Brush::circle(5);
        let points = [IntPoint::new(8, 10), IntPoint::new(9, 10)];
        stroke(&mut bmp, &points, &brush, &RasterSource::Solid(BLACK));
        for x in 6..=11 {
            assert_eq!(bmp.get(x, 10), Some(BLACK), "gap at x={x}");
        }
    }

    #[test]
    fn long_stroke_is_continuous() {
        let mut bmp = Bitmap::filled(40, 40, WHITE).expect("alloc");
        let brush = Brush::square(3);
        let points = [IntPoint::new(5, 5), IntPoint::new(30, 20)];
        stroke(&mut bmp, &points, &brush, &RasterSource::Solid(BLACK));
        let mut on_path = 0;
        line_points(points[0], points[1], reach(&bmp, 0), |p| {
            assert_eq!(bmp.get(p.x, p.y), Some(BLACK), "gap at {p:?}");
            on_path += 1;
        });
        assert_eq!(on_path, 26);
    }

    #[test]
    fn single_point_stamps_once() {
        let mut bmp = Bitmap::filled(10, 10, WHITE).expect("alloc");
        stroke(
            &mut bmp,
            &[IntPoint::new(5, 5)],
            &Brush::square(2),
            &RasterSource::Solid(BLACK),
        );
        let black = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|(x, y)| bmp.get(*x, *y) == Some(BLACK))
            .count();
        assert_eq!(black, 4);
        assert_eq!(bmp.get(4, 4), Some(BLACK));
    }

    #[test]
    fn huge_sizes_are_clamped() {
        for shape in [BrushShape::Square, BrushShape::Circle] {
            let b = Brush::from_settings(u32::MAX, shape);
            assert_eq!(
                (b.width(), b.height()),
                (MAX_BRUSH_SIZE, MAX_BRUSH_SIZE),
                "{shape:?}"
            );
        }
    }

    #[test]
    fn far_stroke_only_walks_the_canvas() {
        let mut bmp = Bitmap::filled(10, 10, WHITE).expect("alloc");
        let points = [IntPoint::new(-2_000_000_000, 5), IntPoint::new(2_000_000_000, 5)];
        let mut stamps = 0;
        let clip = reach(&bmp, 1);
        line_points(points[0], points[1], clip, |_| stamps += 1);
        assert_eq!(stamps, 12, "one stamp per column of the grown canvas");

        stroke(&mut bmp, &points, &Brush::square(1), &RasterSource::Solid(BLACK));
        for x in 0..10 {
            assert_eq!(bmp.get(x, 5), Some(BLACK), "gap at x={x}");
        }
        assert_eq!(bmp.get(0, 4), Some(WHITE));
    }
}
