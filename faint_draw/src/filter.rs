// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place bitmap filters.
//!
//! Filters are applied by the filtered draw calls on
//! [`DrawingContext`](crate::DrawingContext) to a scratch bitmap before it is
//! blended onto the target, and can be applied to any [`Bitmap`] directly.

use peniko::color::Rgba8;

use crate::bitmap::{self, Bitmap, IntPoint, IntRect};
use crate::error::DrawError;
use crate::raster::{self, RasterSource};

/// An in-place bitmap transformation.
pub trait Filter {
    /// Transform `bmp`.
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError>;
}

/// 3×3 blur with weights `1 2 1 / 2 4 2 / 1 2 1`. The outermost pixels are kept.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Blur;

impl Filter for Blur {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        const WEIGHTS: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];
        let src = bmp.clone();
        let (w, h) = (src.width() as i32, src.height() as i32);
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let mut sum = [0_u32; 4];
                for (dy, row) in (-1..=1).zip(WEIGHTS.iter()) {
                    for (dx, weight) in (-1..=1).zip(row.iter()) {
                        let Some(c) = src.get(x + dx, y + dy) else {
                            continue;
                        };
                        for (acc, v) in sum.iter_mut().zip([c.r, c.g, c.b, c.a]) {
                            *acc += u32::from(v) * weight;
                        }
                    }
                }
                let [r, g, b, a] = sum.map(|v| u8::try_from(v / 16).unwrap_or(u8::MAX));
                bmp.put(x, y, Rgba8 { r, g, b, a });
            }
        }
        Ok(())
    }
}

/// Surrounds opaque content with a thick outline.
///
/// A 7 pixel disc of `color` is stamped wherever coverage changes between
/// neighbouring pixels, and the original content is drawn on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outline {
    /// Outline color.
    pub color: Rgba8,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            color: Rgba8 {
                r: 0,
                g: 0,
                b: 0,
                a: 255,
            },
        }
    }
}

impl Outline {
    const DISC: i32 = 7;
}

impl Filter for Outline {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        let mut out = Bitmap::new(bmp.width(), bmp.height())?;
        let src = RasterSource::Solid(self.color);
        let disc = |out: &mut Bitmap, x: i32, y: i32| {
            let half = Self::DISC / 2;
            let rect = IntRect::new(x - half, y - half, Self::DISC, Self::DISC);
            raster::fill_ellipse(out, rect, &src);
        };
        let covered = |x: i32, y: i32| bmp.get(x, y).is_some_and(|c| c.a != 0);
        let (w, h) = (bmp.width() as i32, bmp.height() as i32);
        for y in 0..h {
            for x in 0..w {
                let here = covered(x, y);
                match (here, covered(x + 1, y)) {
                    (false, true) => disc(&mut out, x, y),
                    (true, false) => disc(&mut out, x + 1, y),
                    _ => {}
                }
                match (here, covered(x, y + 1)) {
                    (false, true) => disc(&mut out, x, y),
                    (true, false) => disc(&mut out, x, y + 1),
                    _ => {}
                }
            }
        }
        bitmap::blend(bmp, &mut out, IntPoint::new(0, 0));
        *bmp = out;
        Ok(())
    }
}

/// Inverts the color channels, keeping alpha.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Invert;

impl Filter for Invert {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        for px in bmp.data_mut().chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = u8::MAX - *c;
            }
        }
        Ok(())
    }
}

/// Replaces colors by gray levels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Desaturate {
    /// Weight channels by perceived luminance (`0.3 r + 0.59 g + 0.11 b`)
    /// instead of averaging them.
    pub weighted: bool,
}

impl Filter for Desaturate {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        for px in bmp.data_mut().chunks_exact_mut(4) {
            let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
            let gray = if self.weighted {
                (30 * r + 59 * g + 11 * b) / 100
            } else {
                (r + g + b) / 3
            };
            let gray = u8::try_from(gray).unwrap_or(u8::MAX);
            px[..3].fill(gray);
        }
        Ok(())
    }
}

/// Replaces each `size`×`size` block by its average color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixelize {
    /// Block size in pixels. Zero behaves like one.
    pub size: u32,
}

impl Filter for Pixelize {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        let step = self.size.max(1) as usize;
        let size = i32::try_from(self.size.max(1)).unwrap_or(i32::MAX);
        let (w, h) = (bmp.width() as i32, bmp.height() as i32);
        for by in (0..h).step_by(step) {
            for bx in (0..w).step_by(step) {
                let block = IntRect::new(bx, by, size.min(w - bx), size.min(h - by));
                let mut sum = [0_u64; 4];
                let mut count = 0_u64;
                for y in block.y..=block.bottom() {
                    for x in block.x..=block.right() {
                        if let Some(c) = bmp.get(x, y) {
                            for (acc, v) in sum.iter_mut().zip([c.r, c.g, c.b, c.a]) {
                                *acc += u64::from(v);
                            }
                            count += 1;
                        }
                    }
                }
                if count == 0 {
                    continue;
                }
                let [r, g, b, a] = sum.map(|v| u8::try_from(v / count).unwrap_or(u8::MAX));
                raster::fill_rect(bmp, block, &RasterSource::Solid(Rgba8 { r, g, b, a }));
            }
        }
        Ok(())
    }
}

/// Maps pixels to black or white by their channel sum.
///
/// Pixels whose `r + g + b` lies in `min..=max` become white, others black.
/// Alpha is kept.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Threshold {
    /// Lowest channel sum mapped to white, in `0..=765`.
    pub min: u32,
    /// Highest channel sum mapped to white, in `0..=765`.
    pub max: u32,
}

impl Filter for Threshold {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        for px in bmp.data_mut().chunks_exact_mut(4) {
            let sum = u32::from(px[0]) + u32::from(px[1]) + u32::from(px[2]);
            let v = if (self.min..=self.max).contains(&sum) {
                u8::MAX
            } else {
                0
            };
            px[..3].fill(v);
        }
        Ok(())
    }
}

/// Linear brightness and contrast adjustment: `c * contrast + brightness * 255`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BrightnessContrast {
    /// Offset, as a fraction of full intensity.
    pub brightness: f64,
    /// Multiplier.
    pub contrast: f64,
}

impl Default for BrightnessContrast {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

impl Filter for BrightnessContrast {
    fn apply(&self, bmp: &mut Bitmap) -> Result<(), DrawError> {
        let offset = self.brightness * 255.0;
        for px in bmp.data_mut().chunks_exact_mut(4) {
            for c in &mut px[..3] {
                let v = f64::from(*c) * self.contrast + offset;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "clamped to the u8 range"
                )]
                let v = v.round().clamp(0.0, 255.0) as u8;
                *c = v;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 255 };
    const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    #[test]
    fn blur_softens_a_single_pixel() {
        let mut bmp = Bitmap::filled(5, 5, BLACK).expect("alloc");
        bmp.put(2, 2, WHITE);
        Blur.apply(&mut bmp).expect("blur");
        // 255 weighted by 4, 2 and 1 sixteenths, truncated.
        assert_eq!(bmp.get(2, 2).expect("in bounds").r, 63);
        assert_eq!(bmp.get(1, 2).expect("in bounds").r, 31);
        assert_eq!(bmp.get(1, 1).expect("in bounds").r, 15);
        assert_eq!(bmp.get(2, 2).expect("in bounds").a, 255);
    }

    #[test]
    fn invert_keeps_alpha() {
        let mut bmp = Bitmap::filled(1, 1, Rgba8 { r: 10, g: 20, b: 30, a: 40 }).expect("alloc");
        Invert.apply(&mut bmp).expect("invert");
        assert_eq!(bmp.get(0, 0), Some(Rgba8 { r: 245, g: 235, b: 225, a: 40 }));
    }

    #[test]
    fn desaturate_modes() {
        let red = Rgba8 { r: 255, g: 0, b: 0, a: 255 };
        let mut simple = Bitmap::filled(1, 1, red).expect("alloc");
        Desaturate { weighted: false }.apply(&mut simple).expect("filter");
        assert_eq!(simple.get(0, 0).expect("in bounds").g, 85);
        let mut weighted = Bitmap::filled(1, 1, red).expect("alloc");
        Desaturate { weighted: true }.apply(&mut weighted).expect("filter");
        assert_eq!(weighted.get(0, 0).expect("in bounds").b, 76);
    }

    #[test]
    fn pixelize_averages_blocks() {
        let mut bmp = Bitmap::filled(4, 2, BLACK).expect("alloc");
        bmp.put(0, 0, WHITE);
        bmp.put(1, 1, WHITE);
        Pixelize { size: 2 }.apply(&mut bmp).expect("filter");
        assert_eq!(bmp.get(0, 0), bmp.get(1, 1));
        assert_eq!(bmp.get(0, 1).expect("in bounds").r, 127);
        assert_eq!(bmp.get(3, 0), Some(BLACK));
    }

    #[test]
    fn threshold_splits_by_sum() {
        let mut bmp = Bitmap::filled(2, 1, Rgba8 { r: 100, g: 100, b: 100, a: 255 }).expect("alloc");
        bmp.put(1, 0, Rgba8 { r: 10, g: 10, b: 10, a: 255 });
        Threshold { min: 200, max: 765 }.apply(&mut bmp).expect("filter");
        assert_eq!(bmp.get(0, 0), Some(WHITE));
        assert_eq!(bmp.get(1, 0), Some(BLACK));
    }

    #[test]
    fn brightness_contrast_clamps() {
        let mut bmp = Bitmap::filled(1, 1, Rgba8 { r: 200, g: 100, b: 0, a: 9 }).expect("alloc");
        BrightnessContrast {
            brightness: 0.1,
            contrast: 1.5,
        }
        .apply(&mut bmp)
        .expect("filter");
        let c = bmp.get(0, 0).expect("in bounds");
        assert_eq!((c.r, c.g, c.b, c.a), (255, 176, 26, 9));
    }

    #[test]
    fn outline_surrounds_content() {
        let mut bmp = Bitmap::new(20, 20).expect("alloc");
        raster::fill_rect(&mut bmp, IntRect::new(8, 8, 4, 4), &RasterSource::Solid(WHITE));
        Outline::default().apply(&mut bmp).expect("filter");
        assert_eq!(bmp.get(9, 9), Some(WHITE), "content stays on top");
        assert_eq!(bmp.get(6, 9), Some(BLACK), "outline left of content");
        assert_eq!(bmp.get(9, 13), Some(BLACK), "outline below content");
        assert_eq!(bmp.get(0, 0).expect("in bounds").a, 0, "far pixels untouched");
    }
}
