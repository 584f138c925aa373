// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel buffers and whole-bitmap compositing.
//!
//! A [`Bitmap`] stores straight (non-premultiplied) RGBA8 pixels, four bytes
//! per pixel in `R, G, B, A` order, rows top to bottom with a stride of
//! `width * 4`. The same layout is used by `peniko::ImageFormat::Rgba8` with
//! `ImageAlphaType::Alpha`, so a bitmap can be handed to a vector backend as a
//! pattern surface without conversion.

use peniko::color::Rgba8;

use crate::error::DrawError;

/// Integer pixel position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl IntPoint {
    /// Create a pixel position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a device-space point down to the pixel containing it.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "device coordinates are well within i32"
    )]
    pub fn floored(p: kurbo::Point) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Round a device-space point to the nearest pixel.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "device coordinates are well within i32"
    )]
    pub fn rounded(p: kurbo::Point) -> Self {
        Self::new(p.x.round() as i32, p.y.round() as i32)
    }
}

/// Integer pixel rectangle, inclusive of its top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl IntRect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanning two corners, both included.
    pub fn from_corners(a: IntPoint, b: IntPoint) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Self::new(x0, y0, (a.x - b.x).abs() + 1, (a.y - b.y).abs() + 1)
    }

    /// Last column inside the rectangle.
    pub fn right(&self) -> i32 {
        self.x + self.w - 1
    }

    /// Last row inside the rectangle.
    pub fn bottom(&self) -> i32 {
        self.y + self.h - 1
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// A mutable RGBA8 pixel buffer with straight alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Allocate a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Result<Self, DrawError> {
        Self::filled(width, height, Rgba8 { r: 0, g: 0, b: 0, a: 0 })
    }

    /// Allocate a bitmap filled with `color`.
    ///
    /// Allocation failure is reported instead of aborting so that callers
    /// creating large scratch buffers can abort the enclosing operation.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Result<Self, DrawError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(DrawError::InvalidDimensions { width, height })?;
        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            tracing::warn!(width, height, "bitmap allocation failed");
            return Err(DrawError::Allocation { width, height });
        }
        for _ in 0..(len / 4) {
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DrawError> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(DrawError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA8 bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the bitmap, returning its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Whether `(x, y)` lies inside the bitmap.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.stride() + x as usize * 4)
    }

    /// Color at `(x, y)`, or `None` outside the bitmap.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba8> {
        let i = self.offset(x, y)?;
        let px = &self.data[i..i + 4];
        Some(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Color at `(x, y)` with coordinates wrapped into the bitmap.
    ///
    /// Used for tiling patterns. Returns transparent for an empty bitmap.
    pub fn get_wrapped(&self, x: i32, y: i32) -> Rgba8 {
        if self.width == 0 || self.height == 0 {
            return Rgba8 { r: 0, g: 0, b: 0, a: 0 };
        }
        let (w, h) = (self.width as i32, self.height as i32);
        self.get(x.rem_euclid(w), y.rem_euclid(h))
            .unwrap_or(Rgba8 { r: 0, g: 0, b: 0, a: 0 })
    }

    /// Overwrite the pixel at `(x, y)`. Positions outside the bitmap are ignored.
    pub fn put(&mut self, x: i32, y: i32, color: Rgba8) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Alpha-blend `color` onto the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        if let Some(dst) = self.get(x, y) {
            self.put(x, y, blend_over(color, dst));
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Copy of the pixels inside `rect`, clipped to the bitmap.
    pub fn sub_bitmap(&self, rect: IntRect) -> Result<Self, DrawError> {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.w).min(self.width as i32);
        let y1 = (rect.y + rect.h).min(self.height as i32);
        let w = u32::try_from(x1 - x0).unwrap_or(0);
        let h = u32::try_from(y1 - y0).unwrap_or(0);
        let mut out = Self::new(w, h)?;
        let row_len = w as usize * 4;
        for row in 0..h as usize {
            let src = (y0 as usize + row) * self.stride() + x0 as usize * 4;
            let dst = row * out.stride();
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        Ok(out)
    }
}

/// Straight-alpha "source over".
///
/// Onto an opaque destination this is `dst = (src * a + dst * (255 - a)) / 255`.
pub fn blend_over(src: Rgba8, dst: Rgba8) -> Rgba8 {
    let sa = u32::from(src.a);
    let da = u32::from(dst.a);
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return Rgba8 { r: 0, g: 0, b: 0, a: 0 };
    }
    let mix = |s: u8, d: u8| -> u8 {
        let v = (u32::from(s) * sa * 255 + u32::from(d) * da * (255 - sa)) / (out_a * 255);
        u8::try_from(v).unwrap_or(u8::MAX)
    };
    Rgba8 {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: u8::try_from(out_a).unwrap_or(u8::MAX),
    }
}

fn for_each_overlap(
    src: &Bitmap,
    dst: &mut Bitmap,
    top_left: IntPoint,
    mut f: impl FnMut(Rgba8, Rgba8) -> Option<Rgba8>,
) {
    let (sw, sh) = (src.width as i32, src.height as i32);
    for sy in 0..sh {
        let y = top_left.y + sy;
        if y < 0 {
            continue;
        }
        if y >= dst.height as i32 {
            break;
        }
        for sx in 0..sw {
            let x = top_left.x + sx;
            let (Some(s), Some(d)) = (src.get(sx, sy), dst.get(x, y)) else {
                continue;
            };
            if let Some(out) = f(s, d) {
                dst.put(x, y, out);
            }
        }
    }
}

/// Alpha-blend `src` onto `dst` with its top-left corner at `top_left`.
pub fn blend(src: &Bitmap, dst: &mut Bitmap, top_left: IntPoint) {
    for_each_overlap(src, dst, top_left, |s, d| Some(blend_over(s, d)));
}

/// Alpha-blend `src` onto `dst`, skipping pixels equal to `mask`.
pub fn blend_masked(src: &Bitmap, dst: &mut Bitmap, mask: Rgba8, top_left: IntPoint) {
    for_each_overlap(src, dst, top_left, |s, d| {
        (s.a != 0 && s != mask).then(|| blend_over(s, d))
    });
}

/// Copy `src` onto `dst`, replacing the destination pixels including alpha.
pub fn blit(src: &Bitmap, dst: &mut Bitmap, top_left: IntPoint) {
    for_each_overlap(src, dst, top_left, |s, _| Some(s));
}

/// Copy `src` onto `dst`, skipping pixels equal to `mask`.
pub fn blit_masked(src: &Bitmap, dst: &mut Bitmap, mask: Rgba8, top_left: IntPoint) {
    for_each_overlap(src, dst, top_left, |s, _| (s != mask).then_some(s));
}

/// Resample `src` by `scale` using bilinear interpolation.
///
/// The new size is `max(1, trunc(size * |scale|))`. A negative scale mirrors
/// the result on both axes.
#[expect(
    clippy::cast_possible_truncation,
    reason = "scaled sizes are clamped to u32"
)]
pub fn scale_bilinear(src: &Bitmap, scale: f64) -> Result<Bitmap, DrawError> {
    let factor = scale.abs();
    let new_w = ((f64::from(src.width) * factor) as u32).max(1);
    let new_h = ((f64::from(src.height) * factor) as u32).max(1);
    let mut dst = Bitmap::new(new_w, new_h)?;
    if src.width == 0 || src.height == 0 {
        return Ok(dst);
    }

    let x_ratio = f64::from(src.width - 1) / f64::from(new_w);
    let y_ratio = f64::from(src.height - 1) / f64::from(new_h);
    for y in 0..new_h {
        let fy = y_ratio * f64::from(y);
        let y0 = fy.floor();
        let dy = fy - y0;
        for x in 0..new_w {
            let fx = x_ratio * f64::from(x);
            let x0 = fx.floor();
            let dx = fx - x0;
            let (ix, iy) = (x0 as i32, y0 as i32);
            let px = |ox: i32, oy: i32| {
                src.get(ix + ox, iy + oy)
                    .or_else(|| src.get(ix, iy))
                    .unwrap_or(Rgba8 { r: 0, g: 0, b: 0, a: 0 })
            };
            let (a, b, c, d) = (px(0, 0), px(1, 0), px(0, 1), px(1, 1));
            let lerp = |a: u8, b: u8, c: u8, d: u8| -> u8 {
                let v = f64::from(a) * (1.0 - dx) * (1.0 - dy)
                    + f64::from(b) * dx * (1.0 - dy)
                    + f64::from(c) * (1.0 - dx) * dy
                    + f64::from(d) * dx * dy;
                (v + 0.5).clamp(0.0, 255.0) as u8
            };
            let out = Rgba8 {
                r: lerp(a.r, b.r, c.r, d.r),
                g: lerp(a.g, b.g, c.g, d.g),
                b: lerp(a.b, b.b, c.b, d.b),
                a: lerp(a.a, b.a, c.a, d.a),
            };
            dst.put(x as i32, y as i32, out);
        }
    }

    if scale < 0.0 {
        dst = flipped(&dst)?;
    }
    Ok(dst)
}

/// Resample `src` by an integer factor using nearest-neighbour sampling.
///
/// Uses 16.16 fixed point stepping through the source.
#[expect(
    clippy::cast_possible_truncation,
    reason = "fixed point source offsets are bounded by the source size"
)]
pub fn scale_nearest(src: &Bitmap, scale: u32) -> Result<Bitmap, DrawError> {
    let scale = scale.max(1);
    let new_w = src
        .width
        .checked_mul(scale)
        .ok_or(DrawError::InvalidDimensions {
            width: src.width,
            height: src.height,
        })?;
    let new_h = src
        .height
        .checked_mul(scale)
        .ok_or(DrawError::InvalidDimensions {
            width: src.width,
            height: src.height,
        })?;
    let mut dst = Bitmap::new(new_w, new_h)?;
    if new_w == 0 || new_h == 0 {
        return Ok(dst);
    }
    let x_ratio = (u64::from(src.width) << 16) / u64::from(new_w) + 1;
    let y_ratio = (u64::from(src.height) << 16) / u64::from(new_h) + 1;
    let src_row_len = src.stride();
    for y in 0..new_h as usize {
        let sy = ((y as u64 * y_ratio) >> 16) as usize;
        for x in 0..new_w as usize {
            let sx = ((x as u64 * x_ratio) >> 16) as usize;
            let s = sy * src_row_len + sx * 4;
            let d = y * dst.stride() + x * 4;
            dst.data[d..d + 4].copy_from_slice(&src.data[s..s + 4]);
        }
    }
    Ok(dst)
}

fn flipped(src: &Bitmap) -> Result<Bitmap, DrawError> {
    let mut dst = Bitmap::new(src.width, src.height)?;
    let (w, h) = (src.width as i32, src.height as i32);
    for y in 0..h {
        for x in 0..w {
            if let Some(c) = src.get(x, y) {
                dst.put(w - 1 - x, h - 1 - y, c);
            }
        }
    }
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8 { r: 255, g: 0, b: 0, a: 255 };
    const BLUE: Rgba8 = Rgba8 { r: 0, g: 0, b: 255, a: 255 };
    const WHITE: Rgba8 = Rgba8 { r: 255, g: 255, b: 255, a: 255 };

    fn checker(w: u32, h: u32) -> Bitmap {
        let mut bmp = Bitmap::new(w, h).expect("alloc");
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let c = if (x + y) % 2 == 0 { RED } else { BLUE };
                bmp.put(x, y, c);
            }
        }
        bmp
    }

    #[test]
    fn get_and_put_are_clipped() {
        let mut bmp = Bitmap::new(2, 2).expect("alloc");
        bmp.put(-1, 0, RED);
        bmp.put(2, 0, RED);
        assert!(bmp.data().iter().all(|b| *b == 0), "out-of-bounds put must not write");
        bmp.put(1, 1, RED);
        assert_eq!(bmp.get(1, 1), Some(RED));
        assert_eq!(bmp.get(2, 1), None);
        assert_eq!(bmp.stride(), 8);
    }

    #[test]
    fn set_alpha_of_opaque_source_replaces_background() {
        let src = checker(4, 3);
        for bg in [WHITE, Rgba8 { r: 10, g: 200, b: 30, a: 40 }] {
            let mut dst = Bitmap::filled(8, 8, bg).expect("alloc");
            blit(&src, &mut dst, IntPoint::new(2, 3));
            blend(&src, &mut dst, IntPoint::new(2, 3));
            for y in 0..3 {
                for x in 0..4 {
                    assert_eq!(dst.get(x + 2, y + 3), src.get(x, y), "pixel ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn blend_of_opaque_source_equals_source() {
        let src = checker(3, 3);
        let mut dst = Bitmap::filled(5, 5, Rgba8 { r: 1, g: 2, b: 3, a: 255 }).expect("alloc");
        blend(&src, &mut dst, IntPoint::new(1, 1));
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(dst.get(x + 1, y + 1), src.get(x, y));
            }
        }
    }

    #[test]
    fn translucent_blend_mixes_channels() {
        let half_red = Rgba8 { r: 255, g: 0, b: 0, a: 128 };
        let out = blend_over(half_red, Rgba8 { r: 0, g: 0, b: 0, a: 255 });
        assert_eq!(out.r, 128);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn masked_variants_skip_mask_color() {
        let mut src = Bitmap::filled(2, 1, WHITE).expect("alloc");
        src.put(1, 0, RED);
        let mut dst = Bitmap::filled(2, 1, BLUE).expect("alloc");
        blit_masked(&src, &mut dst, WHITE, IntPoint::new(0, 0));
        assert_eq!(dst.get(0, 0), Some(BLUE), "mask color must be skipped");
        assert_eq!(dst.get(1, 0), Some(RED));

        let mut dst = Bitmap::filled(2, 1, BLUE).expect("alloc");
        blend_masked(&src, &mut dst, WHITE, IntPoint::new(0, 0));
        assert_eq!(dst.get(0, 0), Some(BLUE));
        assert_eq!(dst.get(1, 0), Some(RED));
    }

    #[test]
    fn blit_clips_partially_outside() {
        let src = checker(4, 4);
        let mut dst = Bitmap::filled(3, 3, WHITE).expect("alloc");
        blit(&src, &mut dst, IntPoint::new(-2, 1));
        assert_eq!(dst.get(0, 1), src.get(2, 0));
        assert_eq!(dst.get(2, 0), Some(WHITE));
    }

    #[test]
    fn nearest_scaling_repeats_pixels() {
        let src = checker(2, 2);
        let out = scale_nearest(&src, 3).expect("alloc");
        assert_eq!((out.width(), out.height()), (6, 6));
        assert_eq!(out.get(0, 0), Some(RED));
        assert_eq!(out.get(2, 2), Some(RED));
        assert_eq!(out.get(3, 0), Some(BLUE));
        assert_eq!(out.get(5, 5), Some(RED));
    }

    #[test]
    fn bilinear_scaling_sizes_and_uniform_color() {
        let src = Bitmap::filled(10, 7, RED).expect("alloc");
        let out = scale_bilinear(&src, 0.5).expect("alloc");
        assert_eq!((out.width(), out.height()), (5, 3));
        assert!(
            (0..3).all(|y| (0..5).all(|x| out.get(x, y) == Some(RED))),
            "uniform input must stay uniform"
        );
        let tiny = scale_bilinear(&src, 0.01).expect("alloc");
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn negative_bilinear_scale_mirrors() {
        let mut src = Bitmap::filled(4, 1, WHITE).expect("alloc");
        src.put(0, 0, RED);
        let out = scale_bilinear(&src, -1.0).expect("alloc");
        assert_eq!(out.get(3, 0), Some(RED));
    }

    #[test]
    fn sub_bitmap_is_clipped_copy() {
        let src = checker(4, 4);
        let sub = src.sub_bitmap(IntRect::new(2, 2, 5, 5)).expect("alloc");
        assert_eq!((sub.width(), sub.height()), (2, 2));
        assert_eq!(sub.get(0, 0), src.get(2, 2));
        assert_eq!(sub.get(1, 0), src.get(3, 2));
    }

    #[test]
    fn wrapped_lookup_tiles() {
        let src = checker(2, 2);
        assert_eq!(src.get_wrapped(-1, 0), src.get(1, 0).expect("in bounds"));
        assert_eq!(src.get_wrapped(4, 5), src.get(0, 1).expect("in bounds"));
    }

    #[test]
    fn from_rgba8_checks_length() {
        assert!(Bitmap::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(Bitmap::from_rgba8(2, 2, vec![0; 16]).is_ok());
    }
}
