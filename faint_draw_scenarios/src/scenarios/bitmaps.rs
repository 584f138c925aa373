// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

fn solid(width: u32, height: u32, color: Rgba8) -> Result<Bitmap, DrawError> {
    Bitmap::filled(width, height, color)
}

/// Bitmaps placed past the canvas are skipped; overlapping ones are clipped.
pub(super) struct BitmapPastBounds;

impl Scenario for BitmapPastBounds {
    fn name(&self) -> &'static str {
        "bitmap_past_bounds"
    }

    fn size(&self) -> (u32, u32) {
        (50, 50)
    }

    fn vector(&self) -> bool {
        false
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let red = solid(10, 10, rgba(255, 0, 0))?;
        let s = Settings::default();
        dc.bitmap(&red, Point::new(200.0, 200.0), &s)?;
        dc.bitmap(&red, Point::new(45.0, 45.0), &s)?;
        dc.bitmap(&red, Point::new(-5.0, -5.0), &s)
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        let red = rgba(255, 0, 0);
        expect_close(image, 47, 47, red, 0)?;
        expect_close(image, 49, 49, red, 0)?;
        expect_close(image, 44, 44, WHITE, 0)?;
        expect_close(image, 2, 2, red, 0)?;
        expect_close(image, 5, 5, WHITE, 0)?;
        expect_close(image, 25, 25, WHITE, 0)
    }
}

/// A zoomed bitmap drawn with its background color masked out.
pub(super) struct BitmapMasked;

impl Scenario for BitmapMasked {
    fn name(&self) -> &'static str {
        "bitmap_masked"
    }

    fn size(&self) -> (u32, u32) {
        (30, 30)
    }

    fn vector(&self) -> bool {
        false
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        dc.clear(&Paint::Color(Color::from_rgba8(0, 0, 255, 255)));
        let mut bmp = solid(2, 1, WHITE)?;
        bmp.put(0, 0, rgba(255, 0, 0));
        dc.set_scale(2.0);
        let s = Settings {
            background_style: BackgroundStyle::Masked,
            ..Settings::default().with_bg(Color::WHITE)
        };
        dc.bitmap(&bmp, Point::new(5.0, 5.0), &s)
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        let (red, blue) = (rgba(255, 0, 0), rgba(0, 0, 255));
        expect_close(image, 10, 10, red, 0)?;
        expect_close(image, 11, 11, red, 0)?;
        expect_close(image, 12, 10, blue, 0)?;
        expect_close(image, 13, 11, blue, 0)?;
        expect_close(image, 9, 9, blue, 0)
    }
}
