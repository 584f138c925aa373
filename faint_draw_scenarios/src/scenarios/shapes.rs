// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

const RED: Rgba8 = Rgba8 {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

/// The bottom-right quarter of a circle, filled.
///
/// Angles grow clockwise on screen, so `0..π/2` sweeps from the right-hand
/// side down to the bottom.
pub(super) struct QuarterPie {
    pub(super) antialias: bool,
}

impl Scenario for QuarterPie {
    fn name(&self) -> &'static str {
        if self.antialias {
            "pie_vector"
        } else {
            "pie_raster"
        }
    }

    fn size(&self) -> (u32, u32) {
        (60, 60)
    }

    fn vector(&self) -> bool {
        self.antialias
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let s = fill(Color::from_rgba8(255, 0, 0, 255)).with_antialias(self.antialias);
        let tri = Tri::from_rect(Rect::new(10.0, 10.0, 50.0, 50.0));
        dc.arc(&tri, AngleSpan::new(0.0, FRAC_PI_2), &s);
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        let tolerance = if self.antialias { 8 } else { 0 };
        expect_close(image, 40, 40, RED, tolerance)?;
        expect_close(image, 35, 45, RED, tolerance)?;
        expect_close(image, 20, 20, WHITE, tolerance)?;
        expect_close(image, 40, 20, WHITE, tolerance)?;
        expect_close(image, 20, 40, WHITE, tolerance)
    }
}

/// A fill drawn through a context with an origin offset and a zoom factor.
pub(super) struct ScaledContext;

impl Scenario for ScaledContext {
    fn name(&self) -> &'static str {
        "scaled_context"
    }

    fn size(&self) -> (u32, u32) {
        (40, 40)
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        dc.set_origin(Vec2::new(10.0, 10.0));
        dc.set_scale(2.0);
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        dc.rectangle(&tri, &fill(Color::BLACK));
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        let black = rgba(0, 0, 0);
        expect_close(image, 10, 10, black, 4)?;
        expect_close(image, 29, 29, black, 4)?;
        expect_close(image, 9, 9, WHITE, 4)?;
        expect_close(image, 30, 30, WHITE, 4)
    }
}

/// An aliased rectangle drawn through the invert filter.
pub(super) struct FilteredRectangle;

impl Scenario for FilteredRectangle {
    fn name(&self) -> &'static str {
        "filtered_rectangle"
    }

    fn size(&self) -> (u32, u32) {
        (60, 60)
    }

    fn vector(&self) -> bool {
        false
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let s = fill(Color::from_rgba8(255, 0, 0, 255)).with_antialias(false);
        let tri = Tri::from_rect(Rect::new(20.0, 20.0, 30.0, 30.0));
        dc.rectangle_filtered(&tri, &Invert, &s)
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        expect_close(image, 25, 25, rgba(0, 255, 255), 0)?;
        expect_close(image, 5, 5, WHITE, 0)
    }
}
