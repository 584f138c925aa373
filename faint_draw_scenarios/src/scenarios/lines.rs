// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// A thick line ending in an arrowhead whose tip is the line's end point.
pub(super) struct ArrowLine;

impl Scenario for ArrowLine {
    fn name(&self) -> &'static str {
        "arrow_line"
    }

    fn size(&self) -> (u32, u32) {
        (120, 40)
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let s = Settings {
            arrowhead: ArrowHead::Front,
            ..Settings::default().with_line_width(4.0)
        };
        dc.line(Point::new(0.0, 20.0), Point::new(100.0, 20.0), &s);
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        let black = rgba(0, 0, 0);
        expect_close(image, 50, 20, black, 8)?;
        expect_close(image, 85, 20, black, 8)?;
        // Head wings, well off the line.
        expect_close(image, 80, 13, black, 8)?;
        expect_close(image, 103, 20, WHITE, 4)?;
        expect_close(image, 50, 30, WHITE, 4)
    }
}

/// A one pixel line between pixel rows stays one pixel wide.
pub(super) struct CrispHairline;

impl Scenario for CrispHairline {
    fn name(&self) -> &'static str {
        "crisp_hairline"
    }

    fn size(&self) -> (u32, u32) {
        (100, 20)
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        dc.line(Point::new(10.0, 10.3), Point::new(90.0, 10.3), &Settings::default());
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        expect_close(image, 50, 10, rgba(0, 0, 0), 16)?;
        expect_close(image, 50, 9, WHITE, 16)?;
        expect_close(image, 50, 11, WHITE, 16)
    }
}

/// A round brush dragged by one pixel leaves a continuous mark.
pub(super) struct BrushStrokeNoGap;

impl Scenario for BrushStrokeNoGap {
    fn name(&self) -> &'static str {
        "brush_stroke_no_gap"
    }

    fn size(&self) -> (u32, u32) {
        (30, 20)
    }

    fn vector(&self) -> bool {
        false
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let s = Settings {
            brush_size: 5,
            brush_shape: BrushShape::Circle,
            ..Settings::default()
        };
        dc.stroke(&[IntPoint::new(10, 10), IntPoint::new(11, 10)], &s);
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        for x in 9..=12 {
            expect_close(image, x, 10, rgba(0, 0, 0), 0)?;
        }
        expect_close(image, 20, 10, WHITE, 0)
    }
}
