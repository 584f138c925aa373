// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// A black to white gradient filling the whole canvas, following the frame.
pub(super) struct ObjectAlignedLinearGradient;

impl Scenario for ObjectAlignedLinearGradient {
    fn name(&self) -> &'static str {
        "object_aligned_linear_gradient"
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError> {
        let gradient = Paint::Gradient(Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(1.0, Color::WHITE),
            ],
            object_aligned: true,
        }));
        let (w, h) = self.size();
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        dc.rectangle(&tri, &fill(gradient));
        Ok(())
    }

    fn check(&self, image: &Bitmap) -> Result<(), String> {
        expect_red_in(image, 0, 25, 0..=8)?;
        expect_red_in(image, 50, 25, 100..=160)?;
        expect_red_in(image, 99, 25, 247..=255)?;
        expect_red_in(image, 50, 0, 100..=160)
    }
}
