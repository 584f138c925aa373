// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement and outlines.
//!
//! Glyph shaping is not done here. Sinks hold a [`TextShaper`] and answer
//! measurement and outline requests through it.

use kurbo::{BezPath, Rect, Size};

use crate::settings::FontDesc;

/// Measurements of a shaped text run.
///
/// Rectangles are relative to the start of the baseline, with y growing
/// downwards, so ink above the baseline has negative y.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextShape {
    /// Advance width of the whole run.
    pub width: f64,
    /// Line height: ascent, descent and line gap.
    pub height: f64,
    /// Bounds of the glyph outlines.
    pub ink: Rect,
    /// Layout bounds: advance width by ascent and descent.
    pub logical: Rect,
    /// Advance width after each character, in order.
    pub prefix_widths: Vec<f64>,
}

impl TextShape {
    /// Layout size of the run.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Lays out text and produces glyph outlines.
pub trait TextShaper {
    /// Measure `text` set in `font`.
    fn shape(&self, text: &str, font: &FontDesc) -> TextShape;

    /// Outlines of `text` set in `font`, with the baseline starting at the origin.
    fn outline(&self, text: &str, font: &FontDesc) -> BezPath;
}

impl<T: TextShaper + ?Sized> TextShaper for Box<T> {
    fn shape(&self, text: &str, font: &FontDesc) -> TextShape {
        (**self).shape(text, font)
    }

    fn outline(&self, text: &str, font: &FontDesc) -> BezPath {
        (**self).outline(text, font)
    }
}
