// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style inputs for draw calls.
//!
//! [`Settings`] is plain data. The drawing engine only reads it.

use crate::paint::{Color, Paint};

/// Which parts of a closed shape are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Nothing.
    None,
    /// Outline only, with the foreground paint.
    #[default]
    Border,
    /// Interior only, with the background paint.
    Fill,
    /// Interior with the background paint, then outline with the foreground.
    BorderAndFill,
}

impl FillMode {
    /// Whether the interior is filled.
    pub fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::BorderAndFill)
    }

    /// Whether the outline is stroked.
    pub fn strokes(self) -> bool {
        matches!(self, Self::Border | Self::BorderAndFill)
    }
}

/// Shape of line ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Half-disc around the endpoint.
    Round,
}

/// Shape of joins between line segments.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Arrowheads at line ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArrowHead {
    /// Plain line end.
    #[default]
    None,
    /// Arrowhead at the last point.
    Front,
}

/// How a drawn bitmap is combined with the target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BitmapComposite {
    /// Blend using the source alpha.
    #[default]
    BlendAlpha,
    /// Replace target pixels, alpha included.
    SetAlpha,
}

/// Whether pixels matching the background color are skipped when drawing bitmaps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackgroundStyle {
    /// Every pixel is drawn.
    #[default]
    Opaque,
    /// Pixels equal to the background color are skipped.
    Masked,
}

/// Stamp shape for brushed strokes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrushShape {
    /// Filled square.
    Square,
    /// Filled disc.
    #[default]
    Circle,
}

/// Font request passed through to the text shaper.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDesc {
    /// Family name.
    pub face: String,
    /// Size in pixels.
    pub size: f64,
    /// Bold weight.
    pub bold: bool,
    /// Italic slant.
    pub italic: bool,
}

impl Default for FontDesc {
    fn default() -> Self {
        Self {
            face: String::from("sans-serif"),
            size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

/// Style of a single draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Stroke width in user units.
    pub line_width: f64,
    /// Which parts of closed shapes are drawn.
    pub fill_mode: FillMode,
    /// Dashed outlines.
    pub dashed: bool,
    /// Line end shape.
    pub line_cap: LineCap,
    /// Line join shape.
    pub line_join: LineJoin,
    /// Arrowheads on lines and polylines.
    pub arrowhead: ArrowHead,
    /// Vector (anti-aliased) rendering instead of raster rendering.
    pub antialias: bool,
    /// Bitmap compositing.
    pub bitmap_composite: BitmapComposite,
    /// Bitmap masking.
    pub background_style: BackgroundStyle,
    /// Brush stamp size in pixels. Zero strokes with a 1px pen.
    pub brush_size: u32,
    /// Brush stamp shape.
    pub brush_shape: BrushShape,
    /// Font for text.
    pub font: FontDesc,
    /// Foreground (outline, line and text) paint.
    pub fg: Paint,
    /// Background (fill) paint.
    pub bg: Paint,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            fill_mode: FillMode::Border,
            dashed: false,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            arrowhead: ArrowHead::None,
            antialias: true,
            bitmap_composite: BitmapComposite::BlendAlpha,
            background_style: BackgroundStyle::Opaque,
            brush_size: 0,
            brush_shape: BrushShape::Circle,
            font: FontDesc::default(),
            fg: Paint::Color(Color::BLACK),
            bg: Paint::Color(Color::WHITE),
        }
    }
}

impl Settings {
    /// Set the line width.
    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    /// Set the fill mode.
    pub fn with_fill_mode(mut self, mode: FillMode) -> Self {
        self.fill_mode = mode;
        self
    }

    /// Enable or disable anti-aliased vector rendering.
    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    /// Set the foreground paint.
    pub fn with_fg(mut self, paint: impl Into<Paint>) -> Self {
        self.fg = paint.into();
        self
    }

    /// Set the background paint.
    pub fn with_bg(mut self, paint: impl Into<Paint>) -> Self {
        self.bg = paint.into();
        self
    }

    /// Color used as mask key when bitmaps are drawn masked.
    ///
    /// Only solid background paints can mask.
    pub fn mask_color(&self) -> Option<Color> {
        match self.background_style {
            BackgroundStyle::Masked => self.bg.as_color(),
            BackgroundStyle::Opaque => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_mode_parts() {
        assert!(!FillMode::None.fills() && !FillMode::None.strokes());
        assert!(FillMode::Border.strokes() && !FillMode::Border.fills());
        assert!(FillMode::Fill.fills() && !FillMode::Fill.strokes());
        assert!(FillMode::BorderAndFill.fills() && FillMode::BorderAndFill.strokes());
    }

    #[test]
    fn masking_needs_color_background() {
        let s = Settings {
            background_style: BackgroundStyle::Masked,
            ..Settings::default()
        };
        assert_eq!(s.mask_color(), Some(Color::WHITE));

        let gradient = Paint::Gradient(crate::paint::Gradient::Linear(
            crate::paint::LinearGradient {
                angle: 0.0,
                stops: Vec::new(),
                object_aligned: false,
            },
        ));
        let s = s.with_bg(gradient);
        assert_eq!(s.mask_color(), None);
        assert_eq!(Settings::default().mask_color(), None);
    }
}
