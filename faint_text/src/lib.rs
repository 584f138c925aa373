// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Faint Text: a [`TextShaper`] backed by Skrifa.
//!
//! [`SkrifaShaper`] lays text out on a single line with nominal glyph
//! advances from the font's `hmtx` metrics and produces unhinted outlines.
//! It does not perform complex shaping (no ligatures, kerning or bidi).
//!
//! Faces are registered with raw font bytes and selected per
//! [`FontDesc`]: the face whose family name matches (case-insensitively) and
//! whose weight and slant match best wins; the first registered face is the
//! fallback.
//!
//! Font data that cannot be parsed is not an error: measuring yields an
//! empty [`TextShape`], outlining yields an empty path, and a warning is
//! logged.

use std::sync::Arc;

use faint_draw::{FontDesc, TextShape, TextShaper};
use kurbo::{BezPath, Point, Rect};
use skrifa::instance::{LocationRef, Size};
use skrifa::metrics::GlyphMetrics;
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};

#[derive(Clone, Debug)]
struct Face {
    family: String,
    bold: bool,
    italic: bool,
    data: Arc<[u8]>,
    index: u32,
}

impl Face {
    fn score(&self, font: &FontDesc) -> u32 {
        let mut score = 0;
        if self.family.eq_ignore_ascii_case(&font.face) {
            score += 4;
        }
        if self.bold == font.bold {
            score += 2;
        }
        if self.italic == font.italic {
            score += 1;
        }
        score
    }

    fn font_ref(&self) -> Option<FontRef<'_>> {
        match FontRef::from_index(&self.data, self.index) {
            Ok(f) => Some(f),
            Err(err) => {
                tracing::warn!(family = %self.family, %err, "unreadable font data");
                None
            }
        }
    }
}

/// Text shaper over a set of registered font faces.
#[derive(Clone, Debug, Default)]
pub struct SkrifaShaper {
    faces: Vec<Face>,
}

impl SkrifaShaper {
    /// A shaper with one regular face.
    pub fn new(family: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::default().with_face(family, false, false, data)
    }

    /// Register another face.
    pub fn with_face(
        mut self,
        family: impl Into<String>,
        bold: bool,
        italic: bool,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        self.faces.push(Face {
            family: family.into(),
            bold,
            italic,
            data: data.into(),
            index: 0,
        });
        self
    }

    /// Number of registered faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_for(&self, font: &FontDesc) -> Option<&Face> {
        // `max_by_key` keeps the last maximum; iterate in reverse so the
        // earliest registered face wins ties.
        self.faces.iter().rev().max_by_key(|f| f.score(font))
    }
}

fn size_of(font: &FontDesc) -> Size {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "font sizes fit comfortably in f32"
    )]
    Size::new(font.size as f32)
}

fn glyphs(font_ref: &FontRef<'_>, text: &str) -> Vec<GlyphId> {
    let charmap = font_ref.charmap();
    text.chars()
        .map(|ch| charmap.map(ch).unwrap_or(GlyphId::NOTDEF))
        .collect()
}

impl TextShaper for SkrifaShaper {
    fn shape(&self, text: &str, font: &FontDesc) -> TextShape {
        let Some(font_ref) = self.face_for(font).and_then(Face::font_ref) else {
            return TextShape::default();
        };
        let size = size_of(font);
        let metrics = font_ref.metrics(size, LocationRef::default());
        let glyph_metrics = GlyphMetrics::new(&font_ref, size, LocationRef::default());

        let ascent = f64::from(metrics.ascent);
        let descent = f64::from(metrics.descent);
        let leading = f64::from(metrics.leading);

        let mut x = 0.0_f64;
        let mut ink: Option<Rect> = None;
        let mut prefix_widths = Vec::with_capacity(text.len());
        for gid in glyphs(&font_ref, text) {
            if let Some(b) = glyph_metrics.bounds(gid) {
                // Font units are y-up; flip into y-down with the baseline at zero.
                let r = Rect::new(
                    x + f64::from(b.x_min),
                    -f64::from(b.y_max),
                    x + f64::from(b.x_max),
                    -f64::from(b.y_min),
                );
                ink = Some(ink.map_or(r, |i| i.union(r)));
            }
            x += f64::from(glyph_metrics.advance_width(gid).unwrap_or(0.0));
            prefix_widths.push(x);
        }

        TextShape {
            width: x,
            height: ascent - descent + leading,
            ink: ink.unwrap_or(Rect::ZERO),
            logical: Rect::new(0.0, -ascent, x, -descent),
            prefix_widths,
        }
    }

    fn outline(&self, text: &str, font: &FontDesc) -> BezPath {
        let mut pen = FlipPen {
            path: BezPath::new(),
            offset: 0.0,
        };
        let Some(font_ref) = self.face_for(font).and_then(Face::font_ref) else {
            return pen.path;
        };
        let size = size_of(font);
        let glyph_metrics = GlyphMetrics::new(&font_ref, size, LocationRef::default());
        let outlines = font_ref.outline_glyphs();
        for gid in glyphs(&font_ref, text) {
            if let Some(glyph) = outlines.get(gid) {
                let settings = DrawSettings::unhinted(size, LocationRef::default());
                if let Err(err) = glyph.draw(settings, &mut pen) {
                    tracing::debug!(?gid, %err, "glyph outline failed");
                }
            }
            pen.offset += f64::from(glyph_metrics.advance_width(gid).unwrap_or(0.0));
        }
        pen.path
    }
}

/// Collects outlines into a y-down path, shifted right by `offset`.
struct FlipPen {
    path: BezPath,
    offset: f64,
}

impl FlipPen {
    fn pt(&self, x: f32, y: f32) -> Point {
        Point::new(self.offset + f64::from(x), -f64::from(y))
    }
}

impl OutlinePen for FlipPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.pt(x1, y1), self.pt(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.pt(x1, y1), self.pt(x2, y2), self.pt(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}
