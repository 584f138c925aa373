// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The vector rendering seam.
//!
//! A [`PathSink`] is a stateful, cairo-like path renderer: geometry is
//! accumulated into a current path, then filled or stroked with the current
//! source and line style under the current transform. Rendered pixels stay
//! inside the sink until [`PathSink::composite_into`] merges them onto a
//! target [`Bitmap`].

use std::sync::Arc;

use kurbo::{Affine, Point, Vec2};

use crate::bitmap::Bitmap;
use crate::paint::{Color, Gradient};
use crate::settings::{FontDesc, LineCap, LineJoin};
use crate::text::TextShape;

/// A stateful path renderer.
///
/// Coordinates passed to geometry methods are in user space, which the
/// current transform maps to device pixels. Line width and dash lengths are
/// also in user space at the time of the stroke.
///
/// Sources are fixed to the user space current when they are set: changing
/// the transform afterwards moves later geometry but not the source.
pub trait PathSink {
    /// Begin a new sub-path at `p`.
    fn move_to(&mut self, p: Point);

    /// Add a straight segment to `p`.
    fn line_to(&mut self, p: Point);

    /// Add a cubic Bézier segment with control points `c1`, `c2` ending at `to`.
    fn curve_to(&mut self, c1: Point, c2: Point, to: Point);

    /// Close the current sub-path.
    fn close_path(&mut self);

    /// Discard the current path.
    fn new_path(&mut self);

    /// Fill the current path with the current source and discard it.
    fn fill(&mut self);

    /// Fill the current path with the current source and keep it.
    fn fill_preserve(&mut self);

    /// Stroke the current path with the current source and discard it.
    fn stroke(&mut self);

    /// Use a solid color as the source.
    fn set_source_rgba(&mut self, color: Color);

    /// Use a gradient as the source.
    ///
    /// `user_from_paint` places the gradient's unit paint space in user space.
    fn set_source_gradient(&mut self, gradient: &Gradient, user_from_paint: Affine);

    /// Use a repeating bitmap as the source.
    ///
    /// `user_from_paint` places bitmap pixel space in user space.
    fn set_source_surface(&mut self, surface: &Arc<Bitmap>, user_from_paint: Affine);

    /// Set the stroke width.
    fn set_line_width(&mut self, width: f64);

    /// Set the stroke end caps.
    fn set_line_cap(&mut self, cap: LineCap);

    /// Set the stroke joins.
    fn set_line_join(&mut self, join: LineJoin);

    /// Set alternating on/off dash lengths. An empty slice turns dashing off.
    fn set_dash(&mut self, dashes: &[f64], offset: f64);

    /// Push the transform, source and line style.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`PathSink::save`].
    ///
    /// Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Prepend a translation to the current transform.
    fn translate(&mut self, offset: Vec2);

    /// Prepend a rotation, in radians, to the current transform.
    fn rotate(&mut self, angle: f64);

    /// Prepend a non-uniform scale to the current transform.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Measure `text` set in `font`.
    ///
    /// Sinks without a text shaper return an empty shape.
    fn shape_text(&mut self, text: &str, font: &FontDesc) -> TextShape;

    /// Append the outlines of `text` to the current path, with the baseline
    /// starting at the user space origin.
    fn text_path(&mut self, text: &str, font: &FontDesc);

    /// Merge everything rendered since the last call onto `target` and clear
    /// the sink's pixels.
    fn composite_into(&mut self, target: &mut Bitmap);

    /// Whether the sink is usable.
    fn is_ok(&self) -> bool;

    /// Description of the failure when [`PathSink::is_ok`] is `false`.
    fn error_string(&self) -> Option<String>;
}

/// Convenience helpers for [`PathSink`] callers.
pub trait PathSinkExt: PathSink {
    /// Run `f` between [`PathSink::save`] and [`PathSink::restore`].
    #[inline]
    fn with_saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let out = f(self);
        self.restore();
        out
    }

    /// Add a closed polygon through `points`.
    fn polygon(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.close_path();
    }
}

impl<S: PathSink + ?Sized> PathSinkExt for S {}

impl<S: PathSink + ?Sized> PathSink for &mut S {
    fn move_to(&mut self, p: Point) {
        (**self).move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        (**self).line_to(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        (**self).curve_to(c1, c2, to);
    }

    fn close_path(&mut self) {
        (**self).close_path();
    }

    fn new_path(&mut self) {
        (**self).new_path();
    }

    fn fill(&mut self) {
        (**self).fill();
    }

    fn fill_preserve(&mut self) {
        (**self).fill_preserve();
    }

    fn stroke(&mut self) {
        (**self).stroke();
    }

    fn set_source_rgba(&mut self, color: Color) {
        (**self).set_source_rgba(color);
    }

    fn set_source_gradient(&mut self, gradient: &Gradient, user_from_paint: Affine) {
        (**self).set_source_gradient(gradient, user_from_paint);
    }

    fn set_source_surface(&mut self, surface: &Arc<Bitmap>, user_from_paint: Affine) {
        (**self).set_source_surface(surface, user_from_paint);
    }

    fn set_line_width(&mut self, width: f64) {
        (**self).set_line_width(width);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        (**self).set_line_cap(cap);
    }

    fn set_line_join(&mut self, join: LineJoin) {
        (**self).set_line_join(join);
    }

    fn set_dash(&mut self, dashes: &[f64], offset: f64) {
        (**self).set_dash(dashes, offset);
    }

    fn save(&mut self) {
        (**self).save();
    }

    fn restore(&mut self) {
        (**self).restore();
    }

    fn translate(&mut self, offset: Vec2) {
        (**self).translate(offset);
    }

    fn rotate(&mut self, angle: f64) {
        (**self).rotate(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        (**self).scale(sx, sy);
    }

    fn shape_text(&mut self, text: &str, font: &FontDesc) -> TextShape {
        (**self).shape_text(text, font)
    }

    fn text_path(&mut self, text: &str, font: &FontDesc) {
        (**self).text_path(text, font);
    }

    fn composite_into(&mut self, target: &mut Bitmap) {
        (**self).composite_into(target);
    }

    fn is_ok(&self) -> bool {
        (**self).is_ok()
    }

    fn error_string(&self) -> Option<String> {
        (**self).error_string()
    }
}
