// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint sources and their placement relative to a shape.
//!
//! Every non-solid paint lives in its own fixed *paint space*:
//!
//! - linear gradients run from `(0, 0)` to `(1, 0)`;
//! - radial gradients are the unit circle around the origin;
//! - patterns use bitmap pixels, with pattern pixel `(0, 0)` at the anchor.
//!
//! [`Paint::paint_transform`] maps paint space into user space for a given
//! [`Tri`]. Object-aligned paints follow the frame (its origin, rotation and
//! size), others follow the frame's axis-aligned bounding rectangle so that
//! they appear fixed to the canvas while the shape rotates.

use std::sync::Arc;

use kurbo::{Affine, Point, Vec2};
use peniko::color::Rgba8;
use peniko::{Extend, GradientKind, LinearGradientPosition, RadialGradientPosition};

pub use peniko::Color;

use crate::bitmap::Bitmap;
use crate::tri::Tri;

const EPSILON: f64 = 1e-9;

/// A gradient stop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient, in `[0, 1]`.
    pub offset: f64,
    /// Color at this position.
    pub color: Color,
}

impl ColorStop {
    /// Create a stop.
    pub const fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A gradient along a line through the unit square.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Rotation of the gradient direction about the center of the unit square.
    pub angle: f64,
    /// Stops ordered by offset.
    pub stops: Vec<ColorStop>,
    /// Whether the gradient follows the shape's frame.
    pub object_aligned: bool,
}

/// A gradient from a center point outwards to an ellipse.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    /// Center in unit coordinates of the frame.
    pub center: Point,
    /// Outer radii in unit coordinates of the frame.
    pub radii: Vec2,
    /// Stops ordered by offset.
    pub stops: Vec<ColorStop>,
    /// Whether the gradient follows the shape's frame.
    pub object_aligned: bool,
}

/// A linear or radial gradient.
#[derive(Clone, Debug, PartialEq)]
pub enum Gradient {
    /// See [`LinearGradient`].
    Linear(LinearGradient),
    /// See [`RadialGradient`].
    Radial(RadialGradient),
}

/// A tiled bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Tile contents.
    pub bitmap: Arc<Bitmap>,
    /// Position of pattern pixel `(0, 0)`.
    pub anchor: Point,
    /// Whether the pattern follows the shape's frame.
    pub object_aligned: bool,
}

/// What a shape is filled or stroked with.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// A single color.
    Color(Color),
    /// A tiled bitmap.
    Pattern(Pattern),
    /// A gradient.
    Gradient(Gradient),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl Gradient {
    /// Stops ordered by offset.
    pub fn stops(&self) -> &[ColorStop] {
        match self {
            Self::Linear(g) => &g.stops,
            Self::Radial(g) => &g.stops,
        }
    }

    /// Whether the gradient follows the shape's frame.
    pub fn object_aligned(&self) -> bool {
        match self {
            Self::Linear(g) => g.object_aligned,
            Self::Radial(g) => g.object_aligned,
        }
    }

    /// Color at parameter `t`, padded beyond the first and last stop.
    ///
    /// Interpolation is linear between neighbouring stops. With repeated
    /// offsets the later stop wins.
    pub fn color_at(&self, t: f64) -> Color {
        let stops = self.stops();
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return Color::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        // Half-open spans: zero-width spans never match, so the later of
        // two stops at the same offset is the one reached.
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.offset && t < b.offset {
                return lerp_color(a.color, b.color, (t - a.offset) / (b.offset - a.offset));
            }
        }
        last.color
    }

    /// Gradient parameter for a point in paint space.
    fn parameter(&self, q: Point) -> f64 {
        match self {
            Self::Linear(_) => q.x,
            Self::Radial(_) => q.to_vec2().hypot(),
        }
    }

    /// Express this gradient as a `peniko` gradient in paint space.
    ///
    /// Combine with [`Paint::paint_transform`] to place it.
    pub fn to_peniko(&self) -> peniko::Gradient {
        let kind = match self {
            Self::Linear(_) => {
                GradientKind::Linear(LinearGradientPosition::new((0.0, 0.0), (1.0, 0.0)))
            }
            Self::Radial(_) => GradientKind::Radial(RadialGradientPosition::new((0.0, 0.0), 1.0)),
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "peniko stores stop offsets as f32"
        )]
        let stops: Vec<peniko::ColorStop> = self
            .stops()
            .iter()
            .map(|s| peniko::ColorStop::from((s.offset as f32, s.color)))
            .collect();
        peniko::Gradient {
            kind,
            extend: Extend::Pad,
            stops: stops.as_slice().into(),
            ..peniko::Gradient::default()
        }
    }
}

impl Paint {
    /// The color, if this is a solid paint.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether the paint follows the shape's frame.
    ///
    /// Solid colors have no placement and report `false`.
    pub fn object_aligned(&self) -> bool {
        match self {
            Self::Color(_) => false,
            Self::Pattern(p) => p.object_aligned,
            Self::Gradient(g) => g.object_aligned(),
        }
    }

    /// A copy with pattern anchors moved by `delta`.
    ///
    /// Used when content is moved on the canvas but a pattern should stay
    /// registered with it. Colors and gradients are unaffected.
    pub fn offset_by(&self, delta: Vec2) -> Self {
        match self {
            Self::Pattern(p) => Self::Pattern(Pattern {
                anchor: p.anchor + delta,
                ..p.clone()
            }),
            other => other.clone(),
        }
    }

    /// Map from this paint's paint space into user space for `tri`.
    ///
    /// Always derived from `tri` alone, so repeated calls for different
    /// shapes never observe each other.
    pub fn paint_transform(&self, tri: &Tri) -> Affine {
        match self {
            Self::Color(_) => Affine::IDENTITY,
            Self::Pattern(p) => {
                if p.object_aligned {
                    Affine::translate(tri.p0().to_vec2())
                        * Affine::rotate(tri.angle())
                        * Affine::translate(p.anchor.to_vec2())
                } else {
                    Affine::translate(p.anchor.to_vec2())
                }
            }
            Self::Gradient(Gradient::Linear(g)) => {
                unit_frame(tri, g.object_aligned)
                    * Affine::rotate_about(g.angle, Point::new(0.5, 0.5))
            }
            Self::Gradient(Gradient::Radial(g)) => {
                unit_frame(tri, g.object_aligned)
                    * Affine::translate(g.center.to_vec2())
                    * Affine::scale_non_uniform(nonzero(g.radii.x), nonzero(g.radii.y))
            }
        }
    }

    /// Color of this paint at user-space point `p` when painting `tri`.
    pub fn sample(&self, p: Point, tri: &Tri) -> Rgba8 {
        match self {
            Self::Color(c) => c.to_rgba8(),
            _ => self.sample_in_paint_space(self.paint_transform(tri).inverse() * p),
        }
    }

    /// Color at a point already mapped into paint space.
    pub fn sample_in_paint_space(&self, q: Point) -> Rgba8 {
        match self {
            Self::Color(c) => c.to_rgba8(),
            Self::Pattern(p) => {
                let px = crate::bitmap::IntPoint::floored(q);
                p.bitmap.get_wrapped(px.x, px.y)
            }
            Self::Gradient(g) => g.color_at(g.parameter(q)).to_rgba8(),
        }
    }
}

/// Map from the unit square into user space for `tri`.
///
/// Object-aligned: translate to `p0`, rotate by the frame angle and scale to
/// the frame size. Otherwise the unit square covers the bounding rectangle.
/// Zero extents are replaced by one so the map stays invertible.
pub fn unit_frame(tri: &Tri, object_aligned: bool) -> Affine {
    if object_aligned {
        Affine::translate(tri.p0().to_vec2())
            * Affine::rotate(tri.angle())
            * Affine::scale_non_uniform(nonzero(tri.width()), nonzero(tri.height()))
    } else {
        let r = tri.bounding_rect();
        Affine::translate((r.x0, r.y0))
            * Affine::scale_non_uniform(nonzero(r.width()), nonzero(r.height()))
    }
}

fn nonzero(v: f64) -> f64 {
    if v.abs() < EPSILON { 1.0 } else { v }
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "color components are f32"
    )]
    let t = t as f32;
    let mut out = [0.0_f32; 4];
    for (i, c) in out.iter_mut().enumerate() {
        *c = a.components[i] + (b.components[i] - a.components[i]) * t;
    }
    Color::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn black_to_white(object_aligned: bool) -> Paint {
        Paint::Gradient(Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(1.0, Color::WHITE),
            ],
            object_aligned,
        }))
    }

    #[test]
    fn linear_gradient_spans_tri_width() {
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
        let paint = black_to_white(true);
        let left = paint.sample(Point::new(0.5, 25.0), &tri);
        let mid = paint.sample(Point::new(50.0, 25.0), &tri);
        let right = paint.sample(Point::new(99.5, 25.0), &tri);
        assert!(left.r <= 2, "left should be black, got {left:?}");
        assert!(right.r >= 253, "right should be white, got {right:?}");
        assert!((120..=135).contains(&mid.r), "middle should be gray, got {mid:?}");
    }

    #[test]
    fn aligned_gradient_follows_rotation_unaligned_does_not() {
        let tri = crate::tri::rotated(
            Tri::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0)),
            core::f64::consts::FRAC_PI_2,
            Point::new(50.0, 50.0),
        );
        // After a quarter turn the width axis points down.
        let aligned = black_to_white(true);
        let top = aligned.sample(Point::new(50.0, 1.0), &tri);
        let bottom = aligned.sample(Point::new(50.0, 99.0), &tri);
        assert!(top.r < 10 && bottom.r > 245, "aligned: {top:?} {bottom:?}");

        let fixed = black_to_white(false);
        let left = fixed.sample(Point::new(1.0, 50.0), &tri);
        let right = fixed.sample(Point::new(99.0, 50.0), &tri);
        assert!(left.r < 10 && right.r > 245, "unaligned: {left:?} {right:?}");
    }

    #[test]
    fn transform_is_recomputed_per_tri() {
        let paint = black_to_white(true);
        let a = Tri::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Tri::from_rect(Rect::new(100.0, 0.0, 300.0, 10.0));
        let first = paint.paint_transform(&a);
        let _ = paint.paint_transform(&b);
        assert_eq!(paint.paint_transform(&a), first);
        assert_eq!(paint.paint_transform(&b) * Point::new(1.0, 0.0), Point::new(300.0, 0.0));
    }

    #[test]
    fn radial_gradient_runs_from_center() {
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let paint = Paint::Gradient(Gradient::Radial(RadialGradient {
            center: Point::new(0.5, 0.5),
            radii: Vec2::new(0.5, 0.5),
            stops: vec![
                ColorStop::new(0.0, Color::WHITE),
                ColorStop::new(1.0, Color::BLACK),
            ],
            object_aligned: true,
        }));
        assert_eq!(paint.sample(Point::new(50.0, 50.0), &tri).r, 255);
        let half = paint.sample(Point::new(75.0, 50.0), &tri).r;
        assert!((120..=135).contains(&half), "halfway should be gray, got {half}");
        assert_eq!(paint.sample(Point::new(99.0, 99.0), &tri).r, 0, "padded outside");
    }

    #[test]
    fn stops_pad_and_repeat() {
        let g = Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.2, Color::BLACK),
                ColorStop::new(0.5, Color::BLACK),
                ColorStop::new(0.5, Color::WHITE),
                ColorStop::new(0.8, Color::WHITE),
            ],
            object_aligned: true,
        });
        assert_eq!(g.color_at(-1.0).to_rgba8().r, 0);
        assert_eq!(g.color_at(0.5).to_rgba8().r, 255, "repeated offset takes later stop");
        assert_eq!(g.color_at(2.0).to_rgba8().r, 255);
        let empty = Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: Vec::new(),
            object_aligned: false,
        });
        assert_eq!(empty.color_at(0.5).to_rgba8().a, 0);
    }

    #[test]
    fn coincident_stops_make_a_hard_edge() {
        let red = Color::from_rgba8(255, 0, 0, 255);
        let g = Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(0.5, Color::BLACK),
                ColorStop::new(0.5, red),
                ColorStop::new(0.5, Color::WHITE),
                ColorStop::new(1.0, Color::WHITE),
            ],
            object_aligned: true,
        });
        assert_eq!(g.color_at(0.49).to_rgba8().r, 0, "black up to the edge");
        let at = g.color_at(0.5).to_rgba8();
        assert_eq!((at.r, at.g, at.b), (255, 255, 255), "last stop at the edge wins");
        assert_eq!(g.color_at(0.75).to_rgba8().g, 255, "white after the edge");
    }

    #[test]
    fn pattern_tiles_from_anchor() {
        let mut bmp = Bitmap::new(2, 1).expect("alloc");
        bmp.put(0, 0, Rgba8 { r: 255, g: 0, b: 0, a: 255 });
        bmp.put(1, 0, Rgba8 { r: 0, g: 0, b: 255, a: 255 });
        let paint = Paint::Pattern(Pattern {
            bitmap: Arc::new(bmp),
            anchor: Point::new(1.0, 0.0),
            object_aligned: false,
        });
        let tri = Tri::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(paint.sample(Point::new(1.5, 0.5), &tri).r, 255);
        assert_eq!(paint.sample(Point::new(0.5, 0.5), &tri).b, 255);

        let moved = paint.offset_by(Vec2::new(1.0, 0.0));
        assert_eq!(moved.sample(Point::new(1.5, 0.5), &tri).b, 255);
    }
}
