// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Faint Draw: the drawing engine of a raster paint program.
//!
//! This crate renders geometric shapes, text and bitmaps onto an RGBA pixel
//! buffer. Shapes are positioned by [`Tri`] frames, styled by [`Settings`],
//! and colored by [`Paint`] values (solid colors, gradients, or repeating
//! bitmap patterns).
//!
//! # Two rendering modes
//!
//! Every draw call on a [`DrawingContext`] goes one of two ways, chosen by
//! [`Settings::antialias`]:
//!
//! - **Vector**: the shape becomes a path on a [`PathSink`], a cairo-like
//!   stateful renderer, which fills and strokes it with anti-aliasing. The
//!   sink's pixels are then composited onto the target. Sinks live in other
//!   crates: `faint_draw_vello_cpu` renders with Vello CPU, `faint_draw_ref`
//!   records calls for inspection.
//! - **Raster**: the shape is drawn with the aliased primitives in
//!   [`raster`] straight into the target's pixels.
//!
//! Freehand strokes ([`DrawingContext::stroke`]) stamp a [`brush::Brush`]
//! and bitmaps ([`DrawingContext::bitmap`]) are scaled and blended directly;
//! neither uses the sink.
//!
//! # Coordinates
//!
//! A context has an origin offset and a scale. A user-space point `p` lands
//! on device pixel `p * scale + origin`. Vector coordinates are snapped to
//! the pixel grid according to the line width; see [`align_to_pixels`].
//!
//! # Example
//!
//! ```ignore
//! use faint_draw::{Bitmap, DrawingContext, FillMode, Settings, Tri};
//! use kurbo::Rect;
//!
//! let mut canvas = Bitmap::filled(100, 50, WHITE)?;
//! let mut dc = DrawingContext::new(&mut canvas, sink);
//! let s = Settings::default().with_fill_mode(FillMode::BorderAndFill);
//! dc.ellipse(&Tri::from_rect(Rect::new(10.0, 10.0, 90.0, 40.0)), &s);
//! ```

mod arc;
mod arrow;
mod bitmap;
pub mod brush;
mod context;
mod device;
mod error;
pub mod filter;
mod paint;
mod path;
pub mod raster;
mod settings;
mod sink;
mod text;
mod tri;

pub use arc::{AngleSpan, arc_as_path, arc_end_points, ellipse_as_path, required_curve_count};
pub use arrow::{Arrowhead, LineSegment, arrowhead, head_length};
pub use bitmap::{
    Bitmap, IntPoint, IntRect, blend, blend_masked, blend_over, blit, blit_masked,
    scale_bilinear, scale_nearest,
};
pub use context::{DrawingContext, align_to_pixels};
pub use error::DrawError;
pub use filter::Filter;
pub use paint::{
    Color, ColorStop, Gradient, LinearGradient, Paint, Pattern, RadialGradient, unit_frame,
};
pub use path::{PathPt, control_bounds, spline, to_bez_path};
pub use settings::{
    ArrowHead, BackgroundStyle, BitmapComposite, BrushShape, FillMode, FontDesc, LineCap,
    LineJoin, Settings,
};
pub use sink::{PathSink, PathSinkExt};
pub use text::{TextShape, TextShaper};
pub use tri::{Tri, area, rotated, scaled, skewed, translated};

pub use peniko::color::Rgba8;
