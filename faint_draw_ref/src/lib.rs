// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Faint Draw Reference Sink.
//!
//! This crate provides [`RecordingSink`], a small, stateful implementation of
//! [`PathSink`] for **call recording and state tracing**.
//!
//! It is not a renderer:
//! - It does **not** rasterize to pixels; [`PathSink::composite_into`]
//!   leaves the target untouched.
//! - It is intended for tests and debugging that want to assert on the
//!   paths a drawing context emits and the sink state at the time each path
//!   is filled or stroked.
//!
//! Paths are recorded in device space: every point is mapped through the
//! transform current when it was added, the way a cairo context does it.

use std::sync::Arc;

use faint_draw::{
    Bitmap, Color, FontDesc, Gradient, LineCap, LineJoin, PathSink, TextShape, TextShaper,
};
use kurbo::{Affine, BezPath, Point, Vec2};

/// The current source of a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    /// Solid color.
    Rgba(Color),
    /// Gradient with its paint space placed in device space.
    Gradient {
        /// The gradient.
        gradient: Gradient,
        /// Map from paint space to device pixels.
        device_from_paint: Affine,
    },
    /// Repeating bitmap with its pixel space placed in device space.
    Surface {
        /// The bitmap.
        surface: Arc<Bitmap>,
        /// Map from bitmap pixels to device pixels.
        device_from_paint: Affine,
    },
}

/// Snapshot of the current state inside the sink.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    /// Current transform from user space to device pixels.
    pub transform: Affine,
    /// Current source.
    pub source: Source,
    /// Stroke width in user space.
    pub line_width: f64,
    /// Stroke end caps.
    pub line_cap: LineCap,
    /// Stroke joins.
    pub line_join: LineJoin,
    /// Dash pattern; empty when dashing is off.
    pub dashes: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
    /// Number of unmatched [`PathSink::save`] calls.
    pub save_depth: u32,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            source: Source::Rgba(Color::BLACK),
            line_width: 2.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dashes: Vec::new(),
            dash_offset: 0.0,
            save_depth: 0,
        }
    }
}

/// Event recorded by the sink.
#[derive(Clone, Debug)]
pub enum Event {
    /// The current path was filled.
    Fill {
        /// Filled path, in device space.
        path: BezPath,
        /// Whether the path was kept afterwards.
        preserve: bool,
        /// Snapshot at the time of filling.
        state: StateSnapshot,
    },
    /// The current path was stroked.
    Stroke {
        /// Stroked path, in device space.
        path: BezPath,
        /// Snapshot at the time of stroking.
        state: StateSnapshot,
    },
    /// Text outlines were appended to the current path.
    TextPath {
        /// The text.
        text: String,
        /// The font it was set in.
        font: FontDesc,
    },
    /// The sink was asked to composite onto a target.
    Composite,
}

/// Recording implementation of [`PathSink`].
///
/// Text is measured and outlined with an optional [`TextShaper`]; without
/// one, text has no size and no outlines.
#[derive(Default)]
pub struct RecordingSink {
    events: Vec<Event>,
    path: BezPath,
    state: StateSnapshot,
    saved: Vec<StateSnapshot>,
    shaper: Option<Box<dyn TextShaper>>,
    error: Option<String>,
}

impl core::fmt::Debug for RecordingSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordingSink")
            .field("events", &self.events)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("saved", &self.saved.len())
            .field("shaper", &self.shaper.is_some())
            .field("error", &self.error)
            .finish()
    }
}

impl RecordingSink {
    /// A sink that measures and outlines text with `shaper`.
    pub fn with_shaper(shaper: impl TextShaper + 'static) -> Self {
        Self {
            shaper: Some(Box::new(shaper)),
            ..Self::default()
        }
    }

    /// A sink that reports itself broken with `message`.
    ///
    /// It still records calls.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Returns a slice of recorded events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Clears all recorded events but keeps the current state and path.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// The current state.
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// The path accumulated since the last fill, stroke or `new_path`, in
    /// device space.
    pub fn current_path(&self) -> &BezPath {
        &self.path
    }

    /// Filled and stroked paths in order, paired with whether each was a fill.
    pub fn painted(&self) -> impl Iterator<Item = (&BezPath, bool)> {
        self.events.iter().filter_map(|e| match e {
            Event::Fill { path, .. } => Some((path, true)),
            Event::Stroke { path, .. } => Some((path, false)),
            _ => None,
        })
    }

    fn device(&self, p: Point) -> Point {
        self.state.transform * p
    }
}

impl PathSink for RecordingSink {
    fn move_to(&mut self, p: Point) {
        let p = self.device(p);
        self.path.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        let p = self.device(p);
        self.path.line_to(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        let (c1, c2, to) = (self.device(c1), self.device(c2), self.device(to));
        self.path.curve_to(c1, c2, to);
    }

    fn close_path(&mut self) {
        self.path.close_path();
    }

    fn new_path(&mut self) {
        self.path.truncate(0);
    }

    fn fill(&mut self) {
        self.events.push(Event::Fill {
            path: core::mem::take(&mut self.path),
            preserve: false,
            state: self.state.clone(),
        });
    }

    fn fill_preserve(&mut self) {
        self.events.push(Event::Fill {
            path: self.path.clone(),
            preserve: true,
            state: self.state.clone(),
        });
    }

    fn stroke(&mut self) {
        self.events.push(Event::Stroke {
            path: core::mem::take(&mut self.path),
            state: self.state.clone(),
        });
    }

    fn set_source_rgba(&mut self, color: Color) {
        self.state.source = Source::Rgba(color);
    }

    fn set_source_gradient(&mut self, gradient: &Gradient, user_from_paint: Affine) {
        self.state.source = Source::Gradient {
            gradient: gradient.clone(),
            device_from_paint: self.state.transform * user_from_paint,
        };
    }

    fn set_source_surface(&mut self, surface: &Arc<Bitmap>, user_from_paint: Affine) {
        self.state.source = Source::Surface {
            surface: Arc::clone(surface),
            device_from_paint: self.state.transform * user_from_paint,
        };
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_dash(&mut self, dashes: &[f64], offset: f64) {
        self.state.dashes = dashes.to_vec();
        self.state.dash_offset = offset;
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
        self.state.save_depth += 1;
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform *= Affine::translate(offset);
    }

    fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    fn shape_text(&mut self, text: &str, font: &FontDesc) -> TextShape {
        self.shaper
            .as_ref()
            .map(|s| s.shape(text, font))
            .unwrap_or_default()
    }

    fn text_path(&mut self, text: &str, font: &FontDesc) {
        if let Some(shaper) = &self.shaper {
            let outline = shaper.outline(text, font);
            self.path
                .extend(outline.elements().iter().map(|el| self.state.transform * *el));
        }
        self.events.push(Event::TextPath {
            text: text.to_owned(),
            font: font.clone(),
        });
    }

    fn composite_into(&mut self, _target: &mut Bitmap) {
        self.events.push(Event::Composite);
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn error_string(&self) -> Option<String> {
        self.error.clone()
    }
}
