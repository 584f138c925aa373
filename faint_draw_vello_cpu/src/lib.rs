// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU–backed implementation of the Faint path sink.
//!
//! This crate implements [`PathSink`] on top of the sparse-strips
//! [`vello_cpu::RenderContext`]. Paths accumulate in device space; each fill
//! or stroke is rendered into the context, and
//! [`PathSink::composite_into`] rasterizes everything drawn since the last
//! composite and blends it over the target bitmap.
//!
//! Like a cairo context, the sink has a sticky error status. A transform
//! that cannot be inverted puts the sink into the error state and every
//! later drawing call is ignored.

use std::sync::Arc;

use faint_draw::{
    Bitmap, Color, DrawError, FontDesc, Gradient, LineCap, LineJoin, PathSink, TextShape,
    TextShaper,
};
use kurbo::{Affine, PathEl, Point, Vec2};
use peniko::{Extend, ImageAlphaType, ImageData, ImageFormat, ImageQuality, ImageSampler};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Join as CpuJoin, PathEl as CpuPathEl,
    Point as CpuPoint, Stroke,
};
use vello_cpu::{
    Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings,
};

/// Miter limit used for all strokes.
const MITER_LIMIT: f64 = 10.0;

/// Configuration for [`VelloCpuSink`].
#[derive(Copy, Clone, Debug)]
pub struct VelloCpuSinkConfig {
    /// Rendering pipeline selection.
    ///
    /// Defaults to [`RenderMode::OptimizeSpeed`], which renders through the
    /// `u8` pipeline whenever it is compiled in.
    pub render_mode: RenderMode,
}

impl Default for VelloCpuSinkConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::OptimizeSpeed,
        }
    }
}

#[derive(Clone, Debug)]
enum Source {
    Solid(Color),
    Gradient {
        gradient: peniko::Gradient,
        device_from_paint: Affine,
    },
    Image {
        image: CpuImage,
        device_from_paint: Affine,
    },
}

#[derive(Clone, Debug)]
struct GState {
    ctm: Affine,
    source: Source,
    line_width: f64,
    cap: LineCap,
    join: LineJoin,
    dashes: Vec<f64>,
    dash_offset: f64,
}

impl Default for GState {
    fn default() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            source: Source::Solid(Color::BLACK),
            line_width: 2.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            dashes: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

/// CPU-backed [`PathSink`] using `vello_cpu`.
///
/// A sink whose surface could not be created starts in the error state;
/// check [`PathSink::is_ok`] before drawing through it.
pub struct VelloCpuSink {
    /// `None` when the surface could not be created.
    ctx: Option<RenderContext>,
    width: u16,
    height: u16,
    /// Current path in device pixels.
    path: BezPath,
    state: GState,
    saved: Vec<GState>,
    /// Whether anything was rendered since the last composite.
    dirty: bool,
    shaper: Option<Box<dyn TextShaper>>,
    error: Option<String>,
}

impl core::fmt::Debug for VelloCpuSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VelloCpuSink")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl VelloCpuSink {
    /// Create a sink with a `width` by `height` pixel surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_with(width, height, VelloCpuSinkConfig::default())
    }

    /// Create a sink with the same size as `target`.
    pub fn for_target(target: &Bitmap) -> Self {
        Self::new(target.width(), target.height())
    }

    /// Create a sink with an explicit configuration.
    ///
    /// Both dimensions must be non-zero and fit in a `u16`; otherwise the
    /// sink reports [`DrawError::InvalidDimensions`] through
    /// [`PathSink::error_string`].
    pub fn new_with(width: u32, height: u32, config: VelloCpuSinkConfig) -> Self {
        let mut sink = Self {
            ctx: None,
            width: 0,
            height: 0,
            path: BezPath::new(),
            state: GState::default(),
            saved: Vec::new(),
            dirty: false,
            shaper: None,
            error: None,
        };
        match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => {
                let settings = RenderSettings {
                    render_mode: config.render_mode,
                    ..RenderSettings::default()
                };
                tracing::debug!(width, height, "vello_cpu sink created");
                sink.ctx = Some(RenderContext::new_with(w, h, settings));
                sink.width = w;
                sink.height = h;
            }
            _ => sink.fail(DrawError::InvalidDimensions { width, height }),
        }
        sink
    }

    /// Measure and outline text with `shaper`.
    pub fn with_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    /// Surface width in pixels; zero when the surface could not be created.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Surface height in pixels; zero when the surface could not be created.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn cpu_affine(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn device(&self, p: Point) -> CpuPoint {
        let d = self.state.ctm * p;
        CpuPoint::new(d.x, d.y)
    }

    fn fail(&mut self, err: DrawError) {
        if self.error.is_none() {
            tracing::warn!(%err, "vello_cpu sink entered error state");
            self.error = Some(err.to_string());
        }
    }

    fn transform(&mut self, xf: Affine) {
        if self.error.is_some() {
            return;
        }
        let ctm = self.state.ctm * xf;
        if ctm.determinant() == 0.0 || !ctm.is_finite() {
            self.fail(DrawError::Backend("invalid matrix (not invertible)".into()));
            return;
        }
        self.state.ctm = ctm;
    }

    /// Set the context paint so that `device_from_paint` holds under the
    /// context transform `xf`.
    fn apply_source(ctx: &mut RenderContext, source: &Source, xf: Affine) {
        match source {
            Source::Solid(color) => {
                ctx.set_paint(*color);
                ctx.set_paint_transform(CpuAffine::IDENTITY);
            }
            Source::Gradient {
                gradient,
                device_from_paint,
            } => {
                ctx.set_paint(gradient.clone());
                ctx.set_paint_transform(Self::cpu_affine(xf.inverse() * *device_from_paint));
            }
            Source::Image {
                image,
                device_from_paint,
            } => {
                ctx.set_paint(image.clone());
                ctx.set_paint_transform(Self::cpu_affine(xf.inverse() * *device_from_paint));
            }
        }
    }

    fn render_fill(&mut self) {
        if self.error.is_some() || self.path.is_empty() {
            return;
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        ctx.set_transform(CpuAffine::IDENTITY);
        Self::apply_source(ctx, &self.state.source, Affine::IDENTITY);
        ctx.fill_path(&self.path);
        self.dirty = true;
    }

    fn render_stroke(&mut self) {
        if self.error.is_some() || self.path.is_empty() {
            return;
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let ctm = self.state.ctm;
        let user_path = Self::cpu_affine(ctm.inverse()) * &self.path;
        let user_path = if self.state.dashes.is_empty() {
            user_path
        } else {
            vello_cpu::kurbo::dash(user_path.iter(), self.state.dash_offset, &self.state.dashes)
                .collect()
        };

        let mut stroke = Stroke::new(self.state.line_width);
        stroke.miter_limit = MITER_LIMIT;
        stroke.join = match self.state.join {
            LineJoin::Miter => CpuJoin::Miter,
            LineJoin::Round => CpuJoin::Round,
            LineJoin::Bevel => CpuJoin::Bevel,
        };
        let cap = match self.state.cap {
            LineCap::Butt => CpuCap::Butt,
            LineCap::Round => CpuCap::Round,
        };
        stroke.start_cap = cap;
        stroke.end_cap = cap;

        ctx.set_stroke(stroke);
        ctx.set_transform(Self::cpu_affine(ctm));
        Self::apply_source(ctx, &self.state.source, ctm);
        ctx.stroke_path(&user_path);
        self.dirty = true;
    }
}

impl PathSink for VelloCpuSink {
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
        self.render_fill();
        self.path.truncate(0);
    }

    fn fill_preserve(&mut self) {
        self.render_fill();
    }

    fn stroke(&mut self) {
        self.render_stroke();
        self.path.truncate(0);
    }

    fn set_source_rgba(&mut self, color: Color) {
        self.state.source = Source::Solid(color);
    }

    fn set_source_gradient(&mut self, gradient: &Gradient, user_from_paint: Affine) {
        self.state.source = Source::Gradient {
            gradient: gradient.to_peniko(),
            device_from_paint: self.state.ctm * user_from_paint,
        };
    }

    fn set_source_surface(&mut self, surface: &Arc<Bitmap>, user_from_paint: Affine) {
        let data = ImageData {
            data: peniko::Blob::from(surface.data().to_vec()),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: surface.width(),
            height: surface.height(),
        };
        let image = CpuImage {
            image: ImageSource::from_peniko_image_data(&data),
            sampler: ImageSampler {
                x_extend: Extend::Repeat,
                y_extend: Extend::Repeat,
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        };
        self.state.source = Source::Image {
            image,
            device_from_paint: self.state.ctm * user_from_paint,
        };
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.join = join;
    }

    fn set_dash(&mut self, dashes: &[f64], offset: f64) {
        // All-zero patterns would never advance.
        if dashes.iter().any(|d| *d < 0.0) || (!dashes.is_empty() && dashes.iter().all(|d| *d == 0.0))
        {
            self.fail(DrawError::Backend("invalid dash pattern".into()));
            return;
        }
        self.state.dashes = dashes.to_vec();
        self.state.dash_offset = offset;
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform(Affine::translate(offset));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform(Affine::rotate(angle));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::scale_non_uniform(sx, sy));
    }

    fn shape_text(&mut self, text: &str, font: &FontDesc) -> TextShape {
        self.shaper
            .as_ref()
            .map(|s| s.shape(text, font))
            .unwrap_or_default()
    }

    fn text_path(&mut self, text: &str, font: &FontDesc) {
        let Some(shaper) = &self.shaper else {
            return;
        };
        let outline = shaper.outline(text, font);
        for el in outline.elements() {
            let el = match *el {
                PathEl::MoveTo(p) => CpuPathEl::MoveTo(self.device(p)),
                PathEl::LineTo(p) => CpuPathEl::LineTo(self.device(p)),
                PathEl::QuadTo(a, p) => CpuPathEl::QuadTo(self.device(a), self.device(p)),
                PathEl::CurveTo(a, b, p) => {
                    CpuPathEl::CurveTo(self.device(a), self.device(b), self.device(p))
                }
                PathEl::ClosePath => CpuPathEl::ClosePath,
            };
            self.path.push(el);
        }
    }

    fn composite_into(&mut self, target: &mut Bitmap) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let mut pixmap = Pixmap::new(self.width, self.height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        ctx.reset();

        let pixels = pixmap.take_unpremultiplied();
        for (y, row) in (0_i32..).zip(pixels.chunks_exact(usize::from(self.width))) {
            for (x, px) in (0_i32..).zip(row) {
                if px.a != 0 {
                    target.blend_pixel(x, y, *px);
                }
            }
        }
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn error_string(&self) -> Option<String> {
        self.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faint_draw::{
        ColorStop, DrawingContext, FillMode, LinearGradient, Paint, Pattern, Rgba8, Settings, Tri,
    };
    use kurbo::Rect;

    const WHITE: Rgba8 = Rgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    const BLACK: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    fn canvas(w: u32, h: u32) -> Bitmap {
        Bitmap::filled(w, h, WHITE).expect("alloc")
    }

    fn close(a: Rgba8, b: Rgba8, tol: u8) -> bool {
        a.r.abs_diff(b.r) <= tol
            && a.g.abs_diff(b.g) <= tol
            && a.b.abs_diff(b.b) <= tol
            && a.a.abs_diff(b.a) <= tol
    }

    #[test]
    fn bad_dimensions_put_sink_in_error_state() {
        for (w, h) in [(0, 10), (70_000, 10)] {
            let mut sink = VelloCpuSink::new(w, h);
            assert!(!sink.is_ok(), "{w}x{h} accepted");
            let message = sink.error_string().expect("error recorded");
            assert!(message.contains(&w.to_string()), "{message}");

            sink.move_to(Point::ZERO);
            sink.line_to(Point::new(4.0, 4.0));
            sink.stroke();
            let mut bmp = canvas(4, 4);
            let before = bmp.clone();
            sink.composite_into(&mut bmp);
            assert_eq!(bmp, before, "failed sink draws nothing");
        }
        assert!(VelloCpuSink::new(10, 10).is_ok());
    }

    #[test]
    fn filled_rectangle_covers_its_pixels() {
        let mut bmp = canvas(20, 20);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::new(&mut bmp, sink);
        let s = Settings::default()
            .with_fill_mode(FillMode::Fill)
            .with_bg(Color::BLACK);
        dc.rectangle(&Tri::from_rect(Rect::new(5.0, 5.0, 15.0, 15.0)), &s);
        assert_eq!(dc.target().get(10, 10), Some(BLACK));
        assert_eq!(dc.target().get(5, 5), Some(BLACK));
        assert_eq!(dc.target().get(15, 15), Some(WHITE));
        assert_eq!(dc.target().get(2, 2), Some(WHITE));
    }

    #[test]
    fn one_pixel_line_is_crisp() {
        let mut bmp = canvas(20, 20);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::new(&mut bmp, sink);
        dc.line(Point::new(2.0, 10.0), Point::new(18.0, 10.0), &Settings::default());
        assert_eq!(dc.target().get(10, 10), Some(BLACK), "line row fully covered");
        assert_eq!(dc.target().get(10, 9), Some(WHITE), "row above untouched");
        assert_eq!(dc.target().get(10, 11), Some(WHITE), "row below untouched");
    }

    #[test]
    fn linear_gradient_runs_left_to_right() {
        let mut bmp = canvas(100, 50);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::new(&mut bmp, sink);
        let gradient = Paint::Gradient(Gradient::Linear(LinearGradient {
            angle: 0.0,
            stops: vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(1.0, Color::WHITE),
            ],
            object_aligned: false,
        }));
        let s = Settings::default()
            .with_fill_mode(FillMode::Fill)
            .with_bg(gradient);
        dc.rectangle(&Tri::from_rect(Rect::new(0.0, 0.0, 100.0, 50.0)), &s);
        let left = dc.target().get(1, 25).expect("in bounds");
        let mid = dc.target().get(50, 25).expect("in bounds");
        let right = dc.target().get(98, 25).expect("in bounds");
        assert!(left.r < 16, "left {left:?}");
        assert!(mid.r.abs_diff(128) < 16, "mid {mid:?}");
        assert!(right.r > 240, "right {right:?}");
    }

    #[test]
    fn pattern_repeats() {
        let mut tile = Bitmap::filled(2, 2, WHITE).expect("alloc");
        tile.put(0, 0, BLACK);
        tile.put(1, 1, BLACK);
        let pattern = Paint::Pattern(Pattern {
            bitmap: Arc::new(tile),
            anchor: Point::ZERO,
            object_aligned: false,
        });
        let mut bmp = canvas(10, 10);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::new(&mut bmp, sink);
        let s = Settings::default()
            .with_fill_mode(FillMode::Fill)
            .with_bg(pattern);
        dc.rectangle(&Tri::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0)), &s);
        assert!(close(dc.target().get(4, 4).expect("in bounds"), BLACK, 8));
        assert!(close(dc.target().get(5, 4).expect("in bounds"), WHITE, 8));
        assert!(close(dc.target().get(7, 7).expect("in bounds"), BLACK, 8));
    }

    #[test]
    fn composite_without_drawing_is_a_noop() {
        let mut sink = VelloCpuSink::new(4, 4);
        let mut bmp = canvas(4, 4);
        let before = bmp.clone();
        sink.composite_into(&mut bmp);
        assert_eq!(bmp, before);
    }

    #[test]
    fn composite_clears_rendered_pixels() {
        let mut sink = VelloCpuSink::new(8, 8);
        sink.move_to(Point::new(0.0, 0.0));
        sink.line_to(Point::new(8.0, 0.0));
        sink.line_to(Point::new(8.0, 8.0));
        sink.line_to(Point::new(0.0, 8.0));
        sink.close_path();
        sink.fill();
        let mut first = canvas(8, 8);
        sink.composite_into(&mut first);
        assert_eq!(first.get(3, 3), Some(BLACK));

        let mut second = canvas(8, 8);
        sink.composite_into(&mut second);
        assert_eq!(second.get(3, 3), Some(WHITE));
    }

    #[test]
    fn singular_transform_is_sticky() {
        let mut sink = VelloCpuSink::new(8, 8);
        sink.save();
        sink.scale(0.0, 0.0);
        sink.restore();
        assert!(!sink.is_ok());
        assert!(sink.error_string().is_some_and(|e| e.contains("invalid matrix")));

        sink.move_to(Point::ZERO);
        sink.line_to(Point::new(8.0, 8.0));
        sink.stroke();
        let mut bmp = canvas(8, 8);
        let before = bmp.clone();
        sink.composite_into(&mut bmp);
        assert_eq!(bmp, before, "nothing drawn after the error");
    }

    #[test]
    fn dashed_line_has_gaps() {
        let mut bmp = canvas(40, 10);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::new(&mut bmp, sink);
        let s = Settings {
            dashed: true,
            ..Settings::default().with_line_width(2.0)
        };
        dc.line(Point::new(0.0, 5.0), Point::new(40.0, 5.0), &s);
        // Dashes are four units on, four off.
        assert_eq!(dc.target().get(1, 5), Some(BLACK));
        assert_eq!(dc.target().get(6, 5), Some(WHITE));
        assert_eq!(dc.target().get(9, 5), Some(BLACK));
    }

    #[test]
    fn scaled_context_draws_in_device_pixels() {
        let mut bmp = canvas(40, 40);
        let sink = VelloCpuSink::for_target(&bmp);
        let mut dc = DrawingContext::with_origin_and_scale(&mut bmp, sink, Vec2::new(10.0, 10.0), 2.0);
        let s = Settings::default()
            .with_fill_mode(FillMode::Fill)
            .with_bg(Color::BLACK);
        dc.ellipse(&Tri::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0)), &s);
        assert_eq!(dc.target().get(20, 20), Some(BLACK), "center");
        assert_eq!(dc.target().get(11, 11), Some(WHITE), "outside the corner");
        assert_eq!(dc.target().get(35, 20), Some(WHITE), "right of the ellipse");
    }
}
