// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::f64::consts::FRAC_PI_2;

use faint_draw::filter::Invert;
use faint_draw::{
    AngleSpan, ArrowHead, BackgroundStyle, Bitmap, BrushShape, Color, ColorStop, DrawError,
    DrawingContext, FillMode, Gradient, IntPoint, LinearGradient, Paint, PathSink, Rgba8,
    Settings, Tri,
};
use kurbo::{Point, Rect, Vec2};

mod bitmaps;
mod lines;
mod paints;
mod shapes;

pub const DEFAULT_WIDTH: u32 = 100;
pub const DEFAULT_HEIGHT: u32 = 50;

pub const WHITE: Rgba8 = Rgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

/// The context every scenario draws through; the sink is chosen by the runner.
pub type ScenarioContext<'b, 's> = DrawingContext<'b, &'s mut dyn PathSink>;

pub trait Scenario: Sync {
    fn name(&self) -> &'static str;

    fn size(&self) -> (u32, u32) {
        (DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Whether [`Scenario::check`] needs pixels rendered by the path sink.
    fn vector(&self) -> bool {
        true
    }

    fn run(&self, dc: &mut ScenarioContext<'_, '_>) -> Result<(), DrawError>;

    fn check(&self, image: &Bitmap) -> Result<(), String>;
}

/// Draw `scenario` on a white canvas of its size through `sink`.
pub fn render(scenario: &dyn Scenario, sink: &mut dyn PathSink) -> Result<Bitmap, DrawError> {
    let (width, height) = scenario.size();
    let mut image = Bitmap::filled(width, height, WHITE)?;
    let mut dc = DrawingContext::new(&mut image, sink);
    scenario.run(&mut dc)?;
    Ok(image)
}

fn matches_glob(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return pattern == text;
    }

    let mut remainder = text;
    let mut first_part = true;
    for part in pattern.split('*') {
        if part.is_empty() {
            continue;
        }
        match remainder.find(part) {
            Some(idx) => {
                if first_part && !pattern.starts_with('*') && idx != 0 {
                    return false;
                }
                remainder = &remainder[idx + part.len()..];
            }
            None => return false,
        }
        first_part = false;
    }
    pattern.ends_with('*') || remainder.is_empty()
}

fn scenario_filters() -> Option<Vec<String>> {
    let raw = std::env::var("FAINT_SCENARIO").ok()?;
    let filters: Vec<String> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!filters.is_empty()).then_some(filters)
}

pub fn selected_scenarios() -> Vec<&'static dyn Scenario> {
    let Some(filters) = scenario_filters() else {
        return SCENARIOS.to_vec();
    };

    let selected: Vec<&'static dyn Scenario> = SCENARIOS
        .iter()
        .copied()
        .filter(|s| filters.iter().any(|f| matches_glob(f, s.name())))
        .collect();

    if selected.is_empty() {
        let available: Vec<&str> = SCENARIOS.iter().map(|s| s.name()).collect();
        panic!(
            "FAINT_SCENARIO matched no scenarios.\n  filter: {filters:?}\n  available: {available:?}"
        );
    }

    selected
}

fn pixel(image: &Bitmap, x: i32, y: i32) -> Result<Rgba8, String> {
    image.get(x, y).ok_or_else(|| {
        let (w, h) = (image.width(), image.height());
        format!("pixel ({x}, {y}) is outside the {w}x{h} image")
    })
}

/// Fail unless every channel of pixel `(x, y)` is within `tolerance` of `expected`.
fn expect_close(
    image: &Bitmap,
    x: i32,
    y: i32,
    expected: Rgba8,
    tolerance: u8,
) -> Result<(), String> {
    let got = pixel(image, x, y)?;
    let near = [
        (got.r, expected.r),
        (got.g, expected.g),
        (got.b, expected.b),
        (got.a, expected.a),
    ]
    .iter()
    .all(|(a, b)| a.abs_diff(*b) <= tolerance);
    if near {
        Ok(())
    } else {
        Err(format!("pixel ({x}, {y}) is {got:?}, expected {expected:?} ±{tolerance}"))
    }
}

/// Fail unless the red channel of pixel `(x, y)` lies in `range`.
fn expect_red_in(
    image: &Bitmap,
    x: i32,
    y: i32,
    range: core::ops::RangeInclusive<u8>,
) -> Result<(), String> {
    let got = pixel(image, x, y)?;
    if range.contains(&got.r) {
        Ok(())
    } else {
        Err(format!("pixel ({x}, {y}) is {got:?}, expected red in {range:?}"))
    }
}

fn rgba(r: u8, g: u8, b: u8) -> Rgba8 {
    Rgba8 { r, g, b, a: 255 }
}

fn fill(bg: impl Into<Paint>) -> Settings {
    Settings::default().with_fill_mode(FillMode::Fill).with_bg(bg)
}

pub const SCENARIOS: &[&dyn Scenario] = &[
    &paints::ObjectAlignedLinearGradient,
    &lines::ArrowLine,
    &lines::CrispHairline,
    &lines::BrushStrokeNoGap,
    &shapes::QuarterPie { antialias: true },
    &shapes::QuarterPie { antialias: false },
    &shapes::ScaledContext,
    &shapes::FilteredRectangle,
    &bitmaps::BitmapPastBounds,
    &bitmaps::BitmapMasked,
];
