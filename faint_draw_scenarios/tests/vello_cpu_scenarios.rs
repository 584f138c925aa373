// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenarios rendered with `faint_draw_vello_cpu`.

use faint_draw::PathSink;
use faint_draw_scenarios::scenarios::render;
use faint_draw_vello_cpu::{VelloCpuSink, VelloCpuSinkConfig};
use vello_cpu::RenderMode;

mod common;

#[test]
fn scenarios() {
    let mut errors = Vec::new();
    common::run_scenarios(
        "vello_cpu",
        |scenario| {
            let (width, height) = scenario.size();
            // The u8 pipeline keeps results stable when `f32_pipeline` is also enabled.
            let config = VelloCpuSinkConfig {
                render_mode: RenderMode::OptimizeSpeed,
            };
            let mut sink = VelloCpuSink::new_with(width, height, config);
            let image = render(scenario, &mut sink).map_err(|e| e.to_string())?;
            match sink.error_string() {
                Some(err) => Err(format!("sink error: {err}")),
                None => Ok(image),
            }
        },
        |scenario, image| scenario.check(image),
        &mut errors,
    );

    common::assert_no_scenario_errors(errors);
}
