// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for scenario integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]

use faint_draw::Bitmap;
use faint_draw_scenarios::scenarios::{Scenario, selected_scenarios};

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Render every selected scenario with `render`, then run `check` on the result.
///
/// Failures are collected so one broken scenario does not hide the others.
pub(crate) fn run_scenarios(
    sink_name: &str,
    mut render: impl FnMut(&dyn Scenario) -> Result<Bitmap, String>,
    mut check: impl FnMut(&dyn Scenario, &Bitmap) -> Result<(), String>,
    errors: &mut Vec<String>,
) {
    init_logging();
    for scenario in selected_scenarios() {
        let outcome = render(scenario).and_then(|image| check(scenario, &image));
        if let Err(err) = outcome {
            errors.push(format!("{sink_name}/{}: {err}", scenario.name()));
        }
    }
}

pub(crate) fn assert_no_scenario_errors(errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "{} scenario(s) failed:\n  {}",
        errors.len(),
        errors.join("\n  ")
    );
}
