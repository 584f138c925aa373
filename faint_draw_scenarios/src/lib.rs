// Copyright 2025 the Faint Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Development-only end-to-end scenarios for the Faint drawing engine.
//!
//! Each scenario draws onto a white canvas through a [`faint_draw::DrawingContext`]
//! and then checks a handful of pixels of the result. The scenarios run
//! against every path sink in the workspace:
//!
//! - `faint_draw_vello_cpu`: all scenarios, with pixel checks.
//! - `faint_draw_ref`: all scenarios; pixel checks only for those that do not
//!   depend on vector output, plus balanced sink state for the rest.
//!
//! ## Run tests
//!
//! - Vello CPU: `cargo test -p faint_draw_scenarios --test vello_cpu_scenarios`
//! - Recording: `cargo test -p faint_draw_scenarios --test recording_scenarios`
//!
//! ## Filter scenarios
//!
//! To run only a subset, set `FAINT_SCENARIO` (supports `*` globs):
//!
//! - Single scenario: `FAINT_SCENARIO=arrow_line cargo test -p faint_draw_scenarios`
//! - Multiple patterns (comma/whitespace-separated): `FAINT_SCENARIO='pie_*,brush_*'`
//!
//! Set `RUST_LOG=faint_draw=trace` to see every draw call.

#![allow(
    missing_docs,
    reason = "development-only crate; scenarios are self-documenting via their names"
)]

pub mod scenarios;
