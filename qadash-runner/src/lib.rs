// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core logic for qadash, the unified QA report dashboard.
//!
//! This crate turns raw, independently-produced QA artifacts (unit-test XML,
//! acceptance-test XML, load-test stats tables, cloud metric payloads) into a
//! normalized summary model, accumulates append-only per-source history logs
//! across runs, reduces those logs into trend series, and composes a single
//! render model for the dashboard artifact.
//!
//! The crate is a library of pure-ish building blocks plus one orchestration
//! entry point, [`pipeline::run`]. It never executes tests and never talks to
//! a live service; it only reads artifacts that other tools already produced.

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod history;
pub mod infer;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod summaries;
pub mod table;
pub mod trend;

pub use config::DashboardConfig;
pub use pipeline::{run, RunContext};
pub use summaries::SourceResult;
