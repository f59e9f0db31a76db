// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizers: one per source type.
//!
//! Each normalizer is a pure function from raw artifact text to either a
//! canonical summary or a [`SourceError`](crate::errors::SourceError). The
//! pipeline layers artifact reading on top to produce the full three-way
//! [`SourceResult`](crate::SourceResult).

mod cloudwatch;
mod junit;
mod locust;
mod robot;

pub use cloudwatch::parse_cloud_metric;
pub use junit::parse_unit_test;
pub use locust::parse_load_test;
pub use robot::parse_acceptance;
