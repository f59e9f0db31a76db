// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source types and artifact reading.

use camino::Utf8Path;
use std::{fs, io};

/// A category of external report consumed by the pipeline.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SourceKind {
    /// JUnit-style unit-test summary XML.
    UnitTest,
    /// Acceptance-test output XML.
    AcceptanceTest,
    /// Load-test statistics table.
    LoadTest,
    /// Cloud metric feed payload.
    CloudMetric,
}

impl SourceKind {
    /// Stable identifier, used in log messages and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::UnitTest => "unit-test",
            SourceKind::AcceptanceTest => "acceptance-test",
            SourceKind::LoadTest => "load-test",
            SourceKind::CloudMetric => "cloud-metric",
        }
    }

    /// Human-readable section title.
    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::UnitTest => "Unit Tests",
            SourceKind::AcceptanceTest => "Acceptance Tests",
            SourceKind::LoadTest => "Load Tests",
            SourceKind::CloudMetric => "Cold Starts",
        }
    }

    /// The history log file name for this source, or `None` for sources
    /// that are not persisted (the cloud metric reports a single current
    /// sample and has no trend).
    pub fn history_file_name(self) -> Option<&'static str> {
        match self {
            SourceKind::UnitTest => Some("unit-test.csv"),
            SourceKind::AcceptanceTest => Some("acceptance-test.csv"),
            SourceKind::LoadTest => Some("load-test.csv"),
            SourceKind::CloudMetric => None,
        }
    }

    /// The canonical history field names for this source, in header order.
    ///
    /// This is the fixed header contract: the store establishes it on first
    /// append and rejects any record that deviates from it.
    pub fn history_fields(self) -> &'static [&'static str] {
        match self {
            SourceKind::UnitTest => &["tests", "failures", "errors", "skipped"],
            SourceKind::AcceptanceTest => &["total", "pass", "fail"],
            SourceKind::LoadTest => &["requests", "failures", "avg_response_time_ms"],
            SourceKind::CloudMetric => &[],
        }
    }
}

/// Reads a raw artifact, treating a missing file as absence rather than an
/// error. Any other I/O failure is returned as-is.
pub fn read_artifact(path: &Utf8Path) -> Result<Option<String>, io::Error> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}
