// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The normalized summary model.
//!
//! Every source type normalizes into one of the types here. Instances are
//! built fresh on each run from raw input, never mutated afterwards, and
//! discarded after rendering; the only state that outlives a run is the
//! subset of fields copied into the history log.

use crate::errors::SourceError;
use indexmap::IndexMap;
use std::fmt;

/// A non-negative count that a source dialect may simply not expose.
///
/// Not every unit-test XML dialect carries all four summary attributes, so a
/// missing attribute is an explicit unknown rather than a zero or an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Count {
    /// The source reported this count.
    Known(u64),
    /// The source did not expose this count.
    Unknown,
}

impl Count {
    /// Returns the count if known.
    pub fn known(self) -> Option<u64> {
        match self {
            Count::Known(n) => Some(n),
            Count::Unknown => None,
        }
    }

    /// The value written into a history cell: the number, or an empty cell
    /// for unknown so the trend builder never fabricates a zero datapoint.
    pub fn history_cell(self) -> String {
        match self {
            Count::Known(n) => n.to_string(),
            Count::Unknown => String::new(),
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Known(n) => write!(f, "{n}"),
            Count::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<Option<u64>> for Count {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(n) => Count::Known(n),
            None => Count::Unknown,
        }
    }
}

/// Summary of a unit-test run, as reported by a JUnit-style XML artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuiteSummary {
    /// The total number of tests.
    pub tests: Count,
    /// The number of failed tests.
    pub failures: Count,
    /// The number of errored tests.
    pub errors: Count,
    /// The number of skipped tests.
    pub skipped: Count,
}

/// The status of a single acceptance-test case.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseStatus {
    /// The case passed.
    Pass,
    /// The case failed.
    Fail,
    /// The case reported something other than pass/fail, or no status at all.
    Other,
}

impl CaseStatus {
    /// Stable lowercase identifier, used in rendering and history cells.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Pass => "pass",
            CaseStatus::Fail => "fail",
            CaseStatus::Other => "other",
        }
    }
}

/// The outcome of one acceptance-test case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseResult {
    /// The case name as reported by the source.
    pub name: String,
    /// Pass/fail/other.
    pub status: CaseStatus,
    /// The status message, empty if the source carried none.
    pub message: String,
}

/// Summary of an acceptance-test run.
///
/// `cases` preserves source order: a human scans the list top-to-bottom
/// against the original report, so it is never re-sorted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AcceptanceSummary {
    /// The total number of cases, as reported by the statistics node.
    pub total: u64,
    /// The number of passing cases.
    pub pass: u64,
    /// The number of failing cases.
    pub fail: u64,
    /// Per-case outcomes in report order.
    pub cases: Vec<CaseResult>,
}

/// Per-endpoint load-test metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndpointStats {
    /// Mean response time for this endpoint, in milliseconds.
    pub avg_response_time_ms: f64,
    /// Number of failed requests against this endpoint.
    pub failures: u64,
}

/// Summary of a load-test run.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadSummary {
    /// Sum of the request-count column across all endpoints.
    pub total_requests: u64,
    /// Sum of the failure-count column across all endpoints.
    pub total_failures: u64,
    /// Plain mean of the per-endpoint average response times.
    ///
    /// This is deliberately NOT request-weighted: it matches the source
    /// tool's own mean-of-means semantic, and changing the weighting here
    /// would silently diverge from the numbers the tool itself displays.
    pub avg_response_time_ms: f64,
    /// Per-endpoint breakdown, in table row order.
    pub endpoints: IndexMap<String, EndpointStats>,
}

/// The most recent cold-start sample from the cloud metric feed.
///
/// The feed may carry many datapoints; the model reports only the first
/// (most recent) one and does not aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct ColdStartMetric {
    /// The sampled value.
    pub value: f64,
    /// The sample timestamp, as the feed reported it.
    pub timestamp: String,
}

/// The three-way outcome of normalizing one source.
///
/// Every normalizer produces this, and the dashboard renders all three cases
/// distinctly: an `Error` is never displayed as if the source were merely
/// absent.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceResult<T> {
    /// The artifact was present and normalized successfully.
    Present(T),
    /// The artifact was not configured or its file does not exist.
    Absent,
    /// The artifact was present but could not be normalized.
    Error(SourceError),
}

impl<T> SourceResult<T> {
    /// Returns the normalized summary, if present.
    pub fn present(&self) -> Option<&T> {
        match self {
            SourceResult::Present(value) => Some(value),
            SourceResult::Absent | SourceResult::Error(_) => None,
        }
    }

    /// True if the artifact was missing (not an error).
    pub fn is_absent(&self) -> bool {
        matches!(self, SourceResult::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_display_and_history_cell() {
        assert_eq!(Count::Known(7).to_string(), "7");
        assert_eq!(Count::Unknown.to_string(), "unknown");
        assert_eq!(Count::Known(7).history_cell(), "7");
        assert_eq!(Count::Unknown.history_cell(), "");
    }

    #[test]
    fn source_result_distinguishes_absent_from_error() {
        let absent: SourceResult<SuiteSummary> = SourceResult::Absent;
        let error: SourceResult<SuiteSummary> =
            SourceResult::Error(SourceError::malformed("truncated document"));
        assert!(absent.is_absent());
        assert!(!error.is_absent());
        assert!(error.present().is_none());
    }
}
