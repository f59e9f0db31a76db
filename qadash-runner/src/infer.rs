// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field inference for drift-prone table headers.
//!
//! The load-test tool has renamed its statistics columns more than once
//! across its version history ("# requests" vs "Request Count", and at least
//! three spellings of "average response time"), so the pipeline treats
//! schema drift as the steady state. Each canonical column carries an
//! ordered list of pattern tiers from most- to least-specific; a tier is a
//! conjunction of lowercase substrings that must all appear in a header.
//! Headers are evaluated in their original order within a tier, and only if
//! no header satisfies a tier does matching fall back to the next one. The
//! tiering exists because naive single-substring matching produces false
//! positives: "failure" alone would happily match a "Failures/s" rate column
//! when "Failure Count" was intended.
//!
//! The tier table is data, not code: a new tool version that renames a
//! column again should only ever need a new entry here.

/// A canonical column of the load-test statistics table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CanonicalColumn {
    /// The endpoint name column.
    EndpointName,
    /// The per-endpoint request count.
    RequestCount,
    /// The per-endpoint failure count.
    FailureCount,
    /// The per-endpoint average response time.
    AvgResponseTime,
}

impl CanonicalColumn {
    /// Stable name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalColumn::EndpointName => "endpoint name",
            CanonicalColumn::RequestCount => "request count",
            CanonicalColumn::FailureCount => "failure count",
            CanonicalColumn::AvgResponseTime => "average response time",
        }
    }
}

/// Ordered pattern tiers per canonical column. Within a column, earlier
/// tiers are more specific and always win over later ones.
static PATTERN_TIERS: &[(CanonicalColumn, &[&[&str]])] = &[
    (CanonicalColumn::EndpointName, &[&["name"]]),
    (
        CanonicalColumn::RequestCount,
        &[
            &["request", "count"],
            &["#", "request"],
            &["request"],
        ],
    ),
    (
        CanonicalColumn::FailureCount,
        &[
            &["failure", "count"],
            &["#", "failure"],
            &["failure"],
        ],
    ),
    (
        CanonicalColumn::AvgResponseTime,
        &[
            &["average", "response", "time"],
            &["avg", "response", "time"],
            &["average", "response"],
        ],
    ),
];

fn tiers_for(column: CanonicalColumn) -> &'static [&'static [&'static str]] {
    PATTERN_TIERS
        .iter()
        .find(|(candidate, _)| *candidate == column)
        .map(|(_, tiers)| *tiers)
        .unwrap_or(&[])
}

/// Resolves a canonical column against an observed header row.
///
/// Returns the index of the first header (in original order) satisfying the
/// most specific tier that any header satisfies, or `None` if every tier is
/// exhausted. Matching is case-insensitive and independent of column
/// position. On `None` the caller must report schema drift carrying the
/// observed headers; it must never guess a column.
pub fn resolve(headers: &[String], column: CanonicalColumn) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    for tier in tiers_for(column) {
        let hit = lowered
            .iter()
            .position(|header| tier.iter().all(|needle| header.contains(needle)));
        if hit.is_some() {
            return hit;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    // The three historical spellings of the average response time column all
    // resolve to the same canonical column.
    #[test_case("Average response time"; "sentence case")]
    #[test_case("Average Response Time"; "title case")]
    #[test_case("avg_response_time")]
    fn avg_response_time_spellings(spelling: &str) {
        let headers = headers(&["Name", spelling]);
        assert_eq!(resolve(&headers, CanonicalColumn::AvgResponseTime), Some(1));
    }

    #[test]
    fn specific_tier_beats_rate_column() {
        // "Failures/s" satisfies the loosest tier, but "Failure Count"
        // satisfies a more specific one and must win regardless of order.
        let headers = headers(&["Name", "Failures/s", "Failure Count"]);
        assert_eq!(resolve(&headers, CanonicalColumn::FailureCount), Some(2));
    }

    #[test]
    fn hash_prefixed_spelling() {
        let headers = headers(&["Name", "# requests", "# failures"]);
        assert_eq!(resolve(&headers, CanonicalColumn::RequestCount), Some(1));
        assert_eq!(resolve(&headers, CanonicalColumn::FailureCount), Some(2));
    }

    #[test]
    fn matching_is_position_independent() {
        let headers = headers(&["Request Count", "Name"]);
        assert_eq!(resolve(&headers, CanonicalColumn::RequestCount), Some(0));
        assert_eq!(resolve(&headers, CanonicalColumn::EndpointName), Some(1));
    }

    #[test]
    fn unresolvable_column_is_none() {
        let headers = headers(&["Name", "Throughput"]);
        assert_eq!(resolve(&headers, CanonicalColumn::FailureCount), None);
        assert_eq!(resolve(&headers, CanonicalColumn::AvgResponseTime), None);
    }

    #[test]
    fn first_header_wins_within_a_tier() {
        let headers = headers(&["Request Count", "Retry Request Count"]);
        assert_eq!(resolve(&headers, CanonicalColumn::RequestCount), Some(0));
    }
}
