// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalizer for the load-test statistics table.
//!
//! This is the single most failure-prone normalizer: the upstream tool has
//! renamed its columns repeatedly, so required columns are resolved through
//! the tiered inference engine and an unresolvable column is reported as
//! schema drift carrying the literal observed header list.

use crate::{
    errors::SourceError,
    infer::{self, CanonicalColumn},
    summaries::{EndpointStats, LoadSummary},
    table,
};
use indexmap::IndexMap;

/// Parses the load-test statistics table into a [`LoadSummary`].
///
/// `total_requests` and `total_failures` are column sums;
/// `avg_response_time_ms` is the plain column mean (mean of per-endpoint
/// means, matching the tool's own semantic). The per-endpoint map zips the
/// endpoint-name column with the resolved metric columns row by row.
pub fn parse_load_test(input: &str) -> Result<LoadSummary, SourceError> {
    let table = table::parse(input)
        .map_err(|err| SourceError::malformed(format!("invalid stats table: {err}")))?;

    let required = [
        CanonicalColumn::EndpointName,
        CanonicalColumn::RequestCount,
        CanonicalColumn::FailureCount,
        CanonicalColumn::AvgResponseTime,
    ];
    let mut resolved = [0usize; 4];
    for (slot, column) in required.into_iter().enumerate() {
        match infer::resolve(&table.headers, column) {
            Some(index) => resolved[slot] = index,
            // Never guess: surface exactly what the tool emitted this time.
            None => return Err(SourceError::schema_drift(table.headers)),
        }
    }
    let [name_col, requests_col, failures_col, avg_time_col] = resolved;

    let mut total_requests = 0u64;
    let mut total_failures = 0u64;
    let mut avg_time_sum = 0f64;
    let mut endpoints = IndexMap::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let name = cell(row, row_index, name_col)?.to_owned();
        let requests: u64 = parse_cell(row, row_index, requests_col)?;
        let failures: u64 = parse_cell(row, row_index, failures_col)?;
        let avg_response_time_ms: f64 = parse_cell(row, row_index, avg_time_col)?;

        total_requests += requests;
        total_failures += failures;
        avg_time_sum += avg_response_time_ms;
        endpoints.insert(
            name,
            EndpointStats {
                avg_response_time_ms,
                failures,
            },
        );
    }

    let avg_response_time_ms = if table.rows.is_empty() {
        0.0
    } else {
        avg_time_sum / table.rows.len() as f64
    };

    Ok(LoadSummary {
        total_requests,
        total_failures,
        avg_response_time_ms,
        endpoints,
    })
}

fn cell<'row>(
    row: &'row [String],
    row_index: usize,
    column: usize,
) -> Result<&'row str, SourceError> {
    row.get(column).map(String::as_str).ok_or_else(|| {
        SourceError::malformed(format!(
            "row {} is missing column {}",
            row_index + 1,
            column + 1
        ))
    })
}

fn parse_cell<T: std::str::FromStr>(
    row: &[String],
    row_index: usize,
    column: usize,
) -> Result<T, SourceError> {
    let raw = cell(row, row_index, column)?;
    raw.trim().parse().map_err(|_| {
        SourceError::malformed(format!(
            "row {}: `{raw}` is not a number",
            row_index + 1
        ))
    })
}
