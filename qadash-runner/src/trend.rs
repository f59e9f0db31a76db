// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trend aggregation over history logs.

use crate::history::HistoryRecord;
use indexmap::IndexMap;

/// One datapoint of a trend series.
#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    /// The run timestamp, as recorded in the history log.
    pub timestamp: String,
    /// The field value at that run.
    pub value: f64,
}

/// Trend series keyed by field name. Each series is in history-log order.
pub type TrendSet = IndexMap<String, Vec<TrendPoint>>;

/// Reduces a history log into one series per requested field.
///
/// Series keep log order (a ledger, not a sorted index). Cells that do not
/// parse as a number -- an unknown marker written as an empty cell, or a
/// field the log simply never had -- are skipped rather than turned into
/// fabricated zeros. Empty history yields an empty set, which the dashboard
/// renders as "no trend data" instead of an empty chart.
pub fn build_trend(records: &[HistoryRecord], fields: &[&str]) -> TrendSet {
    if records.is_empty() {
        return TrendSet::new();
    }
    let mut set = TrendSet::new();
    for field in fields {
        let series: Vec<TrendPoint> = records
            .iter()
            .filter_map(|record| {
                let value = record.fields.get(*field)?.trim().parse::<f64>().ok()?;
                Some(TrendPoint {
                    timestamp: record.timestamp.clone(),
                    value,
                })
            })
            .collect();
        set.insert((*field).to_owned(), series);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(ts: &str, failures: &str) -> HistoryRecord {
        HistoryRecord::new(ts)
            .field("tests", "12")
            .field("failures", failures)
    }

    #[test]
    fn empty_history_yields_empty_set() {
        assert!(build_trend(&[], &["failures"]).is_empty());
    }

    #[test]
    fn series_follows_log_order() {
        let records = vec![
            record("2026-08-01T00:00:00Z", "3"),
            record("2026-08-03T00:00:00Z", "1"),
            // Deliberately out of timestamp order: the log is a ledger and
            // the series must not re-sort it.
            record("2026-08-02T00:00:00Z", "2"),
        ];
        let set = build_trend(&records, &["failures"]);
        let series = &set["failures"];
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![3.0, 1.0, 2.0]
        );
        assert_eq!(series[2].timestamp, "2026-08-02T00:00:00Z");
    }

    #[test]
    fn unknown_cells_are_skipped() {
        let records = vec![
            record("2026-08-01T00:00:00Z", "3"),
            record("2026-08-02T00:00:00Z", ""),
            record("2026-08-03T00:00:00Z", "1"),
        ];
        let set = build_trend(&records, &["failures"]);
        assert_eq!(
            set["failures"].iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![3.0, 1.0]
        );
    }

    #[test]
    fn multiple_fields_build_multiple_series() {
        let records = vec![record("2026-08-01T00:00:00Z", "3")];
        let set = build_trend(&records, &["tests", "failures"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set["tests"][0].value, 12.0);
    }
}
