// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard composition and rendering.
//!
//! [`compose`] assembles the render model; [`render`] is the pure function
//! from that model to the HTML document. The model keeps Absent and Error
//! strictly apart: a source that failed to parse is shown with its
//! diagnostic, never as a quietly missing section.

use crate::{
    source::SourceKind,
    summaries::{
        AcceptanceSummary, CaseStatus, ColdStartMetric, LoadSummary, SourceResult, SuiteSummary,
    },
    trend::TrendSet,
};
use chrono::{DateTime, Utc};
use swrite::{swriteln, SWrite};

/// One source's slice of the dashboard: the current-run outcome plus
/// whatever trend history exists.
#[derive(Clone, Debug)]
pub struct SourceSection<T> {
    /// The current-run outcome.
    pub result: SourceResult<T>,
    /// Trend series built from the history log. Empty when no history.
    pub trend: TrendSet,
}

/// The full render model handed to the templating step.
#[derive(Clone, Debug)]
pub struct DashboardModel {
    /// When this dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Unit-test section.
    pub unit_test: SourceSection<SuiteSummary>,
    /// Acceptance-test section.
    pub acceptance: SourceSection<AcceptanceSummary>,
    /// Load-test section.
    pub load_test: SourceSection<LoadSummary>,
    /// Cold-start section. The cloud metric has no history log, so no trend.
    pub cold_start: SourceResult<ColdStartMetric>,
}

/// Assembles the render model from per-source outcomes and trend sets.
pub fn compose(
    generated_at: DateTime<Utc>,
    unit_test: SourceSection<SuiteSummary>,
    acceptance: SourceSection<AcceptanceSummary>,
    load_test: SourceSection<LoadSummary>,
    cold_start: SourceResult<ColdStartMetric>,
) -> DashboardModel {
    DashboardModel {
        generated_at,
        unit_test,
        acceptance,
        load_test,
        cold_start,
    }
}

/// Renders the model into a standalone HTML document.
pub fn render(model: &DashboardModel) -> String {
    let mut out = String::new();
    swriteln!(out, "<!DOCTYPE html>");
    swriteln!(out, "<html>");
    swriteln!(out, "<head>");
    swriteln!(out, "<title>Unified QA Dashboard</title>");
    swriteln!(out, "<style>");
    swriteln!(
        out,
        "body {{ font-family: Arial, sans-serif; margin: 20px; }}\n\
         h1, h2 {{ color: #2C3E50; }}\n\
         .section {{ margin-bottom: 40px; }}\n\
         .metric {{ padding: 10px; border: 1px solid #ccc; border-radius: 5px; margin: 5px 0; }}\n\
         .error {{ color: #B03A2E; }}\n\
         table {{ border-collapse: collapse; }}\n\
         td, th {{ border: 1px solid #ccc; padding: 4px 10px; text-align: left; }}"
    );
    swriteln!(out, "</style>");
    swriteln!(out, "</head>");
    swriteln!(out, "<body>");
    swriteln!(out, "<h1>Unified QA Dashboard</h1>");
    swriteln!(
        out,
        "<p>Generated at {}</p>",
        escape(&model.generated_at.to_rfc3339())
    );

    render_unit_test(&mut out, &model.unit_test);
    render_acceptance(&mut out, &model.acceptance);
    render_load_test(&mut out, &model.load_test);
    render_cold_start(&mut out, &model.cold_start);

    swriteln!(out, "</body>");
    swriteln!(out, "</html>");
    out
}

fn render_unit_test(out: &mut String, section: &SourceSection<SuiteSummary>) {
    open_section(out, SourceKind::UnitTest);
    match &section.result {
        SourceResult::Present(summary) => {
            metric(out, "Total Tests", &summary.tests.to_string());
            metric(out, "Failures", &summary.failures.to_string());
            metric(out, "Errors", &summary.errors.to_string());
            metric(out, "Skipped", &summary.skipped.to_string());
        }
        other => render_non_present(out, other.as_unit_ref()),
    }
    render_trend(out, &section.trend);
    close_section(out);
}

fn render_acceptance(out: &mut String, section: &SourceSection<AcceptanceSummary>) {
    open_section(out, SourceKind::AcceptanceTest);
    match &section.result {
        SourceResult::Present(summary) => {
            metric(out, "Total Cases", &summary.total.to_string());
            metric(out, "Passed", &summary.pass.to_string());
            metric(out, "Failed", &summary.fail.to_string());
            if !summary.cases.is_empty() {
                swriteln!(out, "<table>");
                swriteln!(out, "<tr><th>Case</th><th>Status</th><th>Message</th></tr>");
                for case in &summary.cases {
                    let class = match case.status {
                        CaseStatus::Fail => " class=\"error\"",
                        CaseStatus::Pass | CaseStatus::Other => "",
                    };
                    swriteln!(
                        out,
                        "<tr{class}><td>{}</td><td>{}</td><td>{}</td></tr>",
                        escape(&case.name),
                        case.status.as_str(),
                        escape(&case.message)
                    );
                }
                swriteln!(out, "</table>");
            }
        }
        other => render_non_present(out, other.as_unit_ref()),
    }
    render_trend(out, &section.trend);
    close_section(out);
}

fn render_load_test(out: &mut String, section: &SourceSection<LoadSummary>) {
    open_section(out, SourceKind::LoadTest);
    match &section.result {
        SourceResult::Present(summary) => {
            metric(out, "Total Requests", &summary.total_requests.to_string());
            metric(out, "Failures", &summary.total_failures.to_string());
            metric(
                out,
                "Avg Response Time",
                &format!("{:.1} ms", summary.avg_response_time_ms),
            );
            if !summary.endpoints.is_empty() {
                swriteln!(out, "<table>");
                swriteln!(
                    out,
                    "<tr><th>Endpoint</th><th>Avg Response Time (ms)</th><th>Failures</th></tr>"
                );
                for (name, stats) in &summary.endpoints {
                    swriteln!(
                        out,
                        "<tr><td>{}</td><td>{:.1}</td><td>{}</td></tr>",
                        escape(name),
                        stats.avg_response_time_ms,
                        stats.failures
                    );
                }
                swriteln!(out, "</table>");
            }
        }
        other => render_non_present(out, other.as_unit_ref()),
    }
    render_trend(out, &section.trend);
    close_section(out);
}

fn render_cold_start(out: &mut String, result: &SourceResult<ColdStartMetric>) {
    open_section(out, SourceKind::CloudMetric);
    match result {
        SourceResult::Present(metric_value) => {
            metric(out, "Cold Start Count", &metric_value.value.to_string());
            metric(out, "Timestamp", &metric_value.timestamp);
        }
        other => render_non_present(out, other.as_unit_ref()),
    }
    close_section(out);
}

fn render_non_present(out: &mut String, result: SourceResult<()>) {
    match result {
        SourceResult::Absent => {
            swriteln!(out, "<p>No data found.</p>");
        }
        SourceResult::Error(error) => {
            swriteln!(out, "<p class=\"error\">Failed to read report: {}</p>", escape(&error.to_string()));
        }
        SourceResult::Present(()) => unreachable!("present handled by the caller"),
    }
}

fn render_trend(out: &mut String, trend: &TrendSet) {
    swriteln!(out, "<h3>Trend</h3>");
    if trend.values().all(|series| series.is_empty()) {
        swriteln!(out, "<p>No trend data yet.</p>");
        return;
    }
    for (field, series) in trend {
        if series.is_empty() {
            continue;
        }
        swriteln!(out, "<h4>{}</h4>", escape(field));
        swriteln!(out, "<table>");
        swriteln!(out, "<tr><th>Run</th><th>Value</th></tr>");
        for point in series {
            swriteln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&point.timestamp),
                point.value
            );
        }
        swriteln!(out, "</table>");
    }
}

fn open_section(out: &mut String, kind: SourceKind) {
    swriteln!(out, "<div class=\"section\">");
    swriteln!(out, "<h2>{}</h2>", kind.display_name());
}

fn close_section(out: &mut String) {
    swriteln!(out, "</div>");
}

fn metric(out: &mut String, label: &str, value: &str) {
    swriteln!(
        out,
        "<div class=\"metric\">{}: {}</div>",
        escape(label),
        escape(value)
    );
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl<T> SourceResult<T> {
    /// The outcome with the summary stripped, for shared non-present
    /// rendering.
    fn as_unit_ref(&self) -> SourceResult<()> {
        match self {
            SourceResult::Present(_) => SourceResult::Present(()),
            SourceResult::Absent => SourceResult::Absent,
            SourceResult::Error(error) => SourceResult::Error(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::SourceError, summaries::Count, trend::TrendPoint};
    use chrono::TimeZone;

    fn empty_model() -> DashboardModel {
        compose(
            Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap(),
            SourceSection {
                result: SourceResult::Absent,
                trend: TrendSet::new(),
            },
            SourceSection {
                result: SourceResult::Absent,
                trend: TrendSet::new(),
            },
            SourceSection {
                result: SourceResult::Absent,
                trend: TrendSet::new(),
            },
            SourceResult::Absent,
        )
    }

    #[test]
    fn absent_sources_render_no_data() {
        let html = render(&empty_model());
        assert!(html.contains("No data found."));
        assert!(html.contains("No trend data yet."));
        assert!(!html.contains("Failed to read report"));
    }

    #[test]
    fn error_renders_diagnostic_not_absence() {
        let mut model = empty_model();
        model.load_test.result = SourceResult::Error(SourceError::schema_drift([
            "Name",
            "Throughput",
        ]));
        let html = render(&model);
        assert!(html.contains("Failed to read report"));
        // The observed header list must be visible verbatim.
        assert!(html.contains("Throughput"));
    }

    #[test]
    fn present_summary_renders_values() {
        let mut model = empty_model();
        model.unit_test.result = SourceResult::Present(SuiteSummary {
            tests: Count::Known(12),
            failures: Count::Known(1),
            errors: Count::Known(0),
            skipped: Count::Unknown,
        });
        let html = render(&model);
        assert!(html.contains("Total Tests: 12"));
        assert!(html.contains("Skipped: unknown"));
    }

    #[test]
    fn trend_series_render_in_order() {
        let mut model = empty_model();
        let mut trend = TrendSet::new();
        trend.insert(
            "failures".to_owned(),
            vec![
                TrendPoint {
                    timestamp: "2026-08-01T00:00:00Z".to_owned(),
                    value: 3.0,
                },
                TrendPoint {
                    timestamp: "2026-08-02T00:00:00Z".to_owned(),
                    value: 1.0,
                },
            ],
        );
        model.unit_test.trend = trend;
        let html = render(&model);
        let first = html.find("2026-08-01T00:00:00Z").unwrap();
        let second = html.find("2026-08-02T00:00:00Z").unwrap();
        assert!(first < second);
    }

    #[test]
    fn markup_in_source_data_is_escaped() {
        let mut model = empty_model();
        model.acceptance.result = SourceResult::Present(AcceptanceSummary {
            total: 1,
            pass: 0,
            fail: 1,
            cases: vec![crate::summaries::CaseResult {
                name: "<script>alert(1)</script>".to_owned(),
                status: CaseStatus::Fail,
                message: "a & b".to_owned(),
            }],
        });
        let html = render(&model);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script>alert"));
    }
}
