// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The one-shot pipeline run.
//!
//! Per invocation: for each source, read -> normalize -> (on success) append
//! to history; then, regardless of current-run outcomes, read the full
//! history and build trends; finally compose, render and write the output
//! artifact. A failure to normalize one source never prevents processing of
//! the others, and history problems degrade to a warning plus an empty
//! trend rather than aborting the run.

use crate::{
    config::DashboardConfig,
    dashboard::{self, DashboardModel, SourceSection},
    errors::{PipelineError, SourceError},
    history::{HistoryRecord, HistoryStore},
    normalize,
    source::{self, SourceKind},
    summaries::{AcceptanceSummary, LoadSummary, SourceResult, SuiteSummary},
    trend::{self, TrendSet},
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

/// Per-run state, threaded explicitly through the pipeline.
///
/// There is deliberately no module-level mutable state here: everything a
/// run needs to know about itself lives in this struct, which keeps repeated
/// invocations deterministic and testable in isolation.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// When this run started. Also the timestamp written to history rows.
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// A context for a run starting now.
    pub fn now() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    fn history_timestamp(&self) -> String {
        self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Executes one full pipeline run and writes the dashboard artifact.
///
/// Returns the composed render model (useful for inspection and tests). The
/// only fatal failure is being unable to write the output document;
/// everything else is carried into the model as a per-source outcome.
pub fn run(config: &DashboardConfig, ctx: &RunContext) -> Result<DashboardModel, PipelineError> {
    let store = match HistoryStore::new(config.history.dir.clone()) {
        Ok(store) => Some(store),
        Err(error) => {
            warn!("history store unavailable, trends will be empty: {error}");
            None
        }
    };
    let timestamp = ctx.history_timestamp();

    // Unit tests.
    let unit_result = load_source(config, SourceKind::UnitTest, normalize::parse_unit_test);
    if let SourceResult::Present(summary) = &unit_result {
        append_history(store.as_ref(), SourceKind::UnitTest, suite_record(&timestamp, summary));
    }

    // Acceptance tests.
    let acceptance_result =
        load_source(config, SourceKind::AcceptanceTest, normalize::parse_acceptance);
    if let SourceResult::Present(summary) = &acceptance_result {
        append_history(
            store.as_ref(),
            SourceKind::AcceptanceTest,
            acceptance_record(&timestamp, summary),
        );
    }

    // Load tests.
    let load_result = load_source(config, SourceKind::LoadTest, normalize::parse_load_test);
    if let SourceResult::Present(summary) = &load_result {
        append_history(store.as_ref(), SourceKind::LoadTest, load_record(&timestamp, summary));
    }

    // Cloud metric: no history log, and an empty datapoint list is absence.
    let cold_start = match config.artifact_path(SourceKind::CloudMetric) {
        None => SourceResult::Absent,
        Some(path) => match source::read_artifact(path) {
            Ok(None) => SourceResult::Absent,
            Ok(Some(contents)) => match normalize::parse_cloud_metric(&contents) {
                Ok(Some(metric)) => SourceResult::Present(metric),
                Ok(None) => SourceResult::Absent,
                Err(error) => SourceResult::Error(error),
            },
            Err(error) => SourceResult::Error(SourceError::MalformedInput {
                detail: format!("could not read `{path}`: {error}"),
            }),
        },
    };

    // Trends are built from the full logs even when this run's normalization
    // failed: past runs still have a story to tell.
    let model = dashboard::compose(
        ctx.started_at,
        SourceSection {
            result: unit_result,
            trend: build_trend(store.as_ref(), SourceKind::UnitTest),
        },
        SourceSection {
            result: acceptance_result,
            trend: build_trend(store.as_ref(), SourceKind::AcceptanceTest),
        },
        SourceSection {
            result: load_result,
            trend: build_trend(store.as_ref(), SourceKind::LoadTest),
        },
        cold_start,
    );

    let html = dashboard::render(&model);
    let output_path = &config.output.path;
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| PipelineError::OutputWrite {
            path: output_path.clone(),
            error,
        })?;
    }
    std::fs::write(output_path, html).map_err(|error| PipelineError::OutputWrite {
        path: output_path.clone(),
        error,
    })?;
    info!("dashboard written to `{output_path}`");

    Ok(model)
}

fn load_source<T>(
    config: &DashboardConfig,
    kind: SourceKind,
    parse: impl Fn(&str) -> Result<T, SourceError>,
) -> SourceResult<T> {
    let Some(path) = config.artifact_path(kind) else {
        debug!("{} source not configured", kind.as_str());
        return SourceResult::Absent;
    };
    match source::read_artifact(path) {
        Ok(None) => {
            debug!("{} artifact `{path}` not found", kind.as_str());
            SourceResult::Absent
        }
        Ok(Some(contents)) => match parse(&contents) {
            Ok(summary) => SourceResult::Present(summary),
            Err(error) => {
                warn!("{} artifact `{path}` failed to normalize: {error}", kind.as_str());
                SourceResult::Error(error)
            }
        },
        Err(error) => {
            warn!("{} artifact `{path}` unreadable: {error}", kind.as_str());
            SourceResult::Error(SourceError::MalformedInput {
                detail: format!("could not read `{path}`: {error}"),
            })
        }
    }
}

fn append_history(store: Option<&HistoryStore>, kind: SourceKind, record: HistoryRecord) {
    let Some(store) = store else { return };
    if let Err(error) = store.append(kind, &record) {
        // A bad disk or a header-contract mismatch must not take down the
        // rest of the run; the trend just stays where it was.
        warn!("failed to append {} history: {error}", kind.as_str());
    }
}

fn build_trend(store: Option<&HistoryStore>, kind: SourceKind) -> TrendSet {
    let Some(store) = store else {
        return TrendSet::new();
    };
    match store.read_all(kind) {
        Ok(records) => trend::build_trend(&records, kind.history_fields()),
        Err(error) => {
            warn!("failed to read {} history: {error}", kind.as_str());
            TrendSet::new()
        }
    }
}

fn suite_record(timestamp: &str, summary: &SuiteSummary) -> HistoryRecord {
    HistoryRecord::new(timestamp)
        .field("tests", summary.tests.history_cell())
        .field("failures", summary.failures.history_cell())
        .field("errors", summary.errors.history_cell())
        .field("skipped", summary.skipped.history_cell())
}

fn acceptance_record(timestamp: &str, summary: &AcceptanceSummary) -> HistoryRecord {
    HistoryRecord::new(timestamp)
        .field("total", summary.total.to_string())
        .field("pass", summary.pass.to_string())
        .field("fail", summary.fail.to_string())
}

fn load_record(timestamp: &str, summary: &LoadSummary) -> HistoryRecord {
    HistoryRecord::new(timestamp)
        .field("requests", summary.total_requests.to_string())
        .field("failures", summary.total_failures.to_string())
        .field(
            "avg_response_time_ms",
            summary.avg_response_time_ms.to_string(),
        )
}
