// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard configuration.
//!
//! Artifact locations, the history directory and the output path are all
//! configuration: the core never hardcodes a path. Defaults are embedded as
//! TOML and an optional user file is layered on top.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    source::SourceKind,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// The full pipeline configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct DashboardConfig {
    /// Where each source's artifact lives.
    pub reports: ReportPaths,
    /// History store settings.
    pub history: HistoryConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Per-source artifact paths. A source with no configured path is treated
/// as absent.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReportPaths {
    /// The unit-test summary XML.
    pub unit_test: Option<Utf8PathBuf>,
    /// The acceptance-test output XML.
    pub acceptance_test: Option<Utf8PathBuf>,
    /// The load-test statistics table.
    pub load_test: Option<Utf8PathBuf>,
    /// The cloud metric payload.
    pub cloud_metric: Option<Utf8PathBuf>,
}

/// History store settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct HistoryConfig {
    /// Directory holding the per-source history logs.
    pub dir: Utf8PathBuf,
}

/// Output settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct OutputConfig {
    /// Where the rendered dashboard is written.
    pub path: Utf8PathBuf,
}

impl DashboardConfig {
    /// The embedded default configuration.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Loads the embedded defaults only.
    pub fn default_config() -> Self {
        Self::build(None).expect("default config is always valid")
    }

    /// Loads the defaults with `config_file` layered on top.
    pub fn from_file(config_file: &Utf8Path) -> Result<Self, ConfigParseError> {
        Self::build(Some(config_file))
            .map_err(|kind| ConfigParseError::new(config_file, kind))
    }

    fn build(config_file: Option<&Utf8Path>) -> Result<Self, ConfigParseErrorKind> {
        let mut builder =
            Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(path) = config_file {
            builder = builder.add_source(File::new(path.as_str(), FileFormat::Toml));
        }
        let config = builder
            .build()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;
        serde_path_to_error::deserialize(config)
            .map_err(|error| ConfigParseErrorKind::DeserializeError(Box::new(error)))
    }

    /// The configured artifact path for a source, if any.
    pub fn artifact_path(&self, kind: SourceKind) -> Option<&Utf8Path> {
        let path = match kind {
            SourceKind::UnitTest => &self.reports.unit_test,
            SourceKind::AcceptanceTest => &self.reports.acceptance_test,
            SourceKind::LoadTest => &self.reports.load_test,
            SourceKind::CloudMetric => &self.reports.cloud_metric,
        };
        path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_parses() {
        let config = DashboardConfig::default_config();
        assert_eq!(
            config.artifact_path(SourceKind::UnitTest).unwrap(),
            "reports/pytest/results.xml"
        );
        assert_eq!(config.history.dir, "reports/history");
        assert_eq!(config.output.path, "reports/dashboard.html");
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = camino_tempfile::Utf8TempDir::new().unwrap();
        let path = dir.path().join("qadash.toml");
        std::fs::write(
            &path,
            indoc::indoc! {r#"
                [reports]
                unit-test = "artifacts/junit.xml"

                [output]
                path = "artifacts/dash.html"
            "#},
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(
            config.artifact_path(SourceKind::UnitTest).unwrap(),
            "artifacts/junit.xml"
        );
        // Untouched keys keep their defaults.
        assert_eq!(
            config.artifact_path(SourceKind::LoadTest).unwrap(),
            "reports/locust/results_stats.csv"
        );
        assert_eq!(config.output.path, "artifacts/dash.html");
    }

    #[test]
    fn missing_user_file_is_an_error() {
        let err = DashboardConfig::from_file(Utf8Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
