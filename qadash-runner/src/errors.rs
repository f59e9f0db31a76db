// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the pipeline.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// A failure to normalize a single source.
///
/// These are values, not propagated errors: a normalizer converts its own
/// parse and resolution failures into a `SourceError` carried inside
/// [`SourceResult::Error`](crate::SourceResult::Error), and the rest of the
/// pipeline keeps going.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The artifact is present but does not parse as its expected format.
    #[error("malformed input: {detail}")]
    MalformedInput {
        /// What failed to parse.
        detail: String,
    },

    /// The artifact parses, but a required column could not be resolved.
    ///
    /// Carries the literal observed header list so the dashboard can show
    /// exactly what the tool emitted this time around.
    #[error("unexpected table columns: {headers:?}")]
    SchemaDrift {
        /// The header row as observed, in order.
        headers: Vec<String>,
    },
}

impl SourceError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        SourceError::MalformedInput {
            detail: detail.into(),
        }
    }

    pub(crate) fn schema_drift(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SourceError::SchemaDrift {
            headers: headers.into_iter().map(|h| h.into()).collect(),
        }
    }
}

/// An error that occurred while loading or parsing the dashboard config.
#[derive(Debug, Error)]
#[error("failed to parse qadash config at `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }
}

/// The kind of error that occurred while parsing the config.
#[derive(Debug, Error)]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the layered config.
    #[error(transparent)]
    BuildError(Box<config::ConfigError>),

    /// An error occurred while deserializing the config into the typed form.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<config::ConfigError>>),
}

/// An error that occurred while appending to or reading a history log.
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    /// Failed to create the history directory.
    #[error("failed to create history directory `{dir}`")]
    DirCreate {
        /// The directory being created.
        dir: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// Failed to acquire the store lock.
    #[error("failed to lock history store via `{path}`")]
    Lock {
        /// The lock file path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// Failed to read or write a log file.
    #[error("failed to access history log `{path}`")]
    Io {
        /// The log file path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A record's field set does not match the header the log was created
    /// with. This is a configuration error: the store never reconciles
    /// schemas across time.
    #[error(
        "history log `{path}` was created with header {existing:?}, \
         but this run produced fields {incoming:?}"
    )]
    HeaderMismatch {
        /// The log file path.
        path: Utf8PathBuf,
        /// The header the log was created with.
        existing: Vec<String>,
        /// The field names produced by this run.
        incoming: Vec<String>,
    },

    /// A log file exists but does not parse as a delimited table.
    #[error("history log `{path}` is malformed: {detail}")]
    Malformed {
        /// The log file path.
        path: Utf8PathBuf,
        /// What failed to parse.
        detail: String,
    },
}

/// A fatal pipeline error.
///
/// Per-source failures never show up here -- they are carried as
/// [`SourceResult`](crate::SourceResult) values into the render model. Only
/// faults that prevent producing the output artifact at all are fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Failed to write the rendered dashboard.
    #[error("failed to write dashboard to `{path}`")]
    OutputWrite {
        /// The output path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}
