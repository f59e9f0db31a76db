// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `qadash` command-line interface.

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::Result;
use qadash_runner::{DashboardConfig, RunContext};
use tracing::level_filters::LevelFilter;

/// Generate the unified QA dashboard from previously produced test and
/// telemetry reports.
#[derive(Debug, Parser)]
#[command(name = "qadash", version)]
pub struct QadashApp {
    /// Path to the config file; embedded defaults are used when omitted.
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Write the dashboard here instead of the configured output path.
    #[arg(long, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    /// Increase log verbosity (-v: info, -vv: debug).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

impl QadashApp {
    /// Runs the pipeline once.
    pub fn exec(self) -> Result<()> {
        let level = match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            _ => LevelFilter::DEBUG,
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();

        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default_config(),
        };
        if let Some(output) = self.output {
            config.output.path = output;
        }

        let ctx = RunContext::now();
        qadash_runner::run(&config, &ctx)?;
        println!("Dashboard generated at {}", config.output.path);
        Ok(())
    }
}
