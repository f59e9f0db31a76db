// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::eyre::Result;
use qadash_cli::QadashApp;

fn main() -> Result<()> {
    color_eyre::install()?;
    QadashApp::parse().exec()
}
