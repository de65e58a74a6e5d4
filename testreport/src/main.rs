// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use testreport::TestReportApp;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = TestReportApp::parse();
    let output = app.init_output();
    app.exec(output)
}
