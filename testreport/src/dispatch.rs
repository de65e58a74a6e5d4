// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{OutputContext, OutputOpts};
use camino::Utf8PathBuf;
use clap::{Args, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use owo_colors::OwoColorize;
use std::{io::Write, str::FromStr};
use testreport_renderer::{
    config::ReportConfig,
    generator::{GeneratedReport, ReportInputs},
    store::FileResultStore,
};
use thiserror::Error;
use tracing::debug;

/// Renders test results from one or more result stores as a cross-linked HTML report.
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct TestReportApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TestReportApp {
    /// Initializes logging and color support.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(self, output: OutputContext) -> Result<()> {
        match self.command {
            Command::Generate(opts) => {
                let report = opts.exec()?;
                print_summary(&report, output)
            }
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an HTML report from result stores
    Generate(GenerateOpts),
}

#[derive(Debug, Args)]
struct GenerateOpts {
    /// A result store to include, as NAME=DIR (may be repeated)
    ///
    /// Each root gets its own set of tabs on every page where it has results. Roots are shown in
    /// the order they are specified.
    #[arg(long = "root", value_name = "NAME=DIR", required = true)]
    roots: Vec<RootArg>,

    /// Directory to write the report to
    #[arg(long, short, value_name = "DIR")]
    output: Utf8PathBuf,

    /// Config file [default: <workspace-root>/.config/testreport.toml]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Directory used to look up the default config file [default: current directory]
    #[arg(long, value_name = "DIR")]
    workspace_root: Option<Utf8PathBuf>,
}

impl GenerateOpts {
    fn exec(self) -> Result<GeneratedReport> {
        let workspace_root = match self.workspace_root {
            Some(workspace_root) => workspace_root,
            None => current_dir()?,
        };
        let config = ReportConfig::from_sources(self.config_file.as_deref(), &workspace_root)?;
        debug!(
            render_threads = %config.render_threads(),
            "read config"
        );

        let mut inputs = ReportInputs::new();
        for root in self.roots {
            let store = FileResultStore::open(&root.dir).wrap_err_with(|| {
                format!("failed to read result store for root `{}`", root.name)
            })?;
            inputs.add_store(root.name, store)?;
        }
        let (model, generator) = inputs.build(&config)?;

        let report = generator
            .generate(&model, &self.output)
            .wrap_err_with(|| format!("failed to generate report in `{}`", self.output))?;
        Ok(report)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().wrap_err("failed to determine current directory")?;
    Utf8PathBuf::try_from(dir)
        .map_err(|error| eyre!("current directory is not valid UTF-8: {}", error.as_path().display()))
}

fn print_summary(report: &GeneratedReport, output: OutputContext) -> Result<()> {
    let styles = output.stderr_styles();
    let mut stderr = std::io::stderr().lock();
    writeln!(
        stderr,
        "{:>12} {} pages, open {}",
        "Generated".style(styles.success),
        report.page_count.style(styles.bold),
        report.index_path.as_str().style(styles.bold),
    )?;
    Ok(())
}

/// A `NAME=DIR` pair passed to `--root`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RootArg {
    name: String,
    dir: Utf8PathBuf,
}

impl FromStr for RootArg {
    type Err = RootArgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, dir) = s
            .split_once('=')
            .ok_or_else(|| RootArgParseError::MissingSeparator(s.to_owned()))?;
        if name.is_empty() {
            return Err(RootArgParseError::EmptyName(s.to_owned()));
        }
        if dir.is_empty() {
            return Err(RootArgParseError::EmptyDir(s.to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            dir: dir.into(),
        })
    }
}

/// An error parsing a `--root` argument.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
enum RootArgParseError {
    #[error("`{0}` is not of the form NAME=DIR")]
    MissingSeparator(String),

    #[error("root name in `{0}` is empty")]
    EmptyName(String),

    #[error("store directory in `{0}` is empty")]
    EmptyDir(String),
}
