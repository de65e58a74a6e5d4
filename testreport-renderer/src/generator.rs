// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writes a complete report to disk.

use crate::{
    config::ReportConfig,
    errors::{ReportGenerateError, TreeBuildError},
    metadata::MetadataRendererRegistry,
    output::OutputReader,
    page::{GenericPageRenderer, SCRIPT_PATH, STYLESHEET_PATH, page_file_path},
    store::FileResultStore,
    time::format_log_time,
    tree::{NodeId, TestTreeModel, TestTreeModelBuilder},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::{fs, time::Instant};
use testreport_metadata::TestResultRecord;
use tracing::{debug, info};

/// The stylesheet referenced by every page.
pub const STYLESHEET: &str = include_str!("../resources/style.css");

/// The script referenced by every page.
pub const SCRIPT: &str = include_str!("../resources/report.js");

/// Collects the roots that make up a report.
#[derive(Debug, Default)]
pub struct ReportInputs {
    builder: TestTreeModelBuilder,
    output_readers: DebugIgnore<IndexMap<String, Box<dyn OutputReader>>>,
    root_display_names: IndexMap<String, String>,
}

impl ReportInputs {
    /// Creates an empty set of inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root with its records and captured output.
    pub fn add_root(
        &mut self,
        root_name: impl Into<String>,
        display_name: impl Into<String>,
        records: impl IntoIterator<Item = TestResultRecord>,
        output_reader: Box<dyn OutputReader>,
    ) -> Result<&mut Self, TreeBuildError> {
        let root_name = root_name.into();
        self.builder.add_root(root_name.clone(), records)?;
        self.output_readers.insert(root_name.clone(), output_reader);
        self.root_display_names
            .insert(root_name, display_name.into());
        Ok(self)
    }

    /// Adds a root read from a file-backed store.
    ///
    /// The display name recorded in the store is used if present, otherwise the root name.
    pub fn add_store(
        &mut self,
        root_name: impl Into<String>,
        store: FileResultStore,
    ) -> Result<&mut Self, TreeBuildError> {
        let root_name = root_name.into();
        let display_name = store
            .root_display_name()
            .map_or_else(|| root_name.clone(), str::to_owned);
        let output_reader = Box::new(store.output_reader());
        self.add_root(
            root_name,
            display_name,
            store.into_document().records,
            output_reader,
        )
    }

    /// Builds the tree, and a generator that renders it according to `config`.
    pub fn build(
        self,
        config: &ReportConfig,
    ) -> Result<(TestTreeModel, HtmlReportGenerator), TreeBuildError> {
        let model = self.builder.build()?;
        let generator =
            HtmlReportGenerator::new(self.output_readers.0, self.root_display_names, config);
        Ok((model, generator))
    }
}

/// Renders every node of a tree to its own page, along with the shared resources.
#[derive(Debug)]
pub struct HtmlReportGenerator {
    renderer: GenericPageRenderer,
    render_threads: usize,
}

impl HtmlReportGenerator {
    /// Creates a generator for the given roots, configured by `config`.
    pub fn new(
        output_readers: IndexMap<String, Box<dyn OutputReader>>,
        root_display_names: IndexMap<String, String>,
        config: &ReportConfig,
    ) -> Self {
        let mut renderer = GenericPageRenderer::new(output_readers, root_display_names)
            .with_title_prefix(config.title_prefix());
        if config.generated_at_footer() {
            let now = format_log_time(Local::now().timestamp_millis());
            renderer = renderer.with_footer(format!("Generated at {now}"));
        }

        Self {
            renderer,
            render_threads: config.render_threads().compute(),
        }
    }

    /// Replaces the metadata renderer registry.
    pub fn with_metadata_registry(mut self, registry: MetadataRendererRegistry) -> Self {
        self.renderer = self.renderer.with_metadata_registry(registry);
        self
    }

    /// Returns the page renderer.
    pub fn renderer(&self) -> &GenericPageRenderer {
        &self.renderer
    }

    /// Writes the report for `model` into `dest`, creating it if necessary.
    ///
    /// Existing files at the same locations are overwritten; other files are left alone.
    pub fn generate(
        &self,
        model: &TestTreeModel,
        dest: &Utf8Path,
    ) -> Result<GeneratedReport, ReportGenerateError> {
        let start = Instant::now();

        write_file(&dest.join(STYLESHEET_PATH), STYLESHEET)?;
        write_file(&dest.join(SCRIPT_PATH), SCRIPT)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.render_threads)
            .thread_name(|index| format!("testreport-render-{index}"))
            .build()
            .map_err(ReportGenerateError::ThreadPool)?;

        let ids: Vec<NodeId> = model.nodes().map(|(id, _)| id).collect();
        pool.install(|| {
            ids.into_par_iter()
                .try_for_each(|id| self.write_page(model, id, dest))
        })?;

        let report = GeneratedReport {
            index_path: dest.join(page_file_path(model.root().path())),
            page_count: model.len(),
        };
        info!(
            pages = report.page_count,
            threads = self.render_threads,
            elapsed = ?start.elapsed(),
            "wrote report to {dest}"
        );
        Ok(report)
    }

    fn write_page(
        &self,
        model: &TestTreeModel,
        id: NodeId,
        dest: &Utf8Path,
    ) -> Result<(), ReportGenerateError> {
        let path = model.node(id).path();
        let html =
            self.renderer
                .render(model, id)
                .map_err(|error| ReportGenerateError::RenderPage {
                    path: path.clone(),
                    error,
                })?;
        let file = dest.join(page_file_path(path));
        write_file(&file, &html)?;
        debug!(%path, %file, "wrote page");
        Ok(())
    }
}

/// Information about a report written by [`HtmlReportGenerator::generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedReport {
    /// The page for the root of the tree.
    pub index_path: Utf8PathBuf,

    /// The number of pages written.
    pub page_count: usize,
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), ReportGenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| ReportGenerateError::CreateDir {
            path: parent.to_owned(),
            error,
        })?;
    }
    fs::write(path, contents).map_err(|error| ReportGenerateError::WriteFile {
        path: path.to_owned(),
        error,
    })
}
