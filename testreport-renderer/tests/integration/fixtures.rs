// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use fixture_data::report_roots::REPORT_ROOTS;
use indoc::indoc;
use testreport_renderer::{
    config::ReportConfig,
    generator::{HtmlReportGenerator, ReportInputs},
    store::{FileResultStore, ResultStoreWriter},
    tree::TestTreeModel,
};

/// Writes one result store per fixture root under `dir`.
pub(crate) fn write_stores(dir: &Utf8Path) -> Vec<(&'static str, Utf8PathBuf)> {
    REPORT_ROOTS
        .iter()
        .map(|root| {
            let store_dir = dir.join("stores").join(root.name);
            let writer = ResultStoreWriter::create(store_dir.clone()).unwrap();
            writer.write_document(&root.document()).unwrap();
            for output in &root.outputs {
                writer
                    .write_output(output.output_id, output.destination, output.contents)
                    .unwrap();
            }
            (root.name, store_dir)
        })
        .collect()
}

/// Reads a config that renders on two threads and omits the generation-time footer.
pub(crate) fn test_config(dir: &Utf8Path) -> ReportConfig {
    let config_file = dir.join("testreport.toml");
    std::fs::write(
        &config_file,
        indoc! {r#"
            render-threads = 2
            generated-at-footer = false
        "#},
    )
    .unwrap();
    ReportConfig::from_sources(Some(&config_file), dir).unwrap()
}

/// Loads the fixture roots from freshly written stores.
pub(crate) fn load_report(dir: &Utf8Path, config: &ReportConfig) -> (TestTreeModel, HtmlReportGenerator) {
    let mut inputs = ReportInputs::new();
    for (root_name, store_dir) in write_stores(dir) {
        let store = FileResultStore::open(&store_dir).unwrap();
        inputs.add_store(root_name, store).unwrap();
    }
    inputs.build(config).unwrap()
}
