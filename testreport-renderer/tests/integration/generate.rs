// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{load_report, test_config, write_stores};
use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use fixture_data::report_roots::{EXPECTED_COUNTS, REPORT_ROOTS};
use pretty_assertions::assert_eq;
use testreport_metadata::TestPath;
use indexmap::IndexMap;
use testreport_renderer::{
    config::ReportConfig,
    errors::{RenderError, ReportGenerateError, TreeBuildError},
    generator::{HtmlReportGenerator, ReportInputs, SCRIPT, STYLESHEET},
    output::{MemoryOutputReader, OutputReader},
    page::page_file_path,
    store::FileResultStore,
};

fn read_page(dest: &Utf8Path, path: &str) -> String {
    let file = dest.join(page_file_path(&TestPath::parse(path).unwrap()));
    std::fs::read_to_string(&file).unwrap_or_else(|error| panic!("reading {file}: {error}"))
}

#[test]
fn writes_every_page_and_resource() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, generator) = load_report(temp.path(), &config);
    let dest = temp.path().join("report");

    let report = generator.generate(&model, &dest).unwrap();

    // ROOT, com.example, Calculator (+3 tests), Parser (+1), Server (+1).
    assert_eq!(model.len(), 10);
    assert_eq!(report.page_count, 10);
    assert_eq!(report.index_path, dest.join("index.html"));
    for (_, node) in model.nodes() {
        let file = dest.join(page_file_path(node.path()));
        assert!(file.is_file(), "page for `{}` exists at {file}", node.path());
    }
    assert_eq!(
        std::fs::read_to_string(dest.join("css/style.css")).unwrap(),
        STYLESHEET
    );
    assert_eq!(
        std::fs::read_to_string(dest.join("js/report.js")).unwrap(),
        SCRIPT
    );
}

#[test]
fn counts_match_fixture() {
    let temp = Utf8TempDir::new().unwrap();
    let (model, _) = load_report(temp.path(), &ReportConfig::default_config());

    for expected in EXPECTED_COUNTS {
        let info = model
            .per_root_info(&TestPath::parse(expected.path).unwrap(), expected.root_name)
            .unwrap_or_else(|| panic!("no info for {expected:?}"));
        assert_eq!(
            (
                info.total_leaf_count(),
                info.failed_leaf_count(),
                info.skipped_leaf_count()
            ),
            (expected.total, expected.failed, expected.skipped),
            "counts for {expected:?}"
        );
    }
}

#[test]
fn root_page() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, generator) = load_report(temp.path(), &config);
    let dest = temp.path().join("report");
    generator.generate(&model, &dest).unwrap();

    let html = read_page(&dest, "");
    assert!(html.contains("<title>Test results - All Results</title>"));
    assert!(html.contains("<a href=\"#tab0\">&apos;Unit tests&apos; summary</a>"));
    assert!(html.contains("&apos;Integration tests&apos; summary"));
    assert!(!html.contains("breadcrumbs"));
    assert!(!html.contains("id=\"footer\""));
    // The directory name is itself percent-encoded, so the link escapes the `%`.
    assert!(html.contains("<a href=\"com%252Eexample/index.html\">com.example</a>"));
    assert!(html.contains("<div class=\"percent\">75%</div>"), "unit success rate");
    assert!(html.contains("<div class=\"percent\">100%</div>"), "integration success rate");
}

#[test]
fn failed_leaf_page() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, generator) = load_report(temp.path(), &config);
    let dest = temp.path().join("report");
    generator.generate(&model, &dest).unwrap();

    let html = read_page(&dest, "com.example/Calculator/divides by zero");
    assert!(dest
        .join("com%2Eexample/Calculator/divides%20by%20zero/index.html")
        .is_file());
    assert!(html.contains("<link href=\"../../../css/style.css\""));
    assert!(html.contains(
        "<div class=\"breadcrumbs\"><a href=\"../../../index.html\">all</a> &gt; \
         <a href=\"../../index.html\">com.example</a> &gt; \
         <a href=\"../index.html\">Calculator</a> &gt; divides by zero</div>"
    ));
    assert!(html.contains("<h3>Failure details</h3>"));
    assert!(html.contains(
        "<pre>AssertionError: expected an error\n    at Calculator.divide(Calculator.java:42)\n</pre>"
    ));

    assert!(html.contains("&apos;Unit tests&apos; error output"));
    assert!(!html.contains("standard output"));
    assert!(html.contains("<pre>warning: division by &lt;zero&gt;\n</pre>"));

    assert!(html.contains("&apos;Unit tests&apos; metadata"));
    assert!(html.contains(
        "<td class=\"value\"><a href=\"https://example.com/issues/7\">\
         https://example.com/issues/7</a></td>"
    ));
    assert!(html.contains("<td class=\"key\">retries</td><td class=\"value\">2</td>"));
    assert!(html.contains(
        "<td class=\"key\">blob</td><td class=\"value\">\
         <span class=\"unrenderable\">[error rendering value]</span></td>"
    ));
}

#[test]
fn shared_pages() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, generator) = load_report(temp.path(), &config);
    let dest = temp.path().join("report");
    generator.generate(&model, &dest).unwrap();

    let adds = read_page(&dest, "com.example/Calculator/adds");
    assert!(adds.contains("&apos;Unit tests&apos; standard output"));
    assert!(adds.contains("<pre>adding 2 + 2\nresult: 4\n</pre>"));
    assert!(adds.contains("&apos;Integration tests&apos; summary"));
    assert!(!adds.contains("&apos;Integration tests&apos; standard output"));

    let starts = read_page(&dest, "com.example/Server/starts");
    assert!(starts.contains("&apos;Integration tests&apos; standard output"));
    assert!(!starts.contains("error output"), "empty stderr gets no tab");
    assert!(!starts.contains("Unit tests"));
}

#[test]
fn escaped_segments_and_names() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, generator) = load_report(temp.path(), &config);
    let dest = temp.path().join("report");
    generator.generate(&model, &dest).unwrap();

    assert!(dest
        .join("com%2Eexample/Parser/parses%20%3Ctags%3E/index.html")
        .is_file());

    let parser = read_page(&dest, "com.example/Parser");
    assert!(parser.contains("<th>Child</th><th>Name</th>"));
    assert!(parser.contains(
        "<a href=\"parses%2520%253Ctags%253E/index.html\">parses &lt;tags&gt; &amp; entities</a>\
         </td><td>parses &lt;tags&gt;</td>"
    ));

    let leaf = read_page(&dest, "com.example/Parser/parses <tags>");
    assert!(leaf.contains("<h1>parses &lt;tags&gt;</h1>"));
}

#[test]
fn footer_with_default_config() {
    let temp = Utf8TempDir::new().unwrap();
    let (model, generator) = load_report(temp.path(), &ReportConfig::default_config());
    let dest = temp.path().join("report");
    generator.generate(&model, &dest).unwrap();

    assert!(read_page(&dest, "").contains("<div id=\"footer\"><p>Generated at "));
}

#[test]
fn duplicate_roots_are_rejected() {
    let temp = Utf8TempDir::new().unwrap();
    let stores = write_stores(temp.path());
    let (root_name, store_dir) = &stores[0];

    let mut inputs = ReportInputs::new();
    inputs
        .add_store(*root_name, FileResultStore::open(store_dir).unwrap())
        .unwrap();
    let error = inputs
        .add_root(
            *root_name,
            "again",
            REPORT_ROOTS[0].records.clone(),
            Box::new(MemoryOutputReader::new()),
        )
        .unwrap_err();
    assert_eq!(
        error,
        TreeBuildError::DuplicateRoot {
            root_name: "unit".to_owned()
        }
    );
}

#[test]
fn page_render_error_aborts_generation() {
    let temp = Utf8TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (model, _) = load_report(temp.path(), &config);

    // The integration root appears in the tree but has no reader.
    let mut readers: IndexMap<String, Box<dyn OutputReader>> = IndexMap::new();
    readers.insert("unit".to_owned(), Box::new(MemoryOutputReader::new()));
    let display_names = REPORT_ROOTS
        .iter()
        .map(|root| (root.name.to_owned(), root.display_name.to_owned()))
        .collect();
    let generator = HtmlReportGenerator::new(readers, display_names, &config);

    let error = generator
        .generate(&model, &temp.path().join("report"))
        .unwrap_err();
    match error {
        ReportGenerateError::RenderPage {
            path,
            error: RenderError::MissingOutputReader { root_name },
        } => {
            assert_eq!(root_name, "integration");
            assert!(
                model.per_root_info(&path, "integration").is_some(),
                "failed page `{path}` has integration results"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
