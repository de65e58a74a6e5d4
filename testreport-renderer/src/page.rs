// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of one HTML page per tree node.
//!
//! Every node of a [`TestTreeModel`] is rendered to its own page. Pages are laid out on disk by
//! [`page_file_path`]: the page for the root lives at `index.html`, and the page for
//! `a/b` lives at `a/b/index.html`. Links between pages are always relative, so a report can be
//! moved or served from any location.

use crate::{
    errors::RenderError,
    html::HtmlWriter,
    metadata::MetadataRendererRegistry,
    output::OutputReader,
    tabs::{PerRootTab, PerRootTabRenderer, TabsRenderer},
    tree::{NodeId, TestTreeModel, TestTreeNode},
};
use camino::{Utf8Path, Utf8PathBuf};
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use itertools::Itertools;
use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use testreport_metadata::{Destination, TestPath};
use tracing::debug;

/// The path of the stylesheet, relative to the report directory.
pub const STYLESHEET_PATH: &str = "css/style.css";

/// The path of the script, relative to the report directory.
pub const SCRIPT_PATH: &str = "js/report.js";

/// The default prefix of every page's `<title>`.
pub const DEFAULT_TITLE_PREFIX: &str = "Test results";

/// Characters escaped when mapping a path segment to a directory name.
const FILE_SEGMENT_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Characters escaped within one segment of a relative URL.
const URL_SEGMENT_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Returns the location of the page for `path`, relative to the report directory.
pub fn page_file_path(path: &TestPath) -> Utf8PathBuf {
    let mut file = Utf8PathBuf::new();
    for segment in path.segments() {
        file.push(utf8_percent_encode(segment, FILE_SEGMENT_ESCAPES).to_string());
    }
    file.push("index.html");
    file
}

/// Returns the URL of the page for `target`, relative to the page for `origin`.
///
/// A page linking to itself gets `#`.
pub fn url_to(origin: &TestPath, target: &TestPath) -> String {
    if origin == target {
        return "#".to_owned();
    }
    relative_url(&page_file_path(origin), &page_file_path(target))
}

/// Returns the URL of `target_file`, relative to the directory containing `origin_file`.
///
/// Both paths are relative to the report directory.
pub fn relative_url(origin_file: &Utf8Path, target_file: &Utf8Path) -> String {
    let origin_dir = origin_file.parent().unwrap_or(Utf8Path::new(""));
    let relative = pathdiff::diff_utf8_paths(target_file, origin_dir)
        .unwrap_or_else(|| target_file.to_owned());
    relative
        .components()
        .map(|component| utf8_percent_encode(component.as_str(), URL_SEGMENT_ESCAPES))
        .join("/")
}

/// Renders tree nodes as complete HTML pages.
///
/// A renderer is immutable once built and can be shared across threads.
#[derive(Debug)]
pub struct GenericPageRenderer {
    output_readers: DebugIgnore<IndexMap<String, Box<dyn OutputReader>>>,
    root_display_names: IndexMap<String, String>,
    metadata_registry: MetadataRendererRegistry,
    title_prefix: String,
    footer: Option<String>,
}

impl GenericPageRenderer {
    /// Creates a renderer.
    ///
    /// `output_readers` must contain a reader for every root that appears in the rendered tree.
    /// `root_display_names` maps root names to the names shown in tab titles.
    pub fn new(
        output_readers: IndexMap<String, Box<dyn OutputReader>>,
        root_display_names: IndexMap<String, String>,
    ) -> Self {
        Self {
            output_readers: DebugIgnore(output_readers),
            root_display_names,
            metadata_registry: MetadataRendererRegistry::with_default_renderers(),
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
            footer: None,
        }
    }

    /// Replaces the metadata renderer registry.
    pub fn with_metadata_registry(mut self, registry: MetadataRendererRegistry) -> Self {
        self.metadata_registry = registry;
        self
    }

    /// Sets the prefix of every page's `<title>`.
    pub fn with_title_prefix(mut self, title_prefix: impl Into<String>) -> Self {
        self.title_prefix = title_prefix.into();
        self
    }

    /// Sets a footer line shown at the bottom of every page.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Returns the display name for a root, falling back to the root name.
    pub fn root_display_name<'a>(&'a self, root_name: &'a str) -> &'a str {
        self.root_display_names
            .get(root_name)
            .map_or(root_name, String::as_str)
    }

    /// Renders the page for node `id` of `model`.
    pub fn render(&self, model: &TestTreeModel, id: NodeId) -> Result<String, RenderError> {
        let mut writer = HtmlWriter::new();
        self.render_into(model, id, &mut writer)?;
        Ok(writer.into_string())
    }

    /// Renders the page for node `id` of `model` into `writer`.
    pub fn render_into(
        &self,
        model: &TestTreeModel,
        id: NodeId,
        writer: &mut HtmlWriter,
    ) -> Result<(), RenderError> {
        let node = model.node(id);
        let path = node.path();
        // Collected before writing so that a missing reader produces no partial page.
        let tabs = self.tabs_for(node)?;
        debug!(%path, tabs = ?tabs.titles().collect::<Vec<_>>(), "rendering page");

        let title = page_title(path);
        let page_file = page_file_path(path);

        writer.doctype();
        writer
            .start_element("html")
            .start_element("head")
            .empty_element("meta", &[("charset", "utf-8")])
            .empty_element(
                "meta",
                &[
                    ("name", "viewport"),
                    ("content", "width=device-width, initial-scale=1"),
                ],
            )
            .text_element(
                "title",
                &[],
                &format!("{} - {}", self.title_prefix, title),
            );
        let stylesheet = relative_url(&page_file, Utf8Path::new(STYLESHEET_PATH));
        let script = relative_url(&page_file, Utf8Path::new(SCRIPT_PATH));
        writer
            .empty_element(
                "link",
                &[
                    ("href", stylesheet.as_str()),
                    ("rel", "stylesheet"),
                    ("type", "text/css"),
                ],
            )
            .start_element_with("script", &[("src", script.as_str())])
            .end_element()
            .end_element();

        writer
            .start_element("body")
            .start_element_with("div", &[("id", "content")])
            .text_element("h1", &[], title);
        render_breadcrumbs(path, writer);

        tabs.render(model, id, writer)?;

        if let Some(footer) = &self.footer {
            writer
                .start_element_with("div", &[("id", "footer")])
                .text_element("p", &[], footer)
                .end_element();
        }

        // div#content, body, html
        writer.end_element().end_element().end_element();
        Ok(())
    }

    fn tabs_for<'a>(&'a self, node: &'a TestTreeNode) -> Result<TabsRenderer<'a>, RenderError> {
        let mut tabs = TabsRenderer::new();
        let prefix_titles = self.root_display_names.len() != 1;

        for (root_name, info) in node.per_root_info() {
            let reader = self.output_readers.get(root_name).ok_or_else(|| {
                RenderError::MissingOutputReader {
                    root_name: root_name.clone(),
                }
            })?;
            let title = |suffix: &str| {
                if prefix_titles {
                    format!("'{}' {suffix}", self.root_display_name(root_name))
                } else {
                    suffix.to_owned()
                }
            };

            tabs.add(
                title("summary"),
                PerRootTabRenderer::new(root_name, PerRootTab::Summary),
            );
            if let Some(output_id) = info.output_id() {
                for destination in Destination::ALL {
                    if reader.has_output(output_id, destination) {
                        tabs.add(
                            title(output_tab_title(destination)),
                            PerRootTabRenderer::new(
                                root_name,
                                PerRootTab::Output {
                                    reader: &**reader,
                                    destination,
                                },
                            ),
                        );
                    }
                }
            }
            if !info.metadatas().is_empty() {
                tabs.add(
                    title("metadata"),
                    PerRootTabRenderer::new(
                        root_name,
                        PerRootTab::Metadata {
                            registry: &self.metadata_registry,
                        },
                    ),
                );
            }
        }

        Ok(tabs)
    }
}

fn output_tab_title(destination: Destination) -> &'static str {
    match destination {
        Destination::StdOut => "standard output",
        Destination::StdErr => "error output",
    }
}

/// Returns the title shown for a node: its last segment, or `All Results` for the root.
pub fn page_title(path: &TestPath) -> &str {
    path.name().unwrap_or("All Results")
}

fn render_breadcrumbs(path: &TestPath, writer: &mut HtmlWriter) {
    let Some(name) = path.name() else {
        return;
    };

    writer.start_element_with("div", &[("class", "breadcrumbs")]);
    for ancestor in path.ancestors() {
        let label = ancestor.name().unwrap_or("all");
        let href = url_to(path, &ancestor);
        writer
            .text_element("a", &[("href", href.as_str())], label)
            .characters(" > ");
    }
    writer.characters(name).end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutputReader;
    use maplit::hashset;
    use pretty_assertions::assert_eq;
    use std::{collections::HashSet, time::Duration};
    use test_case::test_case;
    use test_strategy::proptest;
    use testreport_metadata::{
        OutputId, ResultType, SerializedMetadata, SerializedMetadataEntry, TestResultRecord,
    };

    fn path(s: &str) -> TestPath {
        TestPath::parse(s).unwrap()
    }

    fn record(p: &str, result_type: ResultType) -> TestResultRecord {
        TestResultRecord::new(path(p), result_type, Duration::from_millis(3))
    }

    #[test_case("", "index.html" ; "root")]
    #[test_case("a", "a/index.html" ; "one segment")]
    #[test_case("a/b c", "a/b%20c/index.html" ; "space")]
    #[test_case("x/..", "x/%2E%2E/index.html" ; "dot dot")]
    #[test_case("index.html", "index%2Ehtml/index.html" ; "index file name")]
    #[test_case("tést", "t%C3%A9st/index.html" ; "non ascii")]
    fn page_files(p: &str, expected: &str) {
        assert_eq!(page_file_path(&path(p)), expected);
    }

    #[test_case("", "", "#" ; "root self link")]
    #[test_case("a/b", "a/b", "#" ; "self link")]
    #[test_case("", "a", "a/index.html" ; "root to child")]
    #[test_case("a", "", "../index.html" ; "child to root")]
    #[test_case("a/b", "", "../../index.html" ; "grandchild to root")]
    #[test_case("a/b", "a", "../index.html" ; "to parent")]
    #[test_case("a/b", "a/c", "../c/index.html" ; "to sibling")]
    #[test_case("a", "a/b c", "b%2520c/index.html" ; "escaped segment")]
    fn urls(origin: &str, target: &str, expected: &str) {
        assert_eq!(url_to(&path(origin), &path(target)), expected);
    }

    #[test]
    fn resource_urls() {
        assert_eq!(
            relative_url(&page_file_path(&TestPath::ROOT), Utf8Path::new(STYLESHEET_PATH)),
            "css/style.css"
        );
        assert_eq!(
            relative_url(&page_file_path(&path("a/b")), Utf8Path::new(SCRIPT_PATH)),
            "../../js/report.js"
        );
    }

    /// Resolves a relative URL against a directory, undoing URL escaping.
    fn resolve(dir: &Utf8Path, url: &str) -> Utf8PathBuf {
        let mut resolved: Vec<String> = dir.components().map(|c| c.to_string()).collect();
        for segment in url.split('/') {
            let segment = percent_encoding::percent_decode_str(segment)
                .decode_utf8()
                .unwrap()
                .into_owned();
            if segment == ".." {
                resolved.pop().expect("relative URL escapes the report directory");
            } else {
                resolved.push(segment);
            }
        }
        resolved.iter().collect()
    }

    #[proptest]
    fn url_resolves_to_target_page(a: TestPath, b: TestPath) {
        let url = url_to(&a, &b);
        if a == b {
            proptest::prop_assert_eq!(url, "#");
        } else {
            let a_file = page_file_path(&a);
            let a_dir = a_file.parent().unwrap();
            proptest::prop_assert_eq!(resolve(a_dir, &url), page_file_path(&b));
        }
    }

    #[proptest]
    fn page_files_are_unique(a: TestPath, b: TestPath) {
        if a != b {
            proptest::prop_assert_ne!(page_file_path(&a), page_file_path(&b));
        }
    }

    struct Fixture {
        model: TestTreeModel,
        renderer: GenericPageRenderer,
    }

    fn fixture(root_names: &[&str]) -> Fixture {
        let mut builder = TestTreeModel::builder();
        let mut readers: IndexMap<String, Box<dyn OutputReader>> = IndexMap::new();
        let mut display_names = IndexMap::new();

        for &root_name in root_names {
            builder
                .add_root(
                    root_name,
                    [
                        record("suite/passes", ResultType::Success).with_output_id(OutputId(1)),
                        record("suite/fails", ResultType::Failure)
                            .with_output_id(OutputId(2))
                            .with_metadata(SerializedMetadata {
                                log_time: 0,
                                entries: vec![SerializedMetadataEntry::new(
                                    "owner",
                                    r#""team-a""#,
                                    "string",
                                )],
                            }),
                    ],
                )
                .unwrap();

            let mut reader = MemoryOutputReader::new();
            reader
                .insert(OutputId(1), Destination::StdOut, "hello from passes\n")
                .insert(OutputId(2), Destination::StdErr, "oh no\n");
            readers.insert(root_name.to_owned(), Box::new(reader));
            display_names.insert(root_name.to_owned(), format!("{root_name} display"));
        }

        Fixture {
            model: builder.build().unwrap(),
            renderer: GenericPageRenderer::new(readers, display_names),
        }
    }

    fn tab_titles(html: &str) -> Vec<String> {
        let tab_links = html
            .split_once("<ul class=\"tabLinks\">")
            .unwrap()
            .1
            .split_once("</ul>")
            .unwrap()
            .0;
        tab_links
            .split("<a ")
            .skip(1)
            .map(|link| {
                let text = link.split_once('>').unwrap().1;
                text.split_once("</a>").unwrap().0.to_owned()
            })
            .collect()
    }

    #[test]
    fn tabs_for_single_root() {
        let fixture = fixture(&["test"]);
        let render = |p: &str| {
            let id = fixture.model.node_id(&path(p)).unwrap();
            fixture.renderer.render(&fixture.model, id).unwrap()
        };

        assert_eq!(tab_titles(&render("suite")), ["summary"]);
        assert_eq!(
            tab_titles(&render("suite/passes")),
            ["summary", "standard output"]
        );
        assert_eq!(
            tab_titles(&render("suite/fails")),
            ["summary", "error output", "metadata"]
        );
    }

    #[test]
    fn tabs_for_multiple_roots() {
        let fixture = fixture(&["unit", "integration"]);
        let id = fixture.model.node_id(&path("suite/passes")).unwrap();
        let html = fixture.renderer.render(&fixture.model, id).unwrap();

        assert_eq!(
            tab_titles(&html),
            [
                "&apos;unit display&apos; summary",
                "&apos;unit display&apos; standard output",
                "&apos;integration display&apos; summary",
                "&apos;integration display&apos; standard output",
            ]
        );
        assert!(html.contains("<div id=\"tab3\" class=\"tab\">"));
    }

    #[test]
    fn page_structure() {
        let fixture = fixture(&["test"]);
        let id = fixture.model.node_id(&path("suite/passes")).unwrap();
        let html = fixture.renderer.render(&fixture.model, id).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">"));
        assert!(html.contains("<title>Test results - passes</title>"));
        assert!(html.contains("<link href=\"../../css/style.css\" rel=\"stylesheet\""));
        assert!(html.contains("<script src=\"../../js/report.js\"></script>"));
        assert!(html.contains("<h1>passes</h1>"));
        assert!(html.contains(
            "<div class=\"breadcrumbs\"><a href=\"../../index.html\">all</a> &gt; \
             <a href=\"../index.html\">suite</a> &gt; passes</div>"
        ));
        assert!(html.contains("<pre>hello from passes\n</pre>"));
        assert!(!html.contains("id=\"footer\""));
        assert!(html.ends_with("</div></body></html>"));
    }

    #[test]
    fn root_page() {
        let fixture = fixture(&["test"]);
        let html = fixture
            .renderer
            .render(&fixture.model, NodeId::ROOT)
            .unwrap();

        assert!(html.contains("<title>Test results - All Results</title>"));
        assert!(html.contains("<h1>All Results</h1>"));
        assert!(!html.contains("breadcrumbs"));
        assert!(html.contains("<link href=\"css/style.css\""));
        assert!(html.contains("<a href=\"suite/index.html\">suite</a>"));
    }

    #[test]
    fn title_prefix_and_footer() {
        let Fixture { model, renderer } = fixture(&["test"]);
        let renderer = renderer
            .with_title_prefix("Nightly")
            .with_footer("Generated at noon");
        let html = renderer.render(&model, NodeId::ROOT).unwrap();

        assert!(html.contains("<title>Nightly - All Results</title>"));
        assert!(html.contains("<div id=\"footer\"><p>Generated at noon</p></div>"));
    }

    #[test]
    fn missing_output_reader() {
        let mut builder = TestTreeModel::builder();
        builder
            .add_root("test", [record("a", ResultType::Success)])
            .unwrap();
        let model = builder.build().unwrap();
        let renderer = GenericPageRenderer::new(IndexMap::new(), IndexMap::new());

        let error = renderer.render(&model, NodeId::ROOT).unwrap_err();
        assert!(
            matches!(&error, RenderError::MissingOutputReader { root_name } if root_name == "test"),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn output_presence_checked_on_every_render() {
        use std::sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        };

        struct ToggleReader(Arc<AtomicBool>);
        impl OutputReader for ToggleReader {
            fn has_output(&self, _: OutputId, _: Destination) -> bool {
                self.0.load(Ordering::SeqCst)
            }

            fn get_output(
                &self,
                _: OutputId,
                _: Destination,
            ) -> std::io::Result<Box<dyn std::io::BufRead + '_>> {
                Ok(Box::new(&b"x"[..]))
            }
        }

        let present = Arc::new(AtomicBool::new(false));
        let mut builder = TestTreeModel::builder();
        builder
            .add_root(
                "test",
                [record("a", ResultType::Success).with_output_id(OutputId(1))],
            )
            .unwrap();
        let model = builder.build().unwrap();
        let mut readers: IndexMap<String, Box<dyn OutputReader>> = IndexMap::new();
        readers.insert("test".to_owned(), Box::new(ToggleReader(present.clone())));
        let renderer = GenericPageRenderer::new(readers, IndexMap::new());
        let id = model.node_id(&path("a")).unwrap();

        // With no display names known, titles are prefixed with the root name.
        let titles = |html: &str| tab_titles(html).into_iter().collect::<HashSet<_>>();
        assert_eq!(
            titles(&renderer.render(&model, id).unwrap()),
            hashset! {"&apos;test&apos; summary".to_owned()}
        );
        present.store(true, Ordering::SeqCst);
        assert_eq!(
            titles(&renderer.render(&model, id).unwrap()),
            hashset! {
                "&apos;test&apos; summary".to_owned(),
                "&apos;test&apos; standard output".to_owned(),
                "&apos;test&apos; error output".to_owned(),
            }
        );
    }
}
