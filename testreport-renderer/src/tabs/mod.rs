// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-root tabs within a page.
//!
//! Every page has one set of tabs per root: a summary, the captured standard output and error
//! when present, and metadata when any was logged.

mod metadata;
mod output;
mod summary;

pub use summary::{format_success_rate, status_class};

use crate::{
    errors::RenderError,
    html::HtmlWriter,
    metadata::MetadataRendererRegistry,
    output::OutputReader,
    tree::{NodeId, TestTreeModel},
};
use std::fmt;
use swrite::{SWrite, swrite};
use testreport_metadata::Destination;

/// The kind of content shown by a [`PerRootTabRenderer`].
#[derive(Clone, Copy)]
pub enum PerRootTab<'a> {
    /// Counts, success rate, and either failure details or a table of children.
    Summary,

    /// Captured output, copied verbatim.
    Output {
        /// The reader for the root's captured output.
        reader: &'a dyn OutputReader,
        /// Which stream to copy.
        destination: Destination,
    },

    /// Metadata events logged by the test.
    Metadata {
        /// Renderers for metadata values.
        registry: &'a MetadataRendererRegistry,
    },
}

impl fmt::Debug for PerRootTab<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => f.write_str("Summary"),
            Self::Output { destination, .. } => f
                .debug_struct("Output")
                .field("destination", destination)
                .finish_non_exhaustive(),
            Self::Metadata { .. } => f.debug_struct("Metadata").finish_non_exhaustive(),
        }
    }
}

/// Renders one tab for one root at one node.
#[derive(Clone, Copy, Debug)]
pub struct PerRootTabRenderer<'a> {
    root_name: &'a str,
    tab: PerRootTab<'a>,
}

impl<'a> PerRootTabRenderer<'a> {
    /// Creates a new tab renderer.
    pub fn new(root_name: &'a str, tab: PerRootTab<'a>) -> Self {
        Self { root_name, tab }
    }

    /// Returns the root this tab renders.
    pub fn root_name(&self) -> &'a str {
        self.root_name
    }

    /// Returns the kind of tab.
    pub fn tab(&self) -> &PerRootTab<'a> {
        &self.tab
    }

    /// Renders the tab content for the node `id` of `model`.
    pub fn render(
        &self,
        model: &TestTreeModel,
        id: NodeId,
        writer: &mut HtmlWriter,
    ) -> Result<(), RenderError> {
        let node = model.node(id);
        let info =
            node.per_root_info()
                .get(self.root_name)
                .ok_or_else(|| RenderError::MissingRootInfo {
                    root_name: self.root_name.to_owned(),
                    path: node.path().clone(),
                })?;

        match self.tab {
            PerRootTab::Summary => {
                summary::render(model, id, self.root_name, info, writer);
                Ok(())
            }
            PerRootTab::Output {
                reader,
                destination,
            } => output::render(self.root_name, info, reader, destination, writer),
            PerRootTab::Metadata { registry } => {
                metadata::render(info, registry, writer);
                Ok(())
            }
        }
    }
}

/// A titled list of tabs, rendered as a tab strip followed by one content region per tab.
#[derive(Debug, Default)]
pub struct TabsRenderer<'a> {
    tabs: Vec<(String, PerRootTabRenderer<'a>)>,
}

impl<'a> TabsRenderer<'a> {
    /// Creates an empty set of tabs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tab.
    pub fn add(&mut self, title: impl Into<String>, renderer: PerRootTabRenderer<'a>) -> &mut Self {
        self.tabs.push((title.into(), renderer));
        self
    }

    /// Returns the tab titles, in order.
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.tabs.iter().map(|(title, _)| title.as_str())
    }

    /// Renders the tab strip and every tab's content.
    pub fn render(
        &self,
        model: &TestTreeModel,
        id: NodeId,
        writer: &mut HtmlWriter,
    ) -> Result<(), RenderError> {
        writer.start_element_with("div", &[("id", "tabs")]);

        writer.start_element_with("ul", &[("class", "tabLinks")]);
        for (index, (title, _)) in self.tabs.iter().enumerate() {
            let mut href = String::new();
            swrite!(href, "#tab{index}");
            writer
                .start_element("li")
                .text_element("a", &[("href", href.as_str())], title)
                .end_element();
        }
        writer.end_element();

        for (index, (title, renderer)) in self.tabs.iter().enumerate() {
            let mut tab_id = String::new();
            swrite!(tab_id, "tab{index}");
            writer
                .start_element_with("div", &[("id", tab_id.as_str()), ("class", "tab")])
                .text_element("h2", &[], title);
            renderer.render(model, id, writer)?;
            writer.end_element();
        }

        writer.end_element();
        Ok(())
    }
}
