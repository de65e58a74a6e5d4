// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A minimal streaming HTML writer.
//!
//! Element and attribute names are static strings chosen by the renderers. All text and attribute
//! values are escaped; [`HtmlWriter::raw`] is the only way to emit unescaped markup, and is used to
//! splice in fragments produced by another `HtmlWriter`.

use quick_xml::escape::escape;
use swrite::{SWrite, swrite};

/// Writes HTML into an in-memory buffer.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buf: String,
    open: Vec<&'static str>,
}

impl HtmlWriter {
    /// Creates a new, empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the HTML5 doctype.
    pub fn doctype(&mut self) -> &mut Self {
        self.buf.push_str("<!DOCTYPE html>\n");
        self
    }

    /// Opens an element with no attributes.
    pub fn start_element(&mut self, name: &'static str) -> &mut Self {
        self.start_element_with(name, &[])
    }

    /// Opens an element with the given attributes.
    pub fn start_element_with(&mut self, name: &'static str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_start_tag(name, attrs);
        self.open.push(name);
        self
    }

    /// Writes a void element such as `<link>` or `<meta>`, which has no content and no end tag.
    pub fn empty_element(&mut self, name: &'static str, attrs: &[(&str, &str)]) -> &mut Self {
        self.write_start_tag(name, attrs);
        self
    }

    /// Writes escaped text.
    pub fn characters(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(&escape(text));
        self
    }

    /// Writes markup verbatim.
    pub fn raw(&mut self, html: &str) -> &mut Self {
        self.buf.push_str(html);
        self
    }

    /// Closes the innermost open element.
    ///
    /// # Panics
    ///
    /// Panics if no element is open.
    pub fn end_element(&mut self) -> &mut Self {
        let name = self
            .open
            .pop()
            .expect("end_element called with no open element");
        swrite!(self.buf, "</{name}>");
        self
    }

    /// Writes a complete element containing only escaped text.
    pub fn text_element(
        &mut self,
        name: &'static str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> &mut Self {
        self.start_element_with(name, attrs)
            .characters(text)
            .end_element()
    }

    /// Returns the markup written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consumes the writer, returning the markup.
    ///
    /// Any elements that are still open are closed first.
    pub fn into_string(mut self) -> String {
        while !self.open.is_empty() {
            self.end_element();
        }
        self.buf
    }

    fn write_start_tag(&mut self, name: &'static str, attrs: &[(&str, &str)]) {
        swrite!(self.buf, "<{name}");
        for (key, value) in attrs {
            swrite!(self.buf, " {key}=\"{}\"", escape(*value));
        }
        self.buf.push('>');
    }
}
