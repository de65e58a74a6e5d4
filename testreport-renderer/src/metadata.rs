// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of structured metadata values.
//!
//! Metadata entries carry a serialized value and the identifier of its declared type. The
//! [`MetadataRendererRegistry`] maps type identifiers to renderers. Rendering a value never fails
//! as a whole: if no renderer is registered for a type, or the renderer returns an error, the
//! value is replaced by [`UNRENDERABLE_PLACEHOLDER`].

use crate::{
    errors::{DisplayErrorChain, MetadataRenderError},
    html::HtmlWriter,
};
use debug_ignore::DebugIgnore;
use std::collections::HashMap;
use tracing::debug;

/// Text shown in place of a metadata value that could not be rendered.
pub const UNRENDERABLE_PLACEHOLDER: &str = "[error rendering value]";

/// A function that renders a serialized metadata value as an HTML fragment.
pub type MetadataRenderFn =
    dyn Fn(&str, &mut HtmlWriter) -> Result<(), MetadataRenderError> + Send + Sync;

/// Maps declared value types to renderers.
#[derive(Debug, Default)]
pub struct MetadataRendererRegistry {
    renderers: HashMap<String, DebugIgnore<Box<MetadataRenderFn>>>,
}

impl MetadataRendererRegistry {
    /// Type identifier for JSON strings rendered as text.
    pub const STRING: &'static str = "string";
    /// Type identifier for JSON booleans.
    pub const BOOLEAN: &'static str = "boolean";
    /// Type identifier for JSON numbers.
    pub const NUMBER: &'static str = "number";
    /// Type identifier for arbitrary JSON, rendered pretty-printed.
    pub const JSON: &'static str = "json";
    /// Type identifier for JSON strings holding an `http` or `https` URL, rendered as a link.
    pub const LINK: &'static str = "link";

    /// Creates a registry with no renderers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with renderers for the built-in value types.
    pub fn with_default_renderers() -> Self {
        let mut registry = Self::new();
        registry
            .register(Self::STRING, |value, writer| {
                let s: String = decode(Self::STRING, value)?;
                writer.characters(&s);
                Ok(())
            })
            .register(Self::BOOLEAN, |value, writer| {
                let b: bool = decode(Self::BOOLEAN, value)?;
                writer.characters(if b { "true" } else { "false" });
                Ok(())
            })
            .register(Self::NUMBER, |value, writer| {
                let n: serde_json::Number = decode(Self::NUMBER, value)?;
                writer.characters(&n.to_string());
                Ok(())
            })
            .register(Self::JSON, |value, writer| {
                let v: serde_json::Value = decode(Self::JSON, value)?;
                let pretty =
                    serde_json::to_string_pretty(&v).map_err(|error| MetadataRenderError::Decode {
                        value_type: Self::JSON.to_owned(),
                        error,
                    })?;
                writer.text_element("pre", &[], &pretty);
                Ok(())
            })
            .register(Self::LINK, |value, writer| {
                let url: String = decode(Self::LINK, value)?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(MetadataRenderError::invalid_value(
                        Self::LINK,
                        "only http and https links are rendered",
                    ));
                }
                writer.text_element("a", &[("href", url.as_str())], &url);
                Ok(())
            });
        registry
    }

    /// Registers a renderer for `value_type`, replacing any existing one.
    pub fn register<F>(&mut self, value_type: impl Into<String>, renderer: F) -> &mut Self
    where
        F: Fn(&str, &mut HtmlWriter) -> Result<(), MetadataRenderError> + Send + Sync + 'static,
    {
        self.renderers
            .insert(value_type.into(), DebugIgnore(Box::new(renderer)));
        self
    }

    /// Returns the renderer for `value_type`, if one is registered.
    pub fn get_renderer(&self, value_type: &str) -> Option<&MetadataRenderFn> {
        self.renderers.get(value_type).map(|r| &*r.0)
    }

    /// Renders `value` into a standalone fragment.
    pub fn try_render(&self, value_type: &str, value: &str) -> Result<String, MetadataRenderError> {
        let renderer =
            self.get_renderer(value_type)
                .ok_or_else(|| MetadataRenderError::UnknownType {
                    value_type: value_type.to_owned(),
                })?;
        let mut fragment = HtmlWriter::new();
        renderer(value, &mut fragment)?;
        Ok(fragment.into_string())
    }

    /// Renders `value` into `writer`, writing the placeholder instead if rendering fails.
    ///
    /// The renderer writes into a scratch buffer, so a failing renderer never leaves partial
    /// markup behind.
    pub fn render_value(&self, value_type: &str, value: &str, writer: &mut HtmlWriter) {
        match self.try_render(value_type, value) {
            Ok(fragment) => {
                writer.raw(&fragment);
            }
            Err(error) => {
                debug!(
                    value_type,
                    error = %DisplayErrorChain::new(error),
                    "rendering metadata value failed"
                );
                writer.text_element(
                    "span",
                    &[("class", "unrenderable")],
                    UNRENDERABLE_PLACEHOLDER,
                );
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    value_type: &str,
    value: &str,
) -> Result<T, MetadataRenderError> {
    serde_json::from_str(value).map_err(|error| MetadataRenderError::Decode {
        value_type: value_type.to_owned(),
        error,
    })
}
