// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    html::HtmlWriter, metadata::MetadataRendererRegistry, time::format_log_time, tree::PerRootInfo,
};

pub(super) fn render(
    info: &PerRootInfo,
    registry: &MetadataRendererRegistry,
    writer: &mut HtmlWriter,
) {
    writer
        .start_element_with("div", &[("class", "metadata")])
        .start_element("table")
        .start_element("tbody");

    for (index, metadata) in info.metadatas().iter().enumerate() {
        let parity = if index % 2 == 0 { "even" } else { "odd" };
        writer
            .start_element_with("tr", &[("class", parity)])
            .start_element("td")
            .text_element(
                "span",
                &[("class", "time")],
                &format_log_time(metadata.log_time),
            )
            .end_element();

        writer
            .start_element_with("td", &[("class", "elements")])
            .start_element("table")
            .start_element("thead")
            .start_element("tr")
            .text_element("th", &[], "Key")
            .text_element("th", &[], "Value")
            .end_element()
            .end_element()
            .start_element("tbody");
        for entry in &metadata.entries {
            writer
                .start_element("tr")
                .text_element("td", &[("class", "key")], &entry.key)
                .start_element_with("td", &[("class", "value")]);
            registry.render_value(&entry.value_type, &entry.value, writer);
            writer.end_element().end_element();
        }
        // tbody, table, td.elements, tr
        writer
            .end_element()
            .end_element()
            .end_element()
            .end_element();
    }

    writer.end_element().end_element().end_element();
}
