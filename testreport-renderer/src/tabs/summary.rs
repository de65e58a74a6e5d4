// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    html::HtmlWriter,
    page::url_to,
    time::format_duration_very_terse,
    tree::{NodeId, PerRootInfo, TestTreeModel},
};
use testreport_metadata::ResultType;

/// Returns the CSS class used to mark a result's status.
pub fn status_class(result_type: ResultType) -> &'static str {
    match result_type {
        ResultType::Success => "success",
        ResultType::Failure => "failures",
        ResultType::Skipped => "skipped",
    }
}

/// Formats the percentage of non-failed leaves, rounded down, or `-` if there are no leaves.
pub fn format_success_rate(total: usize, failed: usize) -> String {
    if total == 0 {
        return "-".to_owned();
    }
    let succeeded = total.saturating_sub(failed);
    format!("{}%", succeeded * 100 / total)
}

pub(super) fn render(
    model: &TestTreeModel,
    id: NodeId,
    root_name: &str,
    info: &PerRootInfo,
    writer: &mut HtmlWriter,
) {
    render_counters(info, writer);

    if info.has_children() {
        render_children(model, id, root_name, writer);
    } else {
        render_leaf_details(info, writer);
    }
}

fn render_counters(info: &PerRootInfo, writer: &mut HtmlWriter) {
    let result = info.result();

    writer
        .start_element_with("div", &[("class", "summary")])
        .start_element("table")
        .start_element("tr")
        .start_element("td")
        .start_element_with("div", &[("class", "summaryGroup")])
        .start_element("table")
        .start_element("tr");
    info_box(writer, "infoBox", &info.total_leaf_count().to_string(), "tests");
    info_box(
        writer,
        "infoBox",
        &info.failed_leaf_count().to_string(),
        "failures",
    );
    info_box(
        writer,
        "infoBox",
        &info.skipped_leaf_count().to_string(),
        "skipped",
    );
    info_box(
        writer,
        "infoBox duration",
        &format_duration_very_terse(result.duration),
        "duration",
    );
    // tr, table, div.summaryGroup, td
    writer
        .end_element()
        .end_element()
        .end_element()
        .end_element();

    let rate_class = format!("infoBox {} successRate", status_class(result.result_type));
    writer
        .start_element("td")
        .start_element_with("div", &[("class", rate_class.as_str())])
        .text_element(
            "div",
            &[("class", "percent")],
            &format_success_rate(info.total_leaf_count(), info.failed_leaf_count()),
        )
        .text_element("p", &[], "successful")
        .end_element()
        .end_element();

    // tr, table, div.summary
    writer.end_element().end_element().end_element();
}

fn info_box(writer: &mut HtmlWriter, class: &str, counter: &str, label: &str) {
    writer
        .start_element("td")
        .start_element_with("div", &[("class", class)])
        .text_element("div", &[("class", "counter")], counter)
        .text_element("p", &[], label)
        .end_element()
        .end_element();
}

fn render_leaf_details(info: &PerRootInfo, writer: &mut HtmlWriter) {
    let result = info.result();
    let heading = match result.result_type {
        ResultType::Success => return,
        ResultType::Failure => "Failure details",
        ResultType::Skipped => "Skip details",
    };
    if result.failures.is_empty() {
        return;
    }

    writer
        .start_element_with("div", &[("class", "result-details")])
        .text_element("h3", &[], heading)
        .start_element_with("span", &[("class", "code")])
        .start_element("pre");
    for failure in &result.failures {
        writer.characters(&failure.stack_trace).characters("\n");
    }
    writer.end_element().end_element().end_element();
}

fn render_children(model: &TestTreeModel, id: NodeId, root_name: &str, writer: &mut HtmlWriter) {
    let origin = model.node(id).path();
    let children = model.children_of(id, root_name);
    let show_name = children
        .clone()
        .any(|(_, _, info)| info.result().name != info.result().display_name);

    writer.start_element("table").start_element("thead").start_element("tr");
    writer.text_element("th", &[], "Child");
    if show_name {
        writer.text_element("th", &[], "Name");
    }
    for heading in ["Tests", "Failures", "Skipped", "Duration", "Success rate"] {
        writer.text_element("th", &[], heading);
    }
    writer.end_element().end_element();

    writer.start_element("tbody");
    for (_, child, info) in children {
        let result = info.result();
        let class = status_class(result.result_type);
        let href = url_to(origin, child.path());

        writer
            .start_element("tr")
            .start_element_with("td", &[("class", class)])
            .text_element("a", &[("href", href.as_str())], &result.display_name)
            .end_element();
        if show_name {
            writer.text_element("td", &[], &result.name);
        }
        writer
            .text_element("td", &[], &info.total_leaf_count().to_string())
            .text_element("td", &[], &info.failed_leaf_count().to_string())
            .text_element("td", &[], &info.skipped_leaf_count().to_string())
            .text_element("td", &[], &format_duration_very_terse(result.duration))
            .text_element(
                "td",
                &[("class", class)],
                &format_success_rate(info.total_leaf_count(), info.failed_leaf_count()),
            )
            .end_element();
    }
    writer.end_element().end_element();
}
