// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::RenderError, html::HtmlWriter, output::OutputReader, tree::PerRootInfo};
use std::io::{self, BufRead};
use testreport_metadata::Destination;

pub(super) fn render(
    root_name: &str,
    info: &PerRootInfo,
    reader: &dyn OutputReader,
    destination: Destination,
    writer: &mut HtmlWriter,
) -> Result<(), RenderError> {
    writer
        .start_element_with("span", &[("class", "code")])
        .start_element("pre");

    if let Some(output_id) = info.output_id() {
        let to_render_error = |error| RenderError::ReadOutput {
            root_name: root_name.to_owned(),
            output_id,
            destination,
            error,
        };

        // The stream is dropped at the end of this block, on success or failure.
        let mut stream = reader
            .get_output(output_id, destination)
            .map_err(to_render_error)?;
        copy_escaped(&mut stream, writer).map_err(to_render_error)?;
    }

    writer.end_element().end_element();
    Ok(())
}

/// Copies `stream` into `writer` line by line, replacing invalid UTF-8.
fn copy_escaped(stream: &mut dyn BufRead, writer: &mut HtmlWriter) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if stream.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        writer.characters(&String::from_utf8_lossy(&line));
    }
}
