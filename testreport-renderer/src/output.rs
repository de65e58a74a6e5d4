// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to captured test output.

use std::{
    collections::HashMap,
    io::{self, BufRead, Cursor},
};
use testreport_metadata::{Destination, OutputId};

/// Read access to the output captured for one root.
///
/// Streams returned by [`get_output`](Self::get_output) are scoped: the caller holds the stream
/// for as long as it reads, and dropping it releases any underlying resources.
pub trait OutputReader: Send + Sync {
    /// Returns true if non-empty output was captured for this identifier and destination.
    fn has_output(&self, output_id: OutputId, destination: Destination) -> bool;

    /// Opens the captured output for reading.
    fn get_output(
        &self,
        output_id: OutputId,
        destination: Destination,
    ) -> io::Result<Box<dyn BufRead + '_>>;
}

/// An [`OutputReader`] backed by in-memory strings.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutputReader {
    outputs: HashMap<(OutputId, Destination), String>,
}

impl MemoryOutputReader {
    /// Creates a new reader with no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output for an identifier and destination, replacing any earlier value.
    pub fn insert(
        &mut self,
        output_id: OutputId,
        destination: Destination,
        output: impl Into<String>,
    ) -> &mut Self {
        self.outputs.insert((output_id, destination), output.into());
        self
    }
}

impl OutputReader for MemoryOutputReader {
    fn has_output(&self, output_id: OutputId, destination: Destination) -> bool {
        self.outputs
            .get(&(output_id, destination))
            .is_some_and(|output| !output.is_empty())
    }

    fn get_output(
        &self,
        output_id: OutputId,
        destination: Destination,
    ) -> io::Result<Box<dyn BufRead + '_>> {
        let output = self
            .outputs
            .get(&(output_id, destination))
            .map_or("", |output| output.as_str());
        Ok(Box::new(Cursor::new(output.as_bytes())))
    }
}
