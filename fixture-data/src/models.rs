// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for fixture information.

use testreport_metadata::{Destination, OutputId, ResultStoreDocument, TestResultRecord};

/// The results and captured output of one root.
#[derive(Clone, Debug)]
pub struct RootFixture {
    pub name: &'static str,
    pub display_name: &'static str,
    pub records: Vec<TestResultRecord>,
    pub outputs: Vec<OutputFixture>,
}

impl RootFixture {
    pub fn new(name: &'static str, display_name: &'static str) -> Self {
        Self {
            name,
            display_name,
            records: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: TestResultRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_output(
        mut self,
        output_id: u64,
        destination: Destination,
        contents: &'static str,
    ) -> Self {
        self.outputs.push(OutputFixture {
            output_id: OutputId(output_id),
            destination,
            contents,
        });
        self
    }

    /// Returns the document a result store for this root would hold.
    pub fn document(&self) -> ResultStoreDocument {
        let mut document = ResultStoreDocument::new(self.records.clone());
        document.root_display_name = Some(self.display_name.to_owned());
        document
    }
}

#[derive(Copy, Clone, Debug)]
pub struct OutputFixture {
    pub output_id: OutputId,
    pub destination: Destination,
    pub contents: &'static str,
}

/// Leaf counts expected at one path, in one root.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExpectedCounts {
    pub path: &'static str,
    pub root_name: &'static str,
    pub total: usize,
    pub failed: usize,
    pub skipped: usize,
}
