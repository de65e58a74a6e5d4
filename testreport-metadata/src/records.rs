// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::test_path::TestPath;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// The outcome of a single test or container.
///
/// This set is closed: any other value is rejected at deserialization time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    /// The test passed.
    Success,
    /// The test failed.
    Failure,
    /// The test was skipped.
    Skipped,
}

impl ResultType {
    /// Returns the string form used in serialized records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque handle correlating a test result to captured output held by a result store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(pub u64);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which captured stream to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Standard output.
    StdOut,
    /// Standard error.
    StdErr,
}

impl Destination {
    /// All destinations, in display order.
    pub const ALL: [Destination; 2] = [Destination::StdOut, Destination::StdErr];

    /// Returns the short name of this destination, also used as a file extension by
    /// file-backed stores.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StdOut => "stdout",
            Self::StdErr => "stderr",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure attached to a test result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SerializableFailure {
    /// The failure message.
    pub message: String,

    /// The full stack trace, including the message.
    pub stack_trace: String,

    /// The type of the exception or error, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
}

impl SerializableFailure {
    /// Creates a new failure with a message and stack trace.
    pub fn new(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
            exception_type: None,
        }
    }
}

/// A single key/value pair in a [`SerializedMetadata`] event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SerializedMetadataEntry {
    /// The metadata key.
    pub key: String,

    /// The serialized value. Its interpretation depends on `value_type`.
    pub value: String,

    /// Identifier for the declared type of the value, used to pick a renderer.
    pub value_type: String,
}

impl SerializedMetadataEntry {
    /// Creates a new entry.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_type: value_type.into(),
        }
    }
}

/// A metadata event logged by a test: a timestamp and an ordered set of entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SerializedMetadata {
    /// Milliseconds since the Unix epoch at which the event was captured.
    pub log_time: i64,

    /// The entries, in the order they were logged.
    pub entries: Vec<SerializedMetadataEntry>,
}

/// The serialized result of one test or container, as seen from one root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestResultRecord {
    /// The hierarchical path of this result.
    pub path: TestPath,

    /// The internal name of the test.
    pub name: String,

    /// The name shown to users. May differ from `name`.
    pub display_name: String,

    /// The outcome.
    pub result_type: ResultType,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Failures recorded for this result, in order.
    #[serde(default)]
    pub failures: Vec<SerializableFailure>,

    /// Handle to captured output, if any was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_id: Option<OutputId>,

    /// Metadata events, in the order they were logged.
    #[serde(default)]
    pub metadatas: Vec<SerializedMetadata>,
}

impl TestResultRecord {
    /// Creates a record whose display name equals its name and which has no failures, output or
    /// metadata.
    ///
    /// The name is the last path segment, or the empty string for the root.
    pub fn new(path: TestPath, result_type: ResultType, duration: Duration) -> Self {
        let name = path.name().unwrap_or_default().to_owned();
        Self {
            path,
            display_name: name.clone(),
            name,
            result_type,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            failures: Vec::new(),
            output_id: None,
            metadatas: Vec::new(),
        }
    }

    /// Returns the duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Adds a failure.
    pub fn with_failure(mut self, failure: SerializableFailure) -> Self {
        self.failures.push(failure);
        self
    }

    /// Sets the output identifier.
    pub fn with_output_id(mut self, output_id: OutputId) -> Self {
        self.output_id = Some(output_id);
        self
    }

    /// Adds a metadata event.
    pub fn with_metadata(mut self, metadata: SerializedMetadata) -> Self {
        self.metadatas.push(metadata);
        self
    }
}

/// The document persisted by a result store: every record produced by one root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultStoreDocument {
    /// The version of this format.
    pub format_version: u32,

    /// A human-readable name for the root, if the producer supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_display_name: Option<String>,

    /// The records, in the order they were produced.
    pub records: Vec<TestResultRecord>,
}

impl ResultStoreDocument {
    /// The format version written by this crate.
    pub const FORMAT_VERSION: u32 = 1;

    /// Creates a new document at the current format version.
    pub fn new(records: Vec<TestResultRecord>) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            root_display_name: None,
            records,
        }
    }

    /// Parses a document from JSON.
    ///
    /// The format version is not checked; callers decide which versions they accept.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
