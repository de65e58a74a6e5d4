// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurred while parsing a [`TestPath`](crate::TestPath).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid test path `{input}`: {kind}")]
pub struct TestPathParseError {
    input: String,
    kind: TestPathParseErrorKind,
}

impl TestPathParseError {
    pub(crate) fn empty_segment(input: impl Into<String>, index: usize) -> Self {
        Self {
            input: input.into(),
            kind: TestPathParseErrorKind::EmptySegment { index },
        }
    }

    pub(crate) fn separator_in_segment(input: impl Into<String>, segment: String) -> Self {
        Self {
            input: input.into(),
            kind: TestPathParseErrorKind::SeparatorInSegment { segment },
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the reason parsing failed.
    pub fn kind(&self) -> &TestPathParseErrorKind {
        &self.kind
    }
}

/// The reason a [`TestPathParseError`] occurred.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestPathParseErrorKind {
    /// A segment was empty.
    #[error("empty segment at index {index}")]
    EmptySegment {
        /// The index of the empty segment.
        index: usize,
    },

    /// A segment contained the path separator.
    #[error("segment `{segment}` contains `/`")]
    SeparatorInSegment {
        /// The offending segment.
        segment: String,
    },
}
