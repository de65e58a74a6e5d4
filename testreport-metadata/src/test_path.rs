// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::TestPathParseError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A slash-separated hierarchical identifier for a node in a test tree.
///
/// The empty path is [`TestPath::ROOT`]. Every other path consists of one or more non-empty
/// segments, none of which contain `/`.
///
/// Paths are ordered lexicographically by segment, so a path always sorts after each of its
/// ancestors.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestPath {
    segments: Vec<String>,
}

impl TestPath {
    /// The root path, which has no segments.
    pub const ROOT: TestPath = TestPath {
        segments: Vec::new(),
    };

    /// The separator between segments.
    pub const SEPARATOR: char = '/';

    /// Parses a path from its string form.
    ///
    /// The empty string parses to [`Self::ROOT`].
    pub fn parse(input: &str) -> Result<Self, TestPathParseError> {
        if input.is_empty() {
            return Ok(Self::ROOT);
        }

        let segments = input
            .split(Self::SEPARATOR)
            .enumerate()
            .map(|(index, segment)| {
                if segment.is_empty() {
                    Err(TestPathParseError::empty_segment(input, index))
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Builds a path out of individual segments.
    pub fn from_segments<S: Into<String>>(
        segments: impl IntoIterator<Item = S>,
    ) -> Result<Self, TestPathParseError> {
        let mut path = Self::ROOT;
        for segment in segments {
            path = path.child(segment)?;
        }
        Ok(path)
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment of this path, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Returns the number of segments in this path.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the segments of this path, outermost first.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> + Clone + '_ {
        self.segments.iter().map(|s| s.as_str())
    }

    /// Returns the parent of this path, or `None` for the root.
    pub fn parent(&self) -> Option<TestPath> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Result<TestPath, TestPathParseError> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(TestPathParseError::empty_segment(
                self.child_display(&segment),
                self.segments.len(),
            ));
        }
        if segment.contains(Self::SEPARATOR) {
            return Err(TestPathParseError::separator_in_segment(
                self.child_display(&segment),
                segment,
            ));
        }

        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// Returns the strict ancestors of this path, starting with the root and ending with the
    /// parent.
    ///
    /// The root has no ancestors.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            path: self,
            next_len: 0,
        }
    }

    /// Returns true if `self` is a strict prefix of `other`.
    pub fn is_strict_ancestor_of(&self, other: &TestPath) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }

    fn child_display(&self, segment: &str) -> String {
        if self.is_root() {
            segment.to_owned()
        } else {
            format!("{self}{}{segment}", Self::SEPARATOR)
        }
    }
}

impl fmt::Display for TestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for TestPath {
    type Err = TestPathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TestPath {
    type Error = TestPathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TestPath> for String {
    fn from(path: TestPath) -> Self {
        path.to_string()
    }
}

/// Iterator over the strict ancestors of a [`TestPath`], returned by [`TestPath::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    path: &'a TestPath,
    next_len: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = TestPath;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_len >= self.path.segments.len() {
            return None;
        }
        let ancestor = TestPath {
            segments: self.path.segments[..self.next_len].to_vec(),
        };
        self.next_len += 1;
        Some(ancestor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.path.segments.len().saturating_sub(self.next_len);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ancestors<'_> {}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::*;
    use proptest::{collection::vec, prelude::*};

    impl Arbitrary for TestPath {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            vec("[a-zA-Z0-9 ._%()-]{1,8}", 0..5)
                .prop_map(|segments| TestPath { segments })
                .boxed()
        }
    }
}
