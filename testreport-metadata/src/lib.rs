// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Serializable test result records for the testreport HTML renderer.
//!
//! Producers write a [`ResultStoreDocument`] per root (one independent source of test results,
//! such as one test task). The renderer aggregates the documents of all roots into a single tree
//! keyed by [`TestPath`].

mod errors;
mod records;
mod test_path;

pub use errors::*;
pub use records::*;
pub use test_path::*;
