// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [testreport](https://crates.io/crates/testreport).
//!
//! Results from one or more roots are merged into a [`TestTreeModel`](tree::TestTreeModel), and
//! every node of the tree is rendered to a cross-linked HTML page by a
//! [`GenericPageRenderer`](page::GenericPageRenderer). The
//! [`HtmlReportGenerator`](generator::HtmlReportGenerator) writes all pages and their shared
//! resources to a directory.

pub mod config;
pub mod errors;
pub mod generator;
pub mod html;
pub mod metadata;
pub mod output;
pub mod page;
pub mod store;
pub mod tabs;
pub mod time;
pub mod tree;
