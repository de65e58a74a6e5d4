// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders test results from one or more roots as a cross-linked HTML report.
//!
//! This crate is the command-line frontend. The rendering itself lives in
//! [`testreport-renderer`](testreport_renderer).

#![warn(missing_docs)]

mod dispatch;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use output::{Color, OutputContext, StderrStyles};
