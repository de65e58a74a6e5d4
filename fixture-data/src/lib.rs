// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned results shared by testreport's tests.

pub mod models;
pub mod report_roots;
