// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod fixtures;
mod generate;
