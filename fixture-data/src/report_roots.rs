// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two roots, "unit" and "integration", that share part of their tree.

use crate::models::{ExpectedCounts, RootFixture};
use std::{sync::LazyLock, time::Duration};
use testreport_metadata::{
    Destination, OutputId, ResultType, SerializableFailure, SerializedMetadata,
    SerializedMetadataEntry, TestPath, TestResultRecord,
};

fn record(path: &str, result_type: ResultType, millis: u64) -> TestResultRecord {
    TestResultRecord::new(
        TestPath::parse(path).expect("fixture paths are valid"),
        result_type,
        Duration::from_millis(millis),
    )
}

pub static REPORT_ROOTS: LazyLock<Vec<RootFixture>> = LazyLock::new(|| {
    vec![
        RootFixture::new("unit", "Unit tests")
            .with_record(
                record("com.example/Calculator/adds", ResultType::Success, 12)
                    .with_output_id(OutputId(1)),
            )
            .with_record(
                record(
                    "com.example/Calculator/divides by zero",
                    ResultType::Failure,
                    3,
                )
                .with_failure(SerializableFailure::new(
                    "expected an error",
                    "AssertionError: expected an error\n    at Calculator.divide(Calculator.java:42)",
                ))
                .with_output_id(OutputId(2))
                .with_metadata(SerializedMetadata {
                    log_time: 1_718_454_896_789,
                    entries: vec![
                        SerializedMetadataEntry::new(
                            "issue",
                            r#""https://example.com/issues/7""#,
                            "link",
                        ),
                        SerializedMetadataEntry::new("retries", "2", "number"),
                        SerializedMetadataEntry::new("blob", r#""opaque""#, "Bogus"),
                    ],
                }),
            )
            .with_record(
                record("com.example/Calculator/subtracts", ResultType::Skipped, 0).with_failure(
                    SerializableFailure::new(
                        "assumption failed",
                        "AssumptionViolated: not supported on this platform",
                    ),
                ),
            )
            .with_record(
                record("com.example/Parser/parses <tags>", ResultType::Success, 5)
                    .with_display_name("parses <tags> & entities"),
            )
            .with_output(1, Destination::StdOut, "adding 2 + 2\nresult: 4\n")
            .with_output(2, Destination::StdErr, "warning: division by <zero>\n"),
        RootFixture::new("integration", "Integration tests")
            .with_record(record("com.example/Calculator", ResultType::Success, 45))
            .with_record(record("com.example/Calculator/adds", ResultType::Success, 30))
            .with_record(
                record("com.example/Server/starts", ResultType::Success, 100)
                    .with_output_id(OutputId(1)),
            )
            .with_output(1, Destination::StdOut, "listening on 8080\n")
            .with_output(1, Destination::StdErr, ""),
    ]
});

pub static EXPECTED_COUNTS: &[ExpectedCounts] = &[
    ExpectedCounts {
        path: "",
        root_name: "unit",
        total: 4,
        failed: 1,
        skipped: 1,
    },
    ExpectedCounts {
        path: "com.example/Calculator",
        root_name: "unit",
        total: 3,
        failed: 1,
        skipped: 1,
    },
    ExpectedCounts {
        path: "com.example/Parser",
        root_name: "unit",
        total: 1,
        failed: 0,
        skipped: 0,
    },
    ExpectedCounts {
        path: "",
        root_name: "integration",
        total: 2,
        failed: 0,
        skipped: 0,
    },
    ExpectedCounts {
        path: "com.example/Calculator",
        root_name: "integration",
        total: 1,
        failed: 0,
        skipped: 0,
    },
];
