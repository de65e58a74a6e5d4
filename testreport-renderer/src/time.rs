// Copyright (c) The testreport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for durations and timestamps.

use chrono::{Local, TimeZone};
use std::{fmt, time::Duration};
use swrite::{SWrite, swrite};

const MILLIS_PER_SECOND: u128 = 1000;
const MILLIS_PER_MINUTE: u128 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u128 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: u128 = 24 * MILLIS_PER_HOUR;

/// `yyyy-MM-dd HH:mm:ss.SSS`
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Formats a duration as tersely as possible, e.g. `0.512s`, `1m2.50s` or `1d0h0m0.00s`.
///
/// Once a unit is printed, every smaller unit is printed too. Seconds carry three decimals when
/// they are the only unit and two (rounded half-up) otherwise.
pub fn format_duration_very_terse(duration: Duration) -> String {
    let mut millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_owned();
    }

    let mut out = String::new();

    let days = millis / MILLIS_PER_DAY;
    millis %= MILLIS_PER_DAY;
    if days > 0 {
        swrite!(out, "{days}d");
    }

    let hours = millis / MILLIS_PER_HOUR;
    millis %= MILLIS_PER_HOUR;
    if hours > 0 || !out.is_empty() {
        swrite!(out, "{hours}h");
    }

    let minutes = millis / MILLIS_PER_MINUTE;
    millis %= MILLIS_PER_MINUTE;
    if minutes > 0 || !out.is_empty() {
        swrite!(out, "{minutes}m");
    }

    if out.is_empty() {
        swrite!(
            out,
            "{}.{:03}s",
            millis / MILLIS_PER_SECOND,
            millis % MILLIS_PER_SECOND
        );
    } else {
        let hundredths = (millis + 5) / 10;
        swrite!(out, "{}.{:02}s", hundredths / 100, hundredths % 100);
    }

    out
}

/// Formats a metadata capture time (milliseconds since the Unix epoch) in the system-local time
/// zone.
pub fn format_log_time(log_time: i64) -> String {
    format_log_time_in(log_time, &Local)
}

/// Formats a metadata capture time in the given time zone.
///
/// Times that cannot be represented fall back to the raw millisecond value.
pub fn format_log_time_in<Tz>(log_time: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match tz.timestamp_millis_opt(log_time).earliest() {
        Some(time) => time.format(LOG_TIME_FORMAT).to_string(),
        None => log_time.to_string(),
    }
}
