// Copyright 2025 The Azure Resource Manager SDK for Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parse server-suggested delays.
//!
//! Services may ask clients to wait before polling again, or before retrying a
//! throttled request. Azure services use three headers for this purpose:
//!
//! * `retry-after-ms`: a delay in milliseconds.
//! * `x-ms-retry-after-ms`: a delay in milliseconds.
//! * `Retry-After`: a delay in seconds, or an HTTP date.
//!
//! The headers are examined in that order, the first valid value wins.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use std::time::Duration;

const RETRY_AFTER_MS: &str = "retry-after-ms";
const X_MS_RETRY_AFTER_MS: &str = "x-ms-retry-after-ms";

/// Returns the delay suggested by the service, if any.
///
/// Zero, negative, dates in the past, and unparsable values are ignored.
///
/// # Example
/// ```
/// # use azure_arm_gax::retry_after::retry_after;
/// use http::{HeaderMap, HeaderValue};
/// use std::time::Duration;
/// let mut headers = HeaderMap::new();
/// headers.insert("retry-after", HeaderValue::from_static("10"));
/// assert_eq!(retry_after(&headers), Some(Duration::from_secs(10)));
/// ```
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    retry_after_at(headers, Utc::now())
}

fn retry_after_at(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    [RETRY_AFTER_MS, X_MS_RETRY_AFTER_MS]
        .into_iter()
        .find_map(|name| header(headers, name).and_then(parse_millis))
        .or_else(|| {
            header(headers, http::header::RETRY_AFTER.as_str())
                .and_then(|v| parse_seconds(v).or_else(|| parse_date(v, now)))
        })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn parse_millis(value: &str) -> Option<Duration> {
    value
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

fn parse_seconds(value: &str) -> Option<Duration> {
    value
        .parse::<u64>()
        .ok()
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

fn parse_date(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&Utc) - now;
    delta.to_std().ok().filter(|d| !d.is_zero())
}
