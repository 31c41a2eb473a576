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

//! Client configuration.
//!
//! The defaults are intended to work for most applications. Some applications
//! need to identify themselves with a custom user-agent, bound the time spent
//! in each HTTP request, or attach headers to every request. The pipeline
//! implementations consume a [ClientConfig] to apply these settings.
//!
//! # Example
//! ```
//! # use azure_arm_gax::options::ClientConfig;
//! use std::time::Duration;
//! let config = ClientConfig::new()
//!     .set_user_agent("my-app/1.0")
//!     .set_attempt_timeout(Duration::from_secs(30))
//!     .enable_tracing();
//! assert_eq!(config.user_agent(), Some("my-app/1.0"));
//! ```

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::time::Duration;

/// Configure a pipeline.
///
/// A pipeline is shared by all the pollers and pagers created from it, and
/// so is its configuration.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    user_agent: Option<String>,
    attempt_timeout: Option<Duration>,
    default_headers: HeaderMap,
    tracing: bool,
}

impl ClientConfig {
    /// Returns a default [ClientConfig].
    pub fn new() -> Self {
        Self::default()
    }

    /// The prefix for the `user-agent` header, if any.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Sets the prefix for the `user-agent` header.
    pub fn set_user_agent<T: Into<String>>(mut self, v: T) -> Self {
        self.user_agent = Some(v.into());
        self
    }

    /// The maximum time for each HTTP request, if any.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout
    }

    /// Sets the maximum time for each HTTP request.
    ///
    /// This bounds each request, including each `poll()` or `next_page()`
    /// call. It does not bound the total time of a polling loop; use a polling
    /// error policy for that.
    pub fn set_attempt_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.attempt_timeout = Some(v.into());
        self
    }

    /// The headers included in every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Adds a header included in every request.
    pub fn set_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Returns true if tracing is enabled.
    pub fn tracing_enabled(&self) -> bool {
        self.tracing
    }

    /// Enables tracing.
    pub fn enable_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Disables tracing.
    pub fn disable_tracing(mut self) -> Self {
        self.tracing = false;
        self
    }
}
