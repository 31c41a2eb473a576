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

use crate::dialect::{ArmDialect, PollingDialect};
use crate::final_state::FinalStateVia;
use gax::polling_backoff_policy::{FixedFrequency, PollingBackoffPolicy, PollingBackoffPolicyArg};
use gax::polling_error_policy::{
    FailFast, PollingErrorPolicy, PollingErrorPolicyArg, PollingErrorPolicyExt,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The kind recorded in resume tokens when none is configured.
pub const DEFAULT_KIND: &str = "azure-arm-lro";

/// The maximum time [until_done][crate::Poller::until_done] polls an
/// operation with the default error policy.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configure a [Poller][crate::Poller].
///
/// # Example
/// ```
/// # use azure_arm_lro::{FinalStateVia, PollerOptions};
/// # use azure_arm_lro::dialect::HeaderDialect;
/// use std::time::Duration;
/// let options = PollerOptions::new()
///     .set_dialect(HeaderDialect::operation_location())
///     .set_final_state_via(FinalStateVia::OriginalUri)
///     .set_frequency(Duration::from_secs(5))
///     .set_kind("widgets.create");
/// ```
#[derive(Clone, Debug)]
pub struct PollerOptions {
    pub(crate) dialect: Arc<dyn PollingDialect>,
    pub(crate) final_state_via: Option<FinalStateVia>,
    pub(crate) error_policy: Arc<dyn PollingErrorPolicy>,
    pub(crate) backoff_policy: Arc<dyn PollingBackoffPolicy>,
    pub(crate) cancel: CancellationToken,
    pub(crate) kind: String,
}

impl PollerOptions {
    /// Returns the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the headers used to find the polling URL.
    ///
    /// The default is [ArmDialect].
    pub fn set_dialect<T: PollingDialect + 'static>(mut self, v: T) -> Self {
        self.dialect = Arc::new(v);
        self
    }

    /// Sets where the final result is retrieved from.
    ///
    /// By default this depends on the HTTP method of the initiating request,
    /// see [FinalStateVia] for details.
    pub fn set_final_state_via(mut self, v: FinalStateVia) -> Self {
        self.final_state_via = Some(v);
        self
    }

    /// Sets the error policy for [until_done][crate::Poller::until_done].
    ///
    /// The default stops on the first error, and limits the polling loop to
    /// [DEFAULT_TIME_LIMIT].
    pub fn set_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.error_policy = v.into().0;
        self
    }

    /// Sets the backoff policy for [until_done][crate::Poller::until_done].
    pub fn set_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = v.into().0;
        self
    }

    /// Polls at a fixed frequency.
    ///
    /// Shorthand for a [FixedFrequency] backoff policy.
    pub fn set_frequency(self, v: Duration) -> Self {
        self.set_polling_backoff_policy(FixedFrequency::new(v))
    }

    /// Sets a token to cancel pending requests and sleeps.
    pub fn set_cancellation_token(mut self, v: CancellationToken) -> Self {
        self.cancel = v;
        self
    }

    /// Identifies the operation in resume tokens.
    ///
    /// Resuming from a token created with a different kind fails.
    pub fn set_kind<T: Into<String>>(mut self, v: T) -> Self {
        self.kind = v.into();
        self
    }

    /// The configured kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The configured [FinalStateVia], if any.
    pub fn final_state_via(&self) -> Option<FinalStateVia> {
        self.final_state_via
    }
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            dialect: Arc::new(ArmDialect),
            final_state_via: None,
            error_policy: Arc::new(FailFast.with_time_limit(DEFAULT_TIME_LIMIT)),
            backoff_policy: Arc::new(FixedFrequency::default()),
            cancel: CancellationToken::new(),
            kind: DEFAULT_KIND.to_string(),
        }
    }
}
