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

//! Defines the trait for polling backoff policies and common implementations.
//!
//! Pollers driving a long-running operation to completion wait between polling
//! requests to avoid overloading the service. These policies determine how
//! long to wait. If the service suggests a longer delay, via `Retry-After` or
//! similar headers, the poller waits for the longer of the two.
//!
//! These policies should not be confused with retry backoff policies, polling
//! backoff policies should not use jitter.
//!
//! The default is [FixedFrequency], polling every 30 seconds. When the expected
//! execution time is not known in advance, truncated [exponential backoff]
//! **without** jitter often works better.
//!
//! # Example
//! ```
//! # use azure_arm_gax::exponential_backoff::Error;
//! # use azure_arm_gax::exponential_backoff::ExponentialBackoffBuilder;
//! use std::time::Duration;
//!
//! let policy = ExponentialBackoffBuilder::new()
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_maximum_delay(Duration::from_secs(5))
//!     .with_scaling(4.0)
//!     .build()?;
//! // `policy` implements the `PollingBackoffPolicy` trait.
//! # Ok::<(), Error>(())
//! ```
//!
//! [exponential backoff]: https://en.wikipedia.org/wiki/Exponential_backoff

use crate::polling_state::PollingState;
use std::sync::Arc;
use std::time::Duration;

/// Defines the trait implemented by all polling backoff strategies.
pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the delay before the next polling request.
    ///
    /// # Parameters
    /// * `state` - the current state of the polling loop. This method is
    ///   always called after at least one attempt.
    fn wait_period(&self, state: &PollingState) -> Duration;
}

/// A helper type to use [PollingBackoffPolicy] in options.
#[derive(Clone, Debug)]
pub struct PollingBackoffPolicyArg(pub Arc<dyn PollingBackoffPolicy>);

impl<T: PollingBackoffPolicy + 'static> std::convert::From<T> for PollingBackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(value: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(value)
    }
}

/// Polls at a fixed frequency.
///
/// # Example
/// ```
/// # use azure_arm_gax::polling_backoff_policy::*;
/// # use azure_arm_gax::polling_state::PollingState;
/// use std::time::Duration;
/// let policy = FixedFrequency::new(Duration::from_secs(5));
/// assert_eq!(policy.wait_period(&PollingState::default()), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct FixedFrequency {
    frequency: Duration,
}

/// The default polling frequency for [FixedFrequency].
pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(30);

impl FixedFrequency {
    pub fn new(frequency: Duration) -> Self {
        Self { frequency }
    }
}

impl Default for FixedFrequency {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY)
    }
}

impl PollingBackoffPolicy for FixedFrequency {
    fn wait_period(&self, _state: &PollingState) -> Duration {
        self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;

    // Verify `PollingBackoffPolicyArg` can be converted from the desired types.
    #[test]
    fn backoff_policy_arg() {
        let policy = ExponentialBackoffBuilder::default().clamp();
        let _ = PollingBackoffPolicyArg::from(policy);

        let policy: Arc<dyn PollingBackoffPolicy> = Arc::new(FixedFrequency::default());
        let _ = PollingBackoffPolicyArg::from(policy);
    }

    #[test]
    fn fixed_frequency() {
        let policy = FixedFrequency::default();
        for count in [1, 2, 10, 1000] {
            let state = PollingState::default().set_attempt_count(count);
            assert_eq!(policy.wait_period(&state), DEFAULT_FREQUENCY);
        }
        let policy = FixedFrequency::new(Duration::from_millis(10));
        assert_eq!(
            policy.wait_period(&PollingState::default()),
            Duration::from_millis(10)
        );
    }
}
