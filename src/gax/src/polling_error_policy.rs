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

//! Defines the types for polling error policies.
//!
//! # Example
//! ```
//! # use azure_arm_gax::polling_error_policy::*;
//! use std::time::Duration;
//! // Poll for at most 15 minutes or at most 50 attempts: whichever limit is
//! // reached first stops the polling loop.
//! let policy = TransientErrors
//!     .with_time_limit(Duration::from_secs(15 * 60))
//!     .with_attempt_limit(50);
//! ```
//!
//! A poller driving a long-running operation to completion needs to (1) decide
//! what to do when a polling request fails, and (2) limit how long the polling
//! loop may continue when the operation never reaches a terminal state, for
//! example, because the service reports a status this library does not
//! recognize.
//!
//! The default policy, [FailFast], stops the loop on the first error. The
//! caller decides whether to retry. Applications that prefer to keep polling
//! through transient failures can use [TransientErrors] or [AlwaysContinue],
//! decorated with a time or attempt limit.

use crate::error::Error;
use crate::loop_state::LoopState;
use crate::polling_state::PollingState;
use std::sync::Arc;

/// Determines how errors are handled in the polling loop.
///
/// Implementations of this trait determine if polling errors may resolve in
/// future attempts, and for how long the polling loop may continue.
pub trait PollingErrorPolicy: Send + Sync + std::fmt::Debug {
    /// Query the polling policy after an error.
    ///
    /// # Parameters
    /// * `state` - the current state of the polling loop. The attempt count
    ///   includes the failed attempt.
    /// * `error` - the last error when polling the operation.
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState;

    /// Called when the operation is successfully polled, but it is still in
    /// progress.
    ///
    /// Returning an error stops the polling loop.
    ///
    /// # Parameters
    /// * `state` - the current state of the polling loop.
    /// * `operation` - identifies the operation in error messages, typically
    ///   the polling URL.
    fn on_in_progress(&self, _state: &PollingState, _operation: &str) -> Option<Error> {
        None
    }
}

/// A helper type to use [PollingErrorPolicy] in options.
#[derive(Clone, Debug)]
pub struct PollingErrorPolicyArg(pub Arc<dyn PollingErrorPolicy>);

impl<T> std::convert::From<T> for PollingErrorPolicyArg
where
    T: PollingErrorPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingErrorPolicy>> for PollingErrorPolicyArg {
    fn from(value: Arc<dyn PollingErrorPolicy>) -> Self {
        Self(value)
    }
}

/// Extension trait for [PollingErrorPolicy]
pub trait PollingErrorPolicyExt: PollingErrorPolicy + Sized {
    /// Decorate a [PollingErrorPolicy] to limit the total elapsed time in the
    /// polling loop.
    ///
    /// While the time spent in the polling loop (including time in backoff) is
    /// less than the prescribed duration the `on_error()` method returns the
    /// results of the inner policy. After that time it returns
    /// [Exhausted][LoopState::Exhausted] if the inner policy returns
    /// [Continue][LoopState::Continue]. Likewise, `on_in_progress()` returns
    /// an error once the time is exhausted.
    ///
    /// # Example
    /// ```
    /// # use azure_arm_gax::*;
    /// use polling_error_policy::*;
    /// use polling_state::PollingState;
    /// use std::time::{Duration, Instant};
    /// let policy = AlwaysContinue.with_time_limit(Duration::from_secs(10));
    /// let state = PollingState::default().set_start(Instant::now() - Duration::from_secs(20));
    /// assert!(policy.on_error(&state, error::Error::io("reset")).is_exhausted());
    /// ```
    fn with_time_limit(self, maximum_duration: std::time::Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorate a [PollingErrorPolicy] to limit the number of poll attempts.
    ///
    /// The policy passes through the results from the inner policy as long as
    /// `attempt_count < maximum_attempts`. Once the maximum number of attempts
    /// is reached, the policy returns [Exhausted][LoopState::Exhausted] if the
    /// inner policy returns [Continue][LoopState::Continue], and passes the
    /// inner policy result otherwise.
    ///
    /// # Example
    /// ```
    /// # use azure_arm_gax::*;
    /// use polling_error_policy::*;
    /// use polling_state::PollingState;
    /// let policy = AlwaysContinue.with_attempt_limit(3);
    /// let state = PollingState::default().set_attempt_count(2);
    /// assert!(policy.on_error(&state, error::Error::io("reset")).is_continue());
    /// let state = PollingState::default().set_attempt_count(3);
    /// assert!(policy.on_error(&state, error::Error::io("reset")).is_exhausted());
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: PollingErrorPolicy> PollingErrorPolicyExt for T {}

/// A polling policy that stops on the first error.
///
/// Every error is reported as [Permanent][LoopState::Permanent], the caller
/// decides if and when to resume polling.
#[derive(Clone, Debug)]
pub struct FailFast;

impl PollingErrorPolicy for FailFast {
    fn on_error(&self, _state: &PollingState, error: Error) -> LoopState {
        LoopState::Permanent(error)
    }
}

/// A polling policy that continues on any error.
///
/// This policy must be decorated to limit the number of polling attempts or the
/// duration of the polling loop.
///
/// # Example
/// ```
/// # use azure_arm_gax::*;
/// # use polling_error_policy::*;
/// use polling_state::PollingState;
/// let policy = AlwaysContinue;
/// let got = policy.on_error(&PollingState::default(), error::Error::deser("bad"));
/// assert!(got.is_continue());
/// ```
#[derive(Clone, Debug)]
pub struct AlwaysContinue;

impl PollingErrorPolicy for AlwaysContinue {
    fn on_error(&self, _state: &PollingState, error: Error) -> LoopState {
        LoopState::Continue(error)
    }
}

/// A polling policy that continues on transient errors.
///
/// I/O errors, timeouts, and the HTTP status codes commonly used for
/// throttling and temporary unavailability (408, 429, 500, 502, 503, 504) are
/// treated as transient. Any other error stops the loop.
///
/// Polling requests are always safe to repeat. This policy must be decorated to
/// limit the number of polling attempts or the duration of the polling loop.
#[derive(Clone, Debug)]
pub struct TransientErrors;

const TRANSIENT_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

impl PollingErrorPolicy for TransientErrors {
    fn on_error(&self, _state: &PollingState, error: Error) -> LoopState {
        if error.is_io() || error.is_timeout() {
            return LoopState::Continue(error);
        }
        match error.http_status_code() {
            Some(code) if TRANSIENT_STATUS.contains(&code) => LoopState::Continue(error),
            _ => LoopState::Permanent(error),
        }
    }
}

/// A polling policy decorator that limits the total time in the polling loop.
///
/// This policy decorates an inner policy and limits the duration of polling
/// loops. While the time spent in the polling loop (including time in backoff)
/// is less than the prescribed duration the `on_error()` method returns the
/// results of the inner policy. After that time it returns
/// [Exhausted][LoopState::Exhausted] if the inner policy returns
/// [Continue][LoopState::Continue].
///
/// # Parameters
/// * `P` - the inner polling policy, defaults to [TransientErrors].
#[derive(Debug)]
pub struct LimitedElapsedTime<P = TransientErrors>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_duration: std::time::Duration,
}

impl LimitedElapsedTime {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_duration: std::time::Duration) -> Self {
        Self {
            inner: TransientErrors,
            maximum_duration,
        }
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_duration: std::time::Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn in_progress_impl(&self, state: &PollingState, operation: &str) -> Option<Error> {
        let elapsed = state.elapsed();
        if elapsed < self.maximum_duration {
            return None;
        }
        Some(Error::exhausted(Exhausted::new(
            operation,
            "elapsed time",
            format!("{elapsed:?}"),
            format!("{:?}", self.maximum_duration),
        )))
    }
}

impl<P> PollingErrorPolicy for LimitedElapsedTime<P>
where
    P: PollingErrorPolicy + 'static,
{
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState {
        match self.inner.on_error(state, error) {
            LoopState::Continue(e) if state.elapsed() >= self.maximum_duration => {
                LoopState::Exhausted(e)
            }
            s => s,
        }
    }

    fn on_in_progress(&self, state: &PollingState, operation: &str) -> Option<Error> {
        self.inner
            .on_in_progress(state, operation)
            .or_else(|| self.in_progress_impl(state, operation))
    }
}

/// A polling policy decorator that limits the number of attempts.
///
/// The policy passes through the results from the inner policy as long as
/// `attempt_count < maximum_attempts`. However, once the maximum number of
/// attempts is reached, the policy replaces any [Continue][LoopState::Continue]
/// result with [Exhausted][LoopState::Exhausted].
///
/// # Parameters
/// * `P` - the inner polling policy, defaults to [TransientErrors].
#[derive(Debug)]
pub struct LimitedAttemptCount<P = TransientErrors>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: TransientErrors,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }

    fn in_progress_impl(&self, count: u32, operation: &str) -> Option<Error> {
        if count < self.maximum_attempts {
            return None;
        }
        Some(Error::exhausted(Exhausted::new(
            operation,
            "attempt count",
            count.to_string(),
            self.maximum_attempts.to_string(),
        )))
    }
}

impl<P> PollingErrorPolicy for LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, state: &PollingState, error: Error) -> LoopState {
        match self.inner.on_error(state, error) {
            LoopState::Continue(e) if state.attempt_count >= self.maximum_attempts => {
                LoopState::Exhausted(e)
            }
            s => s,
        }
    }

    fn on_in_progress(&self, state: &PollingState, operation: &str) -> Option<Error> {
        self.inner
            .on_in_progress(state, operation)
            .or_else(|| self.in_progress_impl(state.attempt_count, operation))
    }
}

/// Indicates that a polling loop has been exhausted.
#[derive(Debug, thiserror::Error)]
#[error("polling loop for {operation} exhausted, {limit_name} value ({value}) exceeds limit ({limit})")]
pub struct Exhausted {
    operation: String,
    limit_name: &'static str,
    value: String,
    limit: String,
}

impl Exhausted {
    pub fn new(operation: &str, limit_name: &'static str, value: String, limit: String) -> Self {
        Self {
            operation: operation.to_string(),
            limit_name,
            value,
            limit,
        }
    }
}
