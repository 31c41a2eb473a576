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

//! The state of a polling loop, as seen by the polling policies.

use std::time::{Duration, Instant};

/// Tracks the progress of a polling loop.
///
/// Pollers create one of these when the polling loop starts, and increment the
/// attempt count before each polling request. The polling error and backoff
/// policies use it to make their decisions.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct PollingState {
    /// When the polling loop started.
    pub start: Instant,
    /// The number of polling requests, including any that failed.
    pub attempt_count: u32,
}

impl PollingState {
    /// Creates a new state, starting now, with no attempts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the start time.
    pub fn set_start(mut self, v: Instant) -> Self {
        self.start = v;
        self
    }

    /// Changes the attempt count.
    pub fn set_attempt_count(mut self, v: u32) -> Self {
        self.attempt_count = v;
        self
    }

    /// The time since the loop started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for PollingState {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            attempt_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let before = Instant::now();
        let state = PollingState::new();
        assert_eq!(state.attempt_count, 0);
        assert!(state.start >= before, "{state:?}");
    }

    #[test]
    fn setters() {
        let start = Instant::now() - Duration::from_secs(30);
        let state = PollingState::default()
            .set_start(start)
            .set_attempt_count(7);
        assert_eq!(state.start, start);
        assert_eq!(state.attempt_count, 7);
        assert!(state.elapsed() >= Duration::from_secs(30), "{state:?}");
    }
}
