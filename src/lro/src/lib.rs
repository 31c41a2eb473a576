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

//! Types and functions to track Azure Resource Manager long-running operations.
//!
//! Many Azure Resource Manager requests start an operation that completes
//! asynchronously. The service accepts the request, typically with a `201` or
//! `202` status code, and advertises a URL to poll in the response headers.
//! The [Poller] in this crate tracks such operations until they complete:
//!
//! * Step by step, with [Poller::poll].
//! * To completion, with [Poller::until_done].
//! * Across process restarts, with [Poller::resume_token] and
//!   [Poller::from_resume_token].
//!
//! The poller does not retry failed requests on its own when polled step by
//! step. Polling is idempotent, applications can simply call `poll()` again.
//! `until_done()` consults the [PollingErrorPolicy] in [PollerOptions].
//!
//! [PollingErrorPolicy]: gax::polling_error_policy::PollingErrorPolicy

pub mod dialect;
mod final_state;
mod options;
mod poller;
mod status;
mod token;
mod tracker;

pub use final_state::{FinalStateVia, UnknownFinalStateVia};
pub use options::{DEFAULT_KIND, DEFAULT_TIME_LIMIT, PollerOptions};
pub use poller::Poller;
pub use status::OperationStatus;
pub use token::TokenError;
