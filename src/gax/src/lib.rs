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

//! Azure Resource Manager client helpers.
//!
//! This crate contains the types and functions shared by the Azure Resource
//! Manager client libraries for Rust: the error model, the HTTP pipeline
//! abstraction, the pager for list operations, and the policies used to poll
//! long-running operations.
//!
//! The long-running operation poller lives in a separate crate, and a
//! `reqwest`-based [Pipeline][pipeline::Pipeline] implementation lives in
//! another.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions sending requests.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the client libraries.
pub mod error;

/// Defines the request and response types, and the trait implemented by HTTP
/// pipelines.
pub mod pipeline;

pub mod options;

/// Iterate over list operations using `nextLink`-style pagination.
///
/// The stream adapters are gated by the `unstable-stream` feature, async
/// streams are not yet stable.
pub mod paginator;

pub mod retry_after;

pub mod loop_state;
pub mod polling_state;

pub mod exponential_backoff;
pub mod polling_backoff_policy;
pub mod polling_error_policy;
