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

//! Errors reported by the pipeline, the pager, and the poller.
//!
//! The client libraries distinguish between errors sending a request (e.g.
//! cannot open a connection), unexpected responses (e.g. the service rejects
//! the request), long-running operations that complete unsuccessfully, and
//! cancellation by the caller.
//!
//! ARM reports failures using a common JSON envelope, decoded as [Status]:
//!
//! ```text
//! { "error": { "code": "...", "message": "...", "target": "...", "details": [ ... ] } }
//! ```
//!
//! # Examples
//!
//! ```
//! # use azure_arm_gax::error;
//! use error::Error;
//! fn handle_error(e: Error) {
//!     if let Some(status) = e.status() {
//!         println!("the service reported {status:?}")
//!     }
//! }
//! ```

mod core_error;
pub use core_error::*;
mod status;
pub use status::Status;
