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

//! Serialize the state of a poller so it can be resumed later.
//!
//! Tokens are JSON objects with a `version` field. Only version 1 exists:
//!
//! ```text
//! {"version":1,"kind":"...","method":"PUT","originalUri":"...",
//!  "pollingUri":"...","pollingMethod":"OperationLocation",
//!  "resultUri":"...","finalStateVia":"original-uri","status":"InProgress"}
//! ```
//!
//! `resultUri` and `finalStateVia` are optional.

use crate::dialect::PollingMethod;
use crate::final_state::FinalStateVia;
use crate::status::OperationStatus;
use crate::tracker::Tracker;
use gax::Result;
use gax::error::Error;
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

const VERSION: u32 = 1;

/// The reasons a resume token is rejected.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token is not valid JSON, or it is missing required fields.
    #[error("the resume token is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The token was created by an incompatible version of this crate.
    #[error("unsupported resume token version {0}")]
    UnsupportedVersion(u32),
    /// The token was created for a different kind of poller.
    #[error("the resume token is for a poller of kind `{got}`, expected `{want}`")]
    KindMismatch {
        /// The kind expected by the caller.
        want: String,
        /// The kind recorded in the token.
        got: String,
    },
    /// The token contains an invalid HTTP method.
    #[error("the resume token contains an invalid HTTP method `{0}`")]
    InvalidMethod(String),
    /// The operation had completed when the token was created.
    #[error("the operation is in a terminal state ({0}), it cannot be resumed")]
    Terminal(OperationStatus),
}

#[derive(Debug, Deserialize)]
struct Versioned {
    version: u32,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenV1 {
    version: u32,
    kind: String,
    method: String,
    original_uri: Url,
    polling_uri: Url,
    polling_method: PollingMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_uri: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_state_via: Option<FinalStateVia>,
    status: OperationStatus,
}

pub(crate) fn encode(kind: &str, tracker: &Tracker) -> Result<String> {
    if tracker.status.is_terminal() {
        return Err(Error::binding(TokenError::Terminal(tracker.status)));
    }
    let token = TokenV1 {
        version: VERSION,
        kind: kind.to_string(),
        method: tracker.method.to_string(),
        original_uri: tracker.original_url.clone(),
        polling_uri: tracker.polling_url.clone(),
        polling_method: tracker.polling_method,
        result_uri: tracker.result_url.clone(),
        final_state_via: tracker.final_state_via,
        status: tracker.status,
    };
    serde_json::to_string(&token).map_err(Error::ser)
}

pub(crate) fn decode(kind: &str, token: &str) -> Result<Tracker> {
    let versioned = serde_json::from_str::<Versioned>(token)
        .map_err(|e| Error::binding(TokenError::Malformed(e)))?;
    if versioned.version != VERSION {
        return Err(Error::binding(TokenError::UnsupportedVersion(
            versioned.version,
        )));
    }
    let token = serde_json::from_str::<TokenV1>(token)
        .map_err(|e| Error::binding(TokenError::Malformed(e)))?;
    if token.kind != kind {
        return Err(Error::binding(TokenError::KindMismatch {
            want: kind.to_string(),
            got: token.kind,
        }));
    }
    if token.status.is_terminal() {
        return Err(Error::binding(TokenError::Terminal(token.status)));
    }
    let method = Method::from_bytes(token.method.as_bytes())
        .map_err(|_| Error::binding(TokenError::InvalidMethod(token.method.clone())))?;
    Ok(Tracker {
        method,
        original_url: token.original_uri,
        polling_method: token.polling_method,
        polling_url: token.polling_uri,
        result_url: token.result_uri,
        final_state_via: token.final_state_via,
        status: token.status,
    })
}
