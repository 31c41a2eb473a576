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

//! State transitions for long-running operations.
//!
//! These functions do not perform any I/O. The poller sends the requests and
//! commits the new state only when a transition succeeds.

use crate::dialect::{PollingDialect, PollingHeader, PollingMethod};
use crate::final_state::{FinalStateVia, result_url};
use crate::status::OperationStatus;
use gax::Result;
use gax::error::{Error, Status};
use gax::pipeline::RawResponse;
use http::{Method, StatusCode};
use serde_json::Value;
use url::Url;

/// The status codes accepted from the initiating request and from polls.
pub(crate) const ACCEPTED_STATUS_CODES: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tracker {
    pub method: Method,
    pub original_url: Url,
    pub polling_method: PollingMethod,
    pub polling_url: Url,
    pub result_url: Option<Url>,
    pub final_state_via: Option<FinalStateVia>,
    pub status: OperationStatus,
}

impl Tracker {
    /// Creates the state from the response to the initiating request.
    ///
    /// # Panics
    /// If the response status code is not one of 200, 201, 202, or 204.
    pub fn start(
        response: &RawResponse,
        dialect: &dyn PollingDialect,
        final_state_via: Option<FinalStateVia>,
    ) -> Result<Self> {
        let status = match response.status() {
            StatusCode::OK => {
                provisioning_state(response.body())?.unwrap_or(OperationStatus::Succeeded)
            }
            StatusCode::CREATED => {
                provisioning_state(response.body())?.unwrap_or(OperationStatus::InProgress)
            }
            StatusCode::ACCEPTED => OperationStatus::InProgress,
            StatusCode::NO_CONTENT => OperationStatus::Succeeded,
            code => panic!(
                "cannot create a poller from a response with status {code}, \
                 the initiating response must have status 200, 201, 202 or 204"
            ),
        };
        let method = response.method().clone();
        let original_url = response.url().clone();
        let location = PollingHeader::Location.url(response)?;
        let (polling_method, polling_url, status) = match dialect.polling_url(response)? {
            Some((m, url)) => (m, url, status),
            None if method == Method::PUT || method == Method::PATCH => {
                (PollingMethod::OriginalUri, original_url.clone(), status)
            }
            // Nothing to poll, the operation is complete.
            None if status.is_terminal() => {
                (PollingMethod::OriginalUri, original_url.clone(), status)
            }
            None => (
                PollingMethod::OriginalUri,
                original_url.clone(),
                OperationStatus::Succeeded,
            ),
        };
        let result_url = result_url(
            &method,
            &original_url,
            location.as_ref(),
            polling_method,
            final_state_via,
        );
        Ok(Self {
            method,
            original_url,
            polling_method,
            polling_url,
            result_url,
            final_state_via,
            status,
        })
    }

    /// Computes the state after a successful polling response.
    pub fn observe(&self, response: &RawResponse, dialect: &dyn PollingDialect) -> Result<Self> {
        let mut next = self.clone();
        if let Some((method, url)) = dialect.polling_url(response)? {
            if method == self.polling_method {
                next.polling_url = url;
            }
        }
        let monitor = if self.polling_method.is_status_monitor() {
            monitor_status(response.body())?
        } else {
            None
        };
        next.status = match monitor {
            Some(status) => status,
            None => match response.status() {
                StatusCode::ACCEPTED => OperationStatus::InProgress,
                StatusCode::NO_CONTENT => OperationStatus::Succeeded,
                _ => provisioning_state(response.body())?.unwrap_or(OperationStatus::Succeeded),
            },
        };
        Ok(next)
    }
}

/// Returns the `properties.provisioningState` field, if present.
fn provisioning_state(body: &[u8]) -> Result<Option<OperationStatus>> {
    if body.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_slice::<Value>(body).map_err(Error::deser)?;
    match value.pointer("/properties/provisioningState") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(OperationStatus::from(s.as_str()))),
        Some(other) => Err(Error::deser(format!(
            "expected a string in `properties.provisioningState`, got {other}"
        ))),
    }
}

/// Returns the `status` field of a status monitor, if present.
fn monitor_status(body: &[u8]) -> Result<Option<OperationStatus>> {
    if body.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_slice::<Value>(body).map_err(Error::deser)?;
    match value.get("status") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(OperationStatus::from(s.as_str()))),
        Some(other) => Err(Error::deser(format!(
            "expected a string in the `status` field, got {other}"
        ))),
    }
}

/// Extracts the failure details for a failed or canceled operation.
///
/// Uses the `error` field, or the `properties.error` field, of the last
/// response. Without either, the code is the name of the terminal status.
pub(crate) fn failure_status(status: OperationStatus, body: &[u8]) -> Status {
    let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
    let details = value
        .get("error")
        .or_else(|| value.pointer("/properties/error"))
        .and_then(|e| serde_json::from_value::<Status>(e.clone()).ok());
    match details {
        Some(details) if !details.code.is_empty() || !details.message.is_empty() => details,
        _ => Status::default()
            .set_code(status.as_str())
            .set_message(format!("the operation completed with status {status}")),
    }
}
