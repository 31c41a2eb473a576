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

use crate::dialect::PollingMethod;
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where the final result of a long-running operation is retrieved from.
///
/// Each API documents this choice in its description, the generated clients
/// pass it to the poller. When it is not set the poller picks a default
/// based on the HTTP method of the initiating request:
///
/// * `PUT` and `PATCH` fetch the resource at the original URL.
/// * `POST` and `DELETE` fetch the URL in the `Location` header of the
///   initiating response, if present. Otherwise the body of the last polling
///   response is the result.
///
/// When the operation is polled through the `Location` header or the original
/// URL, the last polling response already contains the resource, and it is
/// used as the result unless the original URL is requested explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalStateVia {
    /// The body of the last `Azure-AsyncOperation` status monitor response.
    AzureAsyncOperation,
    /// The URL in the `Location` header of the initiating response.
    Location,
    /// The URL of the initiating request.
    OriginalUri,
    /// The body of the last `Operation-Location` status monitor response.
    OperationLocation,
}

impl FinalStateVia {
    /// The name used in API descriptions and resume tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureAsyncOperation => "azure-async-operation",
            Self::Location => "location",
            Self::OriginalUri => "original-uri",
            Self::OperationLocation => "operation-location",
        }
    }
}

impl std::fmt::Display for FinalStateVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FinalStateVia {
    type Err = UnknownFinalStateVia;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "azure-async-operation" => Ok(Self::AzureAsyncOperation),
            "location" => Ok(Self::Location),
            "original-uri" => Ok(Self::OriginalUri),
            "operation-location" => Ok(Self::OperationLocation),
            _ => Err(UnknownFinalStateVia(s.to_string())),
        }
    }
}

/// The error returned when parsing an unknown [FinalStateVia] name.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown final-state-via value `{0}`")]
pub struct UnknownFinalStateVia(String);

/// Returns the URL to fetch the final result from, or `None` if the last
/// polling response contains the result.
pub(crate) fn result_url(
    method: &Method,
    original: &Url,
    location: Option<&Url>,
    polling_method: PollingMethod,
    via: Option<FinalStateVia>,
) -> Option<Url> {
    match (via, polling_method) {
        (Some(FinalStateVia::OriginalUri), PollingMethod::OriginalUri) => None,
        (Some(FinalStateVia::OriginalUri), _) => Some(original.clone()),
        (Some(FinalStateVia::Location), PollingMethod::Location) => None,
        (Some(FinalStateVia::Location), _) => location.cloned(),
        (Some(FinalStateVia::AzureAsyncOperation | FinalStateVia::OperationLocation), _) => None,
        (None, PollingMethod::Location | PollingMethod::OriginalUri) => None,
        (None, _) if *method == Method::PUT || *method == Method::PATCH => Some(original.clone()),
        (None, _) => location.cloned(),
    }
}
