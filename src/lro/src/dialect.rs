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

//! Select the URL used to poll a long-running operation.
//!
//! Azure Resource Manager APIs advertise the polling URL in one of a few
//! response headers. Which headers apply, and in what order, depends on the
//! API. A [PollingDialect] captures that choice.

use gax::Result;
use gax::error::Error;
use gax::pipeline::RawResponse;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the poller obtains the status of the operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PollingMethod {
    /// Poll the status monitor in the `Azure-AsyncOperation` header.
    AsyncOperation,
    /// Poll the status monitor in the `Operation-Location` header.
    OperationLocation,
    /// Poll the URL in the `Location` header, the status is derived from the
    /// HTTP status code and the body.
    Location,
    /// Poll the resource at the URL of the initiating request.
    OriginalUri,
}

impl PollingMethod {
    /// Returns true if polling returns a status monitor, that is, a JSON
    /// object with a `status` field.
    pub fn is_status_monitor(&self) -> bool {
        matches!(self, Self::AsyncOperation | Self::OperationLocation)
    }
}

/// A response header that may contain a polling URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollingHeader {
    /// The `Azure-AsyncOperation` header.
    AzureAsyncOperation,
    /// The `Operation-Location` header.
    OperationLocation,
    /// The `Location` header.
    Location,
}

impl PollingHeader {
    /// The header name, in lowercase.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AzureAsyncOperation => "azure-asyncoperation",
            Self::OperationLocation => "operation-location",
            Self::Location => "location",
        }
    }

    /// The polling method used when this header selects the polling URL.
    pub fn polling_method(&self) -> PollingMethod {
        match self {
            Self::AzureAsyncOperation => PollingMethod::AsyncOperation,
            Self::OperationLocation => PollingMethod::OperationLocation,
            Self::Location => PollingMethod::Location,
        }
    }

    /// Returns the URL in this header, if the header is present and not empty.
    ///
    /// A value that is not an absolute `http` or `https` URL is an error.
    pub fn url(&self, response: &RawResponse) -> Result<Option<Url>> {
        let Some(value) = response.header_str(self.name()) else {
            return Ok(None);
        };
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let invalid = || {
            Error::binding(InvalidUrl {
                header: self.name(),
                value: value.to_string(),
            })
        };
        let url = Url::parse(value).map_err(|_| invalid())?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            _ => Err(invalid()),
        }
    }
}

/// The error returned when a polling header does not contain a valid URL.
#[derive(Debug, thiserror::Error)]
#[error("the `{header}` header does not contain an absolute URL: `{value}`")]
pub struct InvalidUrl {
    header: &'static str,
    value: String,
}

/// Selects the polling URL from a response.
///
/// The poller consults the dialect on the response that started the
/// operation, and on every polling response. On polling responses, a URL is
/// only used if the dialect selects the same [PollingMethod] as before.
pub trait PollingDialect: Send + Sync + std::fmt::Debug {
    /// Returns the polling method and URL advertised by `response`, if any.
    fn polling_url(&self, response: &RawResponse) -> Result<Option<(PollingMethod, Url)>>;
}

/// A [PollingDialect] based on an ordered list of headers.
///
/// The first header present in the response wins.
///
/// # Example
/// ```
/// # use azure_arm_lro::dialect::{HeaderDialect, PollingHeader};
/// let dialect = HeaderDialect::new([PollingHeader::OperationLocation]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderDialect {
    headers: Vec<PollingHeader>,
}

impl HeaderDialect {
    /// Creates a dialect using `headers`, in order of preference.
    pub fn new<I>(headers: I) -> Self
    where
        I: IntoIterator<Item = PollingHeader>,
    {
        Self {
            headers: headers.into_iter().collect(),
        }
    }

    /// The classic ARM dialect: `Azure-AsyncOperation`, then `Location`.
    pub fn arm() -> Self {
        Self::new([PollingHeader::AzureAsyncOperation, PollingHeader::Location])
    }

    /// The dialect used by newer APIs: `Operation-Location`, then `Location`.
    pub fn operation_location() -> Self {
        Self::new([PollingHeader::OperationLocation, PollingHeader::Location])
    }

    /// The headers consulted by this dialect, in order of preference.
    pub fn headers(&self) -> &[PollingHeader] {
        &self.headers
    }
}

impl PollingDialect for HeaderDialect {
    fn polling_url(&self, response: &RawResponse) -> Result<Option<(PollingMethod, Url)>> {
        first_url(&self.headers, response)
    }
}

/// The default [PollingDialect].
///
/// Prefers `Azure-AsyncOperation`, then `Operation-Location`, then `Location`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArmDialect;

impl PollingDialect for ArmDialect {
    fn polling_url(&self, response: &RawResponse) -> Result<Option<(PollingMethod, Url)>> {
        const HEADERS: [PollingHeader; 3] = [
            PollingHeader::AzureAsyncOperation,
            PollingHeader::OperationLocation,
            PollingHeader::Location,
        ];
        first_url(&HEADERS, response)
    }
}

fn first_url(
    headers: &[PollingHeader],
    response: &RawResponse,
) -> Result<Option<(PollingMethod, Url)>> {
    for header in headers {
        if let Some(url) = header.url(response)? {
            return Ok(Some((header.polling_method(), url)));
        }
    }
    Ok(None)
}
