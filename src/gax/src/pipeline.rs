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

//! The HTTP pipeline abstraction used by pollers and pagers.
//!
//! The pollers and pagers send one fully formed request at a time, and
//! receive the raw response. Authentication, retries, and connection pooling
//! are concerns of the [Pipeline] implementation, not of this crate.
//!
//! A [Pipeline] returns `Ok(RawResponse)` for any HTTP response, including
//! responses with error status codes. Only failures to send the request or to
//! receive the response are reported as errors. Use [check_status] to convert
//! unexpected status codes into errors.

use crate::Result;
use crate::error::{Error, Status};
use bytes::Bytes;
use http::header::{AsHeaderName, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully formed HTTP request.
///
/// # Example
/// ```
/// # use azure_arm_gax::pipeline::Request;
/// # use http::Method;
/// let url = url::Url::parse("https://management.azure.com/subscriptions/sub/resourceGroups/rg")?;
/// let request = Request::new(Method::PUT, url)
///     .with_api_version("2024-03-01")
///     .set_json_body(&serde_json::json!({"location": "westus"}))?;
/// assert_eq!(request.url().query(), Some("api-version=2024-03-01"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Sets (or replaces) a header.
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    pub fn set_body<T: Into<Bytes>>(mut self, v: T) -> Self {
        self.body = Some(v.into());
        self
    }

    /// Serializes `v` as the request body and sets the `content-type` header.
    pub fn set_json_body<T: serde::Serialize>(self, v: &T) -> Result<Self> {
        let body = serde_json::to_vec(v).map_err(Error::ser)?;
        Ok(self
            .set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .set_body(body))
    }

    /// Sets the `api-version` query parameter, replacing any previous value.
    pub fn with_api_version(mut self, version: &str) -> Self {
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != "api-version")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.url
            .query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter())
            .append_pair("api-version", version);
        self
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// The raw HTTP response, and the request that produced it.
///
/// The pollers need the method and URL of the initiating request to select
/// the polling strategy, so the response carries them.
#[derive(Clone, Debug)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    method: Method,
    url: Url,
}

impl RawResponse {
    /// Creates a response with no headers and an empty body.
    pub fn new(method: Method, url: Url, status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            method,
            url,
        }
    }

    /// Sets (or replaces) a header.
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all the headers.
    pub fn set_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the response body.
    pub fn set_body<T: Into<Bytes>>(mut self, v: T) -> Self {
        self.body = v.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The method of the request that produced this response.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL of the request that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decodes the body as JSON.
    ///
    /// An empty body decodes as the JSON `null` value, so `Option<T>` and
    /// `serde_json::Value` targets accept responses without content.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(Error::deser);
        }
        serde_json::from_slice(&self.body).map_err(Error::deser)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must be safe to share among many pollers and pagers.
#[async_trait::async_trait]
pub trait Pipeline: Send + Sync + std::fmt::Debug {
    /// Executes a single request.
    ///
    /// Returns `Ok` for any HTTP response, regardless of the status code.
    /// Returns an error if the request cannot be sent, or the response cannot
    /// be received.
    async fn execute(&self, request: Request) -> Result<RawResponse>;
}

/// Executes `request` unless `cancel` is cancelled first.
///
/// If the token is cancelled while the request is in flight, the request is
/// dropped and the function returns [Error::cancelled].
pub async fn send(
    pipeline: &dyn Pipeline,
    request: Request,
    cancel: &CancellationToken,
) -> Result<RawResponse> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled()),
        r = pipeline.execute(request) => r,
    }
}

/// Returns the response if its status code is in `accepted`.
///
/// Otherwise returns an error. If the body contains the ARM error envelope,
/// the error includes the decoded [Status].
pub fn check_status(response: RawResponse, accepted: &[StatusCode]) -> Result<RawResponse> {
    if accepted.contains(&response.status) {
        return Ok(response);
    }
    Err(to_http_error(response))
}

pub(crate) fn to_http_error(response: RawResponse) -> Error {
    let status_code = response.status.as_u16();
    match Status::try_from(&response.body) {
        Ok(status) => {
            Error::service_with_http_metadata(status, Some(status_code), Some(response.headers))
        }
        Err(_) => Error::http(status_code, response.headers, response.body),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    type TestResult = anyhow::Result<()>;

    mockall::mock! {
        #[derive(Debug)]
        pub Pipeline {}
        #[async_trait::async_trait]
        impl Pipeline for Pipeline {
            async fn execute(&self, request: Request) -> Result<RawResponse>;
        }
    }

    pub(crate) fn test_url(path: &str) -> Url {
        Url::parse("https://management.example.com/")
            .and_then(|u| u.join(path))
            .expect("hard-coded test URL is valid")
    }

    pub(crate) fn json_response(status: StatusCode, body: serde_json::Value) -> RawResponse {
        RawResponse::new(Method::GET, test_url("/test"), status)
            .set_body(serde_json::to_vec(&body).expect("json values always serialize"))
    }

    #[test]
    fn request_builders() -> TestResult {
        let request = Request::new(Method::PUT, test_url("/resource"))
            .set_header(
                HeaderName::from_static("x-test"),
                HeaderValue::from_static("v"),
            )
            .set_json_body(&json!({"a": 1}))?;
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.url().path(), "/resource");
        assert_eq!(
            request.headers().get("x-test"),
            Some(&HeaderValue::from_static("v"))
        );
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        let body = request.body().cloned().unwrap_or_default();
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&body)?, json!({"a": 1}));

        let (method, url, headers, body) = request.into_parts();
        assert_eq!(method, Method::PUT);
        assert_eq!(url.path(), "/resource");
        assert_eq!(headers.len(), 2);
        assert!(body.is_some());
        Ok(())
    }

    #[test]
    fn with_api_version() {
        let request = Request::get(test_url("/list?$filter=x&api-version=old"))
            .with_api_version("2024-01-01");
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("$filter".to_string(), "x".to_string()),
                ("api-version".to_string(), "2024-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn response_accessors() {
        let response = RawResponse::new(Method::DELETE, test_url("/r"), StatusCode::ACCEPTED)
            .set_header(
                HeaderName::from_static("location"),
                HeaderValue::from_static("https://example.com/poll"),
            )
            .set_body("abc");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.method(), Method::DELETE);
        assert_eq!(response.url().path(), "/r");
        assert_eq!(response.header_str("location"), Some("https://example.com/poll"));
        assert_eq!(response.header_str("missing"), None);
        assert_eq!(&response.body()[..], b"abc");

        let response = response.set_headers(HeaderMap::new());
        assert!(response.headers().is_empty(), "{response:?}");
    }

    #[test]
    fn response_json() -> TestResult {
        let response = json_response(StatusCode::OK, json!({"status": "Running"}));
        let got = response.json::<serde_json::Value>()?;
        assert_eq!(got, json!({"status": "Running"}));

        let empty = RawResponse::new(Method::GET, test_url("/"), StatusCode::NO_CONTENT);
        let got = empty.json::<Option<serde_json::Value>>()?;
        assert!(got.is_none(), "{got:?}");

        #[derive(Debug, serde::Deserialize)]
        struct Required {
            #[allow(dead_code)]
            name: String,
        }
        let got = empty.json::<Required>();
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");

        let garbage = empty.set_body("not json");
        let got = garbage.json::<serde_json::Value>();
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");
        Ok(())
    }

    #[test]
    fn check_status_accepted() -> TestResult {
        let response = json_response(StatusCode::CREATED, json!({}));
        let got = check_status(response, &[StatusCode::OK, StatusCode::CREATED])?;
        assert_eq!(got.status(), StatusCode::CREATED);
        Ok(())
    }

    #[test]
    fn check_status_with_envelope() {
        let response = json_response(
            StatusCode::NOT_FOUND,
            json!({"error": {"code": "ResourceNotFound", "message": "gone"}}),
        );
        let got = check_status(response, &[StatusCode::OK]);
        let err = match got {
            Err(e) => e,
            Ok(r) => panic!("expected an error, got {r:?}"),
        };
        assert_eq!(err.http_status_code(), Some(404));
        let status = err.status().cloned().unwrap_or_default();
        assert_eq!(status.code, "ResourceNotFound");
        assert_eq!(status.message, "gone");
        assert!(!err.is_operation_failure(), "{err:?}");
    }

    #[test]
    fn check_status_without_envelope() {
        let response = RawResponse::new(Method::GET, test_url("/"), StatusCode::BAD_GATEWAY)
            .set_body("upstream problem");
        let got = check_status(response, &[StatusCode::OK]);
        let err = match got {
            Err(e) => e,
            Ok(r) => panic!("expected an error, got {r:?}"),
        };
        assert!(err.is_transport(), "{err:?}");
        assert!(err.status().is_none(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(502));
        assert_eq!(
            err.http_payload(),
            Some(&Bytes::from_static(b"upstream problem"))
        );
    }

    #[tokio::test]
    async fn send_passes_through() -> TestResult {
        let mut mock = MockPipeline::new();
        mock.expect_execute()
            .times(1)
            .withf(|r| r.url().path() == "/op")
            .returning(|_| Ok(json_response(StatusCode::OK, json!({"ok": true}))));
        let cancel = CancellationToken::new();
        let got = send(&mock, Request::get(test_url("/op")), &cancel).await?;
        assert_eq!(got.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn send_cancelled_before_start() {
        let mut mock = MockPipeline::new();
        mock.expect_execute().never();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let got = send(&mock, Request::get(test_url("/op")), &cancel).await;
        assert!(matches!(got, Err(ref e) if e.is_cancelled()), "{got:?}");
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait::async_trait]
    impl Pipeline for Stalled {
        async fn execute(&self, _request: Request) -> Result<RawResponse> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(Error::io("unreachable in tests"))
        }
    }

    #[tokio::test]
    async fn send_cancelled_in_flight() -> TestResult {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let got = tokio::time::timeout(
            Duration::from_secs(5),
            send(&Stalled, Request::get(test_url("/op")), &cancel),
        )
        .await?;
        assert!(matches!(got, Err(ref e) if e.is_cancelled()), "{got:?}");
        Ok(())
    }
}
