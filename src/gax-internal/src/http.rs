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

//! A [Pipeline] implementation based on [reqwest].

use gax::Result;
use gax::error::Error;
use gax::options::ClientConfig;
use gax::pipeline::{Pipeline, RawResponse, Request};
use http::HeaderMap;
use http::header::{HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::Instrument;

/// The user agent sent with every request, after any configured prefix.
pub const DEFAULT_USER_AGENT: &str = concat!("azure-arm-rust/", env!("CARGO_PKG_VERSION"));

/// Sends requests using a shared [reqwest::Client].
///
/// Each call to [execute][Pipeline::execute] makes exactly one attempt. The
/// pipeline does not retry, and it returns responses with error status codes
/// as `Ok(RawResponse)`. Only failures to send the request or to receive the
/// response body are reported as errors.
#[derive(Clone, Debug)]
pub struct ReqwestPipeline {
    inner: reqwest::Client,
    user_agent: HeaderValue,
    default_headers: HeaderMap,
    attempt_timeout: Option<Duration>,
    tracing: bool,
}

impl ReqwestPipeline {
    /// Creates a new pipeline with a default [reqwest::Client].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder().build().map_err(Error::io)?;
        Self::with_client(inner, config)
    }

    /// Creates a new pipeline using an existing [reqwest::Client].
    ///
    /// Applications use this to share a connection pool, or to configure TLS
    /// and proxies in ways [ClientConfig] does not support.
    pub fn with_client(inner: reqwest::Client, config: ClientConfig) -> Result<Self> {
        let user_agent = match config.user_agent() {
            Some(prefix) => format!("{prefix} {DEFAULT_USER_AGENT}"),
            None => DEFAULT_USER_AGENT.to_string(),
        };
        let user_agent = HeaderValue::from_str(&user_agent).map_err(Error::ser)?;
        Ok(Self {
            inner,
            user_agent,
            default_headers: config.default_headers().clone(),
            attempt_timeout: config.attempt_timeout(),
            tracing: config.tracing_enabled(),
        })
    }

    async fn attempt(&self, request: Request) -> Result<RawResponse> {
        let (method, url, headers, body) = request.into_parts();
        let mut builder = self
            .inner
            .request(method.clone(), url.clone())
            .headers(self.default_headers.clone())
            .headers(headers)
            .header(USER_AGENT, self.user_agent.clone());
        if let Some(timeout) = self.attempt_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(Self::map_send_error)?;
        tracing::debug!(%method, %url, status = status.as_u16(), "request completed");
        Ok(RawResponse::new(method, url, status)
            .set_headers(response_headers)
            .set_body(body))
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        match err {
            e if e.is_timeout() => Error::timeout(e),
            e => Error::io(e),
        }
    }
}

#[async_trait::async_trait]
impl Pipeline for ReqwestPipeline {
    async fn execute(&self, request: Request) -> Result<RawResponse> {
        if !self.tracing {
            return self.attempt(request).await;
        }
        let span = tracing::info_span!(
            "http_request",
            method = %request.method(),
            url = %request.url()
        );
        self.attempt(request).instrument(span).await
    }
}
