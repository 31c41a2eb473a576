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

//! A minimal client for a fictional `widgets` resource provider.
//!
//! The methods follow the same steps as generated clients: build the URL,
//! send the initiating request, check the status, and wrap the response in a
//! [Poller].

use gax::Result;
use gax::options::ClientConfig;
use gax::pipeline::{Pipeline, Request, check_status};
use gaxi::http::ReqwestPipeline;
use http::{Method, StatusCode};
use azure_arm_lro::{Poller, PollerOptions};
use std::sync::Arc;
use url::Url;

pub const API_VERSION: &str = "2024-01-01";

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Widget {
    pub id: String,
}

#[derive(Clone, Debug)]
pub struct WidgetsClient {
    pipeline: Arc<dyn Pipeline>,
    endpoint: Url,
}

impl WidgetsClient {
    pub fn new(endpoint: &str, config: ClientConfig) -> anyhow::Result<Self> {
        Ok(Self {
            pipeline: Arc::new(ReqwestPipeline::new(config)?),
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn pipeline(&self) -> Arc<dyn Pipeline> {
        self.pipeline.clone()
    }

    pub fn widget_url(&self, name: &str) -> Url {
        self.endpoint
            .join(&format!("/subscriptions/sub/widgets/{name}"))
            .expect("test widget names are valid path segments")
    }

    pub async fn begin_create(&self, name: &str, options: PollerOptions) -> Result<Poller<Widget>> {
        let request = Request::new(Method::PUT, self.widget_url(name))
            .with_api_version(API_VERSION)
            .set_json_body(&serde_json::json!({"location": "westus"}))?;
        self.start(request, options).await
    }

    pub async fn begin_delete(&self, name: &str, options: PollerOptions) -> Result<Poller<()>> {
        let request =
            Request::new(Method::DELETE, self.widget_url(name)).with_api_version(API_VERSION);
        self.start(request, options).await
    }

    async fn start<T>(&self, request: Request, options: PollerOptions) -> Result<Poller<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.pipeline.execute(request).await?;
        let response = check_status(
            response,
            &[
                StatusCode::OK,
                StatusCode::CREATED,
                StatusCode::ACCEPTED,
                StatusCode::NO_CONTENT,
            ],
        )?;
        Poller::new(response, self.pipeline.clone(), options)
    }
}
