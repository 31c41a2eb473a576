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

use crate::options::PollerOptions;
use crate::status::OperationStatus;
use crate::token;
use crate::tracker::{ACCEPTED_STATUS_CODES, Tracker, failure_status};
use gax::Result;
use gax::error::Error;
use gax::loop_state::LoopState;
use gax::pipeline::{Pipeline, RawResponse, Request, check_status, send};
use gax::polling_state::PollingState;
use gax::retry_after::retry_after;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Tracks a long-running operation until it completes.
///
/// A poller is created from the response to the request that started the
/// operation, or from a resume token. Applications can drive the operation
/// step by step with [poll][Poller::poll], or to completion with
/// [until_done][Poller::until_done].
///
/// Each call to `poll()` sends exactly one request. The state of the poller
/// changes only when the request succeeds and the response can be decoded, so
/// a failed `poll()` can be retried safely. Once the operation reaches a
/// terminal state the poller sends no more polling requests.
///
/// A failed or canceled operation is not a polling error. `poll()` succeeds,
/// [done][Poller::done] returns true, and [result][Poller::result] returns an
/// error with the details reported by the service.
///
/// # Example
/// ```no_run
/// # use azure_arm_lro::{Poller, PollerOptions};
/// # use gax::pipeline::{Pipeline, RawResponse};
/// # use std::sync::Arc;
/// # async fn sample(initial: RawResponse, pipeline: Arc<dyn Pipeline>) -> gax::Result<()> {
/// #[derive(serde::Deserialize)]
/// struct Widget { id: String }
///
/// let mut poller = Poller::<Widget>::new(initial, pipeline, PollerOptions::new())?;
/// let widget = poller.until_done().await?;
/// println!("created {}", widget.id);
/// # Ok(()) }
/// ```
///
/// # Parameters
/// * `T` - the type of the final result.
pub struct Poller<T> {
    pipeline: Arc<dyn Pipeline>,
    options: PollerOptions,
    tracker: Tracker,
    latest: Option<RawResponse>,
    result: Option<RawResponse>,
    _result_type: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("pipeline", &self.pipeline)
            .field("options", &self.options)
            .field("tracker", &self.tracker)
            .field("latest", &self.latest)
            .finish()
    }
}

impl<T> Poller<T>
where
    T: DeserializeOwned,
{
    /// Creates a poller from the response to the initiating request.
    ///
    /// Fails if the response advertises an invalid polling URL, or if its
    /// body cannot be decoded.
    ///
    /// # Panics
    /// If the response status is not 200, 201, 202, or 204. Such responses do
    /// not start a long-running operation, the caller should have reported
    /// them as errors.
    pub fn new(
        initial: RawResponse,
        pipeline: Arc<dyn Pipeline>,
        options: PollerOptions,
    ) -> Result<Self> {
        let tracker = Tracker::start(&initial, options.dialect.as_ref(), options.final_state_via)?;
        tracing::debug!(
            method = %tracker.method,
            url = %tracker.original_url,
            polling_method = ?tracker.polling_method,
            status = %tracker.status,
            "started long-running operation"
        );
        Ok(Self {
            pipeline,
            options,
            tracker,
            latest: Some(initial),
            result: None,
            _result_type: PhantomData,
        })
    }

    /// Creates a poller from a token returned by [resume_token][Poller::resume_token].
    ///
    /// The `kind` in `options` must match the kind used to create the token.
    pub fn from_resume_token(
        token: &str,
        pipeline: Arc<dyn Pipeline>,
        options: PollerOptions,
    ) -> Result<Self> {
        let tracker = token::decode(&options.kind, token)?;
        tracing::debug!(
            url = %tracker.polling_url,
            status = %tracker.status,
            "resumed long-running operation"
        );
        Ok(Self {
            pipeline,
            options,
            tracker,
            latest: None,
            result: None,
            _result_type: PhantomData,
        })
    }

    /// Returns true if the operation reached a terminal state.
    pub fn done(&self) -> bool {
        self.tracker.status.is_terminal()
    }

    /// The status of the operation as of the last successful poll.
    pub fn status(&self) -> OperationStatus {
        self.tracker.status
    }

    /// The URL used by the next poll.
    pub fn polling_url(&self) -> &Url {
        &self.tracker.polling_url
    }

    /// The last response received, if any.
    ///
    /// A poller created from a resume token has no response until the first
    /// successful poll.
    pub fn latest_response(&self) -> Option<&RawResponse> {
        self.latest.as_ref()
    }

    /// Serializes the state of the poller.
    ///
    /// Fails if the operation already completed, there is nothing to resume.
    pub fn resume_token(&self) -> Result<String> {
        token::encode(&self.options.kind, &self.tracker)
    }

    /// Polls the operation once.
    ///
    /// Returns the polling response. Once the operation completed this returns
    /// the last response without sending a request.
    pub async fn poll(&mut self) -> Result<RawResponse> {
        if self.done() {
            if let Some(latest) = &self.latest {
                return Ok(latest.clone());
            }
        }
        let request = Request::get(self.tracker.polling_url.clone());
        let response = send(self.pipeline.as_ref(), request, &self.options.cancel).await?;
        let response = check_status(response, &ACCEPTED_STATUS_CODES)?;
        let next = self.tracker.observe(&response, self.options.dialect.as_ref())?;
        tracing::debug!(url = %self.tracker.polling_url, status = %next.status, "polled operation");
        if next.status != self.tracker.status {
            tracing::debug!(from = %self.tracker.status, to = %next.status, "operation status changed");
        }
        self.tracker = next;
        self.latest = Some(response.clone());
        Ok(response)
    }

    /// Returns the final result of the operation.
    ///
    /// Depending on the [FinalStateVia][crate::FinalStateVia] policy this
    /// may send one request. The response is cached, calling this function
    /// again returns the same result.
    ///
    /// If the operation failed, or was canceled, the error contains the
    /// details reported by the service, see [Error::status].
    ///
    /// # Panics
    /// If the operation is not [done][Poller::done].
    pub async fn result(&mut self) -> Result<T> {
        assert!(
            self.done(),
            "result() called before the operation completed, the status is {}",
            self.tracker.status
        );
        if self.tracker.status.is_failure() {
            let body: &[u8] = match &self.latest {
                Some(response) => &response.body()[..],
                None => &[],
            };
            return Err(Error::operation(failure_status(self.tracker.status, body)));
        }
        if self.result.is_none() {
            self.result = match self.tracker.result_url.clone() {
                None => self.latest.clone(),
                Some(url) => {
                    tracing::debug!(%url, "fetching the result of the operation");
                    let response =
                        send(self.pipeline.as_ref(), Request::get(url), &self.options.cancel)
                            .await?;
                    Some(check_status(
                        response,
                        &[StatusCode::OK, StatusCode::NO_CONTENT],
                    )?)
                }
            };
        }
        match &self.result {
            Some(response) => response.json::<T>(),
            None => serde_json::from_value::<T>(serde_json::Value::Null).map_err(Error::deser),
        }
    }

    /// Polls the operation until it completes, and returns its result.
    ///
    /// Between polls the poller waits for the period returned by the backoff
    /// policy, or for the delay suggested by the service in the last response
    /// if that is longer. The error policy decides if polling errors stop the
    /// loop, and may limit how long the loop runs.
    ///
    /// The loop stops with [Error::cancelled] as soon as the cancellation
    /// token in the options is cancelled, including while waiting.
    #[tracing::instrument(level = "debug", skip_all, fields(polling_url = %self.tracker.polling_url))]
    pub async fn until_done(&mut self) -> Result<T> {
        let start = Instant::now();
        let mut attempts = 0_u32;
        while !self.done() {
            if attempts > 0 || self.latest.is_some() {
                self.wait(&polling_state(start, attempts)).await?;
            }
            attempts += 1;
            let state = polling_state(start, attempts);
            match self.poll().await {
                Ok(_) if self.done() => break,
                Ok(_) => {
                    let operation = self.tracker.polling_url.as_str();
                    if let Some(e) = self.options.error_policy.on_in_progress(&state, operation) {
                        return Err(e);
                    }
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => match self.options.error_policy.on_error(&state, e) {
                    LoopState::Continue(e) => {
                        tracing::debug!(error = %e, "polling failed, the operation will be polled again");
                    }
                    other => return Err(other.into_error()),
                },
            }
        }
        self.result().await
    }

    /// Converts the poller into a stream of polling results.
    ///
    /// Each item is the status of the operation after a poll, or the error
    /// from a failed poll. The stream waits between polls in the same way as
    /// [until_done][Poller::until_done]. It ends after the operation reaches a
    /// terminal state, or after an error the error policy does not continue
    /// from.
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<OperationStatus>> {
        use futures::stream::unfold;
        let start = Instant::now();
        unfold(Some((self, 0_u32)), move |state| async move {
            let (mut poller, attempts) = state?;
            if poller.done() {
                return None;
            }
            if attempts > 0 || poller.latest.is_some() {
                if let Err(e) = poller.wait(&polling_state(start, attempts)).await {
                    return Some((Err(e), None));
                }
            }
            let attempts = attempts + 1;
            let state = polling_state(start, attempts);
            match poller.poll().await {
                Ok(_) if poller.done() => Some((Ok(poller.status()), Some((poller, attempts)))),
                Ok(_) => {
                    let operation = poller.tracker.polling_url.as_str();
                    match poller.options.error_policy.on_in_progress(&state, operation) {
                        Some(e) => Some((Err(e), None)),
                        None => Some((Ok(poller.status()), Some((poller, attempts)))),
                    }
                }
                Err(e) if e.is_cancelled() => Some((Err(e), None)),
                Err(e) => match poller.options.error_policy.on_error(&state, e) {
                    LoopState::Continue(e) => Some((Err(e), Some((poller, attempts)))),
                    other => Some((Err(other.into_error()), None)),
                },
            }
        })
    }

    async fn wait(&self, state: &PollingState) -> Result<()> {
        let period = self.options.backoff_policy.wait_period(state);
        let suggested = self
            .latest
            .as_ref()
            .and_then(|r| retry_after(r.headers()))
            .unwrap_or_default();
        let delay = period.max(suggested);
        tracing::debug!(?delay, "waiting before the next poll");
        tokio::select! {
            biased;
            _ = self.options.cancel.cancelled() => Err(Error::cancelled()),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

fn polling_state(start: Instant, attempts: u32) -> PollingState {
    PollingState::default()
        .set_start(start)
        .set_attempt_count(attempts)
}
