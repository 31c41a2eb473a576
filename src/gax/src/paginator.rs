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

//! Iterate over paginated list operations.
//!
//! Azure Resource Manager list operations return one page of items at a time,
//! with a `nextLink` URL to fetch the following page. An empty or missing
//! `nextLink` indicates the last page.
//!
//! A [Pager] drives this protocol. It is created with two functions: `more`
//! decides if another page should be fetched after the last page, and `fetch`
//! retrieves the first page (when called with `None`) or the page after the
//! last page. All state lives in the pager, so if `fetch` fails, calling
//! [Pager::next_page] again retries the same page.
//!
//! # Example
//! ```
//! # use azure_arm_gax::paginator::{Page, Pager};
//! # tokio_test::block_on(async {
//! let mut pager = Pager::for_pageable(|last: Option<&Page<i32>>| {
//!     let next = last.and_then(|p| p.next_link.clone());
//!     async move {
//!         let page = match next.as_deref() {
//!             None => Page::new(vec![1, 2], Some("p2".into())),
//!             Some(_) => Page::new(vec![3], None),
//!         };
//!         Ok(page)
//!     }
//! });
//! let mut items = Vec::new();
//! while pager.more() {
//!     items.extend(pager.next_page().await?.items);
//! }
//! assert_eq!(items, vec![1, 2, 3]);
//! # Ok::<(), azure_arm_gax::error::Error>(()) });
//! ```

use crate::Result;
use crate::error::Error;
use crate::pipeline::{Pipeline, Request, check_status};
use futures::future::BoxFuture;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Describes a page returned by a list operation.
pub trait PageableResponse {
    type PageItem;

    /// The link to the next page, `None` or empty on the last page.
    fn next_link(&self) -> Option<&str>;

    /// Consumes the page, returning its items in the order returned by the
    /// service.
    fn into_items(self) -> Vec<Self::PageItem>;
}

/// Returns true if the page has a non-empty next link.
pub fn has_next_link<P: PageableResponse>(page: &P) -> bool {
    page.next_link().is_some_and(|s| !s.is_empty())
}

/// Drives a paginated list operation, one page at a time.
///
/// # Parameters
/// * `P` - the page type.
/// * `M` - decides if there are more pages after the last page.
/// * `F` - fetches a page given the last page, or the first page given `None`.
pub struct Pager<P, M, F> {
    more: M,
    fetch: F,
    last: Option<P>,
    fetched: u32,
    cancel: Option<CancellationToken>,
}

impl<P, M, F> std::fmt::Debug for Pager<P, M, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("started", &self.last.is_some())
            .field("fetched", &self.fetched)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl<P, M, F, Fut> Pager<P, M, F>
where
    M: Fn(&P) -> bool,
    F: FnMut(Option<&P>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    /// Creates a pager from the `more` and `fetch` functions.
    ///
    /// `fetch` must not assume it is called only once per page, the pager
    /// calls it again if the application retries a failed page.
    pub fn new(more: M, fetch: F) -> Self {
        Self {
            more,
            fetch,
            last: None,
            fetched: 0,
            cancel: None,
        }
    }

    /// Fetching pages stops with [Error::cancelled] once `token` is
    /// cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns true if another page should be fetched.
    ///
    /// This is always true before the first page is fetched.
    pub fn more(&self) -> bool {
        match &self.last {
            None => true,
            Some(p) => (self.more)(p),
        }
    }

    /// Fetches the next page.
    ///
    /// On success the page becomes the last page, and a copy is returned. On
    /// error the pager state is unchanged, calling this function again
    /// retries the same page.
    ///
    /// # Panics
    /// If [more()][Pager::more] is false. Fetching past the last page is a
    /// programming error.
    pub async fn next_page(&mut self) -> Result<P>
    where
        P: Clone,
    {
        assert!(
            self.more(),
            "next_page() called on a pager with no more pages"
        );
        tracing::debug!(page = self.fetched + 1, "fetching page");
        let pending = (self.fetch)(self.last.as_ref());
        let page = match &self.cancel {
            None => pending.await?,
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::cancelled()),
                p = pending => p?,
            },
        };
        self.fetched += 1;
        self.last = Some(page.clone());
        Ok(page)
    }

    /// The number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.fetched
    }
}

impl<P, F, Fut> Pager<P, fn(&P) -> bool, F>
where
    P: PageableResponse,
    F: FnMut(Option<&P>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    /// Creates a pager that continues while the last page has a non-empty next
    /// link.
    pub fn for_pageable(fetch: F) -> Self {
        Self::new(has_next_link::<P>, fetch)
    }
}

#[cfg(feature = "unstable-stream")]
impl<P, M, F, Fut> Pager<P, M, F>
where
    P: Clone,
    M: Fn(&P) -> bool,
    F: FnMut(Option<&P>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    /// Converts the pager into a stream of pages.
    ///
    /// The stream ends after the last page, or after the first error.
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<P>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut pager = state?;
            if !pager.more() {
                return None;
            }
            match pager.next_page().await {
                Ok(p) => Some((Ok(p), Some(pager))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Converts the pager into a stream of items, across all pages.
    ///
    /// The stream ends after the last item, or after the first error.
    pub fn items(self) -> impl futures::Stream<Item = Result<P::PageItem>>
    where
        P: PageableResponse,
    {
        use futures::StreamExt;
        self.into_stream().flat_map(|page| {
            let items: Vec<Result<P::PageItem>> = match page {
                Ok(p) => p.into_items().into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(items)
        })
    }
}

/// A page decoded from a list response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<T> {
    /// The items in this page, in the order returned by the service.
    pub items: Vec<T>,
    /// The link to the next page. `None` on the last page.
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_link: Option<String>) -> Self {
        Self { items, next_link }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes a list response body, using `fields` to find the items and the
    /// next link.
    ///
    /// A missing or `null` items field is an empty page. An empty next link is
    /// the same as no next link.
    pub fn from_json(value: serde_json::Value, fields: &PageFields) -> Result<Self> {
        let serde_json::Value::Object(mut object) = value else {
            return Err(Error::deser(format!(
                "expected a JSON object in the list response, got {value}"
            )));
        };
        let items = match object.remove(&fields.items) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(v) => serde_json::from_value::<Vec<T>>(v).map_err(Error::deser)?,
        };
        let link = object.remove(&fields.next_link).or_else(|| {
            (fields.next_link == DEFAULT_NEXT_LINK)
                .then(|| object.remove(ALTERNATIVE_NEXT_LINK))
                .flatten()
        });
        let next_link = match link {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => {
                return Err(Error::deser(format!(
                    "expected a string in the `{}` field, got {other}",
                    fields.next_link
                )));
            }
        };
        Ok(Self { items, next_link })
    }
}

impl<T> PageableResponse for Page<T> {
    type PageItem = T;

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

const DEFAULT_ITEMS: &str = "value";
const DEFAULT_NEXT_LINK: &str = "nextLink";
const ALTERNATIVE_NEXT_LINK: &str = "NextLink";

/// The names of the JSON fields in a list response.
#[derive(Clone, Debug, PartialEq)]
pub struct PageFields {
    /// The field containing the array of items, `value` by default.
    pub items: String,
    /// The field containing the next link, `nextLink` by default. With the
    /// default name, `NextLink` is also accepted.
    pub next_link: String,
}

impl PageFields {
    pub fn new<I: Into<String>, N: Into<String>>(items: I, next_link: N) -> Self {
        Self {
            items: items.into(),
            next_link: next_link.into(),
        }
    }
}

impl Default for PageFields {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS, DEFAULT_NEXT_LINK)
    }
}

/// The fetch function used by [http_pager].
pub type HttpFetch<T> =
    Box<dyn FnMut(Option<&Page<T>>) -> BoxFuture<'static, Result<Page<T>>> + Send>;

/// A pager over an HTTP list operation.
pub type HttpPager<T> = Pager<Page<T>, fn(&Page<T>) -> bool, HttpFetch<T>>;

/// Creates a pager over an HTTP list operation.
///
/// The first page is fetched with `first`. Each following page is fetched with
/// a `GET` request to the next link of the last page. Relative next links are
/// resolved against the URL of `first`. Responses other than `200 OK` are
/// errors.
pub fn http_pager<T>(pipeline: Arc<dyn Pipeline>, first: Request, fields: PageFields) -> HttpPager<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let fetch = move |last: Option<&Page<T>>| -> BoxFuture<'static, Result<Page<T>>> {
        let request = match last.and_then(|p| p.next_link.as_deref()) {
            None => Ok(first.clone()),
            Some(link) => first
                .url()
                .join(link)
                .map(Request::get)
                .map_err(Error::binding),
        };
        let pipeline = pipeline.clone();
        let fields = fields.clone();
        Box::pin(async move {
            let request = request?;
            tracing::debug!(url = %request.url(), "requesting list page");
            let response = pipeline.execute(request).await?;
            let response = check_status(response, &[StatusCode::OK])?;
            Page::from_json(response.json::<serde_json::Value>()?, &fields)
        })
    };
    Pager::for_pageable(Box::new(fetch) as HttpFetch<T>)
}
