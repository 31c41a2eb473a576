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

//! Drive long-running operations against a local HTTP server.

#[cfg(test)]
mod fake_client;

#[cfg(test)]
mod tests {
    use super::fake_client::{Widget, WidgetsClient};
    use azure_arm_lro::{FinalStateVia, OperationStatus, Poller, PollerOptions};
    use gax::options::ClientConfig;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    const WIDGET_PATH: &str = "/subscriptions/sub/widgets/w1";

    fn new_client(server: &Server) -> Result<WidgetsClient> {
        Ok(WidgetsClient::new(
            &format!("http://{}", server.addr()),
            ClientConfig::new(),
        )?)
    }

    fn options() -> PollerOptions {
        PollerOptions::new().set_frequency(Duration::from_millis(10))
    }

    fn json_status(code: u16, body: serde_json::Value) -> impl Responder {
        status_code(code)
            .insert_header("Content-Type", "application/json")
            .body(body.to_string())
    }

    fn expect_create(server: &Server, header: &'static str, code: u16) {
        let monitor = format!("http://{}/ops/1", server.addr());
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", WIDGET_PATH),
                request::query(url_decoded(contains(("api-version", "2024-01-01")))),
                request::body(json_decoded(eq(json!({"location": "westus"})))),
            ])
            .respond_with(status_code(code).insert_header(header, monitor)),
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn create_with_operation_location() -> Result<()> {
        let server = Server::run();
        expect_create(&server, "Operation-Location", 201);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(2)
                .respond_with(cycle![
                    json_status(200, json!({"status": "Running"})),
                    json_status(200, json!({"status": "Succeeded", "id": "abc"})),
                ]),
        );

        let client = new_client(&server)?;
        let options = options().set_final_state_via(FinalStateVia::OperationLocation);
        let mut poller = client.begin_create("w1", options).await?;
        assert_eq!(poller.status(), OperationStatus::InProgress);

        poller.poll().await?;
        assert_eq!(poller.status(), OperationStatus::InProgress);
        poller.poll().await?;
        assert!(poller.done());
        assert_eq!(poller.result().await?, Widget { id: "abc".into() });
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn create_until_done_fetches_original_uri() -> Result<()> {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
        let server = Server::run();
        expect_create(&server, "Azure-AsyncOperation", 201);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(3)
                .respond_with(cycle![
                    json_status(200, json!({"status": "InProgress"})),
                    json_status(200, json!({"status": "Running"})),
                    json_status(200, json!({"status": "Succeeded"})),
                ]),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", WIDGET_PATH),
                request::query(url_decoded(contains(("api-version", "2024-01-01")))),
            ])
            .times(1)
            .respond_with(json_status(200, json!({"id": "w1"}))),
        );

        let client = new_client(&server)?;
        let mut poller = client.begin_create("w1", options()).await?;
        let got = poller.until_done().await?;
        assert_eq!(got, Widget { id: "w1".into() });

        // Terminal pollers send no more requests.
        poller.poll().await?;
        assert_eq!(poller.status(), OperationStatus::Succeeded);
        assert_eq!(poller.result().await?, got);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn transport_error_then_retry() -> Result<()> {
        let server = Server::run();
        expect_create(&server, "Operation-Location", 201);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(3)
                .respond_with(cycle![
                    json_status(200, json!({"status": "Running"})),
                    delay_and_then(
                        Duration::from_secs(1),
                        json_status(200, json!({"status": "Failed"}))
                    ),
                    json_status(200, json!({"status": "Succeeded", "id": "abc"})),
                ]),
        );

        let config = ClientConfig::new().set_attempt_timeout(Duration::from_millis(100));
        let client = WidgetsClient::new(&format!("http://{}", server.addr()), config)?;
        let options = options().set_final_state_via(FinalStateVia::OperationLocation);
        let mut poller = client.begin_create("w1", options).await?;

        poller.poll().await?;
        let polling_url = poller.polling_url().clone();
        assert_eq!(poller.status(), OperationStatus::InProgress);

        let err = poller.poll().await.unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        assert_eq!(poller.status(), OperationStatus::InProgress);
        assert_eq!(poller.polling_url(), &polling_url);

        poller.poll().await?;
        assert_eq!(poller.status(), OperationStatus::Succeeded);
        assert_eq!(poller.result().await?, Widget { id: "abc".into() });
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_while_sleeping() -> Result<()> {
        let server = Server::run();
        expect_create(&server, "Azure-AsyncOperation", 202);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(0)
                .respond_with(status_code(500)),
        );

        let client = new_client(&server)?;
        let token = CancellationToken::new();
        let options = PollerOptions::new()
            .set_frequency(Duration::from_secs(60))
            .set_cancellation_token(token.clone());
        let mut poller = client.begin_create("w1", options).await?;

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        let start = Instant::now();
        let err = tokio::time::timeout(Duration::from_secs(5), poller.until_done())
            .await?
            .unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert!(start.elapsed() < Duration::from_secs(5), "{:?}", start.elapsed());
        assert_eq!(poller.status(), OperationStatus::InProgress);
        canceller.await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancel_in_flight_poll() -> Result<()> {
        let server = Server::run();
        expect_create(&server, "Azure-AsyncOperation", 202);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(..)
                .respond_with(delay_and_then(
                    Duration::from_secs(2),
                    json_status(200, json!({"status": "Succeeded"})),
                )),
        );

        let client = new_client(&server)?;
        let token = CancellationToken::new();
        let options = options().set_cancellation_token(token.clone());
        let mut poller = client.begin_create("w1", options).await?;

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        let err = tokio::time::timeout(Duration::from_secs(1), poller.poll())
            .await?
            .unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert_eq!(poller.status(), OperationStatus::InProgress);
        canceller.await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failure_surfaces_at_result() -> Result<()> {
        let server = Server::run();
        expect_create(&server, "Azure-AsyncOperation", 201);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(1)
                .respond_with(json_status(
                    200,
                    json!({
                        "status": "Failed",
                        "error": {
                            "code": "QuotaExceeded",
                            "message": "too many widgets",
                            "details": [{"code": "Limit", "message": "limit is 10"}],
                        },
                    }),
                )),
        );

        let client = new_client(&server)?;
        let mut poller = client.begin_create("w1", options()).await?;
        let response = poller.poll().await?;
        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(poller.done());
        assert_eq!(poller.status(), OperationStatus::Failed);

        let err = poller.result().await.unwrap_err();
        assert!(err.is_operation_failure(), "{err:?}");
        let status = err.status().expect("operation failures have a status");
        assert_eq!(status.code, "QuotaExceeded");
        assert_eq!(status.message, "too many widgets");
        assert_eq!(status.details.len(), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn resume_from_token() -> Result<()> {
        fn expect_polls(server: &Server) {
            server.expect(
                Expectation::matching(request::method_path("GET", "/ops/1"))
                    .times(2)
                    .respond_with(cycle![
                        json_status(200, json!({"status": "Running"})),
                        json_status(200, json!({"status": "Succeeded"})),
                    ]),
            );
            server.expect(
                Expectation::matching(request::method_path("GET", WIDGET_PATH))
                    .times(1)
                    .respond_with(json_status(200, json!({"id": "w1"}))),
            );
        }
        let options = || options().set_kind("widgets.create");

        // Continue polling the original poller.
        let server = Server::run();
        expect_create(&server, "Operation-Location", 201);
        expect_polls(&server);
        let client = new_client(&server)?;
        let mut poller = client.begin_create("w1", options()).await?;
        poller.poll().await?;
        let want = poller.until_done().await?;

        // Poll once, then resume from a token.
        let server = Server::run();
        expect_create(&server, "Operation-Location", 201);
        expect_polls(&server);
        let client = new_client(&server)?;
        let mut poller = client.begin_create("w1", options()).await?;
        poller.poll().await?;
        let token = poller.resume_token()?;
        drop(poller);

        let mut resumed = Poller::<Widget>::from_resume_token(&token, client.pipeline(), options())?;
        assert_eq!(resumed.status(), OperationStatus::InProgress);
        let got = resumed.until_done().await?;
        assert_eq!(got, want);
        assert_eq!(resumed.status(), OperationStatus::Succeeded);
        assert!(resumed.resume_token().is_err());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn create_without_polling_headers() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("PUT", WIDGET_PATH)).respond_with(
                json_status(201, json!({"id": "w1", "properties": {"provisioningState": "Creating"}})),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", WIDGET_PATH))
                .times(2)
                .respond_with(cycle![
                    json_status(200, json!({"id": "w1", "properties": {"provisioningState": "Updating"}})),
                    json_status(200, json!({"id": "w1", "properties": {"provisioningState": "Succeeded"}})),
                ]),
        );

        let client = new_client(&server)?;
        let mut poller = client.begin_create("w1", options()).await?;
        assert_eq!(poller.polling_url(), &client.widget_url("w1").join("?api-version=2024-01-01")?);
        let got = poller.until_done().await?;
        assert_eq!(got, Widget { id: "w1".into() });
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn delete_with_location() -> Result<()> {
        let server = Server::run();
        let location = format!("http://{}/ops/loc/1", server.addr());
        server.expect(
            Expectation::matching(request::method_path("DELETE", WIDGET_PATH)).respond_with(
                status_code(202)
                    .insert_header("Location", location)
                    .insert_header("Retry-After", "0"),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/loc/1"))
                .times(2)
                .respond_with(cycle![status_code(202), status_code(204)]),
        );

        let client = new_client(&server)?;
        let mut poller = client.begin_delete("w1", options()).await?;
        poller.until_done().await?;
        assert_eq!(poller.status(), OperationStatus::Succeeded);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn honors_retry_after() -> Result<()> {
        let server = Server::run();
        let monitor = format!("http://{}/ops/1", server.addr());
        server.expect(
            Expectation::matching(request::method_path("PUT", WIDGET_PATH)).respond_with(
                status_code(202)
                    .insert_header("Azure-AsyncOperation", monitor)
                    .insert_header("retry-after-ms", "200"),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(1)
                .respond_with(json_status(200, json!({"status": "Succeeded", "id": "w1"}))),
        );

        let client = new_client(&server)?;
        let options = PollerOptions::new()
            .set_frequency(Duration::from_millis(1))
            .set_final_state_via(FinalStateVia::AzureAsyncOperation);
        let mut poller = client.begin_create("w1", options).await?;
        let start = Instant::now();
        let got = poller.until_done().await?;
        assert_eq!(got, Widget { id: "w1".into() });
        assert!(start.elapsed() >= Duration::from_millis(200), "{:?}", start.elapsed());
        Ok(())
    }

    #[cfg(feature = "unstable-stream")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stream_statuses() -> Result<()> {
        use futures::StreamExt;

        let server = Server::run();
        expect_create(&server, "Operation-Location", 201);
        server.expect(
            Expectation::matching(request::method_path("GET", "/ops/1"))
                .times(3)
                .respond_with(cycle![
                    json_status(200, json!({"status": "NotStarted"})),
                    json_status(200, json!({"status": "Running"})),
                    json_status(200, json!({"status": "Succeeded"})),
                ]),
        );

        let client = new_client(&server)?;
        let poller = client.begin_create("w1", options()).await?;
        let got = poller
            .into_stream()
            .map(|r| r.map_err(|e| e.to_string()))
            .collect::<Vec<_>>()
            .await;
        assert_eq!(
            got,
            vec![
                Ok(OperationStatus::NotStarted),
                Ok(OperationStatus::InProgress),
                Ok(OperationStatus::Succeeded),
            ]
        );
        Ok(())
    }
}
