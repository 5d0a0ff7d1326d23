//! Whole-batch tests through the public `Batcher` API
//!
//! Uses the in-memory sender so the concurrency bound and dispatch order can
//! be observed directly.

#[cfg(test)]
mod tests {
    use crate::common::senders::Reply;
    use crate::common::{ConfigFactory, RecordingSender, RequestFactory};
    use async_trait::async_trait;
    use batchelor_rs::utils::net::TransportErrorKind;
    use batchelor_rs::{
        BatchError, BatchInput, BatchRequest, BatchResults, Batcher, INVALID_TASK, MISSING_NAME,
        Result, Transport,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn batcher(limit: usize, sender: &Arc<RecordingSender>) -> Batcher {
        Batcher::new(ConfigFactory::with_limit(limit))
            .unwrap()
            .with_sender(sender.clone())
    }

    // ==================== Scenarios ====================

    #[tokio::test]
    async fn test_scenario_single_json_response() {
        let sender = Arc::new(
            RecordingSender::new().reply("http://x/ok", Reply::Status(200, r#"{"ok":true}"#.into())),
        );
        let results = batcher(5, &sender)
            .issue_calls(RequestFactory::get("a", "http://x/ok"))
            .await
            .unwrap();

        let serialized = serde_json::to_value(&results).unwrap();
        assert_eq!(serialized["a"]["body"], json!({"ok": true}));
        assert_eq!(serialized["a"]["statusCode"], 200);
        assert_eq!(serialized["a"]["HTTPStatus"], 200);
        assert_eq!(serialized["a"]["headers"]["content-type"], "application/json");
        assert!(serialized["a"].get("originalHeader").is_none());
    }

    #[tokio::test]
    async fn test_scenario_missing_name() {
        let sender = Arc::new(RecordingSender::new());
        let results = batcher(5, &sender)
            .issue_calls(vec![RequestFactory::unnamed("http://x/bad")])
            .await
            .unwrap();

        let serialized = serde_json::to_value(&results).unwrap();
        assert_eq!(serialized[MISSING_NAME]["code"], INVALID_TASK);
        assert_eq!(serialized[MISSING_NAME]["statusCode"], 400);
        assert_eq!(serialized[MISSING_NAME]["HTTPStatus"], 400);
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_bounded_concurrency() {
        let sender = Arc::new(RecordingSender::new().with_delay(Duration::from_millis(25)));
        let results = batcher(2, &sender)
            .issue_calls(RequestFactory::batch(5, "http://svc"))
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        assert!(sender.max_in_flight() <= 2);
        assert_eq!(sender.names(), vec!["r0", "r1", "r2", "r3", "r4"]);
    }

    #[tokio::test]
    async fn test_scenario_timeout_isolated() {
        let sender = Arc::new(
            RecordingSender::new()
                .reply("http://svc/r1", Reply::Fail(TransportErrorKind::Timeout))
                .delay_for("http://svc/r1", Duration::from_millis(30)),
        );
        let results = batcher(3, &sender)
            .issue_calls(RequestFactory::batch(3, "http://svc"))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let timed_out = results["r1"].as_code().unwrap();
        assert_eq!(timed_out.code, "ETIMEDOUT");
        assert_eq!(timed_out.status_code, 504);
        assert!(results["r0"].as_response().is_some());
        assert!(results["r2"].as_response().is_some());
    }

    #[tokio::test]
    async fn test_scenario_preparation_failure_aborts() {
        let sender = Arc::new(RecordingSender::new());
        let mut requests = RequestFactory::batch(3, "http://svc");
        requests[1] = requests[1].clone().with_ip("bad\u{7f}ip");

        let err = batcher(1, &sender).issue_calls(requests).await.unwrap_err();

        assert!(err.is_batch_abort());
        assert!(err.to_string().contains("r1"));
        assert_eq!(sender.names(), vec!["r0"]);
    }

    // ==================== Result mapping ====================

    #[tokio::test]
    async fn test_one_entry_per_name_across_valid_and_invalid() {
        let sender = Arc::new(
            RecordingSender::new()
                .reply("http://svc/r0", Reply::Status(500, "boom".into()))
                .reply("http://svc/r2", Reply::Fail(TransportErrorKind::ConnectionRefused)),
        );
        let mut requests = RequestFactory::batch(4, "http://svc");
        requests.push(BatchRequest::new("bad-method", "http://svc/x").with_method("NOT VALID"));
        requests.push(RequestFactory::unnamed("http://svc/y"));

        let results = batcher(2, &sender).issue_calls(requests).await.unwrap();

        assert_eq!(results.len(), 6);
        let failed = results["r0"].as_response().unwrap();
        assert_eq!(failed.status_code, 500);
        assert_eq!(failed.body, json!("boom"));
        assert!(results["r2"].has_code("ECONNREFUSED"));
        assert!(results["bad-method"].has_code(INVALID_TASK));
        assert!(results[MISSING_NAME].has_code(INVALID_TASK));
    }

    #[tokio::test]
    async fn test_batch_input_from_json() {
        let sender = Arc::new(RecordingSender::new());
        let batcher = batcher(2, &sender);

        let single: BatchInput =
            serde_json::from_str(r#"{"name":"one","url":"http://svc/one"}"#).unwrap();
        let results = batcher.issue_calls(single).await.unwrap();
        assert_eq!(results.len(), 1);

        let many: BatchInput = serde_json::from_str(
            r#"[{"name":"a","url":"http://svc/a"},{"name":"b","url":"http://svc/b","method":"delete"}]"#,
        )
        .unwrap();
        let results = batcher.issue_calls(many).await.unwrap();
        assert_eq!(results.len(), 2);
        let methods: Vec<_> = sender.requests().iter().map(|r| r.method.clone()).collect();
        assert_eq!(methods.last(), Some(&reqwest::Method::DELETE));
    }

    #[tokio::test]
    async fn test_caller_requests_are_not_mutated() {
        let sender = Arc::new(RecordingSender::new());
        let request = BatchRequest {
            persistent: Some(true),
            ..RequestFactory::get("a", "http://svc/a")
        };
        let before = request.clone();
        batcher(1, &sender)
            .issue_calls(vec![request.clone()])
            .await
            .unwrap();
        assert_eq!(request, before);
    }

    // ==================== Override ====================

    struct StaticTransport;

    #[async_trait]
    impl Transport for StaticTransport {
        async fn issue_calls(&self, requests: Vec<BatchRequest>) -> Result<BatchResults> {
            if requests.is_empty() {
                return Err(BatchError::invalid_input("empty batch"));
            }
            Ok(BatchResults::new())
        }
    }

    #[tokio::test]
    async fn test_override_result_and_error_are_returned_verbatim() {
        let sender = Arc::new(RecordingSender::new());
        let mut batcher = batcher(2, &sender);
        batcher.set_transport(Some(Arc::new(StaticTransport) as Arc<dyn Transport>));

        let results = batcher
            .issue_calls(RequestFactory::batch(2, "http://svc"))
            .await
            .unwrap();
        assert!(results.is_empty());

        let err = batcher.issue_calls(Vec::<BatchRequest>::new()).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidInput(_)));
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_batcher_can_be_used_as_a_transport() {
        let sender = Arc::new(RecordingSender::new());
        let inner: Arc<dyn Transport> = Arc::new(batcher(2, &sender));
        let outer = Batcher::new(ConfigFactory::with_limit(1))
            .unwrap()
            .with_transport(inner);

        let results = outer
            .issue_calls(RequestFactory::batch(3, "http://svc"))
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(sender.requests().len(), 3);
    }
}
