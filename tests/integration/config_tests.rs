//! Configuration files driving whole batches

#[cfg(test)]
mod tests {
    use crate::common::senders::Reply;
    use crate::common::{ConfigFactory, RecordingSender, RequestFactory};
    use batchelor_rs::utils::net::TransportErrorKind;
    use batchelor_rs::{BatchError, Batcher, BatcherConfig};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_yaml_config_overrides_error_codes() {
        let file = ConfigFactory::write_file(
            r#"
maxConcurrentBatches: 2
errorCodes:
  ETIMEDOUT:
    statusCode: 408
    body: upstream too slow
"#,
            ".yaml",
        );
        let config = BatcherConfig::from_file(file.path()).await.unwrap();

        let sender = Arc::new(
            RecordingSender::new().reply("http://svc/r0", Reply::Fail(TransportErrorKind::Timeout)),
        );
        let results = Batcher::new(config)
            .unwrap()
            .with_sender(sender)
            .issue_calls(RequestFactory::batch(1, "http://svc"))
            .await
            .unwrap();

        let code = results["r0"].as_code().unwrap();
        assert_eq!(code.code, "ETIMEDOUT");
        assert_eq!(code.status_code, 408);
        assert_eq!(code.http_status, 408);
        assert_eq!(code.body, "upstream too slow");
    }

    #[tokio::test]
    async fn test_json_config_template_reaches_the_wire() {
        let file = ConfigFactory::write_file(
            r#"{
  "maxConcurrentBatches": 1,
  "request": {
    "method": "PUT",
    "timeout": "1500",
    "ip": "203.0.113.9",
    "headers": { "X-Team": "core" }
  }
}"#,
            ".json",
        );
        let config = BatcherConfig::from_file(file.path()).await.unwrap();

        let sender = Arc::new(RecordingSender::new().with_delay(Duration::from_millis(1)));
        Batcher::new(config)
            .unwrap()
            .with_sender(sender.clone())
            .issue_calls(RequestFactory::batch(2, "http://svc"))
            .await
            .unwrap();

        let sent = sender.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|r| r.method == reqwest::Method::PUT));
        assert!(sent.iter().all(|r| r.headers["x-team"] == "core"));
        assert!(sent.iter().all(|r| r.timeout == Some(Duration::from_millis(1500))));
        assert_eq!(sender.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_zero_timeout_from_env_sends_without_timeout() {
        let config = BatcherConfig::from_lookup(|key| {
            (key == "BATCHELOR_REQUEST_TIMEOUT").then(|| "0".to_string())
        })
        .unwrap();

        let sender = Arc::new(RecordingSender::new());
        let results = Batcher::new(config)
            .unwrap()
            .with_sender(sender.clone())
            .issue_calls(RequestFactory::batch(2, "http://svc"))
            .await
            .unwrap();

        assert!(results.values().all(|r| r.as_response().is_some()));
        assert!(sender.requests().iter().all(|r| r.timeout.is_none()));
    }

    #[tokio::test]
    async fn test_invalid_config_file_is_rejected() {
        let file = ConfigFactory::write_file("maxConcurrentBatches: [1, 2]\n", ".yaml");
        let err = BatcherConfig::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, BatchError::Yaml(_)));
    }

    #[test]
    fn test_batcher_rejects_invalid_config() {
        assert!(Batcher::new(ConfigFactory::with_limit(0)).is_err());
    }
}
