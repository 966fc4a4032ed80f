// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the record update boundary using an in-memory transport.

#[cfg(test)]
mod tests {
    use crate::dns_errors::{DdnsError, KeyError, TransportError, ValidationError};
    use crate::metrics::UPDATES_TOTAL;
    use crate::service::RecordService;
    use crate::status_reasons::{
        REASON_SERVER_REJECTED, REASON_SIGNING_KEY_INVALID, REASON_TIMEOUT,
    };
    use crate::transaction::{Operation, UpdateTransaction, UpdateTransactionBuilder};
    use crate::transport::{Ack, UpdateTransport};
    use crate::tsig::{KeyAlgorithm, SigningKey};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every submitted transaction and answers with a fixed result.
    struct FakeTransport {
        reply: Result<Ack, TransportError>,
        seen: Mutex<Vec<(String, String, Duration)>>,
    }

    impl FakeTransport {
        fn answering(reply: Result<Ack, TransportError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn submitted(&self) -> Vec<(String, String, Duration)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpdateTransport for FakeTransport {
        async fn submit(
            &self,
            transaction: &UpdateTransaction,
            key: &SigningKey,
            endpoint: &str,
            timeout: Duration,
        ) -> Result<Ack, TransportError> {
            assert_eq!(key.name, "update-key");
            self.seen
                .lock()
                .unwrap()
                .push((transaction.render(), endpoint.to_string(), timeout));
            self.reply.clone()
        }
    }

    fn ack() -> Ack {
        Ack {
            server: "10.0.0.2:53".parse().unwrap(),
            message_id: 4242,
            elapsed: Duration::from_millis(4),
        }
    }

    fn service(reply: Result<Ack, TransportError>) -> RecordService<FakeTransport> {
        RecordService::new(
            UpdateTransactionBuilder::new("10.0.0.2", 53, "example.test", 60).unwrap(),
            Arc::new(SigningKey::generate("update-key", KeyAlgorithm::HmacSha256).unwrap()),
            FakeTransport::answering(reply),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_add_record_submits_rendered_transaction() {
        let service = service(Ok(ack()));

        let result = service.add_record("www", "A", "10.0.0.5").await.unwrap();
        assert_eq!(result.message_id, 4242);

        let submitted = service.transport.submitted();
        assert_eq!(submitted.len(), 1);
        let (rendered, endpoint, timeout) = &submitted[0];
        assert_eq!(
            rendered,
            "server 10.0.0.2 53\nzone example.test\nupdate add www.example.test. 60 A 10.0.0.5\nsend\n"
        );
        assert_eq!(endpoint, "10.0.0.2:53");
        assert_eq!(*timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_transport() {
        let service = service(Ok(ack()));

        let err = service
            .add_record("www", "A", "not-an-ip")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DdnsError::Validation(ValidationError::InvalidValue { .. })
        ));
        assert!(!err.is_retryable());

        let err = service.add_record("", "TXT", "hello").await.unwrap_err();
        assert!(matches!(
            err,
            DdnsError::Validation(ValidationError::InvalidName { .. })
        ));

        assert!(service.transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_key_never_reaches_transport() {
        let mut key = SigningKey::generate("update-key", KeyAlgorithm::HmacSha256).unwrap();
        key.name = "bad..name".to_string();
        let service = RecordService::new(
            UpdateTransactionBuilder::new("10.0.0.2", 53, "example.test", 60).unwrap(),
            Arc::new(key),
            FakeTransport::answering(Ok(ack())),
            Duration::from_secs(5),
        );

        let err = service.add_record("www", "A", "10.0.0.5").await.unwrap_err();
        assert!(matches!(err, DdnsError::Key(KeyError::Signer { .. })));
        assert_eq!(err.reason(), REASON_SIGNING_KEY_INVALID);
        assert!(!err.is_retryable());
        assert!(service.transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_refused_is_reported_verbatim() {
        let rejected = TransportError::ServerRejected {
            server: "10.0.0.2:53".to_string(),
            fqdn: "www.example.test.".to_string(),
            response_code: "Refused".to_string(),
            rcode: 5,
        };
        let service = service(Err(rejected.clone()));

        let err = service.add_record("www", "A", "10.0.0.5").await.unwrap_err();
        assert_eq!(err, DdnsError::Transport(rejected));
        assert_eq!(err.reason(), REASON_SERVER_REJECTED);
        assert!(!err.is_retryable());

        let count = UPDATES_TOTAL
            .with_label_values(&["add", "A", "rejected"])
            .get();
        assert!(count > 0.0);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable() {
        let service = service(Err(TransportError::Timeout {
            server: "10.0.0.2:53".to_string(),
            timeout_ms: 5000,
        }));

        let err = service
            .add_record_with_ttl("www", "TXT", "hello", Some(300))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), REASON_TIMEOUT);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_explicit_ttl_and_delete() {
        let service = service(Ok(ack()));

        service
            .add_record_with_ttl("www", "CNAME", "web", Some(3600))
            .await
            .unwrap();
        service.delete_record("www", "CNAME", "web").await.unwrap();

        let submitted = service.transport.submitted();
        assert!(submitted[0]
            .0
            .contains("update add www.example.test. 3600 CNAME web.example.test."));
        assert!(submitted[1]
            .0
            .contains("update delete www.example.test. CNAME web.example.test."));
    }

    #[test]
    fn test_prepare_does_not_submit() {
        let service = service(Ok(ack()));

        let tx = service.prepare_add("www", "A", "10.0.0.5", None).unwrap();
        assert_eq!(tx.operation(), Operation::Add);
        let tx = service.prepare_delete("www", "A", "10.0.0.5").unwrap();
        assert_eq!(tx.operation(), Operation::Delete);

        assert!(service.transport.submitted().is_empty());
        assert_eq!(service.timeout(), Duration::from_secs(5));
        assert_eq!(service.builder().default_ttl(), 60);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let service = Arc::new(service(Ok(ack())));

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .add_record(&format!("host{i}"), "A", &format!("10.0.0.{i}"))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(service.transport.submitted().len(), 8);
    }
}
