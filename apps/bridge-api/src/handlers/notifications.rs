//! 设备通知 webhook
//!
//! - POST /notifications
//!
//! 一次请求为一批通知：逐条转换为观测记录后整批提交给接入方。
//! 成功返回 200 与接入方响应体；接入失败返回 500 与上游错误体。

use crate::AppState;
use crate::utils::response::{bad_request_error, invalid_notification_error, upstream_response};
use api_contract::NotificationBatchRequest;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use bridge_telemetry::{
    record_batch_rejected, record_ingest_failure, record_ingest_latency_ms,
    record_ingest_success, record_invalid_record, record_known_record,
    record_notifications_received, record_skipped_record, record_unknown_record,
};
use domain::{Notification, Observation};
use std::time::Instant;
use tracing::{error, info, warn};

pub async fn receive_notifications(
    State(state): State<AppState>,
    body: Result<Json<NotificationBatchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(target: "bridge.webhook", error = %message, "request_body_invalid");
            return bad_request_error(message);
        }
    };

    let notifications: Vec<Notification> =
        request.notifications.into_iter().map(Into::into).collect();
    record_notifications_received(notifications.len() as u64);
    info!(
        target: "bridge.webhook",
        notifications = notifications.len(),
        "notifications_received"
    );

    let outcome = match state.transformer.transform(&notifications) {
        Ok(outcome) => outcome,
        Err(err) => {
            record_invalid_record();
            record_batch_rejected();
            return invalid_notification_error(err.to_string());
        }
    };
    for observation in &outcome.observations {
        match observation {
            Observation::Known { .. } => record_known_record(),
            Observation::Unknown { .. } => record_unknown_record(),
        }
    }
    (0..outcome.invalid).for_each(|_| record_invalid_record());
    (0..outcome.skipped).for_each(|_| record_skipped_record());

    let started_at = Instant::now();
    match state.ingestor.post_series(&outcome.observations).await {
        Ok(response) => {
            record_ingest_success();
            record_ingest_latency_ms(started_at.elapsed().as_millis() as u64);
            info!(
                target: "bridge.webhook",
                records = outcome.observations.len(),
                known = outcome.known(),
                unknown = outcome.unknown(),
                invalid = outcome.invalid,
                skipped = outcome.skipped,
                upstream_status = response.status,
                "series_forwarded"
            );
            upstream_response(StatusCode::OK, response.body)
        }
        Err(err) => {
            record_ingest_failure();
            let body = err.error_body();
            error!(
                target: "bridge.webhook",
                records = outcome.observations.len(),
                error = %err,
                upstream_body = %body,
                "series_forward_failed"
            );
            upstream_response(StatusCode::INTERNAL_SERVER_ERROR, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::AppState;
    use crate::routes::create_app;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use bridge_ingest::{IngestError, IngestResponse, SeriesIngestor};
    use bridge_transform::Transformer;
    use domain::{CodeTable, InvalidValuePolicy, Observation};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingIngestor {
        batches: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl SeriesIngestor for RecordingIngestor {
        async fn post_series(
            &self,
            records: &[Observation],
        ) -> Result<IngestResponse, IngestError> {
            let batch = serde_json::to_value(records).expect("records");
            self.batches.lock().expect("lock").push(batch);
            Ok(IngestResponse {
                status: 200,
                body: serde_json::json!({ "stored": records.len() }),
            })
        }
    }

    struct RejectingIngestor;

    #[async_trait]
    impl SeriesIngestor for RejectingIngestor {
        async fn post_series(
            &self,
            _records: &[Observation],
        ) -> Result<IngestResponse, IngestError> {
            Err(IngestError::Rejected {
                status: 400,
                body: Value::String("bad request".to_string()),
            })
        }
    }

    fn app(ingestor: Arc<dyn SeriesIngestor>, policy: InvalidValuePolicy) -> Router {
        create_app(AppState {
            transformer: Arc::new(Transformer::new(CodeTable::default(), policy)),
            ingestor,
        })
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes()
            .to_vec()
    }

    fn batch() -> Value {
        serde_json::json!({
            "notifications": [
                { "path": "a/b/5600", "payload": STANDARD.encode("23.5"), "ep": "sensor1", "ct": "text/plain" },
                { "path": "a/b/9999", "payload": STANDARD.encode("1.0"), "ep": "sensor2" }
            ]
        })
    }

    #[tokio::test]
    async fn forwards_transformed_batch_once() {
        let ingestor = Arc::new(RecordingIngestor::default());
        let response = app(ingestor.clone(), InvalidValuePolicy::Sentinel)
            .oneshot(post("/notifications", batch()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(body, serde_json::json!({ "stored": 2 }));

        let batches = ingestor.batches.lock().expect("lock");
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            serde_json::json!([
                { "resource": "sensor1", "temperature": 23.5 },
                { "resource": "sensor2", "9999": 1.0 }
            ])
        );
    }

    #[tokio::test]
    async fn ingestion_failure_returns_upstream_body() {
        let response = app(Arc::new(RejectingIngestor), InvalidValuePolicy::Sentinel)
            .oneshot(post("/api/notifications", batch()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, b"bad request".to_vec());
    }

    #[tokio::test]
    async fn malformed_body_is_answered_with_bad_request() {
        let ingestor = Arc::new(RecordingIngestor::default());
        let request = Request::builder()
            .method("POST")
            .uri("/notifications")
            .header("content-type", "application/json")
            .body(Body::from("{\"notifications\": [ { \"ep\": 1 } ]"))
            .expect("request");
        let response = app(ingestor.clone(), InvalidValuePolicy::Sentinel)
            .oneshot(request)
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(body["error"]["code"], "INVALID.REQUEST");
        assert!(ingestor.batches.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn rejected_batch_skips_ingestion() {
        let ingestor = Arc::new(RecordingIngestor::default());
        let body = serde_json::json!({
            "notifications": [
                { "path": "a/b/5600", "payload": STANDARD.encode("23.5"), "ep": "sensor1" },
                { "path": "a/b/5600", "payload": STANDARD.encode("warm"), "ep": "sensor1" }
            ]
        });
        let response = app(ingestor.clone(), InvalidValuePolicy::Reject)
            .oneshot(post("/notifications", body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(body["error"]["code"], "INVALID.NOTIFICATION");
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .starts_with("notification 1 invalid")
        );
        assert!(ingestor.batches.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_still_forwarded() {
        let ingestor = Arc::new(RecordingIngestor::default());
        let response = app(ingestor.clone(), InvalidValuePolicy::Sentinel)
            .oneshot(post("/notifications", serde_json::json!({})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let batches = ingestor.batches.lock().expect("lock");
        assert_eq!(batches.as_slice(), &[serde_json::json!([])]);
    }

    #[tokio::test]
    async fn caller_trace_id_is_echoed() {
        let mut request = post("/notifications", serde_json::json!({ "notifications": null }));
        request
            .headers_mut()
            .insert("x-trace-id", "trace-from-platform".parse().expect("header"));
        let response = app(Arc::new(RecordingIngestor::default()), InvalidValuePolicy::Sentinel)
            .oneshot(request)
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-trace-id").and_then(|v| v.to_str().ok()),
            Some("trace-from-platform")
        );
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let app = app(Arc::new(RecordingIngestor::default()), InvalidValuePolicy::Sentinel);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(body["success"], true);
        assert!(body["data"]["notificationsReceived"].is_u64());
    }
}
